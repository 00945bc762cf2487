/// モック表示アダプタ
///
/// テスト・開発用の表示実装。表示されたウィンドウ名を記録し、
/// キー入力はあらかじめ与えたスクリプトを順に返す。

use crate::domain::{DisplayPort, Frame, VisionResult};
use std::collections::VecDeque;

/// モック表示アダプタ
#[derive(Default)]
pub struct RecordingDisplay {
    /// 表示された（ウィンドウ名, 幅, 高さ）の履歴
    pub shown: Vec<(String, u32, u32)>,
    /// poll_keyが順に返すキー入力
    pub keys: VecDeque<Option<i32>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// キー入力スクリプトを指定して作成
    pub fn with_keys(keys: Vec<Option<i32>>) -> Self {
        Self {
            shown: Vec::new(),
            keys: keys.into(),
        }
    }

    /// 指定ウィンドウが表示された回数
    pub fn shown_count(&self, window: &str) -> usize {
        self.shown.iter().filter(|(name, _, _)| name == window).count()
    }
}

impl DisplayPort for RecordingDisplay {
    fn show(&mut self, window: &str, frame: &Frame) -> VisionResult<()> {
        self.shown
            .push((window.to_string(), frame.width, frame.height));
        Ok(())
    }

    fn poll_key(&mut self) -> VisionResult<Option<i32>> {
        Ok(self.keys.pop_front().unwrap_or(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_display() {
        let mut display = RecordingDisplay::with_keys(vec![Some(27)]);

        let frame = Frame::solid(8, 4, [0, 0, 0]);
        display.show("Test", &frame).unwrap();

        assert_eq!(display.shown_count("Test"), 1);
        assert_eq!(display.shown[0], ("Test".to_string(), 8, 4));

        assert_eq!(display.poll_key().unwrap(), Some(27));
        // スクリプトが尽きたら入力なし
        assert_eq!(display.poll_key().unwrap(), None);
    }
}
