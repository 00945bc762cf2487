//! 表示アダプタ
//!
//! OpenCV highguiによるウィンドウ表示とキー入力ポーリング。
//! ウィンドウはプロセス生存期間にスコープされ、Dropですべて破棄される
//! （エラーパスを含むあらゆる終了経路で解放される）。

use crate::domain::{DisplayPort, Frame, VisionError, VisionResult};
use crate::infrastructure::capture::common::frame_to_mat;
use opencv::highgui;
use std::collections::HashSet;

/// highgui表示アダプタ
pub struct HighguiDisplay {
    wait_ms: i32,
    windows: HashSet<String>,
}

impl HighguiDisplay {
    /// 新しい表示アダプタを作成
    ///
    /// # Arguments
    /// - `wait_ms`: poll_keyのブロック時間（ミリ秒、1以上）
    pub fn new(wait_ms: i32) -> Self {
        Self {
            wait_ms: wait_ms.max(1),
            windows: HashSet::new(),
        }
    }

    /// 任意のキーが押されるまでブロックする（静止画モード用）
    pub fn wait_for_any_key(&self) -> VisionResult<i32> {
        highgui::wait_key(0)
            .map_err(|e| VisionError::Display(format!("wait_key failed: {:?}", e)))
    }
}

impl DisplayPort for HighguiDisplay {
    fn show(&mut self, window: &str, frame: &Frame) -> VisionResult<()> {
        // ウィンドウ作成は名前ごとに1回だけ（等倍表示、リサイズ不可）
        if self.windows.insert(window.to_string()) {
            highgui::named_window(window, highgui::WINDOW_AUTOSIZE)
                .map_err(|e| VisionError::Display(format!("Failed to create window: {:?}", e)))?;
        }

        let mat = frame_to_mat(frame)?;
        highgui::imshow(window, &mat)
            .map_err(|e| VisionError::Display(format!("Failed to show frame: {:?}", e)))
    }

    fn poll_key(&mut self) -> VisionResult<Option<i32>> {
        let key = highgui::wait_key(self.wait_ms)
            .map_err(|e| VisionError::Display(format!("wait_key failed: {:?}", e)))?;

        if key < 0 {
            Ok(None)
        } else {
            Ok(Some(key))
        }
    }
}

impl Drop for HighguiDisplay {
    fn drop(&mut self) {
        // 終了経路を問わず必ずウィンドウを破棄する
        let _ = highgui::destroy_all_windows();
    }
}
