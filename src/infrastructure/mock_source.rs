/// モックフレームソース
///
/// テスト・開発用のフレームソース実装。
/// あらかじめ与えたフレーム列を順に返し、尽きたら終端を通知する。

use crate::domain::{Frame, FrameSourcePort, SourceInfo, VisionResult};
use std::collections::VecDeque;

/// モックフレームソース
pub struct ScriptedSource {
    frames: VecDeque<Frame>,
    info: SourceInfo,
}

impl ScriptedSource {
    /// フレーム列を指定して作成
    pub fn new(frames: Vec<Frame>) -> Self {
        let (width, height) = frames
            .first()
            .map(|f| (f.width, f.height))
            .unwrap_or((0, 0));

        Self {
            frames: frames.into(),
            info: SourceInfo {
                width,
                height,
                fps: 30.0,
                name: "scripted".to_string(),
            },
        }
    }

    /// 指定枚数の単色フレーム列を作成
    pub fn solid_frames(count: usize, width: u32, height: u32, bgr: [u8; 3]) -> Self {
        Self::new(
            (0..count)
                .map(|_| Frame::solid(width, height, bgr))
                .collect(),
        )
    }

    /// 残りフレーム数
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSourcePort for ScriptedSource {
    fn next_frame(&mut self) -> VisionResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }

    fn source_info(&self) -> SourceInfo {
        self.info.clone()
    }
}
