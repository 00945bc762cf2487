//! 動画ファイルキャプチャアダプタ
//!
//! OpenCV videoioで動画ファイルから有限のフレーム列を取得する。
//! 末尾に達した時点で終端（`Ok(None)`）を通知する。

use crate::domain::{Frame, FrameSourcePort, SourceInfo, VisionError, VisionResult};
use crate::infrastructure::capture::common::mat_to_frame;
use opencv::{core::Mat, prelude::*, videoio};

/// 動画ファイルキャプチャアダプタ
pub struct VideoFileSource {
    capture: videoio::VideoCapture,
    info: SourceInfo,
    buffer: Mat,
}

impl VideoFileSource {
    /// 動画ファイルを開く
    ///
    /// # Returns
    /// - `Err(VisionError::Initialization)`: ファイルが存在しない・デコーダが開けない
    pub fn open(path: &str) -> VisionResult<Self> {
        if !std::path::Path::new(path).exists() {
            return Err(VisionError::Initialization(format!(
                "Video file not found: {}",
                path
            )));
        }

        let capture = videoio::VideoCapture::from_file(path, videoio::CAP_ANY).map_err(|e| {
            VisionError::Initialization(format!("Failed to open video {}: {:?}", path, e))
        })?;

        let opened = capture.is_opened().map_err(|e| {
            VisionError::Initialization(format!("Failed to query video {}: {:?}", path, e))
        })?;
        if !opened {
            return Err(VisionError::Initialization(format!(
                "Video cannot be opened: {}",
                path
            )));
        }

        let info = SourceInfo {
            width: capture
                .get(videoio::CAP_PROP_FRAME_WIDTH)
                .unwrap_or(0.0) as u32,
            height: capture
                .get(videoio::CAP_PROP_FRAME_HEIGHT)
                .unwrap_or(0.0) as u32,
            fps: capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0),
            name: format!("video:{}", path),
        };

        tracing::info!(
            "Video opened: {} ({}x{} @ {:.1}fps)",
            path,
            info.width,
            info.height,
            info.fps
        );

        Ok(Self {
            capture,
            info,
            buffer: Mat::default(),
        })
    }
}

impl FrameSourcePort for VideoFileSource {
    fn next_frame(&mut self) -> VisionResult<Option<Frame>> {
        let grabbed = self
            .capture
            .read(&mut self.buffer)
            .map_err(|e| VisionError::Capture(format!("Failed to read video frame: {:?}", e)))?;

        // 末尾・デコード失敗はソース終端
        if !grabbed || self.buffer.empty() {
            return Ok(None);
        }

        mat_to_frame(&self.buffer).map(Some)
    }

    fn source_info(&self) -> SourceInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_fails() {
        let result = VideoFileSource::open("no/such/video.mp4");
        assert!(matches!(result, Err(VisionError::Initialization(_))));
    }
}
