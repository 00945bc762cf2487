//! カメラキャプチャアダプタ
//!
//! OpenCV videoioでカメラデバイスからフレーム列を取得する。

use crate::domain::{Frame, FrameSourcePort, SourceInfo, VisionError, VisionResult};
use crate::infrastructure::capture::common::mat_to_frame;
use opencv::{core::Mat, prelude::*, videoio};

/// カメラキャプチャアダプタ
pub struct CameraSource {
    capture: videoio::VideoCapture,
    info: SourceInfo,
    buffer: Mat,
}

impl CameraSource {
    /// カメラを開く
    ///
    /// # Arguments
    /// - `index`: デバイスインデックス（0 = 既定カメラ）
    ///
    /// # Returns
    /// - `Err(VisionError::Initialization)`: カメラが存在しない・使用中
    pub fn open(index: i32) -> VisionResult<Self> {
        let capture = videoio::VideoCapture::new(index, videoio::CAP_ANY).map_err(|e| {
            VisionError::Initialization(format!("Failed to open camera {}: {:?}", index, e))
        })?;

        let opened = capture.is_opened().map_err(|e| {
            VisionError::Initialization(format!("Failed to query camera {}: {:?}", index, e))
        })?;
        if !opened {
            return Err(VisionError::Initialization(format!(
                "Camera {} is not available",
                index
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
            name: format!("camera:{}", index),
        };

        tracing::info!(
            "Camera {} opened: {}x{} @ {:.1}fps",
            index,
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

impl FrameSourcePort for CameraSource {
    fn next_frame(&mut self) -> VisionResult<Option<Frame>> {
        let grabbed = self
            .capture
            .read(&mut self.buffer)
            .map_err(|e| VisionError::Capture(format!("Failed to read camera frame: {:?}", e)))?;

        // 読み取り失敗（切断・デコード不能）はソース終端として扱う
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
    #[ignore = "Requires a physical camera"]
    fn test_camera_capture_one_frame() {
        let mut source = CameraSource::open(0).expect("camera 0 must be available");
        let frame = source.next_frame().unwrap();
        assert!(frame.is_some());

        let frame = frame.unwrap();
        assert!(frame.is_well_formed());
    }

    #[test]
    fn test_open_invalid_index_fails() {
        // 存在しないインデックスは起動時エラーになる
        let result = CameraSource::open(9999);
        assert!(result.is_err());
    }
}
