//! Capture共通処理
//!
//! OpenCVのMatとDomain層のFrameの相互変換。
//! 各キャプチャアダプタと画像処理アダプタで共有される。

use crate::domain::{Frame, VisionError, VisionResult};
use opencv::{core::Mat, imgcodecs, imgproc, prelude::*};

/// FrameデータをBGRのMatに変換
///
/// Frameのバッファを参照するMatを作成し、所有権のあるコピーを返す。
///
/// # Arguments
/// - `frame`: BGR形式のフレーム
///
/// # Returns
/// BGR形式のMat（CV_8UC3、連続メモリ）
pub fn frame_to_mat(frame: &Frame) -> VisionResult<Mat> {
    if !frame.is_well_formed() {
        return Err(VisionError::Process(format!(
            "Frame buffer length {} does not match {}x{}x3",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let rows = frame.height as i32;

    // バッファを借用する1行Matを作り、3チャンネルのrows行に整形する
    let flat = Mat::from_slice(&frame.data)
        .map_err(|e| VisionError::Process(format!("Failed to create Mat: {:?}", e)))?;
    let shaped = flat
        .reshape(3, rows)
        .map_err(|e| VisionError::Process(format!("Failed to reshape Mat: {:?}", e)))?;

    // 借用元のFrameより長生きできるよう所有コピーを返す
    shaped
        .try_clone()
        .map_err(|e| VisionError::Process(format!("Failed to clone Mat: {:?}", e)))
}

/// MatをFrameに変換
///
/// CV_8UC3はそのまま、CV_8UC4はBGRAとみなしてBGRに変換する。
/// 非連続メモリ（ROI切り出し等）は内部でコピーして連続化する。
pub fn mat_to_frame(mat: &Mat) -> VisionResult<Frame> {
    let bgr = match mat.channels() {
        3 => mat.try_clone().map_err(|e| {
            VisionError::Process(format!("Failed to clone Mat: {:?}", e))
        })?,
        4 => {
            // BGRA → BGR変換
            let mut converted = Mat::default();
            imgproc::cvt_color(mat, &mut converted, imgproc::COLOR_BGRA2BGR, 0).map_err(|e| {
                VisionError::Process(format!("Failed to convert BGRA to BGR: {:?}", e))
            })?;
            converted
        }
        channels => {
            return Err(VisionError::Process(format!(
                "Unsupported channel count: {}",
                channels
            )))
        }
    };

    let data = bgr
        .data_bytes()
        .map_err(|e| VisionError::Process(format!("Failed to read Mat bytes: {:?}", e)))?
        .to_vec();

    Ok(Frame::new(data, bgr.cols() as u32, bgr.rows() as u32))
}

/// 画像ファイルをFrameとして読み込む
///
/// # Returns
/// - `Ok(Frame)`: 読み込み成功
/// - `Err(VisionError::Initialization)`: ファイルが存在しない、またはデコード不能
pub fn load_image(path: &str) -> VisionResult<Frame> {
    if !std::path::Path::new(path).exists() {
        return Err(VisionError::Initialization(format!(
            "Image file not found: {}",
            path
        )));
    }

    let mat = imgcodecs::imread(path, imgcodecs::IMREAD_COLOR)
        .map_err(|e| VisionError::Initialization(format!("Failed to read image: {:?}", e)))?;

    if mat.empty() {
        return Err(VisionError::Initialization(format!(
            "Image cannot be decoded: {}",
            path
        )));
    }

    mat_to_frame(&mat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Scalar;

    #[test]
    fn test_frame_mat_roundtrip() {
        let frame = Frame::solid(16, 8, [10, 20, 30]);
        let mat = frame_to_mat(&frame).unwrap();

        assert_eq!(mat.cols(), 16);
        assert_eq!(mat.rows(), 8);
        assert_eq!(mat.channels(), 3);

        let back = mat_to_frame(&mat).unwrap();
        assert_eq!(back.width, frame.width);
        assert_eq!(back.height, frame.height);
        assert_eq!(back.data, frame.data);
    }

    #[test]
    fn test_frame_to_mat_rejects_malformed() {
        let broken = Frame::new(vec![0u8; 7], 16, 8);
        assert!(matches!(
            frame_to_mat(&broken),
            Err(VisionError::Process(_))
        ));
    }

    #[test]
    fn test_mat_to_frame_converts_bgra() {
        let bgra = Mat::new_rows_cols_with_default(
            4,
            4,
            opencv::core::CV_8UC4,
            Scalar::new(1.0, 2.0, 3.0, 255.0),
        )
        .unwrap();

        let frame = mat_to_frame(&bgra).unwrap();
        assert_eq!(frame.data.len(), 4 * 4 * 3);
        assert_eq!(&frame.data[0..3], &[1, 2, 3]);
    }

    #[test]
    fn test_mat_to_frame_rejects_single_channel() {
        let gray = Mat::new_rows_cols_with_default(
            4,
            4,
            opencv::core::CV_8UC1,
            Scalar::all(0.0),
        )
        .unwrap();
        assert!(matches!(
            mat_to_frame(&gray),
            Err(VisionError::Process(_))
        ));
    }

    #[test]
    fn test_load_image_missing_file() {
        let result = load_image("no/such/file.jpg");
        assert!(matches!(result, Err(VisionError::Initialization(_))));
    }
}
