//! Haarカスケード検知アダプタ
//!
//! 事前学習済みカスケード分類器（顔・目・車・歩行者）による物体検出。
//! 分類器は不透明な外部プリミティブとして扱い、XMLパスは設定から注入する。

use crate::domain::{
    config::{CascadeConfig, CascadeKind},
    BoundingBox, Detection, Frame, FrameProcessorPort, NamedView, VisionError, VisionResult,
};
use crate::infrastructure::capture::common::{frame_to_mat, mat_to_frame};
use opencv::{
    core::{Mat, Rect, Scalar, Size, Vector},
    imgproc, objdetect,
    prelude::*,
};

/// 顔矩形の描画色（BGR）
pub const FACE_BOX_COLOR: (u8, u8, u8) = (127, 0, 255);
/// 目矩形の描画色（BGR）
pub const EYE_BOX_COLOR: (u8, u8, u8) = (255, 255, 0);
/// 車・歩行者矩形の描画色（BGR）
pub const VEHICLE_BOX_COLOR: (u8, u8, u8) = (0, 255, 255);

/// detect_multi_scaleのパラメータ一式
#[derive(Debug, Clone, Copy)]
pub struct CascadeParams {
    /// ピラミッドの縮小率
    pub scale_factor: f64,
    /// 検出に必要な近傍矩形数
    pub min_neighbors: i32,
    /// 検出対象の最小サイズ（0 = 制限なし）
    pub min_size: i32,
    /// CASCADE_SCALE_IMAGEフラグを立てるか
    pub scale_image: bool,
}

impl CascadeParams {
    /// 顔検出向けパラメータ
    pub fn face() -> Self {
        Self {
            scale_factor: 1.3,
            min_neighbors: 5,
            min_size: 0,
            scale_image: false,
        }
    }

    /// 目検出向けパラメータ（OpenCV既定値）
    pub fn eye() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 3,
            min_size: 0,
            scale_image: false,
        }
    }

    /// 車検出向けパラメータ
    #[allow(dead_code)]
    pub fn car() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 3,
            min_size: 30,
            scale_image: false,
        }
    }

    /// 歩行者検出向けパラメータ
    #[allow(dead_code)]
    pub fn pedestrian() -> Self {
        Self {
            scale_factor: 1.05,
            min_neighbors: 5,
            min_size: 120,
            scale_image: true,
        }
    }

    /// 設定値からパラメータを構成
    pub fn from_config(config: &CascadeConfig) -> Self {
        Self {
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_size: config.min_size,
            scale_image: config.kind == CascadeKind::Pedestrian,
        }
    }
}

/// 検知の種類に対応する表示ウィンドウのタイトル
pub fn window_title(kind: CascadeKind) -> &'static str {
    match kind {
        CascadeKind::Face => "Face Detection",
        CascadeKind::FaceEye => "Detected Faces & Eyes",
        CascadeKind::Car => "Car Detection",
        CascadeKind::Pedestrian => "Pedestrians",
    }
}

/// 顔検出数の要約文
pub fn face_summary(count: usize) -> String {
    if count == 0 {
        "No Face Found".to_string()
    } else {
        format!("{} Face(s) Detected", count)
    }
}

/// Haarカスケード検知アダプタ
pub struct CascadeDetector {
    classifier: objdetect::CascadeClassifier,
    params: CascadeParams,
}

impl CascadeDetector {
    /// 分類器XMLを読み込んで検知アダプタを作成
    ///
    /// # Returns
    /// - `Err(VisionError::Initialization)`: XMLが存在しない・読み込めない・空
    pub fn from_file(path: &str, params: CascadeParams) -> VisionResult<Self> {
        if !std::path::Path::new(path).exists() {
            return Err(VisionError::Initialization(format!(
                "Classifier file does not exist: {}",
                path
            )));
        }

        let classifier = objdetect::CascadeClassifier::new(path).map_err(|e| {
            VisionError::Initialization(format!("Failed to load classifier {}: {:?}", path, e))
        })?;

        let empty = classifier.empty().map_err(|e| {
            VisionError::Initialization(format!("Failed to query classifier: {:?}", e))
        })?;
        if empty {
            return Err(VisionError::Initialization(format!(
                "Classifier is empty (invalid XML?): {}",
                path
            )));
        }

        tracing::info!("Cascade classifier loaded: {}", path);

        Ok(Self { classifier, params })
    }

    /// グレースケールMat上で検出を実行
    fn detect_gray(&mut self, gray: &Mat) -> VisionResult<Vec<BoundingBox>> {
        let flags = if self.params.scale_image {
            objdetect::CASCADE_SCALE_IMAGE
        } else {
            0
        };

        let mut rects = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                gray,
                &mut rects,
                self.params.scale_factor,
                self.params.min_neighbors,
                flags,
                Size::new(self.params.min_size, self.params.min_size),
                Size::default(),
            )
            .map_err(|e| VisionError::Process(format!("detect_multi_scale failed: {:?}", e)))?;

        Ok(rects
            .iter()
            .map(|r| BoundingBox::new(r.x, r.y, r.width, r.height))
            .collect())
    }

    /// フレーム上で検出を実行
    ///
    /// 検出性能のため内部でグレースケール化してから走査する。
    pub fn detect(&mut self, frame: &Frame) -> VisionResult<Vec<BoundingBox>> {
        let bgr = frame_to_mat(frame)?;

        let mut gray = Mat::default();
        imgproc::cvt_color(&bgr, &mut gray, imgproc::COLOR_BGR2GRAY, 0)
            .map_err(|e| VisionError::Process(format!("Failed to convert to gray: {:?}", e)))?;

        self.detect_gray(&gray)
    }
}

/// 顔+目のネスト検知アダプタ
///
/// 顔矩形ごとにグレースケールROIを切り出し、その内側で目を検出する。
/// 目の矩形は絶対座標に変換して返す。
pub struct FaceEyeDetector {
    face: CascadeDetector,
    eye: CascadeDetector,
}

impl FaceEyeDetector {
    pub fn from_files(face_path: &str, eye_path: &str) -> VisionResult<Self> {
        Ok(Self {
            face: CascadeDetector::from_file(face_path, CascadeParams::face())?,
            eye: CascadeDetector::from_file(eye_path, CascadeParams::eye())?,
        })
    }

    pub fn detect(&mut self, frame: &Frame) -> VisionResult<Detection> {
        let bgr = frame_to_mat(frame)?;

        let mut gray = Mat::default();
        imgproc::cvt_color(&bgr, &mut gray, imgproc::COLOR_BGR2GRAY, 0)
            .map_err(|e| VisionError::Process(format!("Failed to convert to gray: {:?}", e)))?;

        let faces = self.face.detect_gray(&gray)?;

        let mut eyes = Vec::new();
        for face in &faces {
            let roi_rect = Rect::new(face.x, face.y, face.width, face.height);
            let roi = Mat::roi(&gray, roi_rect)
                .map_err(|e| VisionError::Process(format!("Failed to take face ROI: {:?}", e)))?
                .try_clone()
                .map_err(|e| VisionError::Process(format!("Failed to clone face ROI: {:?}", e)))?;

            for eye in self.eye.detect_gray(&roi)? {
                eyes.push(eye.offset(face.x, face.y));
            }
        }

        Ok(Detection { boxes: faces, eyes })
    }
}

/// 矩形を描き込んだフレームを生成する
pub fn annotate(
    frame: &Frame,
    boxes: &[BoundingBox],
    color_bgr: (u8, u8, u8),
) -> VisionResult<Frame> {
    let mut bgr = frame_to_mat(frame)?;
    draw_boxes(&mut bgr, boxes, color_bgr)?;
    mat_to_frame(&bgr)
}

/// 検出結果（対象+目）を描き込んだフレームを生成する
pub fn annotate_detection(frame: &Frame, detection: &Detection) -> VisionResult<Frame> {
    let mut bgr = frame_to_mat(frame)?;
    draw_boxes(&mut bgr, &detection.boxes, FACE_BOX_COLOR)?;
    draw_boxes(&mut bgr, &detection.eyes, EYE_BOX_COLOR)?;
    mat_to_frame(&bgr)
}

fn draw_boxes(bgr: &mut Mat, boxes: &[BoundingBox], color_bgr: (u8, u8, u8)) -> VisionResult<()> {
    let color = Scalar::new(
        color_bgr.0 as f64,
        color_bgr.1 as f64,
        color_bgr.2 as f64,
        0.0,
    );

    for bbox in boxes {
        let rect = Rect::new(bbox.x, bbox.y, bbox.width, bbox.height);
        imgproc::rectangle(bgr, rect, color, 2, imgproc::LINE_8, 0)
            .map_err(|e| VisionError::Process(format!("Failed to draw rectangle: {:?}", e)))?;
    }

    Ok(())
}

/// 動画向けカスケード検知処理アダプタ
///
/// フレームごとに検出し、矩形を描き込んだ1ビューを返す。
pub struct CascadeVideoAdapter {
    detector: CascadeDetector,
    window: String,
}

impl CascadeVideoAdapter {
    /// 設定から動画向け検知アダプタを作成
    pub fn from_config(config: &CascadeConfig) -> VisionResult<Self> {
        let detector =
            CascadeDetector::from_file(&config.classifier_path, CascadeParams::from_config(config))?;

        Ok(Self {
            detector,
            window: window_title(config.kind).to_string(),
        })
    }
}

impl FrameProcessorPort for CascadeVideoAdapter {
    fn process_frame(&mut self, frame: &Frame) -> VisionResult<Vec<NamedView>> {
        let boxes = crate::measure_span!("cascade_detect", self.detector.detect(frame)?);

        tracing::debug!(hits = boxes.len(), "Cascade scan finished");

        let annotated = annotate(frame, &boxes, VEHICLE_BOX_COLOR)?;
        Ok(vec![NamedView::new(self.window.clone(), annotated)])
    }
}
