//! ナンバープレート位置検出アダプタ
//!
//! 固定5段の輪郭ベースのパイプライン:
//! リサイズ → グレースケール → バイラテラルフィルタ → Cannyエッジ →
//! 輪郭探索 → 四角形ヒューリスティック（面積順に調べ、頂点4つの
//! 近似輪郭を最初に見つけたものを採用）。
//!
//! 状態を持たず、候補がなければ `None`（エラーではない）。
//! 座標はすべてリサイズ後の画像空間。

use crate::domain::{
    config::PlateConfig, BoundingBox, Frame, VisionError, VisionResult,
};
use crate::infrastructure::capture::common::{frame_to_mat, mat_to_frame};
use opencv::{
    core::{self, Mat, Point, Scalar, Size, Vector},
    imgproc,
    prelude::*,
};

/// 検出されたプレート候補
#[derive(Debug, Clone)]
pub struct PlateLocation {
    /// 近似された四角形の頂点（リサイズ後座標）
    #[allow(dead_code)]
    pub quad: Vec<(i32, i32)>,
    /// 候補輪郭の外接矩形
    pub bounding: BoundingBox,
    /// 外接矩形で切り出したプレート画像
    pub plate: Frame,
}

/// 位置検出の結果一式
#[derive(Debug, Clone)]
pub struct PlateLocateResult {
    /// 候補（見つからなければ None）
    pub location: Option<PlateLocation>,
    /// 採用輪郭を描き込んだ表示用フレーム（リサイズ後）
    pub annotated: Frame,
}

/// ナンバープレート位置検出アダプタ
pub struct PlateLocator {
    config: PlateConfig,
}

impl PlateLocator {
    /// 新しい位置検出アダプタを作成
    pub fn new(config: PlateConfig) -> Self {
        Self { config }
    }

    /// アスペクト比を維持して設定幅にリサイズ
    fn resize(&self, bgr: &Mat) -> VisionResult<Mat> {
        let src_width = bgr.cols();
        let src_height = bgr.rows();
        if src_width <= 0 || src_height <= 0 {
            return Err(VisionError::Process("Empty input image".to_string()));
        }

        let dst_width = self.config.resize_width as i32;
        let dst_height =
            ((src_height as f64) * (dst_width as f64) / (src_width as f64)).round() as i32;

        let mut resized = Mat::default();
        imgproc::resize(
            bgr,
            &mut resized,
            Size::new(dst_width, dst_height.max(1)),
            0.0,
            0.0,
            imgproc::INTER_AREA,
        )
        .map_err(|e| VisionError::Process(format!("Failed to resize: {:?}", e)))?;

        Ok(resized)
    }

    /// 前処理: グレースケール → バイラテラル → Cannyエッジ
    fn edges(&self, resized: &Mat) -> VisionResult<Mat> {
        let mut gray = Mat::default();
        imgproc::cvt_color(resized, &mut gray, imgproc::COLOR_BGR2GRAY, 0)
            .map_err(|e| VisionError::Process(format!("Failed to convert to gray: {:?}", e)))?;

        let mut filtered = Mat::default();
        imgproc::bilateral_filter(
            &gray,
            &mut filtered,
            self.config.bilateral_diameter,
            self.config.bilateral_sigma,
            self.config.bilateral_sigma,
            core::BORDER_DEFAULT,
        )
        .map_err(|e| VisionError::Process(format!("Bilateral filter failed: {:?}", e)))?;

        let mut edged = Mat::default();
        imgproc::canny(
            &filtered,
            &mut edged,
            self.config.canny_low,
            self.config.canny_high,
            3,
            false,
        )
        .map_err(|e| VisionError::Process(format!("Canny edge detection failed: {:?}", e)))?;

        Ok(edged)
    }

    /// 面積の大きい順に上位候補の輪郭を取得
    fn top_contours(&self, edged: &Mat) -> VisionResult<Vec<Vector<Point>>> {
        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours(
            edged,
            &mut contours,
            imgproc::RETR_LIST,
            imgproc::CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .map_err(|e| VisionError::Process(format!("find_contours failed: {:?}", e)))?;

        let mut with_area: Vec<(f64, Vector<Point>)> = Vec::with_capacity(contours.len());
        for contour in contours.iter() {
            let area = imgproc::contour_area(&contour, false)
                .map_err(|e| VisionError::Process(format!("contour_area failed: {:?}", e)))?;
            with_area.push((area, contour));
        }

        with_area.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        with_area.truncate(self.config.max_candidates);

        Ok(with_area.into_iter().map(|(_, c)| c).collect())
    }

    /// プレート位置を検出する
    ///
    /// # Returns
    /// 候補の有無にかかわらず `Ok`。候補なしは `location: None` で表現され、
    /// `annotated` はリサイズ後のフレーム（候補ありなら輪郭描画済み）。
    pub fn locate(&self, frame: &Frame) -> VisionResult<PlateLocateResult> {
        let bgr = frame_to_mat(frame)?;
        let resized = self.resize(&bgr)?;
        let edged = self.edges(&resized)?;

        let mut display = resized
            .try_clone()
            .map_err(|e| VisionError::Process(format!("Failed to clone display: {:?}", e)))?;

        for contour in self.top_contours(&edged)? {
            let perimeter = imgproc::arc_length(&contour, true)
                .map_err(|e| VisionError::Process(format!("arc_length failed: {:?}", e)))?;

            let mut approx = Vector::<Point>::new();
            imgproc::approx_poly_dp(
                &contour,
                &mut approx,
                self.config.approx_epsilon_ratio * perimeter,
                true,
            )
            .map_err(|e| VisionError::Process(format!("approx_poly_dp failed: {:?}", e)))?;

            // 四角形（頂点4つ）だけをプレート候補とみなす
            if approx.len() != 4 {
                continue;
            }

            let rect = imgproc::bounding_rect(&contour)
                .map_err(|e| VisionError::Process(format!("bounding_rect failed: {:?}", e)))?;

            let plate_mat = Mat::roi(&resized, rect)
                .map_err(|e| VisionError::Process(format!("Failed to crop plate: {:?}", e)))?
                .try_clone()
                .map_err(|e| VisionError::Process(format!("Failed to clone plate: {:?}", e)))?;

            let mut quads = Vector::<Vector<Point>>::new();
            quads.push(approx.clone());
            imgproc::draw_contours(
                &mut display,
                &quads,
                -1,
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                3,
                imgproc::LINE_8,
                &core::no_array(),
                0,
                Point::new(0, 0),
            )
            .map_err(|e| VisionError::Process(format!("draw_contours failed: {:?}", e)))?;

            let location = PlateLocation {
                quad: approx.iter().map(|p| (p.x, p.y)).collect(),
                bounding: BoundingBox::new(rect.x, rect.y, rect.width, rect.height),
                plate: mat_to_frame(&plate_mat)?,
            };

            return Ok(PlateLocateResult {
                location: Some(location),
                annotated: mat_to_frame(&display)?,
            });
        }

        Ok(PlateLocateResult {
            location: None,
            annotated: mat_to_frame(&display)?,
        })
    }
}
