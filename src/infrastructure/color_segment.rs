//! 色検知処理アダプタ
//!
//! OpenCVを使用したHSV色空間でのセグメンテーション実装。
//! BGR→HSV変換は信頼できる外部変換として扱い、再実装しない。
//!
//! `segment`/`composite`は決定的な純関数で、同一入力に対して常に同一の
//! 結果を返す。色相の循環（h_min > h_max）は2つの部分レンジに展開して
//! マスクのORを取ることで扱う。

use crate::domain::{
    ColorTarget, Frame, FrameProcessorPort, HsvRange, Mask, NamedView, VisionError, VisionResult,
};
use crate::infrastructure::capture::common::{frame_to_mat, mat_to_frame};
use opencv::{
    core::{self, Mat, Scalar},
    imgproc,
    prelude::*,
};

/// フレームをHSV表現のMatに変換
fn frame_to_hsv(frame: &Frame) -> VisionResult<Mat> {
    let bgr = frame_to_mat(frame)?;

    let mut hsv = Mat::default();
    imgproc::cvt_color(&bgr, &mut hsv, imgproc::COLOR_BGR2HSV, 0)
        .map_err(|e| VisionError::Process(format!("Failed to convert BGR to HSV: {:?}", e)))?;

    Ok(hsv)
}

/// 非循環の部分レンジ1つ分のマスクを生成
fn in_range_mask(hsv: &Mat, range: &HsvRange) -> VisionResult<Mat> {
    let lower = Scalar::new(
        range.h_min as f64,
        range.s_min as f64,
        range.v_min as f64,
        0.0,
    );
    let upper = Scalar::new(
        range.h_max as f64,
        range.s_max as f64,
        range.v_max as f64,
        0.0,
    );

    let mut mask = Mat::default();
    core::in_range(hsv, &lower, &upper, &mut mask)
        .map_err(|e| VisionError::Process(format!("Failed to create mask: {:?}", e)))?;

    Ok(mask)
}

/// 2つのマスクの和を取る
fn or_masks(a: &Mat, b: &Mat) -> VisionResult<Mat> {
    let mut merged = Mat::default();
    core::bitwise_or(a, b, &mut merged, &core::no_array())
        .map_err(|e| VisionError::Process(format!("Failed to merge masks: {:?}", e)))?;
    Ok(merged)
}

/// 1チャンネルMatをMaskに変換
fn mat_to_mask(mat: &Mat) -> VisionResult<Mask> {
    let data = mat
        .data_bytes()
        .map_err(|e| VisionError::Process(format!("Failed to read mask bytes: {:?}", e)))?
        .to_vec();

    Ok(Mask::new(data, mat.cols() as u32, mat.rows() as u32))
}

/// MaskをCV_8UC1のMatに変換
fn mask_to_mat(mask: &Mask) -> VisionResult<Mat> {
    if mask.data.len() != (mask.width * mask.height) as usize {
        return Err(VisionError::Process(format!(
            "Mask buffer length {} does not match {}x{}",
            mask.data.len(),
            mask.width,
            mask.height
        )));
    }

    let flat = Mat::from_slice(&mask.data)
        .map_err(|e| VisionError::Process(format!("Failed to create mask Mat: {:?}", e)))?;
    let shaped = flat
        .reshape(1, mask.height as i32)
        .map_err(|e| VisionError::Process(format!("Failed to reshape mask Mat: {:?}", e)))?;

    shaped
        .try_clone()
        .map_err(|e| VisionError::Process(format!("Failed to clone mask Mat: {:?}", e)))
}

/// フレームから単一レンジのマスクを生成する
///
/// 画素のHSV値がレンジ内（境界含む）なら選択（255）、それ以外は非選択（0）。
/// 生成されるマスクの寸法は常に入力フレームと一致する。
pub fn segment(frame: &Frame, range: &HsvRange) -> VisionResult<Mask> {
    segment_multi(frame, std::slice::from_ref(range))
}

/// フレームから複数レンジの和マスクを生成する
///
/// いずれかのレンジに入る画素が選択される。循環レンジは展開済みの
/// 部分レンジとして処理される。
pub fn segment_multi(frame: &Frame, ranges: &[HsvRange]) -> VisionResult<Mask> {
    let hsv = frame_to_hsv(frame)?;

    let mut merged: Option<Mat> = None;
    for range in ranges {
        let (primary, secondary) = range.sub_ranges();

        let mut mask = in_range_mask(&hsv, &primary)?;
        if let Some(secondary) = secondary {
            mask = or_masks(&mask, &in_range_mask(&hsv, &secondary)?)?;
        }

        merged = Some(match merged {
            Some(acc) => or_masks(&acc, &mask)?,
            None => mask,
        });
    }

    let merged = merged.ok_or_else(|| {
        VisionError::Process("segment_multi requires at least one range".to_string())
    })?;

    mat_to_mask(&merged)
}

/// マスクを適用して合成フレームを生成する
///
/// マスクが選択する画素は入力フレームと同一、非選択の画素は全チャンネル0。
/// マスク寸法がフレームと一致しない場合はエラー。
pub fn composite(frame: &Frame, mask: &Mask) -> VisionResult<Frame> {
    if !mask.matches(frame) {
        return Err(VisionError::Process(format!(
            "Mask {}x{} does not match frame {}x{}",
            mask.width, mask.height, frame.width, frame.height
        )));
    }

    let bgr = frame_to_mat(frame)?;
    let mask_mat = mask_to_mat(mask)?;

    let mut masked = Mat::default();
    core::bitwise_and(&bgr, &bgr, &mut masked, &mask_mat)
        .map_err(|e| VisionError::Process(format!("Failed to apply mask: {:?}", e)))?;

    mat_to_frame(&masked)
}

/// 色検知処理アダプタ
///
/// 設定された色ターゲットごとにセグメンテーションと合成を行い、
/// ターゲット1つにつき1つの表示ビューを生成する。
pub struct ColorSegmentAdapter {
    targets: Vec<ColorTarget>,
}

impl ColorSegmentAdapter {
    /// 新しい色検知処理アダプタを作成
    pub fn new(targets: Vec<ColorTarget>) -> Self {
        Self { targets }
    }
}

impl FrameProcessorPort for ColorSegmentAdapter {
    fn process_frame(&mut self, frame: &Frame) -> VisionResult<Vec<NamedView>> {
        let mut views = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            let (mask, composited) = crate::measure_span!("segment_target", {
                let mask = segment(frame, &target.range)?;
                let composited = composite(frame, &mask)?;
                (mask, composited)
            });

            // マスクが空でもエラーではない（全面黒として表示される）
            tracing::debug!(
                target = target.name.as_str(),
                coverage = mask.coverage(),
                "Segmented frame"
            );

            views.push(NamedView::new(target.label.clone(), composited));
        }

        Ok(views)
    }
}
