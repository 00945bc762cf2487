//! データ拡張アダプタ
//!
//! 入力画像をランダムなアフィン変形（回転・平行移動・せん断・ズーム・
//! 左右反転）で複製するプレビュー用エンジン。境界は最近傍画素で充填する。
//! シードを固定すれば生成列は決定的になる。

use crate::domain::{config::AugmentConfig, Frame, VisionError, VisionResult};
use crate::infrastructure::capture::common::{frame_to_mat, mat_to_frame};
use opencv::{
    core::{self, Mat, Size},
    imgcodecs, imgproc,
    prelude::*,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::PathBuf;

/// 1枚分の変形パラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AugmentParams {
    /// 回転角（度）
    pub rotation_deg: f64,
    /// 横シフト（ピクセル）
    pub shift_x: f64,
    /// 縦シフト（ピクセル）
    pub shift_y: f64,
    /// せん断角（度）
    pub shear_deg: f64,
    /// 横ズーム倍率
    pub zoom_x: f64,
    /// 縦ズーム倍率
    pub zoom_y: f64,
    /// 左右反転するか
    pub flip: bool,
}

/// 3x3同次変換行列の積
fn mat3_mul(a: [[f64; 3]; 3], b: [[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

impl AugmentParams {
    /// 画像中心まわりの合成アフィン行列（2x3）を構成
    ///
    /// 平行移動 → 回転 → せん断 → ズーム の順に合成し、
    /// 原点を画像中心へ移してから適用する。
    pub fn affine_matrix(&self, width: u32, height: u32) -> [[f64; 3]; 2] {
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;

        let theta = self.rotation_deg.to_radians();
        let phi = self.shear_deg.to_radians();

        let to_center = [[1.0, 0.0, -cx], [0.0, 1.0, -cy], [0.0, 0.0, 1.0]];
        let scale = [
            [self.zoom_x, 0.0, 0.0],
            [0.0, self.zoom_y, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let shear = [
            [1.0, -phi.sin(), 0.0],
            [0.0, phi.cos(), 0.0],
            [0.0, 0.0, 1.0],
        ];
        let rotation = [
            [theta.cos(), -theta.sin(), 0.0],
            [theta.sin(), theta.cos(), 0.0],
            [0.0, 0.0, 1.0],
        ];
        let from_center = [
            [1.0, 0.0, cx + self.shift_x],
            [0.0, 1.0, cy + self.shift_y],
            [0.0, 0.0, 1.0],
        ];

        let m = mat3_mul(
            from_center,
            mat3_mul(rotation, mat3_mul(shear, mat3_mul(scale, to_center))),
        );

        [m[0], m[1]]
    }
}

/// データ拡張エンジン
pub struct Augmenter {
    config: AugmentConfig,
    rng: StdRng,
}

impl Augmenter {
    /// 新しいエンジンを作成
    ///
    /// `config.seed` が指定されていれば決定的に、なければエントロピーから初期化。
    pub fn new(config: AugmentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    /// 変形パラメータを1枚分サンプリング
    fn sample(&mut self, size: f64) -> AugmentParams {
        let rotation = self.config.rotation_range as f64;
        let shift_x = self.config.width_shift_range as f64 * size;
        let shift_y = self.config.height_shift_range as f64 * size;
        let shear = self.config.shear_range as f64;
        let zoom = self.config.zoom_range as f64;

        AugmentParams {
            rotation_deg: self.rng.gen_range(-rotation..=rotation),
            shift_x: self.rng.gen_range(-shift_x..=shift_x),
            shift_y: self.rng.gen_range(-shift_y..=shift_y),
            shear_deg: self.rng.gen_range(-shear..=shear),
            zoom_x: self.rng.gen_range(1.0 - zoom..=1.0 + zoom),
            zoom_y: self.rng.gen_range(1.0 - zoom..=1.0 + zoom),
            flip: self.config.horizontal_flip && self.rng.gen_bool(0.5),
        }
    }

    /// 1枚分の変形を適用
    fn apply(&self, resized: &Mat, params: &AugmentParams) -> VisionResult<Mat> {
        let source = if params.flip {
            let mut flipped = Mat::default();
            core::flip(resized, &mut flipped, 1)
                .map_err(|e| VisionError::Process(format!("Failed to flip: {:?}", e)))?;
            flipped
        } else {
            resized.try_clone().map_err(|e| {
                VisionError::Process(format!("Failed to clone resized image: {:?}", e))
            })?
        };

        let size = self.config.target_size as i32;
        let matrix = params.affine_matrix(self.config.target_size, self.config.target_size);
        let transform = Mat::from_slice_2d(&matrix)
            .map_err(|e| VisionError::Process(format!("Failed to build transform: {:?}", e)))?;

        let mut warped = Mat::default();
        imgproc::warp_affine(
            &source,
            &mut warped,
            &transform,
            Size::new(size, size),
            imgproc::INTER_LINEAR,
            core::BORDER_REPLICATE, // 最近傍画素による境界充填
            core::Scalar::default(),
        )
        .map_err(|e| VisionError::Process(format!("warp_affine failed: {:?}", e)))?;

        Ok(warped)
    }

    /// 設定枚数分の拡張画像を生成する
    pub fn generate(&mut self, frame: &Frame) -> VisionResult<Vec<Frame>> {
        let bgr = frame_to_mat(frame)?;

        let size = self.config.target_size as i32;
        let mut resized = Mat::default();
        imgproc::resize(
            &bgr,
            &mut resized,
            Size::new(size, size),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(|e| VisionError::Process(format!("Failed to resize: {:?}", e)))?;

        let mut variants = Vec::with_capacity(self.config.count as usize);
        for _ in 0..self.config.count {
            let params = self.sample(self.config.target_size as f64);
            let warped = self.apply(&resized, &params)?;
            variants.push(mat_to_frame(&warped)?);
        }

        Ok(variants)
    }
}

/// 生成画像をPNGとして書き出す
///
/// # Returns
/// 書き出したファイルのパス一覧
pub fn save_variants(output_dir: &str, variants: &[Frame]) -> VisionResult<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| VisionError::Io(format!("Failed to create output dir: {}", e)))?;

    let mut paths = Vec::with_capacity(variants.len());
    for (index, variant) in variants.iter().enumerate() {
        let path = PathBuf::from(output_dir).join(format!("aug_{:04}.png", index));
        let path_str = path
            .to_str()
            .ok_or_else(|| VisionError::Io(format!("Invalid output path: {:?}", path)))?;

        let mat = frame_to_mat(variant)?;
        let written = imgcodecs::imwrite(path_str, &mat, &core::Vector::new())
            .map_err(|e| VisionError::Io(format!("Failed to write {}: {:?}", path_str, e)))?;
        if !written {
            return Err(VisionError::Io(format!(
                "Encoder refused to write: {}",
                path_str
            )));
        }

        paths.push(path);
    }

    Ok(paths)
}
