//! 設定管理
//!
//! TOML設定ファイルの読み込みとDomain型への変換。
//! 入力ソース・分類器パス・各種パラメータはすべてここで注入され、
//! 処理ロジックにリテラルを埋め込まない。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{ColorTarget, HsvRange, VisionError, VisionResult, HUE_MAX};

/// 動作モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// HSV色検知（カメラ/動画、ターゲットごとに1ウィンドウ）
    #[default]
    Color,
    /// Haarカスケード検知（顔・目・車・歩行者）
    Cascade,
    /// ナンバープレート位置検出（輪郭ベース）
    Plate,
    /// データ拡張プレビュー（ランダム変形画像の生成）
    Augment,
}

/// 入力ソースの種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// 接続済みカメラ（デバイスインデックス指定）
    #[default]
    Camera,
    /// 動画ファイル
    Video,
    /// 静止画ファイル
    Image,
}

/// カスケード検知の種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CascadeKind {
    /// 顔検出（静止画）
    #[default]
    Face,
    /// 顔+目のネスト検出（静止画）
    FaceEye,
    /// 車検出（動画）
    Car,
    /// 歩行者検出（動画）
    Pedestrian,
}

impl CascadeKind {
    /// 静止画を入力とする種類か
    pub fn is_still_image(&self) -> bool {
        matches!(self, CascadeKind::Face | CascadeKind::FaceEye)
    }
}

/// アプリケーション設定のルート構造
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// 動作モード
    ///
    /// 選択肢: "color", "cascade", "plate", "augment"
    #[serde(default)]
    pub mode: Mode,
    /// 入力設定
    pub input: InputConfig,
    /// 表示設定
    pub display: DisplayConfig,
    /// 色検知設定
    pub color: ColorConfig,
    /// カスケード検知設定
    pub cascade: CascadeConfig,
    /// ナンバープレート検出設定
    pub plate: PlateConfig,
    /// データ拡張設定
    pub augment: AugmentConfig,
    /// 統計出力設定
    #[serde(default)]
    pub stats: StatsConfig,
}

/// 入力設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InputConfig {
    /// 入力ソース
    ///
    /// 選択肢: "camera", "video", "image"
    #[serde(default)]
    pub source: InputSource,

    /// カメラのデバイスインデックス（source = "camera"）
    ///
    /// 通常は0（既定カメラ）。外付けカメラは1, 2, ...
    pub camera_index: i32,

    /// 動画ファイルのパス（source = "video"）
    #[serde(default)]
    pub video_path: Option<String>,

    /// 静止画ファイルのパス（source = "image"）
    #[serde(default)]
    pub image_path: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: InputSource::default(),
            camera_index: 0,
            video_path: None,
            image_path: None,
        }
    }
}

/// 表示設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DisplayConfig {
    /// 終了キーのキーコード
    ///
    /// デフォルト: 27（ESC）。13を指定するとEnterで終了。
    pub exit_key: i32,

    /// フレームごとのキー入力待ち時間（ミリ秒）
    ///
    /// デフォルト: 1ms
    pub wait_ms: i32,

    /// 元フレームのウィンドウを表示するか
    pub show_original: bool,
}

impl DisplayConfig {
    /// デフォルトの終了キー（ESC）
    pub const DEFAULT_EXIT_KEY: i32 = 27;
    /// デフォルトのキー入力待ち時間（ミリ秒）
    pub const DEFAULT_WAIT_MS: i32 = 1;
    /// 元フレームのウィンドウタイトル
    pub const ORIGINAL_WINDOW: &'static str = "Original Frame";
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            exit_key: Self::DEFAULT_EXIT_KEY,
            wait_ms: Self::DEFAULT_WAIT_MS,
            show_original: true,
        }
    }
}

/// 色検知設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColorConfig {
    /// 検出する色ターゲットのリスト（1ターゲット = 1ウィンドウ）
    pub targets: Vec<ColorTargetConfig>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            targets: vec![
                ColorTargetConfig::preset_red(),
                ColorTargetConfig::preset_blue(),
                ColorTargetConfig::preset_green(),
                ColorTargetConfig::preset_except_white(),
            ],
        }
    }
}

/// 色ターゲット設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColorTargetConfig {
    /// 識別名（ログ用）
    pub name: String,

    /// 表示ウィンドウのタイトル
    pub label: String,

    /// H（色相）の最小値
    ///
    /// OpenCV準拠: H [0-179]。h_min > h_max のレンジは循環指定
    /// （[h_min, 179] と [0, h_max] の和）として扱われる。
    pub h_min: u8,

    /// H（色相）の最大値
    ///
    /// OpenCV準拠: H [0-179]
    pub h_max: u8,

    /// S（彩度）の最小値
    ///
    /// OpenCV準拠: S [0-255]
    pub s_min: u8,

    /// S（彩度）の最大値
    pub s_max: u8,

    /// V（明度）の最小値
    ///
    /// OpenCV準拠: V [0-255]
    pub v_min: u8,

    /// V（明度）の最大値
    pub v_max: u8,
}

impl ColorTargetConfig {
    /// 赤系プリセット
    ///
    /// 色相循環をまたぐ指定（H 170-10）。循環なしのH 161-179指定では
    /// 低色相側の赤を取りこぼす。
    pub fn preset_red() -> Self {
        Self {
            name: "red".to_string(),
            label: "Red Color Detection".to_string(),
            h_min: 170,
            h_max: 10,
            s_min: 155,
            s_max: 255,
            v_min: 84,
            v_max: 255,
        }
    }

    /// 青系プリセット
    pub fn preset_blue() -> Self {
        Self {
            name: "blue".to_string(),
            label: "Blue Color Detection".to_string(),
            h_min: 94,
            h_max: 126,
            s_min: 80,
            s_max: 255,
            v_min: 2,
            v_max: 255,
        }
    }

    /// 緑系プリセット
    pub fn preset_green() -> Self {
        Self {
            name: "green".to_string(),
            label: "Green Color Detection".to_string(),
            h_min: 40,
            h_max: 102,
            s_min: 100,
            s_max: 255,
            v_min: 100,
            v_max: 255,
        }
    }

    /// 白以外の全色プリセット
    ///
    /// 白は彩度が低いため、最小彩度42で除外する。
    pub fn preset_except_white() -> Self {
        Self {
            name: "except-white".to_string(),
            label: "All Colors Except White".to_string(),
            h_min: 0,
            h_max: HUE_MAX,
            s_min: 42,
            s_max: 255,
            v_min: 0,
            v_max: 255,
        }
    }
}

impl From<&ColorTargetConfig> for ColorTarget {
    fn from(config: &ColorTargetConfig) -> Self {
        ColorTarget::new(
            &config.name,
            &config.label,
            HsvRange::new(
                config.h_min,
                config.h_max,
                config.s_min,
                config.s_max,
                config.v_min,
                config.v_max,
            ),
        )
    }
}

/// カスケード検知設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CascadeConfig {
    /// 検知の種類
    ///
    /// 選択肢: "face", "face-eye", "car", "pedestrian"
    #[serde(default)]
    pub kind: CascadeKind,

    /// Haarカスケード分類器XMLのパス
    pub classifier_path: String,

    /// 目検出用分類器XMLのパス（kind = "face-eye" で必須）
    #[serde(default)]
    pub eye_classifier_path: Option<String>,

    /// ピラミッドの縮小率
    ///
    /// 顔: 1.3 / 車: 1.1 / 歩行者: 1.05 が目安
    pub scale_factor: f64,

    /// 検出に必要な近傍矩形数
    ///
    /// 顔・歩行者: 5 / 車: 3 が目安
    pub min_neighbors: i32,

    /// 検出対象の最小サイズ（ピクセル、0 = 制限なし）
    ///
    /// 車: 30 / 歩行者: 120 が目安
    pub min_size: i32,
}

impl CascadeConfig {
    /// デフォルトの縮小率（顔検出）
    pub const DEFAULT_SCALE_FACTOR: f64 = 1.3;
    /// デフォルトの近傍矩形数（顔検出）
    pub const DEFAULT_MIN_NEIGHBORS: i32 = 5;
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            kind: CascadeKind::default(),
            classifier_path: "haarcascades/haarcascade_frontalface_default.xml".to_string(),
            eye_classifier_path: None,
            scale_factor: Self::DEFAULT_SCALE_FACTOR,
            min_neighbors: Self::DEFAULT_MIN_NEIGHBORS,
            min_size: 0,
        }
    }
}

/// ナンバープレート検出設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlateConfig {
    /// 処理前にリサイズする幅（ピクセル、アスペクト比維持）
    pub resize_width: u32,

    /// バイラテラルフィルタの近傍径
    pub bilateral_diameter: i32,

    /// バイラテラルフィルタのシグマ（色・空間共通）
    pub bilateral_sigma: f64,

    /// Cannyエッジ検出の下側しきい値
    pub canny_low: f64,

    /// Cannyエッジ検出の上側しきい値
    pub canny_high: f64,

    /// 面積順に調べる輪郭の最大数
    pub max_candidates: usize,

    /// 多角形近似の許容誤差（周囲長に対する比率）
    pub approx_epsilon_ratio: f64,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            resize_width: 600,
            bilateral_diameter: 11,
            bilateral_sigma: 17.0,
            canny_low: 30.0,
            canny_high: 200.0,
            max_candidates: 10,
            approx_epsilon_ratio: 0.02,
        }
    }
}

/// データ拡張設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AugmentConfig {
    /// 生成する画像の枚数
    pub count: u32,

    /// 変形前に正方形リサイズする一辺（ピクセル）
    pub target_size: u32,

    /// 回転角の範囲（度、±）
    pub rotation_range: f32,

    /// 横シフトの範囲（幅に対する比率、±）
    pub width_shift_range: f32,

    /// 縦シフトの範囲（高さに対する比率、±）
    pub height_shift_range: f32,

    /// せん断角の範囲（度、±）
    pub shear_range: f32,

    /// ズームの範囲（1.0±この値の一様分布、軸ごとに独立）
    pub zoom_range: f32,

    /// 左右反転を50%の確率で行うか
    pub horizontal_flip: bool,

    /// 乱数シード（省略時は非決定的）
    #[serde(default)]
    pub seed: Option<u64>,

    /// 生成画像の出力ディレクトリ
    pub output_dir: String,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            count: 10,
            target_size: 150,
            rotation_range: 40.0,
            width_shift_range: 0.2,
            height_shift_range: 0.2,
            shear_range: 0.2,
            zoom_range: 0.2,
            horizontal_flip: true,
            seed: None,
            output_dir: "augmented".to_string(),
        }
    }
}

/// 統計出力設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatsConfig {
    /// 統計情報の出力間隔（秒）
    pub interval_sec: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { interval_sec: 10 }
    }
}

impl StatsConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_sec)
    }
}

impl AppConfig {
    /// TOMLファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> VisionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VisionError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| VisionError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// デフォルト設定をTOMLファイルに書き出す
    pub fn write_default<P: AsRef<Path>>(path: P) -> VisionResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config).map_err(|e| {
            VisionError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)
            .map_err(|e| VisionError::Configuration(format!("Failed to write config file: {}", e)))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> VisionResult<()> {
        // 表示設定の検証
        if self.display.wait_ms < 1 {
            return Err(VisionError::Configuration(
                "Display wait_ms must be at least 1".to_string(),
            ));
        }

        // 色ターゲットの検証
        if self.color.targets.is_empty() {
            return Err(VisionError::Configuration(
                "At least one color target is required".to_string(),
            ));
        }
        for target in &self.color.targets {
            if target.name.is_empty() || target.label.is_empty() {
                return Err(VisionError::Configuration(
                    "Color target name and label must not be empty".to_string(),
                ));
            }
            if target.h_min > HUE_MAX || target.h_max > HUE_MAX {
                return Err(VisionError::Configuration(format!(
                    "Invalid hue bounds for target '{}' (must be 0-{})",
                    target.name, HUE_MAX
                )));
            }
            // h_min > h_max は循環指定として許可する
            if target.s_min > target.s_max || target.v_min > target.v_max {
                return Err(VisionError::Configuration(format!(
                    "Invalid S/V range for target '{}' (min must be <= max)",
                    target.name
                )));
            }
        }

        // カスケード設定の検証
        if self.cascade.classifier_path.is_empty() {
            return Err(VisionError::Configuration(
                "Cascade classifier_path must not be empty".to_string(),
            ));
        }
        if self.cascade.scale_factor <= 1.0 {
            return Err(VisionError::Configuration(
                "Cascade scale_factor must be greater than 1.0".to_string(),
            ));
        }
        if self.cascade.min_neighbors < 1 {
            return Err(VisionError::Configuration(
                "Cascade min_neighbors must be at least 1".to_string(),
            ));
        }
        if self.cascade.min_size < 0 {
            return Err(VisionError::Configuration(
                "Cascade min_size must be non-negative".to_string(),
            ));
        }
        if self.cascade.kind == CascadeKind::FaceEye && self.cascade.eye_classifier_path.is_none() {
            return Err(VisionError::Configuration(
                "Cascade kind 'face-eye' requires eye_classifier_path".to_string(),
            ));
        }

        // プレート検出設定の検証
        if self.plate.resize_width == 0 {
            return Err(VisionError::Configuration(
                "Plate resize_width must be greater than 0".to_string(),
            ));
        }
        if self.plate.canny_low >= self.plate.canny_high {
            return Err(VisionError::Configuration(
                "Plate canny_low must be less than canny_high".to_string(),
            ));
        }
        if self.plate.max_candidates == 0 {
            return Err(VisionError::Configuration(
                "Plate max_candidates must be greater than 0".to_string(),
            ));
        }
        if self.plate.approx_epsilon_ratio <= 0.0 {
            return Err(VisionError::Configuration(
                "Plate approx_epsilon_ratio must be positive".to_string(),
            ));
        }

        // データ拡張設定の検証
        if self.augment.count == 0 {
            return Err(VisionError::Configuration(
                "Augment count must be greater than 0".to_string(),
            ));
        }
        if self.augment.target_size == 0 {
            return Err(VisionError::Configuration(
                "Augment target_size must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=180.0).contains(&self.augment.rotation_range) {
            return Err(VisionError::Configuration(
                "Augment rotation_range must be within 0-180 degrees".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.augment.width_shift_range)
            || !(0.0..1.0).contains(&self.augment.height_shift_range)
        {
            return Err(VisionError::Configuration(
                "Augment shift ranges must be within [0, 1)".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.augment.zoom_range) {
            return Err(VisionError::Configuration(
                "Augment zoom_range must be within [0, 1)".to_string(),
            ));
        }
        if self.augment.output_dir.is_empty() {
            return Err(VisionError::Configuration(
                "Augment output_dir must not be empty".to_string(),
            ));
        }

        // モードと入力ソースの整合性
        self.validate_mode_input()
    }

    /// モードごとに許可される入力ソースか検証
    fn validate_mode_input(&self) -> VisionResult<()> {
        let source = self.input.source;
        let allowed = match self.mode {
            Mode::Color => matches!(source, InputSource::Camera | InputSource::Video),
            Mode::Cascade => {
                if self.cascade.kind.is_still_image() {
                    matches!(source, InputSource::Image)
                } else {
                    matches!(source, InputSource::Camera | InputSource::Video)
                }
            }
            Mode::Plate | Mode::Augment => matches!(source, InputSource::Image),
        };
        if !allowed {
            return Err(VisionError::Configuration(format!(
                "Input source {:?} is not valid for mode {:?}",
                source, self.mode
            )));
        }

        match source {
            InputSource::Video if self.input.video_path.is_none() => {
                Err(VisionError::Configuration(
                    "Input source 'video' requires video_path".to_string(),
                ))
            }
            InputSource::Image if self.input.image_path.is_none() => {
                Err(VisionError::Configuration(
                    "Input source 'image' requires image_path".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.mode, Mode::Color);
        assert_eq!(config.input.camera_index, 0);
        assert_eq!(config.display.exit_key, 27);
        assert_eq!(config.color.targets.len(), 4);
        assert_eq!(config.plate.resize_width, 600);
        assert_eq!(config.augment.count, 10);
    }

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_color_presets() {
        let red = ColorTargetConfig::preset_red();
        // 赤は循環指定（H 170-10）
        assert!(red.h_min > red.h_max);

        let blue = ColorTargetConfig::preset_blue();
        assert_eq!((blue.h_min, blue.h_max), (94, 126));

        let white = ColorTargetConfig::preset_except_white();
        assert_eq!(white.s_min, 42);
        assert_eq!(white.h_max, HUE_MAX);
    }

    #[test]
    fn test_color_target_conversion() {
        let config = ColorTargetConfig::preset_green();
        let target: ColorTarget = (&config).into();
        assert_eq!(target.name, "green");
        assert_eq!(target.range, HsvRange::new(40, 102, 100, 255, 100, 255));
    }

    #[test]
    fn test_validate_rejects_hue_out_of_domain() {
        let mut config = AppConfig::default();
        config.color.targets[0].h_max = 200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_hue_wraparound() {
        let mut config = AppConfig::default();
        config.color.targets[0].h_min = 170;
        config.color.targets[0].h_max = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_sv() {
        let mut config = AppConfig::default();
        config.color.targets[0].s_min = 200;
        config.color.targets[0].s_max = 100;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.color.targets[0].v_min = 200;
        config.color.targets[0].v_max = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_targets() {
        let mut config = AppConfig::default();
        config.color.targets.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_cascade_params() {
        let mut config = AppConfig::default();
        config.cascade.scale_factor = 1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.cascade.min_neighbors = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.cascade.classifier_path.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_face_eye_requires_eye_classifier() {
        let mut config = AppConfig::default();
        config.mode = Mode::Cascade;
        config.cascade.kind = CascadeKind::FaceEye;
        config.input.source = InputSource::Image;
        config.input.image_path = Some("face.jpg".to_string());
        assert!(config.validate().is_err());

        config.cascade.eye_classifier_path =
            Some("haarcascades/haarcascade_eye.xml".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_mode_input_combinations() {
        // colorモードに静止画は不可
        let mut config = AppConfig::default();
        config.input.source = InputSource::Image;
        config.input.image_path = Some("x.jpg".to_string());
        assert!(config.validate().is_err());

        // plateモードは静止画のみ
        let mut config = AppConfig::default();
        config.mode = Mode::Plate;
        config.input.source = InputSource::Camera;
        assert!(config.validate().is_err());

        config.input.source = InputSource::Image;
        config.input.image_path = Some("car.jpg".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_video_requires_path() {
        let mut config = AppConfig::default();
        config.input.source = InputSource::Video;
        config.input.video_path = None;
        assert!(config.validate().is_err());

        config.input.video_path = Some("walk.mov".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_plate_params() {
        let mut config = AppConfig::default();
        config.plate.canny_low = 250.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.plate.max_candidates = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_augment_params() {
        let mut config = AppConfig::default();
        config.augment.count = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.augment.zoom_range = 1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.augment.width_shift_range = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cascade_kind_still_image() {
        assert!(CascadeKind::Face.is_still_image());
        assert!(CascadeKind::FaceEye.is_still_image());
        assert!(!CascadeKind::Car.is_still_image());
        assert!(!CascadeKind::Pedestrian.is_still_image());
    }

    #[test]
    fn test_config_parses_full_toml() {
        let toml = r#"
            mode = "cascade"

            [input]
            source = "video"
            camera_index = 0
            video_path = "PedestrainVideo.mov"

            [display]
            exit_key = 13
            wait_ms = 1
            show_original = false

            [color]
            [[color.targets]]
            name = "blue"
            label = "Blue Color Detection"
            h_min = 94
            h_max = 126
            s_min = 80
            s_max = 255
            v_min = 2
            v_max = 255

            [cascade]
            kind = "pedestrian"
            classifier_path = "haarcascades/haarcascade_fullbody.xml"
            scale_factor = 1.05
            min_neighbors = 5
            min_size = 120

            [plate]
            resize_width = 600
            bilateral_diameter = 11
            bilateral_sigma = 17.0
            canny_low = 30.0
            canny_high = 200.0
            max_candidates = 10
            approx_epsilon_ratio = 0.02

            [augment]
            count = 10
            target_size = 150
            rotation_range = 40.0
            width_shift_range = 0.2
            height_shift_range = 0.2
            shear_range = 0.2
            zoom_range = 0.2
            horizontal_flip = true
            output_dir = "augmented"

            [stats]
            interval_sec = 5
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.mode, Mode::Cascade);
        assert_eq!(config.cascade.kind, CascadeKind::Pedestrian);
        assert_eq!(config.display.exit_key, 13);
        assert_eq!(config.stats.interval_sec, 5);
        config.validate().expect("full toml must validate");
    }

    #[test]
    fn test_write_default_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        AppConfig::write_default(&path).unwrap();
        let config = AppConfig::from_file(&path).unwrap();

        config.validate().unwrap();
        assert_eq!(config.color.targets.len(), 4);
    }

    #[test]
    fn test_from_file_missing() {
        let result = AppConfig::from_file("definitely/not/here.toml");
        assert!(matches!(result, Err(VisionError::Configuration(_))));
    }

    #[test]
    fn test_config_loads() {
        // config.tomlが正常に読み込めることを確認
        let config = AppConfig::from_file("config.toml").expect("config.tomlが読み込めません");
        config
            .validate()
            .expect("設定値のバリデーションに失敗しました");
    }

    #[test]
    fn test_config_example_loads() {
        // config.toml.exampleが正常に読み込めることを確認
        let config = AppConfig::from_file("config.toml.example")
            .expect("config.toml.exampleが読み込めません");
        config
            .validate()
            .expect("設定値のバリデーションに失敗しました");
    }
}
