mod application;
mod domain;
mod infrastructure;
mod logging;

use crate::application::pipeline::{ViewerConfig, ViewerRunner};
use crate::domain::config::{AppConfig, CascadeKind, InputConfig, InputSource, Mode};
use crate::domain::{DisplayPort, FrameSourcePort, VisionError, VisionResult};
use crate::infrastructure::augment::{save_variants, Augmenter};
use crate::infrastructure::capture::{CameraSource, VideoFileSource};
use crate::infrastructure::capture::common::load_image;
use crate::infrastructure::cascade_detect::{
    self, CascadeDetector, CascadeParams, CascadeVideoAdapter, FaceEyeDetector,
};
use crate::infrastructure::color_segment::ColorSegmentAdapter;
use crate::infrastructure::display::HighguiDisplay;
use crate::infrastructure::plate_locate::PlateLocator;
use crate::logging::init_logging;
use std::path::PathBuf;

fn main() {
    // ログシステムの初期化（非同期ファイル出力）
    let log_dir = PathBuf::from("logs");
    let _guard = init_logging("info", false, Some(log_dir));
    // 注意: _guardはmain終了まで保持する必要がある（Dropでログスレッドが終了）

    tracing::info!("IroScope starting...");

    match run() {
        Ok(_) => {
            tracing::info!("IroScope terminated gracefully.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            std::process::exit(1);
        }
    }
}

/// アプリケーションのメイン処理
fn run() -> Result<(), Box<dyn std::error::Error>> {
    // 設定ファイルの読み込み（存在しない場合はデフォルト設定を使用）
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => {
            tracing::info!("Loaded configuration from config.toml");
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };

    // 設定の検証
    config.validate()?;

    tracing::info!("Configuration validated successfully");
    tracing::info!(
        "Mode: {:?}, input: {:?}, exit key: {}",
        config.mode,
        config.input.source,
        config.display.exit_key
    );

    match config.mode {
        Mode::Color => run_color(&config)?,
        Mode::Cascade => run_cascade(&config)?,
        Mode::Plate => run_plate(&config)?,
        Mode::Augment => run_augment(&config)?,
    }

    Ok(())
}

/// 入力設定からストリーム系のフレームソースを開く
fn open_stream_source(input: &InputConfig) -> VisionResult<Box<dyn FrameSourcePort>> {
    match input.source {
        InputSource::Camera => Ok(Box::new(CameraSource::open(input.camera_index)?)),
        InputSource::Video => {
            let path = input.video_path.as_deref().ok_or_else(|| {
                VisionError::Configuration("Input source 'video' requires video_path".to_string())
            })?;
            Ok(Box::new(VideoFileSource::open(path)?))
        }
        InputSource::Image => Err(VisionError::Configuration(
            "Still image input cannot drive the viewer loop".to_string(),
        )),
    }
}

/// ビューアループの設定を構成
fn viewer_config(config: &AppConfig) -> ViewerConfig {
    ViewerConfig {
        exit_key: config.display.exit_key,
        show_original: config.display.show_original,
        original_window: crate::domain::config::DisplayConfig::ORIGINAL_WINDOW.to_string(),
        stats_interval: config.stats.interval(),
    }
}

/// 色検知モード
fn run_color(config: &AppConfig) -> VisionResult<()> {
    let targets = config.color.targets.iter().map(Into::into).collect();

    let source = open_stream_source(&config.input)?;
    let processor = ColorSegmentAdapter::new(targets);
    let display = HighguiDisplay::new(config.display.wait_ms);

    tracing::info!(
        "Starting color tracking with {} target(s)",
        config.color.targets.len()
    );

    let reason = ViewerRunner::new(source, processor, display, viewer_config(config)).run()?;
    tracing::info!("Color tracking stopped: {:?}", reason);
    Ok(())
}

/// カスケード検知モード
fn run_cascade(config: &AppConfig) -> VisionResult<()> {
    match config.cascade.kind {
        CascadeKind::Face => run_cascade_face(config),
        CascadeKind::FaceEye => run_cascade_face_eye(config),
        CascadeKind::Car | CascadeKind::Pedestrian => run_cascade_video(config),
    }
}

/// 静止画の顔検出
fn run_cascade_face(config: &AppConfig) -> VisionResult<()> {
    let image_path = still_image_path(&config.input)?;
    let frame = load_image(image_path)?;

    let mut detector = CascadeDetector::from_file(
        &config.cascade.classifier_path,
        CascadeParams::from_config(&config.cascade),
    )?;

    let faces = detector.detect(&frame)?;
    tracing::info!("{}", cascade_detect::face_summary(faces.len()));

    if faces.is_empty() {
        return Ok(());
    }

    let annotated = cascade_detect::annotate(&frame, &faces, cascade_detect::FACE_BOX_COLOR)?;

    let mut display = HighguiDisplay::new(config.display.wait_ms);
    display.show(
        cascade_detect::window_title(CascadeKind::Face),
        &annotated,
    )?;
    display.wait_for_any_key()?;
    Ok(())
}

/// 静止画の顔+目検出
fn run_cascade_face_eye(config: &AppConfig) -> VisionResult<()> {
    let image_path = still_image_path(&config.input)?;
    let frame = load_image(image_path)?;

    let eye_path = config.cascade.eye_classifier_path.as_deref().ok_or_else(|| {
        VisionError::Configuration("Cascade kind 'face-eye' requires eye_classifier_path".to_string())
    })?;

    let mut detector = FaceEyeDetector::from_files(&config.cascade.classifier_path, eye_path)?;

    let detection = detector.detect(&frame)?;
    tracing::info!(
        "{} ({} eye(s))",
        cascade_detect::face_summary(detection.boxes.len()),
        detection.eyes.len()
    );

    let annotated = cascade_detect::annotate_detection(&frame, &detection)?;

    let mut display = HighguiDisplay::new(config.display.wait_ms);
    display.show(
        cascade_detect::window_title(CascadeKind::FaceEye),
        &annotated,
    )?;
    display.wait_for_any_key()?;
    Ok(())
}

/// 動画のカスケード検知（車・歩行者）
fn run_cascade_video(config: &AppConfig) -> VisionResult<()> {
    let source = open_stream_source(&config.input)?;
    let processor = CascadeVideoAdapter::from_config(&config.cascade)?;
    let display = HighguiDisplay::new(config.display.wait_ms);

    tracing::info!("Starting cascade detection: {:?}", config.cascade.kind);

    let reason = ViewerRunner::new(source, processor, display, viewer_config(config)).run()?;
    tracing::info!("Cascade detection stopped: {:?}", reason);
    Ok(())
}

/// ナンバープレート検出モード
fn run_plate(config: &AppConfig) -> VisionResult<()> {
    let image_path = still_image_path(&config.input)?;
    let frame = load_image(image_path)?;

    let locator = PlateLocator::new(config.plate.clone());
    let result = locator.locate(&frame)?;

    let mut display = HighguiDisplay::new(config.display.wait_ms);
    display.show("Detected Plate Contour", &result.annotated)?;

    match &result.location {
        Some(location) => {
            tracing::info!(
                "License plate detected at ({}, {}) {}x{}",
                location.bounding.x,
                location.bounding.y,
                location.bounding.width,
                location.bounding.height
            );
            display.show("Cropped Number Plate", &location.plate)?;
        }
        None => {
            tracing::warn!("License plate not detected. Try a clearer image.");
        }
    }

    display.wait_for_any_key()?;
    Ok(())
}

/// データ拡張モード
fn run_augment(config: &AppConfig) -> VisionResult<()> {
    let image_path = still_image_path(&config.input)?;
    let frame = load_image(image_path)?;

    let mut augmenter = Augmenter::new(config.augment.clone());
    let variants = augmenter.generate(&frame)?;

    let paths = save_variants(&config.augment.output_dir, &variants)?;
    tracing::info!(
        "Wrote {} augmented image(s) to {}",
        paths.len(),
        config.augment.output_dir
    );
    Ok(())
}

/// 静止画入力のパスを取得
fn still_image_path(input: &InputConfig) -> VisionResult<&str> {
    input.image_path.as_deref().ok_or_else(|| {
        VisionError::Configuration("Input source 'image' requires image_path".to_string())
    })
}
