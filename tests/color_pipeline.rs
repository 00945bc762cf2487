//! 色検知パイプラインの統合テスト
//!
//! モックのフレームソース・表示アダプタと実際のセグメンテーション処理を
//! 組み合わせ、ビューアループ全体をハードウェアなしでend-to-endに検証する。

use IroScope::application::pipeline::{StopReason, ViewerConfig, ViewerRunner};
use IroScope::domain::config::{ColorTargetConfig, DisplayConfig};
use IroScope::domain::types::Frame;
use IroScope::infrastructure::color_segment::ColorSegmentAdapter;
use IroScope::infrastructure::mock_display::RecordingDisplay;
use IroScope::infrastructure::mock_source::ScriptedSource;

fn preset_targets() -> ColorSegmentAdapter {
    ColorSegmentAdapter::new(vec![
        (&ColorTargetConfig::preset_red()).into(),
        (&ColorTargetConfig::preset_blue()).into(),
        (&ColorTargetConfig::preset_green()).into(),
        (&ColorTargetConfig::preset_except_white()).into(),
    ])
}

#[test]
fn test_two_frame_source_processes_two_cycles_then_ends() {
    // 純青の2フレームを流すと、ちょうど2サイクル処理して終端で停止する
    let source = ScriptedSource::solid_frames(2, 32, 24, [255, 0, 0]);
    let display = RecordingDisplay::new();

    let mut runner = ViewerRunner::new(source, preset_targets(), display, ViewerConfig::default());

    let reason = runner.run().expect("loop must terminate without error");
    assert_eq!(reason, StopReason::SourceEnd);
    assert_eq!(runner.cycles(), 2);
}

#[test]
fn test_all_windows_are_presented() {
    let source = ScriptedSource::solid_frames(1, 16, 16, [255, 0, 0]);
    let display = RecordingDisplay::new();

    let mut runner = ViewerRunner::new(source, preset_targets(), display, ViewerConfig::default());
    runner.run().unwrap();

    let display = runner.display();
    assert_eq!(display.shown_count(DisplayConfig::ORIGINAL_WINDOW), 1);
    assert_eq!(display.shown_count("Red Color Detection"), 1);
    assert_eq!(display.shown_count("Blue Color Detection"), 1);
    assert_eq!(display.shown_count("Green Color Detection"), 1);
    assert_eq!(display.shown_count("All Colors Except White"), 1);

    // すべてのビューは元フレームと同寸法
    for (_, width, height) in &display.shown {
        assert_eq!((*width, *height), (16, 16));
    }
}

#[test]
fn test_exit_key_stops_the_loop() {
    let source = ScriptedSource::solid_frames(100, 16, 16, [0, 255, 0]);
    // 3サイクル目でESCを押す
    let display = RecordingDisplay::with_keys(vec![None, None, Some(27)]);

    let mut runner = ViewerRunner::new(source, preset_targets(), display, ViewerConfig::default());

    let reason = runner.run().unwrap();
    assert_eq!(reason, StopReason::ExitKey);
    assert_eq!(runner.cycles(), 3);
}

#[test]
fn test_configured_exit_key_is_honored() {
    let source = ScriptedSource::solid_frames(100, 16, 16, [0, 255, 0]);
    // Enter(13)で停止する設定ではESC(27)は無視される
    let display = RecordingDisplay::with_keys(vec![Some(27), Some(13)]);

    let config = ViewerConfig {
        exit_key: 13,
        ..ViewerConfig::default()
    };
    let mut runner = ViewerRunner::new(source, preset_targets(), display, config);

    let reason = runner.run().unwrap();
    assert_eq!(reason, StopReason::ExitKey);
    assert_eq!(runner.cycles(), 2);
}

#[test]
fn test_blue_frame_views_select_blue_only() {
    // 純青フレーム: 青ビューは元画像そのまま、赤・緑ビューは全面黒
    let blue_frame = Frame::solid(16, 16, [255, 0, 0]);
    let source = ScriptedSource::new(vec![blue_frame.clone()]);
    let display = RecordingDisplay::new();

    use IroScope::domain::ports::FrameProcessorPort;
    let mut adapter = preset_targets();
    let views = adapter.process_frame(&blue_frame).unwrap();

    let red_view = &views[0];
    let blue_view = &views[1];
    let green_view = &views[2];
    let except_white_view = &views[3];

    assert!(red_view.frame.data.iter().all(|&b| b == 0));
    assert_eq!(blue_view.frame.data, blue_frame.data);
    assert!(green_view.frame.data.iter().all(|&b| b == 0));
    // 純青は有彩色なので「白以外」にも現れる
    assert_eq!(except_white_view.frame.data, blue_frame.data);

    // ループ全体も同じ結果で完走する
    let mut runner = ViewerRunner::new(source, adapter, display, ViewerConfig::default());
    assert_eq!(runner.run().unwrap(), StopReason::SourceEnd);
}

#[test]
fn test_white_frame_is_black_in_except_white_view() {
    let white_frame = Frame::solid(8, 8, [255, 255, 255]);

    use IroScope::domain::ports::FrameProcessorPort;
    let mut adapter = preset_targets();
    let views = adapter.process_frame(&white_frame).unwrap();

    let except_white_view = &views[3];
    assert!(except_white_view.frame.data.iter().all(|&b| b == 0));
}

#[test]
fn test_empty_source_terminates_immediately() {
    let source = ScriptedSource::new(Vec::new());
    let display = RecordingDisplay::new();

    let mut runner = ViewerRunner::new(source, preset_targets(), display, ViewerConfig::default());

    let reason = runner.run().unwrap();
    assert_eq!(reason, StopReason::SourceEnd);
    assert_eq!(runner.cycles(), 0);
    assert!(runner.display().shown.is_empty());
}
