//! ビューアループ制御モジュール
//!
//! Frame Source → Processor → Display の単一スレッド同期ループを
//! 明示的な状態機械（Running/Terminated）として制御します。
//! 停止条件は外部からのポーリング結果（終了キー）とソース終端のみで、
//! リトライや復旧は行いません（フレーム処理エラーはループに対して致命的）。

use crate::application::stats::{StatKind, StatsCollector};
use crate::domain::{
    error::VisionResult,
    ports::{DisplayPort, FrameProcessorPort, FrameSourcePort},
};
use std::time::{Duration, Instant};

/// ループ停止の理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 終了キーが押された
    ExitKey,
    /// フレームソースが終端を通知した
    SourceEnd,
}

/// ループの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// 通常のフレームサイクルを継続
    Running,
    /// 停止（理由付き）
    Terminated(StopReason),
}

/// ビューアループ設定
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// 終了キーのキーコード
    pub exit_key: i32,
    /// 元フレームのウィンドウを表示するか
    pub show_original: bool,
    /// 元フレームのウィンドウタイトル
    pub original_window: String,
    /// 統計出力間隔
    pub stats_interval: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            exit_key: 27,
            show_original: true,
            original_window: "Original Frame".to_string(),
            stats_interval: Duration::from_secs(10),
        }
    }
}

/// ビューアループ実行コンテキスト
pub struct ViewerRunner<S, P, D>
where
    S: FrameSourcePort,
    P: FrameProcessorPort,
    D: DisplayPort,
{
    source: S,
    processor: P,
    display: D,
    config: ViewerConfig,
    stats: StatsCollector,
    cycles: u64,
}

impl<S, P, D> ViewerRunner<S, P, D>
where
    S: FrameSourcePort,
    P: FrameProcessorPort,
    D: DisplayPort,
{
    /// 新しいViewerRunnerを作成
    pub fn new(source: S, processor: P, display: D, config: ViewerConfig) -> Self {
        Self {
            source,
            processor,
            display,
            stats: StatsCollector::new(config.stats_interval),
            config,
            cycles: 0,
        }
    }

    /// 処理したフレームサイクル数を取得
    #[allow(dead_code)]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// 表示アダプタへの参照を取得（テストでの検証用）
    #[allow(dead_code)]
    pub fn display(&self) -> &D {
        &self.display
    }

    /// ループを実行する（ブロッキング）
    ///
    /// # Returns
    /// - `Ok(StopReason)`: 正常停止（終了キーまたはソース終端）
    /// - `Err(VisionError)`: 処理エラー（リトライせずそのまま伝播）
    pub fn run(&mut self) -> VisionResult<StopReason> {
        let info = self.source.source_info();
        tracing::info!(
            "Viewer loop started: {} ({}x{} @ {:.1}fps)",
            info.name,
            info.width,
            info.height,
            info.fps
        );

        loop {
            match self.tick()? {
                LoopState::Running => continue,
                LoopState::Terminated(reason) => {
                    tracing::info!(
                        "Viewer loop terminated: {:?} after {} cycles",
                        reason,
                        self.cycles
                    );
                    return Ok(reason);
                }
            }
        }
    }

    /// 1フレームサイクルを実行する
    ///
    /// 取得 → 処理 → 表示 → キー入力ポーリングの順で、
    /// 次の状態を返す。テストではモックを注入してこの遷移だけを検証できる。
    pub fn tick(&mut self) -> VisionResult<LoopState> {
        let cycle_start = Instant::now();

        // 取得
        let frame = match self.source.next_frame()? {
            Some(frame) => frame,
            None => return Ok(LoopState::Terminated(StopReason::SourceEnd)),
        };
        self.stats
            .record_duration(StatKind::Capture, cycle_start.elapsed());

        // 処理
        let process_start = Instant::now();
        let views = self.processor.process_frame(&frame)?;
        self.stats
            .record_duration(StatKind::Process, process_start.elapsed());

        // 表示
        let render_start = Instant::now();
        if self.config.show_original {
            self.display.show(&self.config.original_window, &frame)?;
        }
        for view in &views {
            self.display.show(&view.name, &view.frame)?;
        }
        self.stats
            .record_duration(StatKind::Render, render_start.elapsed());

        self.cycles += 1;
        self.stats.record_frame();
        self.stats
            .record_duration(StatKind::EndToEnd, cycle_start.elapsed());

        if self.stats.should_report() {
            self.stats.report_and_reset();
        }

        // 停止キーのポーリング
        if let Some(key) = self.display.poll_key()? {
            if key == self.config.exit_key {
                return Ok(LoopState::Terminated(StopReason::ExitKey));
            }
        }

        Ok(LoopState::Running)
    }
}
