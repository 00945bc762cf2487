/// エラー型定義
///
/// Domain層の統一エラー型。thiserrorを使用して型安全なエラー処理を提供します。
///
/// # 設計方針
/// - unwrap()の使用を禁止し、明示的なエラーハンドリングを強制
/// - Result型でエラー伝播を明示化
/// - 起動時に確定する失敗（Initialization）と実行中の失敗（Capture/Process）を区別

use thiserror::Error;

/// Domain層の統一エラー型
#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum VisionError {
    /// フレーム取得関連のエラー
    #[error("Capture error: {0}")]
    Capture(String),

    /// 処理（画像処理）関連のエラー
    #[error("Process error: {0}")]
    Process(String),

    /// 表示（ウィンドウ出力）関連のエラー
    #[error("Display error: {0}")]
    Display(String),

    /// 設定関連のエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 初期化エラー
    ///
    /// カメラ・動画・画像・分類器ファイルが開けない場合など、
    /// 起動時に確定する致命的エラー。
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// 入出力エラー（拡張画像の書き出し等）
    #[error("I/O error: {0}")]
    Io(String),

    /// その他のエラー
    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Domain層の統一Result型
pub type VisionResult<T> = Result<T, VisionError>;
