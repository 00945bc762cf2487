/// Port定義（Clean Architectureのインターフェース）
///
/// Domain層が外部実装に依存するための抽象trait。
/// Infrastructure層がこれらを実装し、Application層がDIで注入する。

use crate::domain::{Frame, NamedView, VisionResult};

/// フレームソースポート: フレーム列の取得を抽象化
///
/// カメラは（切断まで）無限列、動画ファイルは有限列を生成する。
pub trait FrameSourcePort {
    /// 次のフレームを取得する
    ///
    /// # Returns
    /// - `Ok(Some(Frame))`: フレームの取得成功
    /// - `Ok(None)`: ソース終端（ファイル末尾、カメラ切断、デコード失敗）
    /// - `Err(VisionError)`: 致命的エラー
    ///
    /// 呼び出し側は、次の呼び出し以降も前のフレームが有効であることを
    /// 仮定してはならない（バッファリング保証は1フレーム分のみ）。
    fn next_frame(&mut self) -> VisionResult<Option<Frame>>;

    /// ソースの情報を取得
    fn source_info(&self) -> SourceInfo;
}

impl<T: FrameSourcePort + ?Sized> FrameSourcePort for Box<T> {
    fn next_frame(&mut self) -> VisionResult<Option<Frame>> {
        (**self).next_frame()
    }

    fn source_info(&self) -> SourceInfo {
        (**self).source_info()
    }
}

/// フレームソース情報
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub name: String,
}

/// 処理ポート: 1フレームを0個以上の表示ビューへ変換する
///
/// 色検知ではターゲットごとに1ビュー、カスケード検知では
/// 矩形を描き込んだ1ビューを返す。
pub trait FrameProcessorPort {
    /// フレームを処理して表示ビューを返す
    ///
    /// # Returns
    /// - `Ok(Vec<NamedView>)`: ウィンドウ名付きの処理結果（空も可）
    /// - `Err(VisionError)`: 処理エラー（ループに対して致命的）
    fn process_frame(&mut self, frame: &Frame) -> VisionResult<Vec<NamedView>>;
}

/// 表示ポート: ウィンドウ出力と停止キーのポーリングを抽象化
pub trait DisplayPort {
    /// 名前付きウィンドウにフレームを表示
    fn show(&mut self, window: &str, frame: &Frame) -> VisionResult<()>;

    /// キー入力をポーリングする（短時間ブロック）
    ///
    /// # Returns
    /// - `Ok(Some(key))`: 押されたキーのコード
    /// - `Ok(None)`: 入力なし
    fn poll_key(&mut self) -> VisionResult<Option<i32>>;
}
