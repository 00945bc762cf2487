/// コア型定義
///
/// Domain層の中心となるデータ構造。
/// すべての処理で共有される不変の型。

use std::time::Instant;

/// 色相の最大値（OpenCV準拠の8bit表現: H [0-179]）
pub const HUE_MAX: u8 = 179;

/// キャプチャされたフレームデータ
#[derive(Debug, Clone)]
pub struct Frame {
    /// フレーム取得時刻
    pub timestamp: Instant,
    /// フレーム画像データ（BGR形式、連続メモリ）
    pub data: Vec<u8>,
    /// 画像の幅
    pub width: u32,
    /// 画像の高さ
    pub height: u32,
}

impl Frame {
    /// 新しいフレームを作成
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            timestamp: Instant::now(),
            data,
            width,
            height,
        }
    }

    /// BGR 3チャンネルで期待されるバイト数
    pub fn expected_len(&self) -> usize {
        (self.width * self.height * 3) as usize
    }

    /// データ長が幅・高さと整合しているか
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.expected_len()
    }

    #[allow(dead_code)]
    /// 単色で塗りつぶしたフレームを作成（テスト・調整用）
    ///
    /// `bgr`はBGR順の画素値。
    pub fn solid(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..(width * height) {
            data.extend_from_slice(&bgr);
        }
        Self::new(data, width, height)
    }
}

/// 二値マスク（255 = 選択、0 = 非選択）
///
/// 不変条件: マスクの幅・高さは派生元フレームと常に一致する。
#[derive(Debug, Clone)]
pub struct Mask {
    /// マスクデータ（1チャンネル、連続メモリ）
    pub data: Vec<u8>,
    /// マスクの幅
    pub width: u32,
    /// マスクの高さ
    pub height: u32,
}

impl Mask {
    /// 新しいマスクを作成
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// フレームと同一寸法か
    pub fn matches(&self, frame: &Frame) -> bool {
        self.width == frame.width && self.height == frame.height
    }

    /// 選択された画素数
    pub fn coverage(&self) -> u32 {
        self.data.iter().filter(|&&v| v != 0).count() as u32
    }

    #[allow(dead_code)]
    /// 1画素も選択されていないか（エラーではなく「全面黒」の正常系）
    pub fn is_empty_selection(&self) -> bool {
        self.coverage() == 0
    }
}

/// HSV色空間のレンジ（OpenCV準拠: H[0-179], S[0-255], V[0-255]）
///
/// 色相は循環するため、`h_min > h_max` のレンジは
/// `[h_min, 179]` と `[0, h_max]` の2つの部分レンジの和として扱う
/// （赤系の指定に必要）。S/Vについては `min > max` なら定義上、何も選択しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub h_min: u8,
    pub h_max: u8,
    pub s_min: u8,
    pub s_max: u8,
    pub v_min: u8,
    pub v_max: u8,
}

impl HsvRange {
    /// 新しいHSVレンジを作成
    pub fn new(h_min: u8, h_max: u8, s_min: u8, s_max: u8, v_min: u8, v_max: u8) -> Self {
        Self {
            h_min,
            h_max,
            s_min,
            s_max,
            v_min,
            v_max,
        }
    }

    /// 色相が循環境界をまたぐレンジか
    pub fn wraps_hue(&self) -> bool {
        self.h_min > self.h_max
    }

    /// 循環を展開した部分レンジを取得
    ///
    /// # Returns
    /// - 非循環: `(self, None)`
    /// - 循環:   `([h_min, 179], Some([0, h_max]))`
    pub fn sub_ranges(&self) -> (HsvRange, Option<HsvRange>) {
        if !self.wraps_hue() {
            return (*self, None);
        }

        let upper_arc = HsvRange {
            h_min: self.h_min,
            h_max: HUE_MAX,
            ..*self
        };
        let lower_arc = HsvRange {
            h_min: 0,
            h_max: self.h_max,
            ..*self
        };
        (upper_arc, Some(lower_arc))
    }

    #[allow(dead_code)]
    /// OpenCVのScalar形式で下限を取得 [H, S, V]
    pub fn lower_bound(&self) -> [u8; 3] {
        [self.h_min, self.s_min, self.v_min]
    }

    #[allow(dead_code)]
    /// OpenCVのScalar形式で上限を取得 [H, S, V]
    pub fn upper_bound(&self) -> [u8; 3] {
        [self.h_max, self.s_max, self.v_max]
    }

    #[allow(dead_code)]
    /// HSV値がレンジ内か（境界を含む）
    ///
    /// 色相循環を考慮する。S/Vの `min > max` は常にfalse。
    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        let hue_ok = if self.wraps_hue() {
            h >= self.h_min || h <= self.h_max
        } else {
            h >= self.h_min && h <= self.h_max
        };
        hue_ok && s >= self.s_min && s <= self.s_max && v >= self.v_min && v <= self.v_max
    }
}

/// 検出対象の色（名前付きHSVレンジ）
#[derive(Debug, Clone)]
pub struct ColorTarget {
    /// 識別名（ログ用）
    pub name: String,
    /// 表示ウィンドウのタイトル
    pub label: String,
    /// 検出レンジ
    pub range: HsvRange,
}

impl ColorTarget {
    pub fn new(name: &str, label: &str, range: HsvRange) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            range,
        }
    }
}

/// 検出結果の矩形（画像座標系、ピクセル単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// 新しい矩形を作成
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[allow(dead_code)]
    /// 矩形の中心座標を取得
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    #[allow(dead_code)]
    /// 矩形の面積を取得
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// 親矩形の座標系から絶対座標系へ平行移動
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// カスケード検出の結果
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// 検出された対象（顔・車・歩行者など）の矩形
    pub boxes: Vec<BoundingBox>,
    /// 顔検出時にネストして検出された目の矩形（絶対座標）
    pub eyes: Vec<BoundingBox>,
}

impl Detection {
    #[allow(dead_code)]
    /// 対象が1つ以上検出されたか
    pub fn found(&self) -> bool {
        !self.boxes.is_empty()
    }
}

/// 名前付きの表示ビュー（1ウィンドウ分）
#[derive(Debug, Clone)]
pub struct NamedView {
    /// ウィンドウタイトル
    pub name: String,
    /// 表示するフレーム
    pub frame: Frame,
}

impl NamedView {
    pub fn new(name: impl Into<String>, frame: Frame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_well_formed() {
        let frame = Frame::new(vec![0u8; 10 * 20 * 3], 10, 20);
        assert!(frame.is_well_formed());

        let broken = Frame::new(vec![0u8; 5], 10, 20);
        assert!(!broken.is_well_formed());
    }

    #[test]
    fn test_frame_solid() {
        let frame = Frame::solid(4, 2, [255, 0, 0]);
        assert_eq!(frame.data.len(), 4 * 2 * 3);
        assert_eq!(&frame.data[0..3], &[255, 0, 0]);
        assert_eq!(&frame.data[21..24], &[255, 0, 0]);
    }

    #[test]
    fn test_mask_matches_frame() {
        let frame = Frame::new(vec![0u8; 8 * 4 * 3], 8, 4);
        let mask = Mask::new(vec![0u8; 8 * 4], 8, 4);
        assert!(mask.matches(&frame));

        let wrong = Mask::new(vec![0u8; 8 * 5], 8, 5);
        assert!(!wrong.matches(&frame));
    }

    #[test]
    fn test_mask_coverage() {
        let mut data = vec![0u8; 10];
        data[2] = 255;
        data[7] = 255;
        let mask = Mask::new(data, 5, 2);
        assert_eq!(mask.coverage(), 2);
        assert!(!mask.is_empty_selection());

        let empty = Mask::new(vec![0u8; 10], 5, 2);
        assert!(empty.is_empty_selection());
    }

    #[test]
    fn test_hsv_range_bounds() {
        let range = HsvRange::new(94, 126, 80, 255, 2, 255);
        assert_eq!(range.lower_bound(), [94, 80, 2]);
        assert_eq!(range.upper_bound(), [126, 255, 255]);
        assert!(!range.wraps_hue());
    }

    #[test]
    fn test_hsv_range_wraparound_split() {
        // 赤系: H 170-10 は [170, 179] と [0, 10] に分割される
        let red = HsvRange::new(170, 10, 155, 255, 84, 255);
        assert!(red.wraps_hue());

        let (upper, lower) = red.sub_ranges();
        assert_eq!(upper.h_min, 170);
        assert_eq!(upper.h_max, HUE_MAX);

        let lower = lower.expect("wrapping range must split in two");
        assert_eq!(lower.h_min, 0);
        assert_eq!(lower.h_max, 10);

        // S/V境界は両側に引き継がれる
        assert_eq!(upper.s_min, 155);
        assert_eq!(lower.v_min, 84);
    }

    #[test]
    fn test_hsv_range_no_split_when_plain() {
        let green = HsvRange::new(40, 102, 100, 255, 100, 255);
        let (primary, secondary) = green.sub_ranges();
        assert_eq!(primary, green);
        assert!(secondary.is_none());
    }

    #[test]
    fn test_hsv_contains_inclusive_bounds() {
        let range = HsvRange::new(40, 102, 100, 255, 100, 255);
        assert!(range.contains(40, 100, 100));
        assert!(range.contains(102, 255, 255));
        assert!(!range.contains(39, 100, 100));
        assert!(!range.contains(103, 100, 100));
        assert!(!range.contains(50, 99, 100));
    }

    #[test]
    fn test_hsv_contains_wraparound() {
        let red = HsvRange::new(170, 10, 155, 255, 84, 255);
        assert!(red.contains(178, 200, 200));
        assert!(red.contains(5, 200, 200));
        assert!(!red.contains(90, 200, 200));
    }

    #[test]
    fn test_hsv_inverted_sv_selects_nothing() {
        // S/Vの min > max は定義上、空選択
        let range = HsvRange::new(0, 179, 200, 100, 0, 255);
        assert!(!range.contains(90, 150, 128));
        assert!(!range.contains(90, 200, 128));
    }

    #[test]
    fn test_bounding_box_center_and_area() {
        let bbox = BoundingBox::new(100, 200, 50, 60);
        assert_eq!(bbox.center(), (125, 230));
        assert_eq!(bbox.area(), 3000);
    }

    #[test]
    fn test_bounding_box_offset() {
        let eye = BoundingBox::new(10, 12, 20, 20);
        let moved = eye.offset(100, 50);
        assert_eq!(moved.x, 110);
        assert_eq!(moved.y, 62);
        assert_eq!(moved.width, 20);
    }

    #[test]
    fn test_detection_found() {
        let mut detection = Detection::default();
        assert!(!detection.found());

        detection.boxes.push(BoundingBox::new(0, 0, 10, 10));
        assert!(detection.found());
    }
}
