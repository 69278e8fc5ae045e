//! 趨勢判定

use oee_core::TrendConfig;
use rust_decimal::Decimal;
use serde::Serialize;

/// 趨勢方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Stable,
}

/// 序列統計（平均/最大/最小/趨勢）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeriesStats {
    pub mean: Decimal,
    pub max: Decimal,
    pub min: Decimal,
    pub trend: TrendDirection,
}

/// 趨勢判定器
pub struct TrendClassifier;

impl TrendClassifier {
    /// 比較前半段與後半段平均值
    ///
    /// 在 floor(n/2) 處切分；後半 - 前半 > 門檻為上升，< -門檻為下降。
    /// 資料點少於 `min_len`（且至少 2 個）時一律持平。序列須依日期由舊到新排列。
    pub fn classify(values: &[Decimal], config: &TrendConfig) -> TrendDirection {
        if values.len() < config.min_len.max(2) {
            return TrendDirection::Stable;
        }

        let mid = values.len() / 2;
        let earlier = mean(&values[..mid]);
        let later = mean(&values[mid..]);
        let diff = later - earlier;

        if diff > config.threshold {
            TrendDirection::Up
        } else if diff < -config.threshold {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    /// 計算序列統計；空序列回傳全零
    pub fn stats(values: &[Decimal], config: &TrendConfig) -> SeriesStats {
        if values.is_empty() {
            return SeriesStats::default();
        }

        SeriesStats {
            mean: mean(values),
            max: values.iter().copied().max().unwrap_or_default(),
            min: values.iter().copied().min().unwrap_or_default(),
            trend: Self::classify(values, config),
        }
    }
}

/// 算術平均，空序列為 0
pub(crate) fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}
