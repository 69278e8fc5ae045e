//! OEE 指標結果模型

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 顯示用四捨五入（一位小數）
pub fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// OEE 三項子指標與綜合分數（百分比，0-100）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OeeMetrics {
    /// 稼動率
    pub availability: Decimal,
    /// 性能稼動率
    pub performance: Decimal,
    /// 良率
    pub quality: Decimal,
    /// 綜合效率
    pub oee: Decimal,
}

impl OeeMetrics {
    /// 全零結果（無資料時使用）
    pub fn zero() -> Self {
        Self::default()
    }

    /// 由三項子指標組合 OEE
    ///
    /// OEE = 稼動率 × 性能 × 良率 / 10000
    pub fn compose(availability: Decimal, performance: Decimal, quality: Decimal) -> Self {
        Self {
            availability,
            performance,
            quality,
            oee: availability * performance * quality / Decimal::from(10_000),
        }
    }

    /// 轉為顯示精度（一位小數）
    pub fn rounded(&self) -> Self {
        Self {
            availability: round_display(self.availability),
            performance: round_display(self.performance),
            quality: round_display(self.quality),
            oee: round_display(self.oee),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.availability.is_zero()
            && self.performance.is_zero()
            && self.quality.is_zero()
            && self.oee.is_zero()
    }
}
