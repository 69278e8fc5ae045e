//! OEE 等級判定

use rust_decimal::Decimal;
use serde::Serialize;

/// OEE/良率等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OeeLevel {
    /// ≥ 85
    Excellent,
    /// 70 ≤ x < 85
    Good,
    /// 50 ≤ x < 70
    Warning,
    /// < 50
    Critical,
}

impl OeeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// 等級判定器
pub struct LevelClassifier;

impl LevelClassifier {
    /// 依分數判定等級，超出 [0, 100] 的值同樣適用
    pub fn classify(value: Decimal) -> OeeLevel {
        if value >= Decimal::from(85) {
            OeeLevel::Excellent
        } else if value >= Decimal::from(70) {
            OeeLevel::Good
        } else if value >= Decimal::from(50) {
            OeeLevel::Warning
        } else {
            OeeLevel::Critical
        }
    }
}
