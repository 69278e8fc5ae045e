//! # OEE Calculation Engine
//!
//! 核心 OEE 計算引擎：事件分攤 → 單筆評分 → 維度彙總 → 趨勢/等級

pub mod aggregation;
pub mod allocation;
pub mod bucketing;
pub mod calculator;
pub mod history;
pub mod level;
pub mod metrics;
pub mod pareto;
pub mod periods;
pub mod trend;

// Re-export 主要類型
pub use aggregation::{
    Aggregator, GroupSummary, SegmentOee, ShiftDashboard, ShiftOee, UNKNOWN_SEGMENT_NAME,
};
pub use allocation::{AllocationResolver, AllocationResult, OrphanReport, RecordAllocation};
pub use bucketing::DateBucketing;
pub use calculator::{OeeCalculator, ScoredSnapshot};
pub use history::{DailyOee, DailyQuality, DailySeries, DailyStoppage, OeeHistory, ShiftHistory};
pub use level::{LevelClassifier, OeeLevel};
pub use metrics::{MetricCalculator, ScoredRecord};
pub use pareto::{BlockedBreakdown, ParetoCalculator, ParetoEntry, UNSPECIFIED_REASON};
pub use periods::{PeriodAggregator, PeriodDashboard, PeriodOee, PeriodSummary, SegmentPeriodSeries};
pub use trend::{SeriesStats, TrendClassifier, TrendDirection};

/// OEE 計算警告
#[derive(Debug, Clone, serde::Serialize)]
pub struct OeeWarning {
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl OeeWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}
