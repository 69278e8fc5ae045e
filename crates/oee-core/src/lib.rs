//! # OEE Core
//!
//! 核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod event;
pub mod record;
pub mod reference;
pub mod score;
pub mod source;

// Re-export 主要類型
pub use calendar::{PeriodCalendar, PeriodKind, PeriodWindow, WeekStart};
pub use config::{
    AllocationScope, EngineConfig, GroupOeeMode, PerformanceStrategy, QualityStrategy, TrendConfig,
};
pub use event::{BlockedProductEvent, StoppageCategory, StoppageEvent};
pub use record::ProductionRecord;
pub use reference::{EquipmentSegment, SegmentStatus, Shift};
pub use score::{round_display, OeeMetrics};
pub use source::{RecordFilter, RecordSource, Snapshot};

/// OEE 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum OeeError {
    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("配置解析失敗: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("未知的策略名稱: {0}")]
    UnknownStrategy(String),

    #[error("未知的停機類別: {0}")]
    UnknownCategory(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("資料來源錯誤: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, OeeError>;
