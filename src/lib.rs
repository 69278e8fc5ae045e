//! # OEE
//!
//! 設備綜合效率（OEE）彙總引擎
//!
//! - [`model`]: 資料模型、配置、期間日曆、資料來源介面
//! - [`calc`]: 事件分攤、指標公式、維度彙總、趨勢與等級判定

pub use oee_calc as calc;
pub use oee_core as model;

pub use oee_calc::{
    OeeCalculator, OeeLevel, OeeWarning, PeriodDashboard, ScoredSnapshot, ShiftDashboard,
    TrendDirection,
};
pub use oee_core::{
    BlockedProductEvent, EngineConfig, EquipmentSegment, OeeError, OeeMetrics, ProductionRecord,
    RecordFilter, RecordSource, Result, Shift, Snapshot, StoppageEvent,
};
