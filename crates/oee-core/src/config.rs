//! OEE 引擎配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::calendar::WeekStart;
use crate::OeeError;

/// 引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 性能稼動率計算策略
    pub performance_strategy: PerformanceStrategy,

    /// 良率計算策略
    pub quality_strategy: QualityStrategy,

    /// 未關聯事件的分攤範圍
    pub allocation_scope: AllocationScope,

    /// 群組 OEE 的彙總方式
    pub group_oee_mode: GroupOeeMode,

    /// 班次未設定目標時的預設 OEE 目標
    pub default_target_oee: Decimal,

    /// 每週起始日
    pub week_start: WeekStart,

    /// 週窗口數量（含本週）
    pub weeks: u32,

    /// 月窗口數量（含本月）
    pub months: u32,

    /// 年窗口數量（含本年）
    pub years: u32,

    /// 平滑趨勢（歷史資料用，避免雜訊造成翻轉）
    pub smoothed_trend: TrendConfig,

    /// 嚴格趨勢（期間儀表板用，任何差異都算方向）
    pub strict_trend: TrendConfig,

    /// 柏拉圖保留的原因數量
    pub pareto_top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            performance_strategy: PerformanceStrategy::Auto,
            quality_strategy: QualityStrategy::DefectsAndBlocked,
            allocation_scope: AllocationScope::DateShiftEquipment,
            group_oee_mode: GroupOeeMode::MeanOfRecords,
            default_target_oee: Decimal::from(85),
            week_start: WeekStart::Sunday,
            weeks: 4,
            months: 12,
            years: 2,
            smoothed_trend: TrendConfig::smoothed(),
            strict_trend: TrendConfig::strict(),
            pareto_top_n: 8,
        }
    }
}

impl EngineConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 字串載入配置（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置性能策略
    pub fn with_performance_strategy(mut self, strategy: PerformanceStrategy) -> Self {
        self.performance_strategy = strategy;
        self
    }

    /// 建構器模式：設置良率策略
    pub fn with_quality_strategy(mut self, strategy: QualityStrategy) -> Self {
        self.quality_strategy = strategy;
        self
    }

    /// 建構器模式：設置分攤範圍
    pub fn with_allocation_scope(mut self, scope: AllocationScope) -> Self {
        self.allocation_scope = scope;
        self
    }

    /// 建構器模式：設置群組 OEE 彙總方式
    pub fn with_group_oee_mode(mut self, mode: GroupOeeMode) -> Self {
        self.group_oee_mode = mode;
        self
    }

    /// 建構器模式：設置預設 OEE 目標
    pub fn with_default_target_oee(mut self, target: Decimal) -> Self {
        self.default_target_oee = target;
        self
    }

    /// 建構器模式：設置每週起始日
    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    /// 建構器模式：設置期間窗口數量
    pub fn with_window_counts(mut self, weeks: u32, months: u32, years: u32) -> Self {
        self.weeks = weeks;
        self.months = months;
        self.years = years;
        self
    }

    /// 建構器模式：設置柏拉圖保留數量
    pub fn with_pareto_top_n(mut self, top_n: usize) -> Self {
        self.pareto_top_n = top_n;
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> crate::Result<()> {
        if self.weeks == 0 || self.months == 0 || self.years == 0 {
            return Err(OeeError::InvalidConfig(
                "期間窗口數量必須大於 0".to_string(),
            ));
        }

        if self.default_target_oee < Decimal::ZERO || self.default_target_oee > Decimal::ONE_HUNDRED
        {
            return Err(OeeError::InvalidConfig(format!(
                "預設 OEE 目標超出範圍: {}",
                self.default_target_oee
            )));
        }

        self.smoothed_trend.validate()?;
        self.strict_trend.validate()?;

        Ok(())
    }
}

/// 性能稼動率策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceStrategy {
    /// 依記錄中已填的欄位自動選擇：有目標產出用目標，否則有節拍用節拍
    Auto,

    /// 總產出 / 目標產出
    TargetOutput,

    /// 總產出 / (實際時間 × 60 / 理想節拍)
    CycleTime,

    /// 理想節拍 / 實際節拍，再乘上目標達成率（上限 1）
    CycleTimeWithTargetAttainment,
}

impl FromStr for PerformanceStrategy {
    type Err = OeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" | "Auto" => Ok(Self::Auto),
            "target_output" | "TargetOutput" => Ok(Self::TargetOutput),
            "cycle_time" | "CycleTime" => Ok(Self::CycleTime),
            "cycle_time_with_target_attainment" | "CycleTimeWithTargetAttainment" => {
                Ok(Self::CycleTimeWithTargetAttainment)
            }
            _ => Err(OeeError::UnknownStrategy(s.to_string())),
        }
    }
}

/// 良率策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityStrategy {
    /// (總產出 - 不良 - 封鎖) / 總產出
    DefectsAndBlocked,

    /// (總產出 - 不良) / 總產出，忽略封鎖數量
    DefectsOnly,
}

impl FromStr for QualityStrategy {
    type Err = OeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "defects_and_blocked" | "DefectsAndBlocked" => Ok(Self::DefectsAndBlocked),
            "defects_only" | "DefectsOnly" => Ok(Self::DefectsOnly),
            _ => Err(OeeError::UnknownStrategy(s.to_string())),
        }
    }
}

/// 未關聯事件的分攤範圍
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationScope {
    /// 同日期 + 班次 + 設備段
    DateShiftEquipment,
    /// 同班次（跨日期、跨設備）
    Shift,
    /// 同設備段（跨日期、跨班次）
    Equipment,
    /// 同日期
    Date,
    /// 同日期 + 班次
    DateShift,
}

impl AllocationScope {
    pub fn uses_date(&self) -> bool {
        matches!(self, Self::DateShiftEquipment | Self::Date | Self::DateShift)
    }

    pub fn uses_shift(&self) -> bool {
        matches!(self, Self::DateShiftEquipment | Self::Shift | Self::DateShift)
    }

    pub fn uses_equipment(&self) -> bool {
        matches!(self, Self::DateShiftEquipment | Self::Equipment)
    }
}

/// 群組 OEE 彙總方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOeeMode {
    /// 各記錄 OEE 的算術平均
    MeanOfRecords,
    /// 三項子指標平均值的乘積
    ProductOfMeans,
}

/// 趨勢判定參數
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// 前後半段平均差距門檻（百分點）
    pub threshold: Decimal,

    /// 最少資料點數，不足一律視為持平
    pub min_len: usize,
}

impl TrendConfig {
    pub fn new(threshold: Decimal, min_len: usize) -> Self {
        Self { threshold, min_len }
    }

    /// 平滑判定：差距超過 2 個百分點且至少 4 個點
    pub fn smoothed() -> Self {
        Self::new(Decimal::TWO, 4)
    }

    /// 嚴格判定：任何差距都視為方向，至少 2 個點
    pub fn strict() -> Self {
        Self::new(Decimal::ZERO, 2)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.threshold < Decimal::ZERO {
            return Err(OeeError::InvalidConfig(format!(
                "趨勢門檻不可為負: {}",
                self.threshold
            )));
        }
        if self.min_len < 2 {
            return Err(OeeError::InvalidConfig(format!(
                "趨勢最少資料點數至少為 2: {}",
                self.min_len
            )));
        }
        Ok(())
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self::strict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::new();

        assert_eq!(config.performance_strategy, PerformanceStrategy::Auto);
        assert_eq!(config.quality_strategy, QualityStrategy::DefectsAndBlocked);
        assert_eq!(config.allocation_scope, AllocationScope::DateShiftEquipment);
        assert_eq!(config.default_target_oee, Decimal::from(85));
        assert_eq!((config.weeks, config.months, config.years), (4, 12, 2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new()
            .with_performance_strategy(PerformanceStrategy::CycleTime)
            .with_quality_strategy(QualityStrategy::DefectsOnly)
            .with_allocation_scope(AllocationScope::Shift)
            .with_group_oee_mode(GroupOeeMode::ProductOfMeans)
            .with_week_start(WeekStart::Monday)
            .with_pareto_top_n(5);

        assert_eq!(config.performance_strategy, PerformanceStrategy::CycleTime);
        assert_eq!(config.quality_strategy, QualityStrategy::DefectsOnly);
        assert_eq!(config.group_oee_mode, GroupOeeMode::ProductOfMeans);
        assert_eq!(config.week_start, WeekStart::Monday);
        assert_eq!(config.pareto_top_n, 5);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json_str(
            r#"{ "performance_strategy": "cycle_time", "weeks": 6 }"#,
        )
        .unwrap();

        assert_eq!(config.performance_strategy, PerformanceStrategy::CycleTime);
        assert_eq!(config.weeks, 6);
        assert_eq!(config.months, 12);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = EngineConfig::from_json_str(r#"{ "months": 0 }"#).unwrap_err();
        assert!(matches!(err, OeeError::InvalidConfig(_)));

        let err = EngineConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, OeeError::ConfigParse(_)));
    }

    #[test]
    fn test_validate_trend_config() {
        let mut config = EngineConfig::new();
        config.smoothed_trend = TrendConfig::new(Decimal::from(-1), 4);
        assert!(config.validate().is_err());

        config.smoothed_trend = TrendConfig::new(Decimal::TWO, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_strategies() {
        assert_eq!(
            "target_output".parse::<PerformanceStrategy>().unwrap(),
            PerformanceStrategy::TargetOutput
        );
        assert_eq!(
            "CycleTimeWithTargetAttainment".parse::<PerformanceStrategy>().unwrap(),
            PerformanceStrategy::CycleTimeWithTargetAttainment
        );
        assert_eq!(
            "defects_only".parse::<QualityStrategy>().unwrap(),
            QualityStrategy::DefectsOnly
        );
        assert!("speed".parse::<PerformanceStrategy>().is_err());
    }

    #[test]
    fn test_allocation_scope_keys() {
        assert!(AllocationScope::DateShiftEquipment.uses_date());
        assert!(AllocationScope::DateShiftEquipment.uses_shift());
        assert!(AllocationScope::DateShiftEquipment.uses_equipment());

        assert!(!AllocationScope::Shift.uses_date());
        assert!(AllocationScope::Shift.uses_shift());
        assert!(!AllocationScope::Shift.uses_equipment());

        assert!(AllocationScope::DateShift.uses_date());
        assert!(!AllocationScope::DateShift.uses_equipment());
    }
}
