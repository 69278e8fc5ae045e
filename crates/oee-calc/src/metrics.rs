//! OEE 指標公式

use oee_core::{
    EngineConfig, OeeMetrics, PerformanceStrategy, ProductionRecord, QualityStrategy,
};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::allocation::{AllocationResult, RecordAllocation};

/// 已評分的生產記錄
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    pub record: ProductionRecord,
    pub allocation: RecordAllocation,
    pub metrics: OeeMetrics,
}

/// 指標計算器
///
/// 所有公式在分母非正時回傳 0，並把結果限制在 [0, 100]。
/// 運算溢位不會 panic：過大的比值視為 100，過小的視為 0。
pub struct MetricCalculator;

impl MetricCalculator {
    /// 單筆記錄評分
    pub fn score(
        record: &ProductionRecord,
        stoppage_minutes: Decimal,
        blocked_quantity: Decimal,
        config: &EngineConfig,
    ) -> OeeMetrics {
        let availability = Self::availability(record.planned_time_minutes, stoppage_minutes);
        let performance = Self::performance(record, config.performance_strategy);
        let quality = Self::quality(
            record.total_produced,
            record.defects,
            blocked_quantity,
            config.quality_strategy,
        );

        OeeMetrics::compose(availability, performance, quality)
    }

    /// 批次評分（並行，輸出順序與輸入一致）
    pub fn score_all(
        records: &[ProductionRecord],
        allocation: &AllocationResult,
        config: &EngineConfig,
    ) -> Vec<ScoredRecord> {
        records
            .par_iter()
            .map(|record| {
                let allocated = allocation.get(&record.id);
                ScoredRecord {
                    record: record.clone(),
                    allocation: allocated,
                    metrics: Self::score(
                        record,
                        allocated.stoppage_minutes,
                        allocated.blocked_quantity,
                        config,
                    ),
                }
            })
            .collect()
    }

    /// 稼動率 = (計劃時間 - 停機) / 計劃時間 × 100
    pub fn availability(planned_minutes: Decimal, stoppage_minutes: Decimal) -> Decimal {
        if planned_minutes <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        // 只有負停機會讓減法溢位，結果必然超過 100
        let productive = planned_minutes
            .checked_sub(stoppage_minutes)
            .unwrap_or(Decimal::MAX);
        ratio_percent(productive, planned_minutes)
    }

    /// 性能稼動率（依策略）
    pub fn performance(record: &ProductionRecord, strategy: PerformanceStrategy) -> Decimal {
        match Self::resolve_strategy(record, strategy) {
            PerformanceStrategy::CycleTime => Self::performance_by_cycle_time(record),
            PerformanceStrategy::CycleTimeWithTargetAttainment => {
                Self::performance_by_cycle_time_and_target(record)
            }
            PerformanceStrategy::TargetOutput | PerformanceStrategy::Auto => {
                Self::performance_by_target(
                    record.total_produced,
                    record.target_output.unwrap_or(Decimal::ZERO),
                )
            }
        }
    }

    /// 將 `Auto` 解析為具體策略：有目標產出用目標，否則有節拍用節拍
    pub fn resolve_strategy(
        record: &ProductionRecord,
        strategy: PerformanceStrategy,
    ) -> PerformanceStrategy {
        match strategy {
            PerformanceStrategy::Auto if record.target_output.is_some() => {
                PerformanceStrategy::TargetOutput
            }
            PerformanceStrategy::Auto if record.has_cycle_times() => PerformanceStrategy::CycleTime,
            PerformanceStrategy::Auto => PerformanceStrategy::TargetOutput,
            concrete => concrete,
        }
    }

    /// 總產出 / 目標產出
    ///
    /// 沒有目標（0）但有產出時視為達標；兩者皆為 0 時為 0。
    pub fn performance_by_target(total_produced: Decimal, target_output: Decimal) -> Decimal {
        if target_output > Decimal::ZERO {
            return ratio_percent(total_produced, target_output);
        }

        if total_produced > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    /// 總產出 / 理想產出，理想產出 = 實際時間（分）× 60 / 理想節拍（秒）
    pub fn performance_by_cycle_time(record: &ProductionRecord) -> Decimal {
        let ideal_cycle = match record.ideal_cycle_time {
            Some(cycle) if cycle > Decimal::ZERO => cycle,
            _ => return Decimal::ZERO,
        };

        // 理想產出溢位代表實際產量相對趨近 0
        let ideal_units = match record
            .actual_time_minutes
            .checked_mul(Decimal::from(60))
            .and_then(|seconds| seconds.checked_div(ideal_cycle))
        {
            Some(units) if units > Decimal::ZERO => units,
            _ => return Decimal::ZERO,
        };

        ratio_percent(record.total_produced, ideal_units)
    }

    /// 理想節拍 / 實際節拍 × min(1, 總產出 / 目標產出)
    pub fn performance_by_cycle_time_and_target(record: &ProductionRecord) -> Decimal {
        if record.total_produced <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let (ideal, actual) = match (record.ideal_cycle_time, record.actual_cycle_time) {
            (Some(ideal), Some(actual)) if ideal > Decimal::ZERO && actual > Decimal::ZERO => {
                (ideal, actual)
            }
            _ => return Decimal::ZERO,
        };

        let attainment = match record.target_output {
            Some(target) if target > Decimal::ZERO => record
                .total_produced
                .checked_div(target)
                .map_or(Decimal::ONE, |ratio| ratio.min(Decimal::ONE)),
            _ => Decimal::ONE,
        };

        // 兩個因子皆為正，溢位只可能往上
        ideal
            .checked_div(actual)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|base| base.checked_mul(attainment))
            .map_or(Decimal::ONE_HUNDRED, clamp_percent)
    }

    /// 良率（依策略）
    pub fn quality(
        total_produced: Decimal,
        defects: Decimal,
        blocked_quantity: Decimal,
        strategy: QualityStrategy,
    ) -> Decimal {
        if total_produced <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let good = match strategy {
            QualityStrategy::DefectsAndBlocked => total_produced
                .checked_sub(defects)
                .and_then(|good| good.checked_sub(blocked_quantity)),
            QualityStrategy::DefectsOnly => total_produced.checked_sub(defects),
        };

        // 扣除量溢位時取最保守的 0
        ratio_percent(good.unwrap_or(Decimal::ZERO).max(Decimal::ZERO), total_produced)
    }
}

/// numerator / denominator × 100，限制在 [0, 100]
///
/// 溢位時依兩數符號判斷方向：同號為 100，異號為 0。
pub(crate) fn ratio_percent(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }

    match numerator
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    {
        Some(percent) => clamp_percent(percent),
        None if numerator.is_sign_negative() == denominator.is_sign_negative() => {
            Decimal::ONE_HUNDRED
        }
        None => Decimal::ZERO,
    }
}

/// 限制在 [0, 100]
pub(crate) fn clamp_percent(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED)
}
