//! 每日歷史序列

use chrono::NaiveDate;
use oee_core::{
    BlockedProductEvent, EngineConfig, OeeMetrics, ProductionRecord, Shift, StoppageEvent,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregation::Aggregator;
use crate::bucketing::DateBucketing;
use crate::metrics::{ratio_percent, ScoredRecord};
use crate::trend::{mean, TrendClassifier, TrendDirection};

/// 單日 OEE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyOee {
    pub date: NaiveDate,
    pub metrics: OeeMetrics,
    pub record_count: usize,
}

/// 單一班次的每日序列
#[derive(Debug, Clone, Serialize)]
pub struct ShiftHistory {
    pub shift_id: String,
    pub shift_name: String,
    /// 只含有資料的日期，由舊到新
    pub days: Vec<DailyOee>,
    pub mean_oee: Decimal,
    pub trend: TrendDirection,
}

impl ShiftHistory {
    pub fn has_data(&self) -> bool {
        !self.days.is_empty()
    }
}

/// 回溯期間的 OEE 歷史
#[derive(Debug, Clone, Serialize)]
pub struct OeeHistory {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub general: Vec<DailyOee>,
    pub by_shift: Vec<ShiftHistory>,
    /// 平均 OEE 最高的班次名稱
    pub best_shift: Option<String>,
    pub worst_shift: Option<String>,
}

impl OeeHistory {
    /// 建立 [from, to] 區間的歷史
    pub fn build(
        scored: &[ScoredRecord],
        shifts: &[Shift],
        from: NaiveDate,
        to: NaiveDate,
        config: &EngineConfig,
    ) -> Self {
        let in_range: Vec<&ScoredRecord> = scored
            .iter()
            .filter(|s| s.record.is_within(from, to))
            .collect();

        let general = daily(&in_range, config);

        let mut by_shift: Vec<ShiftHistory> = shifts
            .iter()
            .map(|shift| {
                let records: Vec<&ScoredRecord> = in_range
                    .iter()
                    .copied()
                    .filter(|s| s.record.shift_id == shift.id)
                    .collect();
                shift_history(&shift.id, &shift.name, &records, config)
            })
            .collect();

        let mut unknown: BTreeMap<&str, Vec<&ScoredRecord>> = BTreeMap::new();
        for record in in_range.iter().copied() {
            if !shifts.iter().any(|shift| shift.id == record.record.shift_id) {
                unknown
                    .entry(record.record.shift_id.as_str())
                    .or_default()
                    .push(record);
            }
        }
        for (shift_id, records) in unknown {
            by_shift.push(shift_history(shift_id, shift_id, &records, config));
        }

        let ranked: Vec<&ShiftHistory> = by_shift.iter().filter(|s| s.has_data()).collect();
        let best_shift = ranked
            .iter()
            .max_by(|a, b| a.mean_oee.cmp(&b.mean_oee))
            .map(|s| s.shift_name.clone());
        let worst_shift = ranked
            .iter()
            .min_by(|a, b| a.mean_oee.cmp(&b.mean_oee))
            .map(|s| s.shift_name.clone());

        Self {
            from,
            to,
            general,
            by_shift,
            best_shift,
            worst_shift,
        }
    }
}

fn daily(records: &[&ScoredRecord], config: &EngineConfig) -> Vec<DailyOee> {
    DateBucketing::group_by_date(records, |s| s.record.date)
        .into_iter()
        .map(|(date, bucket)| {
            let summary = Aggregator::mean(bucket.into_iter().copied(), config.group_oee_mode);
            DailyOee {
                date,
                metrics: summary.metrics,
                record_count: summary.record_count,
            }
        })
        .collect()
}

fn shift_history(
    shift_id: &str,
    shift_name: &str,
    records: &[&ScoredRecord],
    config: &EngineConfig,
) -> ShiftHistory {
    let days = daily(records, config);
    let values: Vec<Decimal> = days.iter().map(|day| day.metrics.oee).collect();

    ShiftHistory {
        shift_id: shift_id.to_string(),
        shift_name: shift_name.to_string(),
        mean_oee: mean(&values),
        trend: TrendClassifier::classify(&values, &config.smoothed_trend),
        days,
    }
}

/// 單日停機統計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyStoppage {
    pub date: NaiveDate,
    pub total_minutes: Decimal,
    pub event_count: usize,
    pub hours: Decimal,
}

/// 單日品質統計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyQuality {
    pub date: NaiveDate,
    /// (良品 - 封鎖) / 產量 × 100
    pub quality: Decimal,
    pub blocked: Decimal,
    pub total_produced: Decimal,
}

/// 依日期的事件序列
pub struct DailySeries;

impl DailySeries {
    /// 每日停機分鐘、次數與時數
    pub fn stoppages(stoppages: &[StoppageEvent]) -> Vec<DailyStoppage> {
        DateBucketing::group_by_date(stoppages, |s| s.date)
            .into_iter()
            .map(|(date, events)| {
                let total_minutes: Decimal = events.iter().map(|e| e.duration_minutes).sum();
                DailyStoppage {
                    date,
                    total_minutes,
                    event_count: events.len(),
                    hours: total_minutes / Decimal::from(60),
                }
            })
            .collect()
    }

    /// 每日品質；沒有產量的日期不列出
    pub fn quality(
        records: &[ProductionRecord],
        blocked: &[BlockedProductEvent],
    ) -> Vec<DailyQuality> {
        let blocked_by_date = DateBucketing::group_by_date(blocked, |b| b.date);

        DateBucketing::group_by_date(records, |r| r.date)
            .into_iter()
            .filter_map(|(date, day_records)| {
                let total_produced: Decimal = day_records.iter().map(|r| r.total_produced).sum();
                if total_produced <= Decimal::ZERO {
                    return None;
                }

                let good: Decimal = day_records.iter().map(|r| r.good_units()).sum();
                let blocked_quantity: Decimal = blocked_by_date
                    .get(&date)
                    .map(|events| events.iter().map(|e| e.quantity).sum())
                    .unwrap_or_default();

                Some(DailyQuality {
                    date,
                    quality: ratio_percent(
                        good.checked_sub(blocked_quantity).unwrap_or(Decimal::ZERO),
                        total_produced,
                    ),
                    blocked: blocked_quantity,
                    total_produced,
                })
            })
            .collect()
    }
}
