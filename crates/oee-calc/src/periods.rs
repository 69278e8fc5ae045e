//! 期間彙總（週/月/年）

use chrono::NaiveDate;
use oee_core::{EngineConfig, EquipmentSegment, OeeMetrics, PeriodKind, PeriodWindow};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::aggregation::{segment_name, Aggregator};
use crate::level::{LevelClassifier, OeeLevel};
use crate::metrics::ScoredRecord;
use crate::trend::{mean, SeriesStats, TrendClassifier};

/// 單一窗口的 OEE
#[derive(Debug, Clone, Serialize)]
pub struct PeriodOee {
    pub kind: PeriodKind,
    /// 與設備段序列對齊用的標籤
    pub label: String,
    pub offset: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub metrics: OeeMetrics,
    pub record_count: usize,
    pub level: OeeLevel,
}

impl PeriodOee {
    pub fn has_data(&self) -> bool {
        self.record_count > 0
    }
}

/// 設備段的期間序列（與總體序列逐一對齊）
#[derive(Debug, Clone, Serialize)]
pub struct SegmentPeriodSeries {
    pub equipment_id: String,
    pub name: String,
    pub periods: Vec<PeriodOee>,
    /// 有資料窗口的平均 OEE
    pub mean_oee: Decimal,
    /// 該設備段各期間類型的統計
    pub summaries: Vec<PeriodSummary>,
}

impl SegmentPeriodSeries {
    pub fn summary(&self, kind: PeriodKind) -> Option<&PeriodSummary> {
        self.summaries.iter().find(|summary| summary.kind == kind)
    }
}

/// 單一期間類型的統計
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub kind: PeriodKind,
    pub stats: SeriesStats,
}

/// 期間儀表板
#[derive(Debug, Clone, Serialize)]
pub struct PeriodDashboard {
    pub general: Vec<PeriodOee>,
    pub segments: Vec<SegmentPeriodSeries>,
    pub summaries: Vec<PeriodSummary>,
}

impl PeriodDashboard {
    /// 依標籤查找總體窗口
    pub fn window(&self, label: &str) -> Option<&PeriodOee> {
        self.general.iter().find(|period| period.label == label)
    }

    pub fn summary(&self, kind: PeriodKind) -> Option<&PeriodSummary> {
        self.summaries.iter().find(|summary| summary.kind == kind)
    }
}

/// 期間彙總器
pub struct PeriodAggregator;

impl PeriodAggregator {
    /// 依窗口彙總
    ///
    /// 每個窗口獨立篩選 `start <= date <= end` 的記錄；窗口間互不影響，並行計算。
    pub fn aggregate(
        scored: &[ScoredRecord],
        windows: &[PeriodWindow],
        segments: &[EquipmentSegment],
        config: &EngineConfig,
    ) -> PeriodDashboard {
        tracing::debug!("期間彙總：{} 個窗口，{} 筆記錄", windows.len(), scored.len());

        let general: Vec<PeriodOee> = windows
            .par_iter()
            .map(|window| Self::window_oee(scored.iter(), window, config))
            .collect();

        let equipment_ids: BTreeSet<&str> = scored
            .iter()
            .map(|s| s.record.equipment_id.as_str())
            .collect();

        let mut segment_series: Vec<SegmentPeriodSeries> = equipment_ids
            .into_par_iter()
            .map(|equipment_id| {
                let periods: Vec<PeriodOee> = windows
                    .iter()
                    .map(|window| {
                        let records = scored
                            .iter()
                            .filter(|s| s.record.equipment_id == equipment_id);
                        Self::window_oee(records, window, config)
                    })
                    .collect();

                let with_data: Vec<Decimal> = periods
                    .iter()
                    .filter(|p| p.has_data())
                    .map(|p| p.metrics.oee)
                    .collect();

                SegmentPeriodSeries {
                    equipment_id: equipment_id.to_string(),
                    name: segment_name(segments, equipment_id),
                    mean_oee: mean(&with_data),
                    summaries: Self::summaries(&periods, windows, config),
                    periods,
                }
            })
            .collect();

        segment_series.sort_by(|a, b| b.mean_oee.cmp(&a.mean_oee));

        let summaries = Self::summaries(&general, windows, config);

        PeriodDashboard {
            general,
            segments: segment_series,
            summaries,
        }
    }

    /// 單一類型的統計：只取有資料的窗口，依時間由舊到新排列
    pub fn summarize(periods: &[PeriodOee], kind: PeriodKind, config: &EngineConfig) -> SeriesStats {
        let mut chronological: Vec<&PeriodOee> = periods
            .iter()
            .filter(|p| p.kind == kind && p.has_data())
            .collect();
        chronological.sort_by_key(|p| p.start);

        let values: Vec<Decimal> = chronological.iter().map(|p| p.metrics.oee).collect();
        TrendClassifier::stats(&values, &config.strict_trend)
    }

    /// 每個出現在窗口中的期間類型各一項統計
    fn summaries(
        periods: &[PeriodOee],
        windows: &[PeriodWindow],
        config: &EngineConfig,
    ) -> Vec<PeriodSummary> {
        [PeriodKind::Week, PeriodKind::Month, PeriodKind::Year]
            .into_iter()
            .filter(|kind| windows.iter().any(|w| w.kind == *kind))
            .map(|kind| PeriodSummary {
                kind,
                stats: Self::summarize(periods, kind, config),
            })
            .collect()
    }

    fn window_oee<'a, I>(records: I, window: &PeriodWindow, config: &EngineConfig) -> PeriodOee
    where
        I: Iterator<Item = &'a ScoredRecord>,
    {
        let summary = Aggregator::mean(
            records.filter(|s| window.contains(s.record.date)),
            config.group_oee_mode,
        );

        PeriodOee {
            kind: window.kind,
            label: window.label.clone(),
            offset: window.offset,
            start: window.start,
            end: window.end,
            metrics: summary.metrics,
            record_count: summary.record_count,
            level: LevelClassifier::classify(summary.metrics.oee),
        }
    }
}
