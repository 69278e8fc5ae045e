//! 維度彙總（班次/設備段）

use oee_core::{EngineConfig, EquipmentSegment, GroupOeeMode, OeeMetrics, Shift, StoppageEvent};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::level::{LevelClassifier, OeeLevel};
use crate::metrics::ScoredRecord;
use crate::OeeWarning;

/// 找不到設備段名稱時的顯示名稱
pub const UNKNOWN_SEGMENT_NAME: &str = "Unknown";

/// 群組彙總結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GroupSummary {
    pub metrics: OeeMetrics,
    pub record_count: usize,
}

/// 單一班次 OEE
#[derive(Debug, Clone, Serialize)]
pub struct ShiftOee {
    pub shift_id: String,
    pub shift_name: String,
    pub metrics: OeeMetrics,
    pub record_count: usize,
    /// 分攤到此班次記錄的停機分鐘
    pub stoppage_minutes: Decimal,
    /// 此班次登錄的全部停機分鐘（含孤立事件）
    pub reported_stoppage_minutes: Decimal,
    pub target_oee: Decimal,
    /// 有資料且 OEE 低於目標
    pub below_target: bool,
    pub level: OeeLevel,
}

/// 班次儀表板
#[derive(Debug, Clone, Serialize)]
pub struct ShiftDashboard {
    pub by_shift: Vec<ShiftOee>,
    /// 依記錄數加權的總體數值
    pub general: OeeMetrics,
    pub general_level: OeeLevel,
    pub warnings: Vec<OeeWarning>,
}

/// 單一設備段 OEE
#[derive(Debug, Clone, Serialize)]
pub struct SegmentOee {
    pub equipment_id: String,
    pub name: String,
    pub metrics: OeeMetrics,
    pub record_count: usize,
    pub total_produced: Decimal,
    pub level: OeeLevel,
}

/// 維度彙總器
pub struct Aggregator;

impl Aggregator {
    /// 群組平均
    ///
    /// 每筆記錄權重相同，與產量無關。空群組回傳全零。
    pub fn mean<'a, I>(records: I, mode: GroupOeeMode) -> GroupSummary
    where
        I: IntoIterator<Item = &'a ScoredRecord>,
    {
        let mut sum = OeeMetrics::zero();
        let mut count = 0usize;

        for scored in records {
            sum.availability += scored.metrics.availability;
            sum.performance += scored.metrics.performance;
            sum.quality += scored.metrics.quality;
            sum.oee += scored.metrics.oee;
            count += 1;
        }

        if count == 0 {
            return GroupSummary::default();
        }

        let n = Decimal::from(count);
        let availability = sum.availability / n;
        let performance = sum.performance / n;
        let quality = sum.quality / n;

        let metrics = match mode {
            GroupOeeMode::MeanOfRecords => OeeMetrics {
                availability,
                performance,
                quality,
                oee: sum.oee / n,
            },
            GroupOeeMode::ProductOfMeans => OeeMetrics::compose(availability, performance, quality),
        };

        GroupSummary {
            metrics,
            record_count: count,
        }
    }

    /// 依記錄數加權平均（記錄數為 0 的群組略過）
    pub fn weighted(groups: &[(OeeMetrics, usize)]) -> OeeMetrics {
        let total: usize = groups.iter().map(|(_, count)| *count).sum();
        if total == 0 {
            return OeeMetrics::zero();
        }

        let mut sum = OeeMetrics::zero();
        for (metrics, count) in groups.iter().filter(|(_, count)| *count > 0) {
            let weight = Decimal::from(*count);
            sum.availability += metrics.availability * weight;
            sum.performance += metrics.performance * weight;
            sum.quality += metrics.quality * weight;
            sum.oee += metrics.oee * weight;
        }

        let n = Decimal::from(total);
        OeeMetrics {
            availability: sum.availability / n,
            performance: sum.performance / n,
            quality: sum.quality / n,
            oee: sum.oee / n,
        }
    }

    /// 依班次彙總
    ///
    /// 每個參考班次都有一列（無資料時為零）；記錄引用的未知班次附加在最後，名稱使用其 id。
    /// `stoppages` 只用於登錄停機總分鐘，不影響指標。
    pub fn by_shift(
        scored: &[ScoredRecord],
        stoppages: &[StoppageEvent],
        shifts: &[Shift],
        config: &EngineConfig,
    ) -> Vec<ShiftOee> {
        let mut reported: BTreeMap<&str, Decimal> = BTreeMap::new();
        for stoppage in stoppages {
            *reported.entry(stoppage.shift_id.as_str()).or_default() += stoppage.duration_minutes;
        }
        let reported_for = |shift_id: &str| reported.get(shift_id).copied().unwrap_or_default();

        let mut grouped: BTreeMap<&str, Vec<&ScoredRecord>> = BTreeMap::new();
        for record in scored {
            grouped
                .entry(record.record.shift_id.as_str())
                .or_default()
                .push(record);
        }

        let mut rows: Vec<ShiftOee> = shifts
            .iter()
            .map(|shift| {
                let records = grouped.remove(shift.id.as_str()).unwrap_or_default();
                let mut row = Self::shift_row(
                    &shift.id,
                    &shift.name,
                    &records,
                    shift.target_or(config.default_target_oee),
                    config.group_oee_mode,
                );
                row.reported_stoppage_minutes = reported_for(&shift.id);
                row
            })
            .collect();

        for (shift_id, records) in grouped {
            tracing::debug!("記錄引用未知班次: {}", shift_id);
            let mut row = Self::shift_row(
                shift_id,
                shift_id,
                &records,
                config.default_target_oee,
                config.group_oee_mode,
            );
            row.reported_stoppage_minutes = reported_for(shift_id);
            rows.push(row);
        }

        rows
    }

    /// 由班次列計算總體數值
    pub fn general_from_shifts(rows: &[ShiftOee]) -> OeeMetrics {
        let groups: Vec<(OeeMetrics, usize)> = rows
            .iter()
            .map(|row| (row.metrics, row.record_count))
            .collect();
        Self::weighted(&groups)
    }

    /// 依設備段彙總，依 OEE 由高到低排序
    pub fn by_segment(
        scored: &[ScoredRecord],
        segments: &[EquipmentSegment],
        mode: GroupOeeMode,
    ) -> Vec<SegmentOee> {
        let mut grouped: BTreeMap<&str, Vec<&ScoredRecord>> = BTreeMap::new();
        for record in scored {
            grouped
                .entry(record.record.equipment_id.as_str())
                .or_default()
                .push(record);
        }

        let mut rows: Vec<SegmentOee> = grouped
            .into_iter()
            .map(|(equipment_id, records)| {
                let summary = Self::mean(records.iter().copied(), mode);
                SegmentOee {
                    equipment_id: equipment_id.to_string(),
                    name: segment_name(segments, equipment_id),
                    metrics: summary.metrics,
                    record_count: summary.record_count,
                    total_produced: records.iter().map(|r| r.record.total_produced).sum(),
                    level: LevelClassifier::classify(summary.metrics.oee),
                }
            })
            .collect();

        // 穩定排序：同分時保留 id 順序
        rows.sort_by(|a, b| b.metrics.oee.cmp(&a.metrics.oee));
        rows
    }

    fn shift_row(
        shift_id: &str,
        shift_name: &str,
        records: &[&ScoredRecord],
        target_oee: Decimal,
        mode: GroupOeeMode,
    ) -> ShiftOee {
        let summary = Self::mean(records.iter().copied(), mode);
        ShiftOee {
            shift_id: shift_id.to_string(),
            shift_name: shift_name.to_string(),
            metrics: summary.metrics,
            record_count: summary.record_count,
            stoppage_minutes: records.iter().map(|r| r.allocation.stoppage_minutes).sum(),
            reported_stoppage_minutes: Decimal::ZERO,
            target_oee,
            below_target: summary.record_count > 0 && summary.metrics.oee < target_oee,
            level: LevelClassifier::classify(summary.metrics.oee),
        }
    }
}

/// 設備段顯示名稱
pub(crate) fn segment_name(segments: &[EquipmentSegment], equipment_id: &str) -> String {
    segments
        .iter()
        .find(|segment| segment.id == equipment_id)
        .map(|segment| segment.name.clone())
        .unwrap_or_else(|| UNKNOWN_SEGMENT_NAME.to_string())
}
