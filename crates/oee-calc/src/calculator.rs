//! OEE 主計算器

use chrono::NaiveDate;
use oee_core::{EngineConfig, OeeError, PeriodCalendar, RecordFilter, RecordSource, Snapshot};
use serde::Serialize;

use crate::aggregation::{Aggregator, SegmentOee, ShiftDashboard};
use crate::allocation::{AllocationResolver, OrphanReport};
use crate::bucketing::DateBucketing;
use crate::history::{DailyQuality, DailySeries, DailyStoppage, OeeHistory};
use crate::level::LevelClassifier;
use crate::metrics::{MetricCalculator, ScoredRecord};
use crate::pareto::{BlockedBreakdown, ParetoCalculator, ParetoEntry};
use crate::periods::{PeriodAggregator, PeriodDashboard};
use crate::OeeWarning;

/// 評分後的快照
#[derive(Debug, Clone, Serialize)]
pub struct ScoredSnapshot {
    /// 與輸入記錄順序一致
    pub scored: Vec<ScoredRecord>,
    pub orphans: OrphanReport,
    pub warnings: Vec<OeeWarning>,
    pub calculation_time_ms: Option<u64>,
}

/// OEE 計算器
///
/// 每次呼叫都只依賴傳入的快照，不保留任何狀態。
pub struct OeeCalculator {
    config: EngineConfig,
}

impl OeeCalculator {
    /// 創建新的 OEE 計算器
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// 驗證配置後創建
    pub fn try_new(config: EngineConfig) -> oee_core::Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 從資料來源載入快照
    pub fn load<S: RecordSource + ?Sized>(
        &self,
        source: &S,
        filter: &RecordFilter,
    ) -> oee_core::Result<Snapshot> {
        let snapshot = Snapshot::load(source, filter)?;
        tracing::debug!(
            "載入快照：生產 {} 筆，停機 {} 筆，封鎖 {} 筆",
            snapshot.records.len(),
            snapshot.stoppages.len(),
            snapshot.blocked.len()
        );
        Ok(snapshot)
    }

    /// 分攤事件並為每筆記錄評分
    pub fn score_snapshot(&self, snapshot: &Snapshot) -> ScoredSnapshot {
        tracing::info!(
            "開始 OEE 計算：生產 {} 筆，停機 {} 筆，封鎖 {} 筆",
            snapshot.records.len(),
            snapshot.stoppages.len(),
            snapshot.blocked.len()
        );

        let start_time = std::time::Instant::now();

        // Step 1: 事件分攤
        tracing::debug!("Step 1: 事件分攤 ({:?})", self.config.allocation_scope);
        let allocation = AllocationResolver::resolve(
            &snapshot.records,
            &snapshot.stoppages,
            &snapshot.blocked,
            self.config.allocation_scope,
        );

        // Step 2: 單筆評分
        tracing::debug!("Step 2: 單筆評分 ({:?})", self.config.performance_strategy);
        let scored = MetricCalculator::score_all(&snapshot.records, &allocation, &self.config);

        // Step 3: 孤立事件
        let mut warnings = Vec::new();
        let orphans = allocation.orphans;
        if !orphans.stoppage_events.is_empty() {
            tracing::warn!(
                "{} 筆停機事件找不到對應生產記錄，共 {} 分鐘",
                orphans.stoppage_events.len(),
                orphans.stoppage_minutes
            );
            warnings.push(OeeWarning::warning(
                "stoppage".to_string(),
                format!(
                    "{} stoppage events ({} min) have no matching production record",
                    orphans.stoppage_events.len(),
                    orphans.stoppage_minutes
                ),
            ));
        }
        if !orphans.blocked_events.is_empty() {
            tracing::warn!(
                "{} 筆封鎖事件找不到對應生產記錄，共 {} 件",
                orphans.blocked_events.len(),
                orphans.blocked_quantity
            );
            warnings.push(OeeWarning::warning(
                "blocked".to_string(),
                format!(
                    "{} blocked-product events ({} units) have no matching production record",
                    orphans.blocked_events.len(),
                    orphans.blocked_quantity
                ),
            ));
        }
        if snapshot.records.is_empty() {
            warnings.push(OeeWarning::info(
                "production".to_string(),
                "no production records in snapshot".to_string(),
            ));
        }

        let elapsed = start_time.elapsed().as_millis() as u64;
        tracing::info!("OEE 計算完成，耗時 {} ms", elapsed);

        ScoredSnapshot {
            scored,
            orphans,
            warnings,
            calculation_time_ms: Some(elapsed),
        }
    }

    /// 班次儀表板
    pub fn shift_dashboard(&self, snapshot: &Snapshot) -> ShiftDashboard {
        let scored = self.score_snapshot(snapshot);
        let by_shift = Aggregator::by_shift(
            &scored.scored,
            &snapshot.stoppages,
            &snapshot.shifts,
            &self.config,
        );
        let general = Aggregator::general_from_shifts(&by_shift);

        ShiftDashboard {
            by_shift,
            general,
            general_level: LevelClassifier::classify(general.oee),
            warnings: scored.warnings,
        }
    }

    /// 設備段排名
    pub fn segment_ranking(&self, snapshot: &Snapshot) -> Vec<SegmentOee> {
        let scored = self.score_snapshot(snapshot);
        Aggregator::by_segment(&scored.scored, &snapshot.segments, self.config.group_oee_mode)
    }

    /// 週/月/年期間儀表板
    pub fn period_dashboard(
        &self,
        snapshot: &Snapshot,
        today: NaiveDate,
    ) -> oee_core::Result<PeriodDashboard> {
        let windows = PeriodCalendar::from_config(&self.config).build(today)?;
        let scored = self.score_snapshot(snapshot);

        Ok(PeriodAggregator::aggregate(
            &scored.scored,
            &windows,
            &snapshot.segments,
            &self.config,
        ))
    }

    /// [today - days, today] 的每日歷史（含兩端）
    pub fn history(
        &self,
        snapshot: &Snapshot,
        today: NaiveDate,
        days: u32,
    ) -> oee_core::Result<OeeHistory> {
        let from = DateBucketing::lookback_start(today, days)
            .ok_or_else(|| OeeError::InvalidDate(format!("{} 往前 {} 天", today, days)))?;
        let scored = self.score_snapshot(snapshot);

        Ok(OeeHistory::build(
            &scored.scored,
            &snapshot.shifts,
            from,
            today,
            &self.config,
        ))
    }

    /// 停機原因柏拉圖
    pub fn stoppage_pareto(&self, snapshot: &Snapshot) -> Vec<ParetoEntry> {
        ParetoCalculator::stoppages(&snapshot.stoppages, self.config.pareto_top_n)
    }

    pub fn blocked_breakdown(&self, snapshot: &Snapshot) -> BlockedBreakdown {
        ParetoCalculator::blocked(&snapshot.blocked)
    }

    pub fn stoppage_trend(&self, snapshot: &Snapshot) -> Vec<DailyStoppage> {
        DailySeries::stoppages(&snapshot.stoppages)
    }

    pub fn quality_trend(&self, snapshot: &Snapshot) -> Vec<DailyQuality> {
        DailySeries::quality(&snapshot.records, &snapshot.blocked)
    }
}

impl Default for OeeCalculator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::OeeLevel;
    use chrono::NaiveTime;
    use oee_core::{ProductionRecord, Shift, StoppageEvent};
    use rust_decimal::Decimal;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn shift(id: &str, name: &str) -> Shift {
        Shift::new(
            id.to_string(),
            name.to_string(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        )
    }

    fn reference_snapshot() -> Snapshot {
        let record = ProductionRecord::new(
            date(14),
            "L1".to_string(),
            "A".to_string(),
            Decimal::from(720),
            Decimal::from(95),
        )
        .with_target_output(Decimal::from(100))
        .with_defects(Decimal::from(5));

        let stoppage = StoppageEvent::new(
            date(14),
            "A".to_string(),
            "L1".to_string(),
            Decimal::from(60),
            "Jam".to_string(),
        );

        Snapshot::new()
            .with_records(vec![record])
            .with_stoppages(vec![stoppage])
            .with_shifts(vec![shift("A", "Morning"), shift("B", "Night")])
    }

    #[test]
    fn test_score_snapshot() {
        let calculator = OeeCalculator::with_defaults();

        let result = calculator.score_snapshot(&reference_snapshot());

        assert_eq!(result.scored.len(), 1);
        assert!(result.orphans.is_empty());
        assert!(result.warnings.is_empty());

        let rounded = result.scored[0].metrics.rounded();
        assert_eq!(rounded.availability, Decimal::new(917, 1));
        assert_eq!(rounded.performance, Decimal::new(950, 1));
        assert_eq!(rounded.quality, Decimal::new(947, 1));
        assert_eq!(rounded.oee, Decimal::new(825, 1));
        assert_eq!(LevelClassifier::classify(rounded.oee), OeeLevel::Good);
    }

    #[test]
    fn test_orphan_warning() {
        let calculator = OeeCalculator::with_defaults();
        let snapshot = reference_snapshot().with_stoppages(vec![StoppageEvent::new(
            date(14),
            "B".to_string(),
            "L1".to_string(),
            Decimal::from(15),
            "Jam".to_string(),
        )]);

        let result = calculator.score_snapshot(&snapshot);

        assert_eq!(result.orphans.stoppage_minutes, Decimal::from(15));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.scored[0].allocation.stoppage_minutes, Decimal::ZERO);

        // 孤立停機仍計入所屬班次的登錄分鐘
        let dashboard = calculator.shift_dashboard(&snapshot);
        assert_eq!(dashboard.by_shift[1].stoppage_minutes, Decimal::ZERO);
        assert_eq!(dashboard.by_shift[1].reported_stoppage_minutes, Decimal::from(15));
    }

    #[test]
    fn test_shift_dashboard() {
        let calculator = OeeCalculator::with_defaults();

        let dashboard = calculator.shift_dashboard(&reference_snapshot());

        assert_eq!(dashboard.by_shift.len(), 2);
        assert_eq!(dashboard.by_shift[0].stoppage_minutes, Decimal::from(60));
        assert_eq!(dashboard.by_shift[0].reported_stoppage_minutes, Decimal::from(60));
        assert!(dashboard.by_shift[0].below_target);
        assert_eq!(dashboard.by_shift[1].record_count, 0);
        assert_eq!(dashboard.general, dashboard.by_shift[0].metrics);
    }

    #[test]
    fn test_period_dashboard_and_history() {
        let calculator = OeeCalculator::with_defaults();
        let snapshot = reference_snapshot();

        let periods = calculator.period_dashboard(&snapshot, date(15)).unwrap();
        assert_eq!(periods.window("Current Week").unwrap().record_count, 1);
        assert_eq!(periods.segments.len(), 1);

        let history = calculator.history(&snapshot, date(15), 30).unwrap();
        assert_eq!(history.from, NaiveDate::from_ymd_opt(2025, 9, 15).unwrap());
        assert_eq!(history.general.len(), 1);
        assert_eq!(history.best_shift.as_deref(), Some("Morning"));
    }

    #[test]
    fn test_history_includes_first_day_of_lookback() {
        let calculator = OeeCalculator::with_defaults();
        let first_day = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        let before = NaiveDate::from_ymd_opt(2025, 9, 14).unwrap();
        let snapshot = reference_snapshot().with_records(vec![
            ProductionRecord::new(first_day, "L1".into(), "A".into(), Decimal::from(480), Decimal::from(50)),
            ProductionRecord::new(before, "L1".into(), "A".into(), Decimal::from(480), Decimal::from(50)),
        ]);

        let history = calculator.history(&snapshot, date(15), 30).unwrap();

        assert_eq!(history.general.len(), 1);
        assert_eq!(history.general[0].date, first_day);
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let config = EngineConfig::default().with_window_counts(0, 12, 2);
        assert!(OeeCalculator::try_new(config).is_err());
    }

    #[test]
    fn test_load_from_source() {
        let calculator = OeeCalculator::with_defaults();
        let source = reference_snapshot();

        let snapshot = calculator
            .load(&source, &RecordFilter::between(date(1), date(10)))
            .unwrap();

        assert!(snapshot.records.is_empty());
        assert_eq!(snapshot.shifts.len(), 2);
    }
}
