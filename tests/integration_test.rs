//! 集成測試

use chrono::{NaiveDate, NaiveTime};
use oee::calc::{
    AllocationResolver, Aggregator, LevelClassifier, MetricCalculator, OeeLevel, TrendClassifier,
    TrendDirection,
};
use oee::model::{AllocationScope, PerformanceStrategy, QualityStrategy, TrendConfig};
use oee::{
    BlockedProductEvent, EngineConfig, EquipmentSegment, OeeCalculator, OeeError, OeeMetrics,
    ProductionRecord, Shift, Snapshot, StoppageEvent,
};
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn shift(id: &str, name: &str) -> Shift {
    Shift::new(
        id.to_string(),
        name.to_string(),
        NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
    )
}

fn record(on: NaiveDate, equipment: &str, shift_id: &str, produced: i64) -> ProductionRecord {
    ProductionRecord::new(
        on,
        equipment.to_string(),
        shift_id.to_string(),
        Decimal::from(480),
        Decimal::from(produced),
    )
    .with_target_output(Decimal::from(100))
}

#[test]
fn test_reference_shift_scenario() {
    // 計劃 720 分鐘、停機 60 分鐘、目標 100、產出 95、不良 5
    let on = date(2025, 10, 14);
    let snapshot = Snapshot::new()
        .with_records(vec![ProductionRecord::new(
            on,
            "L1".to_string(),
            "A".to_string(),
            Decimal::from(720),
            Decimal::from(95),
        )
        .with_target_output(Decimal::from(100))
        .with_defects(Decimal::from(5))])
        .with_stoppages(vec![StoppageEvent::new(
            on,
            "A".to_string(),
            "L1".to_string(),
            Decimal::from(60),
            "Jam".to_string(),
        )])
        .with_shifts(vec![shift("A", "Morning")]);

    let calculator = OeeCalculator::with_defaults();
    let result = calculator.score_snapshot(&snapshot);
    let metrics = result.scored[0].metrics.rounded();

    assert_eq!(metrics.availability, Decimal::new(917, 1));
    assert_eq!(metrics.performance, Decimal::new(950, 1));
    assert_eq!(metrics.quality, Decimal::new(947, 1));
    assert_eq!(metrics.oee, Decimal::new(825, 1));
    assert_eq!(LevelClassifier::classify(metrics.oee), OeeLevel::Good);
}

#[test]
fn test_weighted_general_across_shifts() {
    // 班次 A：3 筆，OEE 90；班次 B：7 筆，OEE 70
    let on = date(2025, 10, 14);
    let mut records = Vec::new();
    for i in 0..3 {
        records.push(record(on, &format!("A{}", i), "A", 90));
    }
    for i in 0..7 {
        records.push(record(on, &format!("B{}", i), "B", 70));
    }
    let snapshot = Snapshot::new()
        .with_records(records)
        .with_shifts(vec![shift("A", "Morning"), shift("B", "Night")]);

    let dashboard = OeeCalculator::with_defaults().shift_dashboard(&snapshot);

    assert_eq!(dashboard.by_shift[0].metrics.oee, Decimal::from(90));
    assert_eq!(dashboard.by_shift[1].metrics.oee, Decimal::from(70));
    assert_eq!(dashboard.general.oee, Decimal::from(76));
    assert_eq!(dashboard.general_level, OeeLevel::Good);
}

#[test]
fn test_shift_target_is_reread_per_snapshot() {
    let on = date(2025, 10, 14);
    let records = vec![record(on, "L1", "A", 80)];
    let calculator = OeeCalculator::with_defaults();

    let before = calculator.shift_dashboard(
        &Snapshot::new()
            .with_records(records.clone())
            .with_shifts(vec![shift("A", "Morning")]),
    );
    let after = calculator.shift_dashboard(
        &Snapshot::new()
            .with_records(records)
            .with_shifts(vec![shift("A", "Morning").with_target_oee(Decimal::from(75))]),
    );

    assert!(before.by_shift[0].below_target);
    assert!(!after.by_shift[0].below_target);
}

#[test]
fn test_proportional_allocation_across_group() {
    let on = date(2025, 10, 14);
    let records = vec![record(on, "L1", "A", 100), record(on, "L1", "A", 100)];
    let linked_id = records[1].id;
    let stoppages = vec![
        StoppageEvent::new(on, "A".into(), "L1".into(), Decimal::from(60), "Jam".into()),
        StoppageEvent::new(on, "A".into(), "L1".into(), Decimal::from(48), "Tooling".into())
            .linked_to(linked_id),
    ];

    let result =
        AllocationResolver::resolve(&records, &stoppages, &[], AllocationScope::DateShiftEquipment);

    assert_eq!(result.get(&records[0].id).stoppage_minutes, Decimal::from(30));
    assert_eq!(result.get(&linked_id).stoppage_minutes, Decimal::from(78));
    assert_eq!(result.total_stoppage_minutes(), Decimal::from(108));
    assert!(result.orphans.is_empty());
}

#[test]
fn test_period_and_segment_views() {
    let today = date(2025, 10, 15);
    let snapshot = Snapshot::new()
        .with_records(vec![
            record(date(2025, 10, 14), "L1", "A", 90),
            record(date(2025, 10, 14), "L2", "A", 60),
            record(date(2025, 9, 2), "L1", "A", 70),
            record(date(2024, 6, 1), "L2", "A", 50),
        ])
        .with_shifts(vec![shift("A", "Morning")])
        .with_segments(vec![EquipmentSegment::new(
            "L1".into(),
            "Press".into(),
            "PR-01".into(),
            Decimal::from(100),
        )]);

    let calculator = OeeCalculator::with_defaults();

    let ranking = calculator.segment_ranking(&snapshot);
    assert_eq!(ranking[0].name, "Press");
    assert_eq!(ranking[1].name, "Unknown");

    let periods = calculator.period_dashboard(&snapshot, today).unwrap();
    assert_eq!(periods.general.len(), 4 + 12 + 2);
    assert_eq!(periods.window("Current Week").unwrap().record_count, 2);
    assert_eq!(periods.window("Month -1").unwrap().record_count, 1);
    assert_eq!(periods.window("Year -1").unwrap().record_count, 1);

    let labels: Vec<&str> = periods.general.iter().map(|p| p.label.as_str()).collect();
    for segment in &periods.segments {
        let segment_labels: Vec<&str> = segment.periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(segment_labels, labels);
    }
}

#[test]
fn test_supplemented_analyses() {
    let on = date(2025, 10, 14);
    let snapshot = Snapshot::new()
        .with_records(vec![record(on, "L1", "A", 100).with_defects(Decimal::from(10))])
        .with_stoppages(vec![
            StoppageEvent::new(on, "A".into(), "L1".into(), Decimal::from(90), "Jam".into()),
            StoppageEvent::new(on, "A".into(), "L1".into(), Decimal::from(30), " ".into()),
        ])
        .with_blocked(vec![BlockedProductEvent::new(
            on,
            "A".into(),
            "L1".into(),
            Decimal::from(20),
            "Seal".into(),
            "quarantine".into(),
        )]);

    let calculator = OeeCalculator::with_defaults();

    let pareto = calculator.stoppage_pareto(&snapshot);
    assert_eq!(pareto[0].reason, "Jam");
    assert_eq!(pareto[0].percentage, Decimal::from(75));
    assert_eq!(pareto[1].reason, "Not specified");

    let stoppage_trend = calculator.stoppage_trend(&snapshot);
    assert_eq!(stoppage_trend[0].hours, Decimal::from(2));

    let quality_trend = calculator.quality_trend(&snapshot);
    assert_eq!(quality_trend[0].quality, Decimal::from(70));

    let breakdown = calculator.blocked_breakdown(&snapshot);
    assert_eq!(breakdown.by_destination[0].0, "quarantine");
}

#[test]
fn test_empty_snapshot_yields_zero_results() {
    let calculator = OeeCalculator::with_defaults();
    let snapshot = Snapshot::new().with_shifts(vec![shift("A", "Morning")]);

    let dashboard = calculator.shift_dashboard(&snapshot);
    assert!(dashboard.general.is_zero());
    assert_eq!(dashboard.by_shift.len(), 1);
    assert_eq!(dashboard.general_level, OeeLevel::Critical);

    let periods = calculator.period_dashboard(&snapshot, date(2025, 10, 15)).unwrap();
    assert!(periods.general.iter().all(|p| p.metrics.is_zero()));

    assert!(calculator.segment_ranking(&snapshot).is_empty());
    assert!(calculator.stoppage_pareto(&snapshot).is_empty());
}

#[rstest]
#[case(PerformanceStrategy::TargetOutput, Decimal::from(80))]
#[case(PerformanceStrategy::CycleTime, Decimal::from(80))]
#[case(PerformanceStrategy::CycleTimeWithTargetAttainment, Decimal::from(64))]
fn test_performance_strategies(#[case] strategy: PerformanceStrategy, #[case] expected: Decimal) {
    let record = ProductionRecord::new(
        date(2025, 10, 14),
        "L1".into(),
        "A".into(),
        Decimal::from(720),
        Decimal::from(800),
    )
    .with_actual_time(Decimal::from(600))
    .with_target_output(Decimal::from(1_000))
    .with_cycle_times(Decimal::from(36), Decimal::from(45));

    assert_eq!(MetricCalculator::performance(&record, strategy), expected);
}

#[test]
fn test_quality_strategies() {
    assert_eq!(
        MetricCalculator::quality(
            Decimal::from(100),
            Decimal::from(5),
            Decimal::from(15),
            QualityStrategy::DefectsAndBlocked
        ),
        Decimal::from(80)
    );
    assert_eq!(
        MetricCalculator::quality(
            Decimal::from(100),
            Decimal::from(5),
            Decimal::from(15),
            QualityStrategy::DefectsOnly
        ),
        Decimal::from(95)
    );
}

#[test]
fn test_config_from_json() {
    let config = EngineConfig::from_json_str(
        r#"{ "performance_strategy": "cycle_time", "pareto_top_n": 5, "weeks": 8 }"#,
    )
    .unwrap();

    assert_eq!(config.performance_strategy, PerformanceStrategy::CycleTime);
    assert_eq!(config.pareto_top_n, 5);
    assert_eq!(config.weeks, 8);
    assert_eq!(config.months, 12);

    assert!(EngineConfig::from_json_str(r#"{ "years": 0 }"#).is_err());
    assert!(matches!(
        EngineConfig::from_json_str("not json"),
        Err(OeeError::ConfigParse(_))
    ));
}

fn arb_record() -> impl Strategy<Value = (ProductionRecord, Decimal, Decimal)> {
    (
        0i64..1_000,
        0i64..2_000,
        0i64..1_500,
        0i64..1_500,
        0i64..1_200,
        0i64..500,
        prop::option::of((1i64..120, 1i64..120)),
    )
        .prop_map(
            |(planned, stoppage, target, produced, defects, blocked, cycles)| {
                let mut record = ProductionRecord::new(
                    date(2025, 10, 14),
                    "L1".into(),
                    "A".into(),
                    Decimal::from(planned),
                    Decimal::from(produced),
                )
                .with_defects(Decimal::from(defects.min(produced)));
                if target > 0 {
                    record = record.with_target_output(Decimal::from(target));
                }
                if let Some((ideal, actual)) = cycles {
                    record = record.with_cycle_times(Decimal::from(ideal), Decimal::from(actual));
                }
                (record, Decimal::from(stoppage), Decimal::from(blocked))
            },
        )
}

fn arb_strategy() -> impl Strategy<Value = PerformanceStrategy> {
    prop_oneof![
        Just(PerformanceStrategy::Auto),
        Just(PerformanceStrategy::TargetOutput),
        Just(PerformanceStrategy::CycleTime),
        Just(PerformanceStrategy::CycleTimeWithTargetAttainment),
    ]
}

proptest! {
    #[test]
    fn prop_metrics_stay_in_range(
        (record, stoppage, blocked) in arb_record(),
        strategy in arb_strategy(),
    ) {
        let config = EngineConfig::default().with_performance_strategy(strategy);
        let metrics = MetricCalculator::score(&record, stoppage, blocked, &config);
        let hundred = Decimal::ONE_HUNDRED;

        for value in [metrics.availability, metrics.performance, metrics.quality, metrics.oee] {
            prop_assert!(value >= Decimal::ZERO && value <= hundred, "out of range: {}", value);
        }
    }

    #[test]
    fn prop_composition_law((record, stoppage, blocked) in arb_record()) {
        let metrics = MetricCalculator::score(&record, stoppage, blocked, &EngineConfig::default());
        prop_assert_eq!(
            metrics.oee,
            metrics.availability * metrics.performance * metrics.quality / Decimal::from(10_000)
        );
    }

    #[test]
    fn prop_zero_production_scores_zero((record, stoppage, blocked) in arb_record()) {
        let record = ProductionRecord { total_produced: Decimal::ZERO, defects: Decimal::ZERO, ..record };
        let metrics = MetricCalculator::score(&record, stoppage, blocked, &EngineConfig::default());
        prop_assert_eq!(metrics.performance, Decimal::ZERO);
        prop_assert_eq!(metrics.quality, Decimal::ZERO);
    }

    #[test]
    fn prop_allocation_conserves_minutes(durations in prop::collection::vec(1i64..240, 0..20), copies in 1usize..6) {
        let on = date(2025, 10, 14);
        let records: Vec<ProductionRecord> = (0..copies).map(|_| record(on, "L1", "A", 50)).collect();
        let stoppages: Vec<StoppageEvent> = durations
            .iter()
            .map(|m| StoppageEvent::new(on, "A".into(), "L1".into(), Decimal::from(*m), "Jam".into()))
            .collect();

        let result = AllocationResolver::resolve(&records, &stoppages, &[], AllocationScope::DateShiftEquipment);
        let expected: Decimal = durations.iter().map(|m| Decimal::from(*m)).sum();

        prop_assert_eq!(result.total_stoppage_minutes(), expected);
    }

    #[test]
    fn prop_short_series_are_stable(values in prop::collection::vec(0i64..100, 0..4)) {
        let series: Vec<Decimal> = values.into_iter().map(Decimal::from).collect();
        prop_assert_eq!(
            TrendClassifier::classify(&series, &TrendConfig::smoothed()),
            TrendDirection::Stable
        );
    }

    #[test]
    fn prop_weighted_mean_between_extremes(a in 0i64..=100, b in 0i64..=100, na in 1usize..50, nb in 1usize..50) {
        let ma = OeeMetrics { oee: Decimal::from(a), ..OeeMetrics::zero() };
        let mb = OeeMetrics { oee: Decimal::from(b), ..OeeMetrics::zero() };
        let general = Aggregator::weighted(&[(ma, na), (mb, nb)]);

        prop_assert!(general.oee >= Decimal::from(a.min(b)));
        prop_assert!(general.oee <= Decimal::from(a.max(b)));
    }
}
