//! 班次 OEE 儀表板示例

use chrono::{NaiveDate, NaiveTime};
use oee::model::{round_display, StoppageCategory};
use oee::{
    BlockedProductEvent, EngineConfig, EquipmentSegment, OeeCalculator, ProductionRecord, Shift,
    Snapshot, StoppageEvent,
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== 班次 OEE 儀表板示例 ===\n");

    let date = NaiveDate::from_ymd_opt(2025, 10, 14)
        .ok_or_else(|| anyhow::anyhow!("無效日期"))?;

    let shifts = vec![
        Shift::new(
            "T1".to_string(),
            "Morning".to_string(),
            NaiveTime::from_hms_opt(6, 0, 0).ok_or_else(|| anyhow::anyhow!("無效時間"))?,
            NaiveTime::from_hms_opt(14, 0, 0).ok_or_else(|| anyhow::anyhow!("無效時間"))?,
        )
        .with_target_oee(Decimal::from(80)),
        Shift::new(
            "T2".to_string(),
            "Afternoon".to_string(),
            NaiveTime::from_hms_opt(14, 0, 0).ok_or_else(|| anyhow::anyhow!("無效時間"))?,
            NaiveTime::from_hms_opt(22, 0, 0).ok_or_else(|| anyhow::anyhow!("無效時間"))?,
        ),
        Shift::new(
            "T3".to_string(),
            "Night".to_string(),
            NaiveTime::from_hms_opt(22, 0, 0).ok_or_else(|| anyhow::anyhow!("無效時間"))?,
            NaiveTime::from_hms_opt(6, 0, 0).ok_or_else(|| anyhow::anyhow!("無效時間"))?,
        ),
    ];

    let segments = vec![
        EquipmentSegment::new(
            "L1".to_string(),
            "Filling Line".to_string(),
            "FL-01".to_string(),
            Decimal::from(120),
        ),
        EquipmentSegment::new(
            "L2".to_string(),
            "Packing Line".to_string(),
            "PK-01".to_string(),
            Decimal::from(90),
        ),
    ];

    let records = vec![
        ProductionRecord::new(date, "L1".into(), "T1".into(), Decimal::from(480), Decimal::from(900))
            .with_target_output(Decimal::from(960))
            .with_defects(Decimal::from(12)),
        ProductionRecord::new(date, "L2".into(), "T1".into(), Decimal::from(480), Decimal::from(610))
            .with_target_output(Decimal::from(720))
            .with_defects(Decimal::from(4)),
        ProductionRecord::new(date, "L1".into(), "T2".into(), Decimal::from(480), Decimal::from(700))
            .with_cycle_times_from_capacity(Decimal::from(120))
            .with_defects(Decimal::from(30)),
    ];

    let stoppages = vec![
        StoppageEvent::new(date, "T1".into(), "L1".into(), Decimal::from(35), "Jam".into()),
        StoppageEvent::new(date, "T2".into(), "L1".into(), Decimal::from(50), "Changeover".into())
            .with_category(StoppageCategory::Setup),
        StoppageEvent::new(date, "T3".into(), "L2".into(), Decimal::from(20), String::new()),
    ];

    let blocked = vec![BlockedProductEvent::new(
        date,
        "T2".into(),
        "L1".into(),
        Decimal::from(15),
        "Seal failure".into(),
        "rework".into(),
    )
    .with_lot("LOT-2025-1014".into())];

    let snapshot = Snapshot::new()
        .with_records(records)
        .with_stoppages(stoppages)
        .with_blocked(blocked)
        .with_shifts(shifts)
        .with_segments(segments);

    let calculator = OeeCalculator::try_new(EngineConfig::default())?;
    tracing::info!(
        "示例資料：{} 個班次，{} 個設備段",
        snapshot.shifts.len(),
        snapshot.segments.len()
    );
    let dashboard = calculator.shift_dashboard(&snapshot);

    println!("班次彙總:");
    for row in &dashboard.by_shift {
        let metrics = row.metrics.rounded();
        println!(
            "  - {}: OEE {}% (A {}%, P {}%, Q {}%), 記錄 {} 筆, 停機 {}/{} 分鐘, 目標 {}%{}",
            row.shift_name,
            metrics.oee,
            metrics.availability,
            metrics.performance,
            metrics.quality,
            row.record_count,
            round_display(row.stoppage_minutes),
            round_display(row.reported_stoppage_minutes),
            row.target_oee,
            if row.below_target { " ⚠" } else { "" }
        );
    }
    println!(
        "\n總體 OEE: {}% ({})",
        round_display(dashboard.general.oee),
        dashboard.general_level.as_str()
    );

    for warning in &dashboard.warnings {
        println!("警告 [{}]: {}", warning.subject, warning.message);
    }

    println!("\n設備段排名:");
    for row in calculator.segment_ranking(&snapshot) {
        println!(
            "  - {} ({}): OEE {}%, 產量 {}",
            row.name,
            row.level.as_str(),
            round_display(row.metrics.oee),
            row.total_produced
        );
    }

    println!("\n停機柏拉圖:");
    for entry in calculator.stoppage_pareto(&snapshot) {
        println!(
            "  - {}: {} 分鐘 ({}%, 累計 {}%)",
            entry.reason,
            entry.minutes,
            round_display(entry.percentage),
            round_display(entry.cumulative)
        );
    }

    println!("\nJSON:");
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    Ok(())
}
