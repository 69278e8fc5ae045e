//! 週/月/年期間儀表板示例

use chrono::{Duration, NaiveDate, NaiveTime};
use oee::model::{round_display, PeriodKind, RecordFilter};
use oee::{EngineConfig, EquipmentSegment, OeeCalculator, ProductionRecord, Shift, Snapshot, StoppageEvent};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== 期間 OEE 儀表板示例 ===\n");

    let today = NaiveDate::from_ymd_opt(2025, 10, 15).ok_or_else(|| anyhow::anyhow!("無效日期"))?;
    let six = NaiveTime::from_hms_opt(6, 0, 0).ok_or_else(|| anyhow::anyhow!("無效時間"))?;
    let eighteen = NaiveTime::from_hms_opt(18, 0, 0).ok_or_else(|| anyhow::anyhow!("無效時間"))?;

    // 過去 400 天，每天兩條產線各一筆
    let mut records = Vec::new();
    let mut stoppages = Vec::new();
    for offset in 0..400i64 {
        let date = today - Duration::days(offset);
        for (line, base) in [("L1", 900i64), ("L2", 700i64)] {
            let produced = base + (offset % 7) * 15;
            records.push(
                ProductionRecord::new(date, line.into(), "D".into(), Decimal::from(720), Decimal::from(produced))
                    .with_target_output(Decimal::from(1_000))
                    .with_defects(Decimal::from(offset % 11)),
            );
            if offset % 3 == 0 {
                stoppages.push(StoppageEvent::new(
                    date,
                    "D".into(),
                    line.into(),
                    Decimal::from(20 + offset % 40),
                    "Micro stop".into(),
                ));
            }
        }
    }

    let source = Snapshot::new()
        .with_records(records)
        .with_stoppages(stoppages)
        .with_shifts(vec![Shift::new("D".into(), "Day".into(), six, eighteen)])
        .with_segments(vec![
            EquipmentSegment::new("L1".into(), "Press".into(), "PR-01".into(), Decimal::from(85)),
            EquipmentSegment::new("L2".into(), "Oven".into(), "OV-01".into(), Decimal::from(60)),
        ]);

    let config = EngineConfig::from_json_str(r#"{ "week_start": "monday", "months": 6 }"#)?;
    let calculator = OeeCalculator::try_new(config)?;

    let from = today - Duration::days(730);
    let snapshot = calculator.load(&source, &RecordFilter::between(from, today))?;
    tracing::info!("載入 {} ~ {} 共 {} 筆生產記錄", from, today, snapshot.records.len());
    let dashboard = calculator.period_dashboard(&snapshot, today)?;

    for kind in [PeriodKind::Week, PeriodKind::Month, PeriodKind::Year] {
        println!("{:?}:", kind);
        for period in dashboard.general.iter().filter(|p| p.kind == kind) {
            println!(
                "  {:<14} {} ~ {}  OEE {}%  ({} 筆)",
                period.label,
                period.start,
                period.end,
                round_display(period.metrics.oee),
                period.record_count
            );
        }
        if let Some(summary) = dashboard.summary(kind) {
            println!(
                "  平均 {}%，最高 {}%，最低 {}%，趨勢 {:?}",
                round_display(summary.stats.mean),
                round_display(summary.stats.max),
                round_display(summary.stats.min),
                summary.stats.trend
            );
        }
    }

    println!("\n設備段:");
    for segment in &dashboard.segments {
        println!("  - {}: 平均 OEE {}%", segment.name, round_display(segment.mean_oee));
        for summary in &segment.summaries {
            println!(
                "      {:?}: 平均 {}%，趨勢 {:?}",
                summary.kind,
                round_display(summary.stats.mean),
                summary.stats.trend
            );
        }
    }

    let history = calculator.history(&snapshot, today, 30)?;
    println!(
        "\n近 30 天：最佳班次 {:?}，最差班次 {:?}",
        history.best_shift, history.worst_shift
    );

    println!("\n{}", serde_json::to_string_pretty(&calculator.stoppage_trend(&snapshot))?);

    Ok(())
}
