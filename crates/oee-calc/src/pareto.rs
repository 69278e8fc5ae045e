//! 柏拉圖分析（停機原因/封鎖品）

use oee_core::{BlockedProductEvent, StoppageEvent};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 未填寫原因時的顯示名稱
pub const UNSPECIFIED_REASON: &str = "Not specified";

/// 柏拉圖項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParetoEntry {
    pub reason: String,
    pub minutes: Decimal,
    pub event_count: usize,
    /// 佔全部停機的百分比
    pub percentage: Decimal,
    /// 累計百分比
    pub cumulative: Decimal,
}

/// 封鎖品分類統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockedBreakdown {
    pub total_quantity: Decimal,
    pub event_count: usize,
    /// 依去向，數量由高到低
    pub by_destination: Vec<(String, Decimal)>,
    /// 依原因，數量由高到低
    pub by_reason: Vec<(String, Decimal)>,
}

/// 柏拉圖計算器
pub struct ParetoCalculator;

impl ParetoCalculator {
    /// 停機原因柏拉圖
    ///
    /// 百分比以所有原因的總分鐘為分母，因此取前 N 項後累計值可能小於 100。
    pub fn stoppages(stoppages: &[StoppageEvent], top_n: usize) -> Vec<ParetoEntry> {
        let mut grouped: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
        for stoppage in stoppages {
            let entry = grouped.entry(reason_key(&stoppage.reason)).or_default();
            entry.0 += stoppage.duration_minutes;
            entry.1 += 1;
        }

        let total: Decimal = grouped.values().map(|(minutes, _)| *minutes).sum();

        let mut ranked: Vec<(String, Decimal, usize)> = grouped
            .into_iter()
            .map(|(reason, (minutes, count))| (reason, minutes, count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let mut cumulative = Decimal::ZERO;
        ranked
            .into_iter()
            .take(top_n)
            .map(|(reason, minutes, event_count)| {
                let percentage = share(minutes, total);
                cumulative += percentage;
                ParetoEntry {
                    reason,
                    minutes,
                    event_count,
                    percentage,
                    cumulative,
                }
            })
            .collect()
    }

    /// 封鎖品依去向與原因分類
    pub fn blocked(blocked: &[BlockedProductEvent]) -> BlockedBreakdown {
        let mut by_destination: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut by_reason: BTreeMap<String, Decimal> = BTreeMap::new();

        for event in blocked {
            *by_destination
                .entry(reason_key(&event.destination))
                .or_default() += event.quantity;
            *by_reason.entry(reason_key(&event.reason)).or_default() += event.quantity;
        }

        BlockedBreakdown {
            total_quantity: blocked.iter().map(|e| e.quantity).sum(),
            event_count: blocked.len(),
            by_destination: ranked(by_destination),
            by_reason: ranked(by_reason),
        }
    }
}

fn reason_key(reason: &str) -> String {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        UNSPECIFIED_REASON.to_string()
    } else {
        trimmed.to_string()
    }
}

fn share(part: Decimal, total: Decimal) -> Decimal {
    if total <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        part / total * Decimal::ONE_HUNDRED
    }
}

fn ranked(totals: BTreeMap<String, Decimal>) -> Vec<(String, Decimal)> {
    let mut rows: Vec<(String, Decimal)> = totals.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}
