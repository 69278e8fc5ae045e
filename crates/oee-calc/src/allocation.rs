//! 停機/封鎖事件分攤

use chrono::NaiveDate;
use oee_core::{AllocationScope, BlockedProductEvent, ProductionRecord, StoppageEvent};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 單筆生產記錄分得的停機分鐘與封鎖數量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecordAllocation {
    pub stoppage_minutes: Decimal,
    pub blocked_quantity: Decimal,
}

/// 找不到對應生產記錄的事件
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrphanReport {
    /// 孤立停機事件
    pub stoppage_events: Vec<Uuid>,
    /// 孤立停機總分鐘
    pub stoppage_minutes: Decimal,
    /// 孤立封鎖事件
    pub blocked_events: Vec<Uuid>,
    /// 孤立封鎖總數量
    pub blocked_quantity: Decimal,
}

impl OrphanReport {
    pub fn is_empty(&self) -> bool {
        self.stoppage_events.is_empty() && self.blocked_events.is_empty()
    }
}

/// 分攤結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct AllocationResult {
    /// 記錄ID → 分攤量（每筆記錄都有一項，無事件時為零）
    pub allocations: BTreeMap<Uuid, RecordAllocation>,

    pub orphans: OrphanReport,
}

impl AllocationResult {
    /// 取得記錄的分攤量，不存在時為零
    pub fn get(&self, record_id: &Uuid) -> RecordAllocation {
        self.allocations.get(record_id).copied().unwrap_or_default()
    }

    pub fn total_stoppage_minutes(&self) -> Decimal {
        self.allocations.values().map(|a| a.stoppage_minutes).sum()
    }

    pub fn total_blocked_quantity(&self) -> Decimal {
        self.allocations.values().map(|a| a.blocked_quantity).sum()
    }
}

/// 分攤群組鍵（依分攤範圍保留對應欄位）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub date: Option<NaiveDate>,
    pub shift_id: Option<String>,
    pub equipment_id: Option<String>,
}

impl GroupKey {
    pub fn new(scope: AllocationScope, date: NaiveDate, shift_id: &str, equipment_id: &str) -> Self {
        Self {
            date: scope.uses_date().then_some(date),
            shift_id: scope.uses_shift().then(|| shift_id.to_string()),
            equipment_id: scope.uses_equipment().then(|| equipment_id.to_string()),
        }
    }
}

/// 平均分攤的小數位數；截斷後的餘數由群組最後一筆記錄吸收
const SHARE_SCALE: u32 = 10;

/// 可分攤到生產記錄的事件
trait Allocatable {
    fn event_id(&self) -> Uuid;
    fn linked_record_id(&self) -> Option<Uuid>;
    fn group_key(&self, scope: AllocationScope) -> GroupKey;
    fn amount(&self) -> Decimal;
}

impl Allocatable for StoppageEvent {
    fn event_id(&self) -> Uuid {
        self.id
    }

    fn linked_record_id(&self) -> Option<Uuid> {
        self.linked_record_id
    }

    fn group_key(&self, scope: AllocationScope) -> GroupKey {
        GroupKey::new(scope, self.date, &self.shift_id, &self.equipment_id)
    }

    fn amount(&self) -> Decimal {
        self.duration_minutes
    }
}

impl Allocatable for BlockedProductEvent {
    fn event_id(&self) -> Uuid {
        self.id
    }

    fn linked_record_id(&self) -> Option<Uuid> {
        self.linked_record_id
    }

    fn group_key(&self, scope: AllocationScope) -> GroupKey {
        GroupKey::new(scope, self.date, &self.shift_id, &self.equipment_id)
    }

    fn amount(&self) -> Decimal {
        self.quantity
    }
}

/// 未關聯事件在群組內的累計
#[derive(Default)]
struct GroupTotal {
    amount: Decimal,
    events: Vec<Uuid>,
}

/// 無法分攤的事件
#[derive(Default)]
struct Unassigned {
    events: Vec<Uuid>,
    amount: Decimal,
}

/// 事件分攤器
pub struct AllocationResolver;

impl AllocationResolver {
    /// 分攤停機與封鎖事件到生產記錄
    ///
    /// 1. 有 `linked_record_id` 的事件全額歸給該記錄
    /// 2. 其餘事件依分攤範圍加總後，平均分給同群組的所有記錄
    /// 3. 群組內沒有記錄的事件視為孤立，不歸給任何記錄
    ///
    /// 結果與輸入順序無關，且分攤總量與事件總量完全相等。
    pub fn resolve(
        records: &[ProductionRecord],
        stoppages: &[StoppageEvent],
        blocked: &[BlockedProductEvent],
        scope: AllocationScope,
    ) -> AllocationResult {
        let mut allocations: BTreeMap<Uuid, RecordAllocation> = records
            .iter()
            .map(|r| (r.id, RecordAllocation::default()))
            .collect();

        let mut groups: BTreeMap<GroupKey, Vec<Uuid>> = BTreeMap::new();
        for record in records {
            groups
                .entry(GroupKey::new(scope, record.date, &record.shift_id, &record.equipment_id))
                .or_default()
                .push(record.id);
        }
        // 餘數對象不隨輸入順序改變
        for ids in groups.values_mut() {
            ids.sort();
        }

        let stoppage_orphans = Self::distribute(stoppages, scope, &groups, &mut allocations, |a, m| {
            a.stoppage_minutes += m
        });
        let blocked_orphans = Self::distribute(blocked, scope, &groups, &mut allocations, |a, q| {
            a.blocked_quantity += q
        });

        let mut orphans = OrphanReport {
            stoppage_events: stoppage_orphans.events,
            stoppage_minutes: stoppage_orphans.amount,
            blocked_events: blocked_orphans.events,
            blocked_quantity: blocked_orphans.amount,
        };
        orphans.stoppage_events.sort();
        orphans.blocked_events.sort();

        AllocationResult {
            allocations,
            orphans,
        }
    }

    fn distribute<E, F>(
        events: &[E],
        scope: AllocationScope,
        groups: &BTreeMap<GroupKey, Vec<Uuid>>,
        allocations: &mut BTreeMap<Uuid, RecordAllocation>,
        apply: F,
    ) -> Unassigned
    where
        E: Allocatable,
        F: Fn(&mut RecordAllocation, Decimal),
    {
        let mut unassigned = Unassigned::default();
        let mut totals: BTreeMap<GroupKey, GroupTotal> = BTreeMap::new();

        for event in events {
            match event.linked_record_id() {
                Some(record_id) => match allocations.get_mut(&record_id) {
                    Some(allocation) => apply(allocation, event.amount()),
                    None => {
                        unassigned.events.push(event.event_id());
                        unassigned.amount += event.amount();
                    }
                },
                None => {
                    let total = totals.entry(event.group_key(scope)).or_default();
                    total.amount += event.amount();
                    total.events.push(event.event_id());
                }
            }
        }

        for (key, total) in totals {
            match groups.get(&key) {
                Some(ids) => {
                    for (id, share) in ids.iter().zip(split_evenly(total.amount, ids.len())) {
                        if let Some(allocation) = allocations.get_mut(id) {
                            apply(allocation, share);
                        }
                    }
                }
                None => {
                    tracing::debug!("群組 {:?} 沒有生產記錄，{} 未分攤", key, total.amount);
                    unassigned.events.extend(total.events);
                    unassigned.amount += total.amount;
                }
            }
        }

        unassigned
    }
}

/// 把 `total` 分成 `parts` 份，最後一份吸收截斷餘數，總和恰為 `total`
fn split_evenly(total: Decimal, parts: usize) -> Vec<Decimal> {
    if parts == 0 {
        return Vec::new();
    }

    let share = (total / Decimal::from(parts))
        .round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::ToZero);
    let mut shares = vec![share; parts];
    let assigned = share * Decimal::from(parts - 1);
    if let Some(last) = shares.last_mut() {
        *last = total - assigned;
    }
    shares
}
