//! 資料來源介面與快照

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{BlockedProductEvent, EquipmentSegment, ProductionRecord, Shift, StoppageEvent};

/// 查詢條件（日期含邊界，設備/班次可選）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// 起始日期
    pub from: Option<NaiveDate>,

    /// 結束日期
    pub to: Option<NaiveDate>,

    /// 設備段ID
    pub equipment_id: Option<String>,

    /// 班次ID
    pub shift_id: Option<String>,
}

impl RecordFilter {
    /// 不設任何條件
    pub fn all() -> Self {
        Self::default()
    }

    /// 依日期範圍查詢
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    /// 建構器模式：限定設備段
    pub fn with_equipment(mut self, equipment_id: String) -> Self {
        self.equipment_id = Some(equipment_id);
        self
    }

    /// 建構器模式：限定班次
    pub fn with_shift(mut self, shift_id: String) -> Self {
        self.shift_id = Some(shift_id);
        self
    }

    /// 檢查日期/設備/班次是否符合
    pub fn matches(&self, date: NaiveDate, equipment_id: &str, shift_id: &str) -> bool {
        self.from.map_or(true, |from| date >= from)
            && self.to.map_or(true, |to| date <= to)
            && self
                .equipment_id
                .as_deref()
                .map_or(true, |id| id == equipment_id)
            && self.shift_id.as_deref().map_or(true, |id| id == shift_id)
    }
}

/// 外部資料來源
///
/// 沒有符合條件的資料時回傳空集合，而不是錯誤。
pub trait RecordSource {
    fn production(&self, filter: &RecordFilter) -> crate::Result<Vec<ProductionRecord>>;

    fn stoppages(&self, filter: &RecordFilter) -> crate::Result<Vec<StoppageEvent>>;

    fn blocked(&self, filter: &RecordFilter) -> crate::Result<Vec<BlockedProductEvent>>;

    /// 班次目標可能被修改，每次計算都要重新讀取
    fn shifts(&self) -> crate::Result<Vec<Shift>>;

    fn segments(&self) -> crate::Result<Vec<EquipmentSegment>>;
}

/// 單次計算使用的不可變資料快照
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub records: Vec<ProductionRecord>,
    pub stoppages: Vec<StoppageEvent>,
    pub blocked: Vec<BlockedProductEvent>,
    pub shifts: Vec<Shift>,
    pub segments: Vec<EquipmentSegment>,
}

impl Snapshot {
    /// 創建空快照
    pub fn new() -> Self {
        Self::default()
    }

    /// 從任意資料來源載入快照
    pub fn load<S: RecordSource + ?Sized>(source: &S, filter: &RecordFilter) -> crate::Result<Self> {
        Ok(Self {
            records: source.production(filter)?,
            stoppages: source.stoppages(filter)?,
            blocked: source.blocked(filter)?,
            shifts: source.shifts()?,
            segments: source.segments()?,
        })
    }

    /// 建構器模式：設置生產記錄
    pub fn with_records(mut self, records: Vec<ProductionRecord>) -> Self {
        self.records = records;
        self
    }

    /// 建構器模式：設置停機事件
    pub fn with_stoppages(mut self, stoppages: Vec<StoppageEvent>) -> Self {
        self.stoppages = stoppages;
        self
    }

    /// 建構器模式：設置封鎖事件
    pub fn with_blocked(mut self, blocked: Vec<BlockedProductEvent>) -> Self {
        self.blocked = blocked;
        self
    }

    /// 建構器模式：設置班次
    pub fn with_shifts(mut self, shifts: Vec<Shift>) -> Self {
        self.shifts = shifts;
        self
    }

    /// 建構器模式：設置設備段
    pub fn with_segments(mut self, segments: Vec<EquipmentSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// 依條件裁切成子快照（參考資料保持完整）
    pub fn filtered(&self, filter: &RecordFilter) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| filter.matches(r.date, &r.equipment_id, &r.shift_id))
                .cloned()
                .collect(),
            stoppages: self
                .stoppages
                .iter()
                .filter(|s| filter.matches(s.date, &s.equipment_id, &s.shift_id))
                .cloned()
                .collect(),
            blocked: self
                .blocked
                .iter()
                .filter(|b| filter.matches(b.date, &b.equipment_id, &b.shift_id))
                .cloned()
                .collect(),
            shifts: self.shifts.clone(),
            segments: self.segments.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.stoppages.is_empty() && self.blocked.is_empty()
    }
}

impl RecordSource for Snapshot {
    fn production(&self, filter: &RecordFilter) -> crate::Result<Vec<ProductionRecord>> {
        Ok(self.filtered(filter).records)
    }

    fn stoppages(&self, filter: &RecordFilter) -> crate::Result<Vec<StoppageEvent>> {
        Ok(self.filtered(filter).stoppages)
    }

    fn blocked(&self, filter: &RecordFilter) -> crate::Result<Vec<BlockedProductEvent>> {
        Ok(self.filtered(filter).blocked)
    }

    fn shifts(&self) -> crate::Result<Vec<Shift>> {
        Ok(self.shifts.clone())
    }

    fn segments(&self) -> crate::Result<Vec<EquipmentSegment>> {
        Ok(self.segments.clone())
    }
}
