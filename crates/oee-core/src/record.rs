//! 生產記錄模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 生產記錄（單一班次、單一設備段、單一日期的產出）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// 記錄ID
    pub id: Uuid,

    /// 生產日期
    pub date: NaiveDate,

    /// 設備段ID
    pub equipment_id: String,

    /// 班次ID
    pub shift_id: String,

    /// 計劃時間（分鐘）
    pub planned_time_minutes: Decimal,

    /// 實際運轉時間（分鐘）
    pub actual_time_minutes: Decimal,

    /// 理想節拍（秒/件）
    pub ideal_cycle_time: Option<Decimal>,

    /// 實際節拍（秒/件）
    pub actual_cycle_time: Option<Decimal>,

    /// 目標產出（產能或重量目標）
    pub target_output: Option<Decimal>,

    /// 總產出
    pub total_produced: Decimal,

    /// 不良數
    pub defects: Decimal,
}

impl ProductionRecord {
    /// 創建新的生產記錄
    pub fn new(
        date: NaiveDate,
        equipment_id: String,
        shift_id: String,
        planned_time_minutes: Decimal,
        total_produced: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            equipment_id,
            shift_id,
            planned_time_minutes,
            actual_time_minutes: planned_time_minutes,
            ideal_cycle_time: None,
            actual_cycle_time: None,
            target_output: None,
            total_produced,
            defects: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置記錄ID
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// 建構器模式：設置實際運轉時間
    pub fn with_actual_time(mut self, minutes: Decimal) -> Self {
        self.actual_time_minutes = minutes;
        self
    }

    /// 建構器模式：設置目標產出
    pub fn with_target_output(mut self, target: Decimal) -> Self {
        self.target_output = Some(target);
        self
    }

    /// 建構器模式：設置節拍（理想/實際）
    pub fn with_cycle_times(mut self, ideal: Decimal, actual: Decimal) -> Self {
        self.ideal_cycle_time = Some(ideal);
        self.actual_cycle_time = Some(actual);
        self
    }

    /// 建構器模式：設置不良數
    pub fn with_defects(mut self, defects: Decimal) -> Self {
        self.defects = defects;
        self
    }

    /// 依每小時產能推導節拍
    ///
    /// 理想節拍 = 3600 / 每小時產能；實際節拍 = 實際時間 × 60 / 總產出。
    /// 沒有產出時實際節拍沿用理想節拍。
    pub fn with_cycle_times_from_capacity(mut self, output_per_hour: Decimal) -> Self {
        if output_per_hour <= Decimal::ZERO {
            return self;
        }

        let ideal = Decimal::from(3600) / output_per_hour;
        let actual = if self.total_produced > Decimal::ZERO {
            self.actual_time_minutes * Decimal::from(60) / self.total_produced
        } else {
            ideal
        };

        self.ideal_cycle_time = Some(ideal);
        self.actual_cycle_time = Some(actual);
        self
    }

    /// 良品數（總產出 - 不良數，不低於 0）
    pub fn good_units(&self) -> Decimal {
        (self.total_produced - self.defects).max(Decimal::ZERO)
    }

    /// 是否有節拍資料
    pub fn has_cycle_times(&self) -> bool {
        self.ideal_cycle_time.is_some() && self.actual_cycle_time.is_some()
    }

    /// 是否在日期範圍內（含邊界）
    pub fn is_within(&self, from: NaiveDate, to: NaiveDate) -> bool {
        from <= self.date && self.date <= to
    }
}
