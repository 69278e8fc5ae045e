//! 停機與品質封鎖事件模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::OeeError;

/// 停機類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoppageCategory {
    /// 非計劃停機
    #[default]
    Unplanned,
    /// 計劃停機
    Planned,
    /// 保養維修
    Maintenance,
    /// 換線/調機
    Setup,
}

impl StoppageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unplanned => "unplanned",
            Self::Planned => "planned",
            Self::Maintenance => "maintenance",
            Self::Setup => "setup",
        }
    }
}

impl FromStr for StoppageCategory {
    type Err = OeeError;

    /// 同時接受儀表板目錄中的葡文代碼
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "unplanned" | "nao_planejada" => Ok(Self::Unplanned),
            "planned" | "planejada" => Ok(Self::Planned),
            "maintenance" | "manutencao" => Ok(Self::Maintenance),
            "setup" => Ok(Self::Setup),
            other => Err(OeeError::UnknownCategory(other.to_string())),
        }
    }
}

/// 停機事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoppageEvent {
    /// 事件ID
    pub id: Uuid,

    /// 發生日期
    pub date: NaiveDate,

    /// 班次ID
    pub shift_id: String,

    /// 設備段ID
    pub equipment_id: String,

    /// 停機時長（分鐘）
    pub duration_minutes: Decimal,

    /// 停機原因（自由文字或目錄ID）
    pub reason: String,

    /// 停機類別
    pub category: StoppageCategory,

    /// 明確關聯的生產記錄
    pub linked_record_id: Option<Uuid>,
}

impl StoppageEvent {
    /// 創建新的停機事件
    pub fn new(
        date: NaiveDate,
        shift_id: String,
        equipment_id: String,
        duration_minutes: Decimal,
        reason: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            shift_id,
            equipment_id,
            duration_minutes,
            reason,
            category: StoppageCategory::default(),
            linked_record_id: None,
        }
    }

    /// 建構器模式：設置停機類別
    pub fn with_category(mut self, category: StoppageCategory) -> Self {
        self.category = category;
        self
    }

    /// 建構器模式：關聯到指定生產記錄
    pub fn linked_to(mut self, record_id: Uuid) -> Self {
        self.linked_record_id = Some(record_id);
        self
    }

    /// 是否為明確關聯事件
    pub fn is_linked(&self) -> bool {
        self.linked_record_id.is_some()
    }
}

/// 品質封鎖事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedProductEvent {
    /// 事件ID
    pub id: Uuid,

    /// 發生日期
    pub date: NaiveDate,

    /// 班次ID
    pub shift_id: String,

    /// 設備段ID
    pub equipment_id: String,

    /// 封鎖原因
    pub reason: String,

    /// 封鎖數量
    pub quantity: Decimal,

    /// 去向（重工/報廢/退回/隔離…）
    pub destination: String,

    /// 批號
    pub lot: Option<String>,

    /// 明確關聯的生產記錄
    pub linked_record_id: Option<Uuid>,
}

impl BlockedProductEvent {
    /// 創建新的封鎖事件
    pub fn new(
        date: NaiveDate,
        shift_id: String,
        equipment_id: String,
        quantity: Decimal,
        reason: String,
        destination: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            shift_id,
            equipment_id,
            reason,
            quantity,
            destination,
            lot: None,
            linked_record_id: None,
        }
    }

    /// 建構器模式：設置批號
    pub fn with_lot(mut self, lot: String) -> Self {
        self.lot = Some(lot);
        self
    }

    /// 建構器模式：關聯到指定生產記錄
    pub fn linked_to(mut self, record_id: Uuid) -> Self {
        self.linked_record_id = Some(record_id);
        self
    }

    /// 是否為明確關聯事件
    pub fn is_linked(&self) -> bool {
        self.linked_record_id.is_some()
    }
}
