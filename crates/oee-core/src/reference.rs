//! 參考資料：班次與設備段

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 班次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// 班次ID
    pub id: String,

    /// 班次名稱
    pub name: String,

    /// 開始時間
    pub start_time: NaiveTime,

    /// 結束時間（可跨日）
    pub end_time: NaiveTime,

    /// OEE 目標（0-100），未設定時使用引擎預設值
    pub target_oee: Option<Decimal>,
}

impl Shift {
    /// 創建新的班次
    pub fn new(id: String, name: String, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id,
            name,
            start_time,
            end_time,
            target_oee: None,
        }
    }

    /// 建構器模式：設置 OEE 目標
    pub fn with_target_oee(mut self, target: Decimal) -> Self {
        self.target_oee = Some(target);
        self
    }

    /// 取得 OEE 目標，未設定時回退到預設值
    pub fn target_or(&self, default_target: Decimal) -> Decimal {
        self.target_oee.unwrap_or(default_target)
    }

    /// 班次長度（分鐘），跨午夜的班次會自動加上一天
    pub fn duration_minutes(&self) -> i64 {
        let minutes = (self.end_time - self.start_time).num_minutes();
        if minutes <= 0 {
            minutes + 24 * 60
        } else {
            minutes
        }
    }
}

/// 設備段狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    /// 運轉中
    #[default]
    Active,
    /// 停用
    Inactive,
    /// 維修中
    Maintenance,
}

/// 設備段（產線）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentSegment {
    /// 設備段ID
    pub id: String,

    /// 名稱
    pub name: String,

    /// 代碼
    pub code: String,

    /// 每小時目標產出（產能或重量目標）
    pub target_output_per_hour: Decimal,

    /// 狀態
    pub status: SegmentStatus,
}

impl EquipmentSegment {
    /// 創建新的設備段
    pub fn new(id: String, name: String, code: String, target_output_per_hour: Decimal) -> Self {
        Self {
            id,
            name,
            code,
            target_output_per_hour,
            status: SegmentStatus::Active,
        }
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: SegmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == SegmentStatus::Active
    }
}
