//! 期間日曆：滾動週/月/年窗口

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineConfig, OeeError};

/// 每週起始日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    /// 週日（儀表板預設的地區慣例）
    #[default]
    Sunday,
    /// 週一（ISO 8601）
    Monday,
}

impl WeekStart {
    /// 距離本週起始日的天數
    fn days_into_week(&self, date: NaiveDate) -> u32 {
        match self {
            Self::Sunday => date.weekday().num_days_from_sunday(),
            Self::Monday => date.weekday().num_days_from_monday(),
        }
    }
}

/// 期間類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Week,
    Month,
    Year,
}

impl PeriodKind {
    fn label_stem(&self) -> &'static str {
        match self {
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }

    /// 窗口標籤：偏移 0 為 "Current Week"，其餘為 "Week -N"
    pub fn label(&self, offset: u32) -> String {
        if offset == 0 {
            format!("Current {}", self.label_stem())
        } else {
            format!("{} -{}", self.label_stem(), offset)
        }
    }
}

/// 期間窗口（起訖日皆包含）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    /// 期間類型
    pub kind: PeriodKind,

    /// 穩定標籤，作為總體序列與設備序列的對齊鍵
    pub label: String,

    /// 往前偏移的期數（0 = 本期）
    pub offset: u32,

    /// 起始日
    pub start: NaiveDate,

    /// 結束日
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 窗口天數
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// 期間日曆建構器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodCalendar {
    /// 每週起始日
    pub week_start: WeekStart,

    /// 週窗口數量（含本週）
    pub weeks: u32,

    /// 月窗口數量（含本月）
    pub months: u32,

    /// 年窗口數量（含本年）
    pub years: u32,
}

impl PeriodCalendar {
    /// 創建新的期間日曆（預設 4 週、12 個月、2 年）
    pub fn new(week_start: WeekStart) -> Self {
        Self {
            week_start,
            weeks: 4,
            months: 12,
            years: 2,
        }
    }

    /// 從引擎配置創建
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            week_start: config.week_start,
            weeks: config.weeks,
            months: config.months,
            years: config.years,
        }
    }

    /// 建構器模式：設置窗口數量
    pub fn with_counts(mut self, weeks: u32, months: u32, years: u32) -> Self {
        self.weeks = weeks;
        self.months = months;
        self.years = years;
        self
    }

    /// 產生全部窗口：週 → 月 → 年，每類由本期往前排列
    pub fn build(&self, today: NaiveDate) -> crate::Result<Vec<PeriodWindow>> {
        let mut windows = self.week_windows(today)?;
        windows.extend(self.month_windows(today)?);
        windows.extend(self.year_windows(today)?);
        Ok(windows)
    }

    /// 週窗口
    pub fn week_windows(&self, today: NaiveDate) -> crate::Result<Vec<PeriodWindow>> {
        let current_start = today
            .checked_sub_signed(Duration::days(i64::from(self.week_start.days_into_week(today))))
            .ok_or_else(|| overflow(today))?;

        (0..self.weeks)
            .map(|offset| {
                let start = current_start
                    .checked_sub_signed(Duration::weeks(i64::from(offset)))
                    .ok_or_else(|| overflow(today))?;
                let end = start
                    .checked_add_signed(Duration::days(6))
                    .ok_or_else(|| overflow(today))?;
                Ok(window(PeriodKind::Week, offset, start, end))
            })
            .collect()
    }

    /// 月窗口
    pub fn month_windows(&self, today: NaiveDate) -> crate::Result<Vec<PeriodWindow>> {
        let current_start = today.with_day(1).ok_or_else(|| overflow(today))?;

        (0..self.months)
            .map(|offset| {
                let start = current_start
                    .checked_sub_months(Months::new(offset))
                    .ok_or_else(|| overflow(today))?;
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .ok_or_else(|| overflow(today))?;
                Ok(window(PeriodKind::Month, offset, start, end))
            })
            .collect()
    }

    /// 年窗口
    pub fn year_windows(&self, today: NaiveDate) -> crate::Result<Vec<PeriodWindow>> {
        (0..self.years)
            .map(|offset| {
                let year = today.year() - offset as i32;
                let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| overflow(today))?;
                let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| overflow(today))?;
                Ok(window(PeriodKind::Year, offset, start, end))
            })
            .collect()
    }
}

impl Default for PeriodCalendar {
    fn default() -> Self {
        Self::new(WeekStart::default())
    }
}

fn window(kind: PeriodKind, offset: u32, start: NaiveDate, end: NaiveDate) -> PeriodWindow {
    PeriodWindow {
        kind,
        label: kind.label(offset),
        offset,
        start,
        end,
    }
}

fn overflow(today: NaiveDate) -> OeeError {
    OeeError::InvalidDate(format!("期間計算溢出: {}", today))
}
