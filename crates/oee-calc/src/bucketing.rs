//! 日期分桶

use chrono::NaiveDate;
use oee_core::PeriodWindow;
use std::collections::BTreeMap;

/// 日期分桶計算器
pub struct DateBucketing;

impl DateBucketing {
    /// 依日期分組，鍵由舊到新排序
    pub fn group_by_date<'a, T, F>(items: &'a [T], date_of: F) -> BTreeMap<NaiveDate, Vec<&'a T>>
    where
        F: Fn(&T) -> NaiveDate,
    {
        let mut buckets: BTreeMap<NaiveDate, Vec<&'a T>> = BTreeMap::new();
        for item in items {
            buckets.entry(date_of(item)).or_default().push(item);
        }
        buckets
    }

    /// 收集不重複日期（排序後）
    pub fn unique_dates<T, F>(items: &[T], date_of: F) -> Vec<NaiveDate>
    where
        F: Fn(&T) -> NaiveDate,
    {
        let mut dates: Vec<NaiveDate> = items.iter().map(date_of).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    /// 篩出落在時間窗內的項目
    pub fn in_window<'a, T, F>(items: &'a [T], window: &PeriodWindow, date_of: F) -> Vec<&'a T>
    where
        F: Fn(&T) -> NaiveDate,
    {
        items
            .iter()
            .filter(|item| window.contains(date_of(item)))
            .collect()
    }

    /// 回溯窗口的起始日 `today - days`
    ///
    /// 窗口為閉區間 [today - days, today]，共 `days + 1` 個日期。
    pub fn lookback_start(today: NaiveDate, days: u32) -> Option<NaiveDate> {
        today.checked_sub_days(chrono::Days::new(u64::from(days)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    #[test]
    fn test_group_by_date() {
        let items = vec![(d(3), 1), (d(1), 2), (d(3), 3)];

        let buckets = DateBucketing::group_by_date(&items, |item| item.0);

        let keys: Vec<_> = buckets.keys().copied().collect();
        assert_eq!(keys, vec![d(1), d(3)]);
        assert_eq!(buckets[&d(3)].len(), 2);
    }

    #[test]
    fn test_unique_dates() {
        let items = vec![d(5), d(1), d(5), d(2)];

        let dates = DateBucketing::unique_dates(&items, |date| *date);

        assert_eq!(dates, vec![d(1), d(2), d(5)]);
    }

    #[test]
    fn test_lookback_start() {
        assert_eq!(DateBucketing::lookback_start(d(31), 30), Some(d(1)));
        assert_eq!(DateBucketing::lookback_start(d(30), 1), Some(d(29)));
        assert_eq!(DateBucketing::lookback_start(d(30), 0), Some(d(30)));
        assert_eq!(
            DateBucketing::lookback_start(d(15), 30),
            NaiveDate::from_ymd_opt(2025, 9, 15)
        );
        assert_eq!(DateBucketing::lookback_start(NaiveDate::MIN, 1), None);
    }
}
