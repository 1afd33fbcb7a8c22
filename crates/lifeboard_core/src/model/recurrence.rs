//! Recurrence rules for repeating tasks.
//!
//! # Invariants
//! - `interval` is at least 1 for persisted rules.
//! - Month/year steps clamp the day to the last valid day of the target month.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Repeat unit of a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Repeat rule attached to a task: every `interval` `frequency` units,
/// optionally ending on `until` (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub interval: u32,
    pub until: Option<NaiveDate>,
}

impl Recurrence {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            until: None,
        }
    }

    /// Adds one step of this rule to `date`.
    pub fn step(&self, date: NaiveDate) -> Option<NaiveDate> {
        let interval = self.interval.max(1);
        match self.frequency {
            Frequency::Daily => date.checked_add_signed(Duration::days(i64::from(interval))),
            Frequency::Weekly => date.checked_add_signed(Duration::weeks(i64::from(interval))),
            Frequency::Monthly => add_months(date, interval),
            Frequency::Yearly => add_months(date, interval.checked_mul(12)?),
        }
    }

    /// Next occurrence after `date`, or `None` once the rule has ended.
    pub fn next_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        let next = self.step(date)?;
        match self.until {
            Some(until) if next > until => None,
            _ => Some(next),
        }
    }
}

fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total_months = date.month0().checked_add(months)?;
    let year = date.year().checked_add(i32::try_from(total_months / 12).ok()?)?;
    let month = total_months % 12 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(first_of_next.pred_opt()?.day())
}

#[cfg(test)]
mod tests {
    use super::{Frequency, Recurrence};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_rule_adds_interval_weeks() {
        let rule = Recurrence::new(Frequency::Weekly, 2);
        assert_eq!(rule.next_after(date(2024, 3, 1)), Some(date(2024, 3, 15)));
    }

    #[test]
    fn monthly_rule_clamps_to_month_end() {
        let rule = Recurrence::new(Frequency::Monthly, 1);
        assert_eq!(rule.next_after(date(2024, 1, 31)), Some(date(2024, 2, 29)));
        assert_eq!(rule.next_after(date(2023, 12, 15)), Some(date(2024, 1, 15)));
    }

    #[test]
    fn yearly_rule_handles_leap_day() {
        let rule = Recurrence::new(Frequency::Yearly, 1);
        assert_eq!(rule.next_after(date(2024, 2, 29)), Some(date(2025, 2, 28)));
    }

    #[test]
    fn rule_stops_after_until() {
        let rule = Recurrence {
            frequency: Frequency::Daily,
            interval: 1,
            until: Some(date(2024, 5, 2)),
        };
        assert_eq!(rule.next_after(date(2024, 5, 1)), Some(date(2024, 5, 2)));
        assert_eq!(rule.next_after(date(2024, 5, 2)), None);
    }
}
