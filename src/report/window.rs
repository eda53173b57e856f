use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::utils::format_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    /// Prefix of the sheet names this period writes.
    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => f.write_str("daily"),
            Self::Weekly => f.write_str("weekly"),
            Self::Monthly => f.write_str("monthly"),
        }
    }
}

/// Inclusive range of calendar dates covered by one report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub period: ReportPeriod,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Window of `period` that contains `today`. Weeks start on Sunday.
    pub fn new(period: ReportPeriod, today: NaiveDate) -> Self {
        let (start, end) = match period {
            ReportPeriod::Daily => (today, today),
            ReportPeriod::Weekly => {
                let start =
                    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
                (start, start + Duration::days(6))
            }
            ReportPeriod::Monthly => {
                let start = today - Duration::days(i64::from(today.day0()));
                // the day before the first of next month
                (start, start + Months::new(1) - Duration::days(1))
            }
        };
        Self { period, start, end }
    }

    pub fn start_str(&self) -> String {
        format_date(self.start)
    }

    pub fn end_str(&self) -> String {
        format_date(self.end)
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Human-readable span, which also serves as the sheet name suffix for
    /// daily and monthly reports.
    fn span(&self) -> String {
        match self.period {
            ReportPeriod::Daily => self.start_str(),
            ReportPeriod::Weekly => format!("{} to {}", self.start_str(), self.end_str()),
            ReportPeriod::Monthly => self.start.format("%Y-%m").to_string(),
        }
    }

    pub fn sheet_suffix(&self) -> String {
        match self.period {
            ReportPeriod::Weekly => format!("{}_to_{}", self.start_str(), self.end_str()),
            _ => self.span(),
        }
    }

    pub fn sheet_name(&self) -> String {
        format!("{}-{}", self.period.label(), self.sheet_suffix())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} report generated for {} in sheet: {}",
            self.period.label(),
            self.span(),
            self.sheet_name()
        )
    }
}
