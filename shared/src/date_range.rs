use std::fmt;

use chrono::{DateTime, Days, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the date filter menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangeOption {
    pub label: &'static str,
    /// `None` means no lower bound.
    pub date_from: Option<&'static str>,
    /// Exclusive upper bound. `None` runs up to now.
    pub date_to: Option<&'static str>,
}

pub const DEFAULT_DATE_RANGE_LABEL: &str = "Last 7 days";

pub const DATE_RANGE_OPTIONS: &[DateRangeOption] = &[
    DateRangeOption {
        label: "Today",
        date_from: Some("dStart"),
        date_to: None,
    },
    DateRangeOption {
        label: "Yesterday",
        date_from: Some("-1dStart"),
        date_to: Some("dStart"),
    },
    DateRangeOption {
        label: "Last 24 hours",
        date_from: Some("-24h"),
        date_to: None,
    },
    DateRangeOption {
        label: "Last 7 days",
        date_from: Some("-7d"),
        date_to: None,
    },
    DateRangeOption {
        label: "Last 14 days",
        date_from: Some("-14d"),
        date_to: None,
    },
    DateRangeOption {
        label: "Last 30 days",
        date_from: Some("-30d"),
        date_to: None,
    },
    DateRangeOption {
        label: "Last 90 days",
        date_from: Some("-90d"),
        date_to: None,
    },
    DateRangeOption {
        label: "All time",
        date_from: None,
        date_to: None,
    },
];

/// Active heatmap date filter as held by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl HeatmapFilter {
    pub fn from_option(option: &DateRangeOption) -> Self {
        Self {
            date_from: option.date_from.map(str::to_string),
            date_to: option.date_to.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    Malformed(String),
    OutOfRange(String),
}

impl fmt::Display for DateRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(raw) => write!(f, "malformed relative date: {raw:?}"),
            Self::OutOfRange(raw) => write!(f, "relative date out of range: {raw:?}"),
        }
    }
}

impl std::error::Error for DateRangeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDate {
    /// Midnight UTC, this many days back. `dStart` is today.
    DayStart(u32),
    Hours(u32),
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
}

fn parse_count(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parse `dStart`, `-NdStart`, or `-N{h,d,w,m,y}`.
pub fn parse_relative(raw: &str) -> Result<RelativeDate, DateRangeError> {
    if raw == "dStart" {
        return Ok(RelativeDate::DayStart(0));
    }
    let malformed = || DateRangeError::Malformed(raw.to_string());
    let body = raw.strip_prefix('-').ok_or_else(malformed)?;
    if let Some(days) = body.strip_suffix("dStart") {
        return parse_count(days)
            .map(RelativeDate::DayStart)
            .ok_or_else(malformed);
    }
    let unit = body.chars().last().ok_or_else(malformed)?;
    let digits = &body[..body.len() - unit.len_utf8()];
    let n = parse_count(digits).ok_or_else(malformed)?;
    match unit {
        'h' => Ok(RelativeDate::Hours(n)),
        'd' => Ok(RelativeDate::Days(n)),
        'w' => Ok(RelativeDate::Weeks(n)),
        'm' => Ok(RelativeDate::Months(n)),
        'y' => Ok(RelativeDate::Years(n)),
        _ => Err(malformed()),
    }
}

impl RelativeDate {
    pub fn resolve(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::DayStart(n) => now
                .date_naive()
                .checked_sub_days(Days::new(u64::from(n)))?
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc()),
            Self::Hours(n) => now.checked_sub_signed(TimeDelta::try_hours(i64::from(n))?),
            Self::Days(n) => now.checked_sub_signed(TimeDelta::try_days(i64::from(n))?),
            Self::Weeks(n) => now.checked_sub_signed(TimeDelta::try_weeks(i64::from(n))?),
            Self::Months(n) => now.checked_sub_months(Months::new(n)),
            Self::Years(n) => now.checked_sub_months(Months::new(n.checked_mul(12)?)),
        }
    }
}

/// Lower bound for a filter's `date_from`. `Ok(None)` is an unbounded range.
pub fn resolve_date_from(
    date_from: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, DateRangeError> {
    let Some(raw) = date_from else {
        return Ok(None);
    };
    parse_relative(raw)?
        .resolve(now)
        .map(Some)
        .ok_or_else(|| DateRangeError::OutOfRange(raw.to_string()))
}

pub fn option_for_label(label: &str) -> Option<&'static DateRangeOption> {
    DATE_RANGE_OPTIONS.iter().find(|opt| opt.label == label)
}

/// Upper bound for a filter's `date_to`. `Ok(None)` runs up to now.
pub fn resolve_date_to(
    date_to: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, DateRangeError> {
    resolve_date_from(date_to, now)
}

/// Menu entry whose bounds match the filter exactly.
pub fn option_for_filter(filter: &HeatmapFilter) -> Option<&'static DateRangeOption> {
    DATE_RANGE_OPTIONS.iter().find(|opt| {
        opt.date_from == filter.date_from.as_deref() && opt.date_to == filter.date_to.as_deref()
    })
}

/// Menu entry for `label`, or the default entry for an unknown label.
pub fn option_for_label_or_default(label: &str) -> &'static DateRangeOption {
    option_for_label(label)
        .or_else(|| option_for_label(DEFAULT_DATE_RANGE_LABEL))
        .unwrap_or(&DATE_RANGE_OPTIONS[0])
}
