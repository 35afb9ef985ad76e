use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc, Weekday};

use std::sync::Arc;

use crate::core::{AppError, Result};

pub const DAY_NAMES: [&str; 7] = [
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
    "domingo",
];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Business-local calendar.
///
/// All timestamps are stored as UTC; "today" and the day/month names used for
/// tariff matching are taken in the business's fixed UTC offset with Spanish
/// (es-ES) names, independent of the host locale.
#[derive(Debug, Clone, Copy)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    pub fn new(utc_offset_hours: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
            AppError::Configuration(format!("Invalid UTC offset: {} hours", utc_offset_hours))
        })?;

        Ok(Self { offset })
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Business-local calendar date of an instant
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Today's business-local date according to `clock`
    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        self.local_date(clock.now())
    }
}

/// A clock read through the business calendar
#[derive(Clone)]
pub struct BusinessClock {
    calendar: BusinessCalendar,
    clock: Arc<dyn Clock>,
}

impl BusinessClock {
    pub fn new(calendar: BusinessCalendar, clock: Arc<dyn Clock>) -> Self {
        Self { calendar, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.calendar.today(self.clock.as_ref())
    }

    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        self.calendar.local_date(at)
    }
}

/// Lowercase Spanish weekday name, e.g. "lunes"
pub fn weekday_name(date: NaiveDate) -> &'static str {
    DAY_NAMES[date.weekday().num_days_from_monday() as usize]
}

/// Lowercase Spanish month name, e.g. "enero"
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

/// Folds a name for comparison: trimmed, lowercase, Spanish accents removed.
///
/// "Miércoles", "MIERCOLES" and " miercoles " all fold to "miercoles".
pub fn fold_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

/// Parses a Spanish weekday name back into a `Weekday`
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let folded = fold_name(name);
    DAY_NAMES
        .iter()
        .position(|day| fold_name(day) == folded)
        .map(|idx| WEEKDAYS[idx])
}

/// Parses a Spanish month name into its number (1-12)
pub fn parse_month(name: &str) -> Option<u32> {
    let folded = fold_name(name);
    MONTH_NAMES
        .iter()
        .position(|month| fold_name(month) == folded)
        .map(|idx| idx as u32 + 1)
}
