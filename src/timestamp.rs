use time::format_description::BorrowedFormatItem;
use time::macros::{date, format_description};
use time::{Date, PrimitiveDateTime, Time};
use tracing::warn;

/// Calendar day used for time-only stamps when no fallback date is known.
pub const TIME_ONLY_EPOCH: Date = date!(1900-01-01);

/// Accepted timestamp layouts, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `YYYY-MM-DD HH:MM:SS`
    IsoDateTime,
    /// `DD/MM/YYYY HH:MM:SS`
    DayMonthYear,
    /// `MM/DD/YYYY HH:MM:SS`
    MonthDayYear,
    /// `HH:MM:SS`
    TimeOnly,
}

impl TimestampFormat {
    /// Fixed priority order. `01/07/2025` is always day/month.
    pub const ALL: [TimestampFormat; 4] = [
        TimestampFormat::IsoDateTime,
        TimestampFormat::DayMonthYear,
        TimestampFormat::MonthDayYear,
        TimestampFormat::TimeOnly,
    ];

    pub fn has_date(self) -> bool {
        !matches!(self, TimestampFormat::TimeOnly)
    }

    fn items(self) -> &'static [BorrowedFormatItem<'static>] {
        match self {
            TimestampFormat::IsoDateTime => format_description!(
                "[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute padding:none]:[second padding:none]"
            ),
            TimestampFormat::DayMonthYear => format_description!(
                "[day padding:none]/[month padding:none]/[year] [hour padding:none]:[minute padding:none]:[second padding:none]"
            ),
            TimestampFormat::MonthDayYear => format_description!(
                "[month padding:none]/[day padding:none]/[year] [hour padding:none]:[minute padding:none]:[second padding:none]"
            ),
            TimestampFormat::TimeOnly => format_description!(
                "[hour padding:none]:[minute padding:none]:[second padding:none]"
            ),
        }
    }

    /// `[year]` takes an optional sign; log years never carry one.
    fn has_signed_year(self, s: &str) -> bool {
        match self {
            TimestampFormat::IsoDateTime => s.starts_with(['+', '-']),
            TimestampFormat::DayMonthYear | TimestampFormat::MonthDayYear => s.contains(['+', '-']),
            TimestampFormat::TimeOnly => false,
        }
    }

    fn parse(self, s: &str) -> Option<PrimitiveDateTime> {
        if self.has_signed_year(s) {
            return None;
        }
        match self {
            TimestampFormat::TimeOnly => Time::parse(s, self.items())
                .ok()
                .map(|t| PrimitiveDateTime::new(TIME_ONLY_EPOCH, t)),
            _ => PrimitiveDateTime::parse(s, self.items()).ok(),
        }
    }
}

/// Try every layout in order and report which one matched. Does not log.
pub fn detect(raw: &str, fallback_date: Option<Date>) -> Option<(PrimitiveDateTime, TimestampFormat)> {
    let s = raw.trim();
    TimestampFormat::ALL.iter().find_map(|&fmt| {
        let parsed = fmt.parse(s)?;
        let resolved = match (fmt, fallback_date) {
            (TimestampFormat::TimeOnly, Some(day)) => parsed.replace_date(day),
            _ => parsed,
        };
        Some((resolved, fmt))
    })
}

/// Parse a log timestamp. Time-only values are anchored to `fallback_date`
/// when one is given, otherwise to [`TIME_ONLY_EPOCH`].
pub fn parse_datetime(raw: &str, fallback_date: Option<Date>) -> Option<PrimitiveDateTime> {
    match detect(raw, fallback_date) {
        Some((dt, _)) => Some(dt),
        None => {
            warn!("unrecognized datetime format: {}", raw.trim());
            None
        }
    }
}
