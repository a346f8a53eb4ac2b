//! ISO 8601 rendering of DATE, TIME and TIMESTAMP column values.
//!
//! A [`TemporalFormat`] is a plain `Copy` value. Every call formats from its
//! arguments alone, so serializers on different threads can each hold one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

use crate::error::{DocError, Result};

/// Zone used for the offset suffix of TIME and TIMESTAMP values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemporalZone {
    /// The process's local time zone.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl FromStr for TemporalZone {
    type Err = DocError;

    /// Accepts `local`, `utc`, `Z`, or an offset like `+05:30` / `-0800`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("local") {
            return Ok(TemporalZone::Local);
        }
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(TemporalZone::Fixed(Utc.fix()));
        }
        parse_offset(s)
            .map(TemporalZone::Fixed)
            .ok_or_else(|| DocError::Config(format!("Invalid time zone '{}'", s)))
    }
}

impl fmt::Display for TemporalZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalZone::Local => f.write_str("local"),
            TemporalZone::Fixed(offset) => f.write_str(&format_offset(*offset)),
        }
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    if !rest.is_ascii() {
        return None;
    }
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None if rest.len() == 2 => (rest, "00"),
        None => return None,
    };
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn format_offset(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// Formatter for temporal column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemporalFormat {
    zone: TemporalZone,
}

impl TemporalFormat {
    pub fn new(zone: TemporalZone) -> Self {
        Self { zone }
    }

    /// Formatter using the process's local zone.
    pub fn local() -> Self {
        Self::new(TemporalZone::Local)
    }

    /// Formatter using a fixed offset.
    pub fn fixed(offset: FixedOffset) -> Self {
        Self::new(TemporalZone::Fixed(offset))
    }

    pub fn zone(&self) -> TemporalZone {
        self.zone
    }

    /// `YYYY-MM-DD`
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// `HH:MM:SS±HH:MM`, with the zone's offset on 1970-01-01.
    pub fn format_time(&self, time: NaiveTime) -> String {
        let offset = match self.zone {
            TemporalZone::Fixed(offset) => offset,
            TemporalZone::Local => {
                let naive = NaiveDate::default().and_time(time);
                Local
                    .from_local_datetime(&naive)
                    .earliest()
                    .map(|dt| *dt.offset())
                    .unwrap_or_else(|| Local.offset_from_utc_datetime(&naive))
            }
        };
        format!("{}{}", time.format("%H:%M:%S"), format_offset(offset))
    }

    /// `YYYY-MM-DDTHH:MM:SS±HH:MM`, the instant shown in the zone.
    pub fn format_timestamp(&self, ts: DateTime<Utc>) -> String {
        match self.zone {
            TemporalZone::Local => render(&ts.with_timezone(&Local)),
            TemporalZone::Fixed(offset) => render(&ts.with_timezone(&offset)),
        }
    }
}

fn render<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    format!(
        "{}{}",
        dt.naive_local().format("%Y-%m-%dT%H:%M:%S"),
        format_offset(dt.offset().fix())
    )
}
