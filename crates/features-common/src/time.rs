//! RFC 3339 instant and ISO 8601 interval parsing.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid instant: {0}. Expected an RFC 3339 date-time")]
    InvalidInstant(String),

    #[error("Invalid duration: {0}. Expected an ISO 8601 duration")]
    InvalidDuration(String),

    #[error("Interval out of range: {0}")]
    OutOfRange(String),
}

/// Parse an RFC 3339 instant, e.g. `2018-02-12T23:20:50Z`.
///
/// This is the strict form used for request parameters.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TimeParseError::InvalidInstant(s.to_string()))
}

/// Interpret a string as a date-time if it looks like one.
///
/// This is the lenient form used to recognize temporal feature properties:
/// full RFC 3339, a naive date-time (assumed UTC), or a bare date.
pub fn recognize_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&nd.and_hms_opt(0, 0, 0)?));
    }

    None
}

/// An ISO 8601 duration, split into calendar and clock components.
///
/// Months need calendar arithmetic and cannot be collapsed into seconds,
/// so the components are kept separate and applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsoDuration {
    /// Calendar months (years folded in).
    pub months: u32,
    /// Days (weeks folded in).
    pub days: u32,
    /// Clock seconds (hours and minutes folded in).
    pub seconds: i64,
}

impl IsoDuration {
    /// The zero duration.
    pub fn zero() -> Self {
        Self {
            months: 0,
            days: 0,
            seconds: 0,
        }
    }

    /// A plain clock duration in seconds.
    pub fn from_seconds(seconds: i64) -> Self {
        Self {
            months: 0,
            days: 0,
            seconds,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.days == 0 && self.seconds == 0
    }

    /// Parse an ISO 8601 duration, e.g. `P7M6DT12H31M12S` or `PT1H`.
    ///
    /// Supports years, months, weeks and days in the date section and
    /// hours, minutes and whole seconds in the time section. At least one
    /// component must be present.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let err = || TimeParseError::InvalidDuration(s.to_string());

        let rest = s.strip_prefix('P').ok_or_else(err)?;
        let (date_part, time_part) = match rest.split_once('T') {
            Some((d, t)) => (d, Some(t)),
            None => (rest, None),
        };

        let mut months: u32 = 0;
        let mut days: u32 = 0;
        let mut seconds: i64 = 0;
        let mut components = 0usize;

        for (value, unit) in split_components(date_part).ok_or_else(err)? {
            components += 1;
            match unit {
                'Y' => months = months.checked_add(value.checked_mul(12).ok_or_else(err)?).ok_or_else(err)?,
                'M' => months = months.checked_add(value).ok_or_else(err)?,
                'W' => days = days.checked_add(value.checked_mul(7).ok_or_else(err)?).ok_or_else(err)?,
                'D' => days = days.checked_add(value).ok_or_else(err)?,
                _ => return Err(err()),
            }
        }

        if let Some(time_part) = time_part {
            if time_part.is_empty() {
                return Err(err());
            }
            for (value, unit) in split_components(time_part).ok_or_else(err)? {
                components += 1;
                let value = i64::from(value);
                match unit {
                    'H' => seconds += value * 3600,
                    'M' => seconds += value * 60,
                    'S' => seconds += value,
                    _ => return Err(err()),
                }
            }
        }

        if components == 0 {
            return Err(err());
        }

        Ok(Self {
            months,
            days,
            seconds,
        })
    }

    /// Add this duration to an instant, calendar months first.
    pub fn add_to(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        start
            .checked_add_months(Months::new(self.months))?
            .checked_add_signed(Duration::days(i64::from(self.days)))?
            .checked_add_signed(Duration::seconds(self.seconds))
    }
}

/// Split `"7M6D"` into `[(7, 'M'), (6, 'D')]`; `None` on malformed input.
fn split_components(part: &str) -> Option<Vec<(u32, char)>> {
    let mut out = Vec::new();
    let mut digits = String::new();
    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else if ch.is_ascii_alphabetic() {
            if digits.is_empty() {
                return None;
            }
            out.push((digits.parse().ok()?, ch));
            digits.clear();
        } else {
            return None;
        }
    }
    if !digits.is_empty() {
        // Trailing digits without a unit
        return None;
    }
    Some(out)
}

/// A closed time interval with its originating duration.
///
/// Both bounds are inclusive. For an interval parsed from `start/duration`
/// the end is `start + duration`; for `start/end` the duration is the
/// clock difference between the two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration: IsoDuration,
}

impl TimeInterval {
    /// An interval covering a single instant.
    pub fn instant(at: DateTime<Utc>) -> Self {
        Self {
            start: at,
            end: at,
            duration: IsoDuration::zero(),
        }
    }

    /// Parse a datetime parameter.
    ///
    /// Accepts:
    /// - a single instant: `2018-02-12T23:20:50Z`
    /// - an instant/instant interval: `2018-03-12T00:00:00Z/2018-03-18T04:01:12Z`
    /// - an instant/duration interval: `2018-02-12T00:00:00Z/P0M6DT12H31M12S`
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let s = s.trim();

        let Some((start_str, rest)) = s.split_once('/') else {
            return Ok(Self::instant(parse_rfc3339(s)?));
        };

        let start = parse_rfc3339(start_str)?;

        if rest.starts_with('P') {
            let duration = IsoDuration::parse(rest)?;
            let end = duration
                .add_to(start)
                .ok_or_else(|| TimeParseError::OutOfRange(s.to_string()))?;
            return Ok(Self {
                start,
                end,
                duration,
            });
        }

        let end = parse_rfc3339(rest)?;
        let duration = IsoDuration::from_seconds((end - start).num_seconds());
        Ok(Self {
            start,
            end,
            duration,
        })
    }

    /// Whether an instant lies inside the interval (bounds inclusive).
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at <= self.end
    }
}
