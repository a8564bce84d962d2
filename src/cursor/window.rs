//! Window computation

use crate::error::{Error, Result};
use crate::types::CursorFormat;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::fmt;

const MILLIS_PER_DAY: i64 = 86_400_000;

// ============================================================================
// Granularity
// ============================================================================

/// Smallest addressable time unit of a cursor
///
/// All window boundaries lie on multiples of the granularity since the
/// Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Granularity {
    millis: i64,
}

impl Granularity {
    /// One millisecond
    pub const MILLISECOND: Granularity = Granularity { millis: 1 };

    /// One calendar day (UTC)
    pub const DAY: Granularity = Granularity {
        millis: MILLIS_PER_DAY,
    };

    /// Parse a compact duration such as `1ms` or `1d`
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_duration(parse_duration(s)?)
    }

    /// Create a granularity from a positive duration
    pub fn from_duration(duration: Duration) -> Result<Self> {
        let millis = duration.num_milliseconds();
        if millis <= 0 {
            return Err(Error::invalid_config(
                "cursor_granularity",
                "must be a positive duration",
            ));
        }
        Ok(Self { millis })
    }

    /// Granularity as a duration
    pub fn as_duration(&self) -> Duration {
        Duration::milliseconds(self.millis)
    }

    /// Round an instant down onto the grid
    pub fn truncate(&self, dt: DateTime<Utc>) -> DateTime<Utc> {
        let ms = dt.timestamp_millis();
        let floor = ms - ms.rem_euclid(self.millis);
        DateTime::from_timestamp_millis(floor).unwrap_or(dt)
    }

    /// Whether this granularity is a whole number of days
    pub fn is_whole_days(&self) -> bool {
        self.millis % MILLIS_PER_DAY == 0
    }

    /// Whether a duration is an exact multiple of this granularity
    pub fn divides(&self, duration: Duration) -> bool {
        duration.num_milliseconds() % self.millis == 0
    }
}

/// Parse a compact duration string like "31d", "2h", "30m", "1ms"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    // "ms" must be tried before "m" and "s"
    let (num_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else if let Some(stripped) = s.strip_suffix('d') {
        (stripped, "d")
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, "h")
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, "m")
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, "s")
    } else if let Some(stripped) = s.strip_suffix('w') {
        (stripped, "w")
    } else {
        // Assume days if no suffix
        (s, "d")
    };

    let num: i64 = num_str
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("Invalid duration: '{s}'")))?;

    if num <= 0 {
        return Err(Error::config(format!("Duration must be positive: '{s}'")));
    }

    let duration = match unit {
        "w" => Duration::weeks(num),
        "d" => Duration::days(num),
        "h" => Duration::hours(num),
        "m" => Duration::minutes(num),
        "s" => Duration::seconds(num),
        _ => Duration::milliseconds(num),
    };

    Ok(duration)
}

// ============================================================================
// TimeWindow
// ============================================================================

/// A half-open extraction interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
    /// Grid the bounds lie on
    pub granularity: Granularity,
}

impl TimeWindow {
    /// Length of the window
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// Both bounds in a cursor format
    pub fn formatted(&self, format: CursorFormat) -> (String, String) {
        (format.format(self.start), format.format(self.end))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.granularity.is_whole_days() {
            write!(
                f,
                "[{}, {})",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        } else {
            write!(
                f,
                "[{}, {})",
                self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
                self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
            )
        }
    }
}

// ============================================================================
// WindowConfig
// ============================================================================

/// How a stream's time range is split into windows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Configured start of the range
    pub start_date: DateTime<Utc>,
    /// Maximum span of one window
    pub step: Duration,
    /// Grid window bounds lie on
    pub granularity: Granularity,
    /// Representation of bounds and checkpoints
    pub cursor_format: CursorFormat,
}

impl WindowConfig {
    /// Create a validated window configuration
    pub fn new(
        start_date: DateTime<Utc>,
        step: Duration,
        granularity: Granularity,
        cursor_format: CursorFormat,
    ) -> Result<Self> {
        let config = Self {
            start_date,
            step,
            granularity,
            cursor_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that bounds can be represented exactly
    pub fn validate(&self) -> Result<()> {
        if self.step <= Duration::zero() {
            return Err(Error::invalid_config("step", "must be a positive duration"));
        }
        if !self.granularity.divides(self.step) {
            return Err(Error::invalid_config(
                "step",
                "must be a whole multiple of the cursor granularity",
            ));
        }
        if self.cursor_format == CursorFormat::Date && !self.granularity.is_whole_days() {
            return Err(Error::invalid_config(
                "cursor_granularity",
                "date cursors need a granularity of whole days",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Windows
// ============================================================================

/// Derive the window sequence covering `[max(checkpoint, start_date), truncate(now))`
///
/// Both ends are truncated onto the granularity grid first, so coverage
/// stops at `truncate(now)`: with day granularity the current partial day
/// is left for the next run. The sequence is empty when the truncated
/// start is not before `truncate(now)`.
pub fn windows(
    config: &WindowConfig,
    checkpoint: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Windows {
    let effective_start = match checkpoint {
        Some(cp) if cp > config.start_date => cp,
        _ => config.start_date,
    };

    Windows {
        next: config.granularity.truncate(effective_start),
        end: config.granularity.truncate(now),
        step: config.step,
        granularity: config.granularity,
    }
}

/// Lazy, finite iterator over consecutive windows
#[derive(Debug, Clone)]
pub struct Windows {
    next: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    granularity: Granularity,
}

impl Windows {
    /// Exclusive end of the whole range
    pub fn range_end(&self) -> DateTime<Utc> {
        self.end
    }
}

impl Iterator for Windows {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<TimeWindow> {
        if self.next >= self.end {
            return None;
        }

        let start = self.next;
        let end = match start.checked_add_signed(self.step) {
            Some(candidate) if candidate < self.end => candidate,
            _ => self.end,
        };
        self.next = end;

        Some(TimeWindow {
            start,
            end,
            granularity: self.granularity,
        })
    }
}

impl std::iter::FusedIterator for Windows {}
