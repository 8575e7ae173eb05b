//! Time windows: relative range tokens and explicit start/end bounds.

use core::fmt;
use core::str::FromStr;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// A relative "most recent N units" range accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RangeToken {
    M1,
    M5,
    M15,
    M30,
    #[default]
    H1,
    H3,
    H6,
    H12,
    D1,
    H24,
    D3,
    D7,
    D30,
}

impl RangeToken {
    /// Every token, shortest first.
    pub const ALL: [RangeToken; 13] = [
        RangeToken::M1,
        RangeToken::M5,
        RangeToken::M15,
        RangeToken::M30,
        RangeToken::H1,
        RangeToken::H3,
        RangeToken::H6,
        RangeToken::H12,
        RangeToken::D1,
        RangeToken::H24,
        RangeToken::D3,
        RangeToken::D7,
        RangeToken::D30,
    ];

    /// The token as sent in the `range` query parameter.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RangeToken::M1 => "1m",
            RangeToken::M5 => "5m",
            RangeToken::M15 => "15m",
            RangeToken::M30 => "30m",
            RangeToken::H1 => "1h",
            RangeToken::H3 => "3h",
            RangeToken::H6 => "6h",
            RangeToken::H12 => "12h",
            RangeToken::D1 => "1d",
            RangeToken::H24 => "24h",
            RangeToken::D3 => "3d",
            RangeToken::D7 => "7d",
            RangeToken::D30 => "30d",
        }
    }

    /// Length of the range in milliseconds.
    pub const fn duration_ms(&self) -> i64 {
        match self {
            RangeToken::M1 => MINUTE_MS,
            RangeToken::M5 => 5 * MINUTE_MS,
            RangeToken::M15 => 15 * MINUTE_MS,
            RangeToken::M30 => 30 * MINUTE_MS,
            RangeToken::H1 => HOUR_MS,
            RangeToken::H3 => 3 * HOUR_MS,
            RangeToken::H6 => 6 * HOUR_MS,
            RangeToken::H12 => 12 * HOUR_MS,
            RangeToken::D1 | RangeToken::H24 => DAY_MS,
            RangeToken::D3 => 3 * DAY_MS,
            RangeToken::D7 => 7 * DAY_MS,
            RangeToken::D30 => 30 * DAY_MS,
        }
    }

    /// Next longer token, wrapping to the shortest.
    pub fn next(self) -> Self {
        let idx = self.index();
        RangeToken::ALL[(idx + 1) % RangeToken::ALL.len()]
    }

    /// Next shorter token, wrapping to the longest.
    pub fn prev(self) -> Self {
        let idx = self.index();
        RangeToken::ALL[(idx + RangeToken::ALL.len() - 1) % RangeToken::ALL.len()]
    }

    fn index(self) -> usize {
        RangeToken::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeToken {
    type Err = ParseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RangeToken::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseRangeError(s.to_string()))
    }
}

/// Error returned when a range token is not one the backend accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRangeError(pub String);

impl fmt::Display for ParseRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown range token: {}", self.0)
    }
}

impl std::error::Error for ParseRangeError {}

/// The active time window of a query.
///
/// Exactly one representation is active. Explicit bounds take precedence
/// over a relative range when both are available, see [`TimeWindow::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    /// Most recent span described by a range token.
    Range(RangeToken),
    /// Explicit `[start, end]` bounds in epoch milliseconds.
    Explicit { start: i64, end: i64 },
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::Range(RangeToken::default())
    }
}

impl TimeWindow {
    /// Pick the active window from optional inputs.
    ///
    /// Both `start` and `end` must be present for explicit bounds to apply;
    /// otherwise the range is used. Returns `None` when neither form is complete.
    pub fn resolve(range: Option<RangeToken>, start: Option<i64>, end: Option<i64>) -> Option<Self> {
        match (start, end, range) {
            (Some(start), Some(end), _) => Some(TimeWindow::Explicit { start, end }),
            (_, _, Some(range)) => Some(TimeWindow::Range(range)),
            _ => None,
        }
    }

    /// Length of the window in milliseconds. Inverted explicit bounds yield 0.
    pub fn span_ms(&self) -> i64 {
        match self {
            TimeWindow::Range(token) => token.duration_ms(),
            TimeWindow::Explicit { start, end } => end.saturating_sub(*start).max(0),
        }
    }

    /// The range token, if this is a relative window.
    pub fn range(&self) -> Option<RangeToken> {
        match self {
            TimeWindow::Range(token) => Some(*token),
            TimeWindow::Explicit { .. } => None,
        }
    }

    /// The explicit bounds, if any.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self {
            TimeWindow::Range(_) => None,
            TimeWindow::Explicit { start, end } => Some((*start, *end)),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::Range(token) => write!(f, "last {}", token),
            TimeWindow::Explicit { start, end } => write!(f, "{}..{}", start, end),
        }
    }
}
