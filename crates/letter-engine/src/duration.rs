//! Free-text duration parsing.
//!
//! Schedule rows describe their length in prose: `"1.5 часа"`, `"30 минут"`,
//! `"1 час+"`, or `"-"` when nothing is declared. [`parse_duration_minutes`]
//! turns that prose into whole minutes. It never fails: text without a
//! recognised unit or without a number is "unspecified" and yields zero.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Unit word for hours. Matches "час", "часа", "часов" after lowercasing.
const HOUR_UNIT: &str = "час";

/// Unit word for minutes. Matches "минут", "минуты", "минута" after lowercasing.
const MINUTE_UNIT: &str = "минут";

/// Marks an open-ended "at least" duration such as `"1 час+"`.
const OPEN_ENDED_MARKER: char = '+';

/// Length credited to an open-ended hour entry.
const OPEN_ENDED_MINUTES: i64 = 60;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid decimal regex"));

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid integer regex"));

/// A duration description together with the minutes it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDuration {
    text: String,
    minutes: i64,
}

impl ParsedDuration {
    /// Parse a duration description. Never fails; see [`parse_duration_minutes`].
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let minutes = parse_duration_minutes(&text);
        Self { text, minutes }
    }

    /// The description exactly as authored.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    /// Whether the description carried no usable length.
    pub fn is_unspecified(&self) -> bool {
        self.minutes == 0
    }
}

/// Convert a free-text duration into minutes.
///
/// # Rules
///
/// 1. Empty input → `0`.
/// 2. Contains the hour unit (case-insensitive):
///    - with a `+` marker → exactly `60`, whatever the number says;
///    - otherwise the first decimal number times 60, truncated toward zero
///      (`"1.58 часа"` → `94`).
/// 3. Contains the minute unit → the first integer found.
/// 4. Anything else → `0`.
///
/// # Examples
///
/// ```
/// use letter_engine::duration::parse_duration_minutes;
///
/// assert_eq!(parse_duration_minutes("1.5 часа"), 90);
/// assert_eq!(parse_duration_minutes("30 минут"), 30);
/// assert_eq!(parse_duration_minutes("1 час+"), 60);
/// assert_eq!(parse_duration_minutes("-"), 0);
/// ```
pub fn parse_duration_minutes(text: &str) -> i64 {
    if text.is_empty() {
        return 0;
    }
    let lowered = text.to_lowercase();

    if lowered.contains(HOUR_UNIT) {
        if lowered.contains(OPEN_ENDED_MARKER) {
            return OPEN_ENDED_MINUTES;
        }
        return DECIMAL
            .find(&lowered)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|hours| (hours * 60.0).trunc() as i64)
            .unwrap_or(0);
    }

    if lowered.contains(MINUTE_UNIT) {
        return INTEGER
            .find(&lowered)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0);
    }

    0
}
