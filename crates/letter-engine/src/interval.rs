//! Start/end resolution for schedule variants.
//!
//! A variant's start is always its date token plus start time. Its end comes
//! from the first rule that applies:
//!
//! 1. an explicit end date (covers entries that run past midnight);
//! 2. a declared end time, in which case the parsed duration is added to the
//!    start;
//! 3. otherwise the start of the chronologically next variant. When nothing
//!    starts later the end stays absent: the entry runs until further notice.
//!
//! Rule 3 is a derived relationship over the start-ordered view of the whole
//! set, recomputed from the variants rather than stored as links.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::datetime::ProgramCalendar;
use crate::error::{EngineError, Result};
use crate::variant::{EndRule, Variant};

/// Which rule produced a variant's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndSource {
    ExplicitDate,
    Duration,
    NextVariant,
    /// No rule applied; the end is absent.
    Open,
}

/// The computed `[start, end)` pair for one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedInterval {
    pub variant_id: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub source: EndSource,
}

impl ResolvedInterval {
    /// Half-open containment: `start <= instant < end`. An absent end
    /// contains every instant from the start onwards.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && self.end.is_none_or(|end| instant < end)
    }

    /// Length in whole minutes, if the end is known.
    pub fn minutes(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_minutes())
    }
}

/// The instant a variant starts.
pub fn resolve_start(variant: &Variant, calendar: &ProgramCalendar) -> Result<NaiveDateTime> {
    calendar.resolve(variant.date(), variant.start_time())
}

/// The instant a variant ends, judged against every variant in `all`.
///
/// `Ok(None)` means no rule produced an end; that is a valid terminal state,
/// not an error.
pub fn resolve_end(
    variant: &Variant,
    all: &[Variant],
    calendar: &ProgramCalendar,
) -> Result<Option<NaiveDateTime>> {
    let starts = resolve_starts(all, calendar)?;
    let start = resolve_start(variant, calendar)?;
    let (end, _) = end_from_starts(variant, start, &starts, calendar)?;
    Ok(end)
}

/// Resolve every variant in `all`, in input order.
///
/// # Errors
///
/// Returns [`EngineError::MalformedTimeToken`] when a token names a day that
/// does not exist, [`EngineError::InvalidData`] when a duration overflows the
/// calendar, and [`EngineError::EmptyInterval`] when a resolved end is not
/// strictly after its start.
pub fn resolve_all(all: &[Variant], calendar: &ProgramCalendar) -> Result<Vec<ResolvedInterval>> {
    let starts = resolve_starts(all, calendar)?;

    all.iter()
        .zip(&starts)
        .map(|(variant, &start)| {
            let (end, source) = end_from_starts(variant, start, &starts, calendar)?;
            if let Some(end) = end {
                if end <= start {
                    return Err(EngineError::EmptyInterval {
                        id: variant.id().to_string(),
                        start,
                        end,
                    });
                }
            }
            Ok(ResolvedInterval {
                variant_id: variant.id().to_string(),
                start,
                end,
                source,
            })
        })
        .collect()
}

/// Variants starting strictly after `instant`, ascending by start.
///
/// `starts` must be parallel to `variants`. Variants sharing a start keep
/// their input order.
pub fn later_starts<'a>(
    variants: &'a [Variant],
    starts: &[NaiveDateTime],
    instant: NaiveDateTime,
) -> Vec<(&'a Variant, NaiveDateTime)> {
    let mut later: Vec<_> = variants
        .iter()
        .zip(starts.iter().copied())
        .filter(|(_, start)| *start > instant)
        .collect();
    later.sort_by_key(|(_, start)| *start);
    later
}

fn resolve_starts(all: &[Variant], calendar: &ProgramCalendar) -> Result<Vec<NaiveDateTime>> {
    all.iter().map(|v| resolve_start(v, calendar)).collect()
}

fn end_from_starts(
    variant: &Variant,
    start: NaiveDateTime,
    starts: &[NaiveDateTime],
    calendar: &ProgramCalendar,
) -> Result<(Option<NaiveDateTime>, EndSource)> {
    match variant.end_rule() {
        EndRule::Explicit { date, time } => {
            Ok((Some(calendar.resolve(date, time)?), EndSource::ExplicitDate))
        }
        EndRule::Duration => {
            let minutes = variant.duration().minutes();
            let end = Duration::try_minutes(minutes)
                .and_then(|delta| start.checked_add_signed(delta))
                .ok_or_else(|| {
                    EngineError::InvalidData(format!(
                        "duration of '{}' ({minutes} minutes) is out of range",
                        variant.id()
                    ))
                })?;
            Ok((Some(end), EndSource::Duration))
        }
        EndRule::NextVariant => {
            let next = starts.iter().copied().filter(|s| *s > start).min();
            match next {
                Some(end) => {
                    debug!(id = variant.id(), %end, "end inferred from next variant");
                    Ok((Some(end), EndSource::NextVariant))
                }
                None => {
                    debug!(id = variant.id(), "no later variant; end left open");
                    Ok((None, EndSource::Open))
                }
            }
        }
    }
}
