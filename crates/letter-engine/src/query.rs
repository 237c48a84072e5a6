//! Temporal queries over a [`VariantStore`].
//!
//! All queries read the store's resolved intervals; none of them mutate
//! anything, so a shared store can serve concurrent callers.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::datetime::{parse_clock_time, DateToken, TIME_FORMAT};
use crate::error::Result;
use crate::interval::later_starts;
use crate::store::VariantStore;
use crate::variant::Variant;

/// Variants whose interval contains `instant`, in document order.
///
/// Containment is half-open: a variant on `[A, B)` is active at `A` but not
/// at `B`. A variant with no end is active from its start onwards.
pub fn variants_active_at(store: &VariantStore, instant: NaiveDateTime) -> Vec<&Variant> {
    store
        .entries()
        .filter(|(_, interval)| interval.contains(instant))
        .map(|(variant, _)| variant)
        .collect()
}

/// [`variants_active_at`] for the instant `now` maps to in the program window.
pub fn current_slot(store: &VariantStore, now: NaiveDateTime) -> Result<Vec<&Variant>> {
    let moment = store.calendar().moment_for(now)?;
    Ok(variants_active_at(store, moment.instant))
}

/// Variants starting strictly after the given tokens, ascending by start.
///
/// # Errors
///
/// Returns [`EngineError::MalformedTimeToken`](crate::EngineError::MalformedTimeToken)
/// if either token is malformed.
pub fn next_variants_after<'a>(
    store: &'a VariantStore,
    date_token: &str,
    time_token: &str,
) -> Result<Vec<&'a Variant>> {
    let instant = store.calendar().resolve_tokens(date_token, time_token)?;
    Ok(next_variants_after_instant(store, instant))
}

/// Variants starting strictly after `instant`, ascending by start.
pub fn next_variants_after_instant(store: &VariantStore, instant: NaiveDateTime) -> Vec<&Variant> {
    later_starts(store.variants(), &store.starts(), instant)
        .into_iter()
        .map(|(variant, _)| variant)
        .collect()
}

/// Variants whose date and start time equal the given tokens.
pub fn variants_starting_at<'a>(
    store: &'a VariantStore,
    date_token: &str,
    time_token: &str,
) -> Result<Vec<&'a Variant>> {
    let date = date_token.parse::<DateToken>()?;
    let time = parse_clock_time(time_token)?;
    Ok(store
        .variants()
        .iter()
        .filter(|v| v.date() == date && v.start_time() == time)
        .collect())
}

/// One start slot in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub date: DateToken,
    pub time: String,
    pub variants: Vec<TocVariant>,
    #[serde(skip)]
    start: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocVariant {
    pub id: String,
    pub title: String,
}

/// Every distinct `(date, start time)` slot with the variants starting in it,
/// slots ascending by start instant.
pub fn table_of_contents(store: &VariantStore) -> Vec<TocEntry> {
    let mut toc: Vec<TocEntry> = Vec::new();

    for (variant, interval) in store.entries() {
        let item = TocVariant {
            id: variant.id().to_string(),
            title: variant.title().to_string(),
        };
        match toc
            .iter_mut()
            .find(|e| e.date == variant.date() && e.start == interval.start)
        {
            Some(entry) => entry.variants.push(item),
            None => toc.push(TocEntry {
                date: variant.date(),
                time: variant.start_time().format(TIME_FORMAT).to_string(),
                variants: vec![item],
                start: interval.start,
            }),
        }
    }

    toc.sort_by_key(|e| e.start);
    toc
}
