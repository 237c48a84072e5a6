//! Two-track timeline projection.
//!
//! Tracked variants are split into column A (id suffix `a`) and column B
//! (id suffix `b`). Every other id stays out of the projection. Each column
//! is ordered by start, idle stretches between neighbours become explicit
//! gap items, and the whole thing is bounded by a global min/max so a
//! renderer can scale it.
//!
//! Column B is always drawn narrow. A column A item is narrow only while it
//! shares time with something in column B.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::datetime::DateToken;
use crate::interval::ResolvedInterval;
use crate::store::VariantStore;
use crate::variant::{Track, Variant};

/// A real variant placed in a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackEntry {
    pub id: String,
    pub title: String,
    pub date: DateToken,
    pub start_time: String,
    pub start_datetime: NaiveDateTime,
    pub end_datetime: NaiveDateTime,
    /// Minutes parsed from the duration text, not the layout length.
    pub duration_minutes: i64,
    pub is_narrow: bool,
}

/// Idle time between two consecutive entries of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub start_datetime: NaiveDateTime,
    pub end_datetime: NaiveDateTime,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackItem {
    Variant(TrackEntry),
    Gap(Gap),
}

impl TrackItem {
    pub fn start(&self) -> NaiveDateTime {
        match self {
            TrackItem::Variant(e) => e.start_datetime,
            TrackItem::Gap(g) => g.start_datetime,
        }
    }

    pub fn end(&self) -> NaiveDateTime {
        match self {
            TrackItem::Variant(e) => e.end_datetime,
            TrackItem::Gap(g) => g.end_datetime,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, TrackItem::Gap(_))
    }
}

/// Both columns plus the bounds needed to scale them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimelineProjection {
    pub column_a: Vec<TrackItem>,
    pub column_b: Vec<TrackItem>,
    pub min_time: Option<NaiveDateTime>,
    pub max_time: Option<NaiveDateTime>,
    pub total_minutes: i64,
}

/// Whether `[s1, e1)` and `[s2, e2)` share any instant. Touching endpoints
/// do not overlap.
pub fn intervals_overlap(
    s1: NaiveDateTime,
    e1: NaiveDateTime,
    s2: NaiveDateTime,
    e2: NaiveDateTime,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Project every variant in `store`.
pub fn project_store(store: &VariantStore) -> TimelineProjection {
    project_timeline(store.entries())
}

/// Project the given variants with their resolved intervals.
///
/// An entry without a resolved end is stretched to the latest end among the
/// projected entries; if none of them has an end it is dropped. That fallback
/// can lie before the entry's own start, so a renderer may receive an item
/// with `end_datetime < start_datetime`. Such an item does not widen
/// `max_time`.
pub fn project_timeline<'a, I>(entries: I) -> TimelineProjection
where
    I: IntoIterator<Item = (&'a Variant, &'a ResolvedInterval)>,
{
    let mut tracked: Vec<(Track, &Variant, &ResolvedInterval)> = entries
        .into_iter()
        .filter_map(|(v, i)| v.track().map(|track| (track, v, i)))
        .collect();
    tracked.sort_by_key(|(_, _, interval)| interval.start);

    let fallback_end = tracked.iter().filter_map(|(_, _, i)| i.end).max();

    let mut column_a = Vec::new();
    let mut column_b = Vec::new();
    for (track, variant, interval) in tracked {
        let Some(end) = interval.end.or(fallback_end) else {
            continue;
        };
        let entry = TrackEntry {
            id: variant.id().to_string(),
            title: variant.title().to_string(),
            date: variant.date(),
            start_time: variant.start_time_text().to_string(),
            start_datetime: interval.start,
            end_datetime: end,
            duration_minutes: variant.duration().minutes(),
            is_narrow: track == Track::B,
        };
        match track {
            Track::A => column_a.push(entry),
            Track::B => column_b.push(entry),
        }
    }

    for a in &mut column_a {
        a.is_narrow = column_b.iter().any(|b| {
            intervals_overlap(a.start_datetime, a.end_datetime, b.start_datetime, b.end_datetime)
        });
    }

    let bounds = column_a.iter().chain(&column_b);
    let min_time = bounds.clone().map(|e| e.start_datetime).min();
    let max_time = bounds.map(|e| e.end_datetime).max();
    let total_minutes = match (min_time, max_time) {
        (Some(min), Some(max)) => (max - min).num_minutes(),
        _ => 0,
    };

    TimelineProjection {
        column_a: with_gaps(column_a),
        column_b: with_gaps(column_b),
        min_time,
        max_time,
        total_minutes,
    }
}

/// Interleave gap items wherever an entry ends strictly before the next
/// one starts. Touching or overlapping neighbours get no gap.
fn with_gaps(column: Vec<TrackEntry>) -> Vec<TrackItem> {
    let mut items = Vec::with_capacity(column.len() * 2);
    let mut prev_end: Option<NaiveDateTime> = None;

    for entry in column {
        if let Some(gap_start) = prev_end {
            if gap_start < entry.start_datetime {
                items.push(TrackItem::Gap(Gap {
                    start_datetime: gap_start,
                    end_datetime: entry.start_datetime,
                    duration_minutes: (entry.start_datetime - gap_start).num_minutes(),
                }));
            }
        }
        prev_end = Some(entry.end_datetime);
        items.push(TrackItem::Variant(entry));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::{resolve_instant, ProgramCalendar};

    fn t(time: &str) -> NaiveDateTime {
        resolve_instant("31.12", time).unwrap()
    }

    fn store(json_variants: &str) -> VariantStore {
        let json = format!(r#"{{"variants":[{json_variants}]}}"#);
        VariantStore::from_json(&json, ProgramCalendar::default()).unwrap()
    }

    fn entry_ids(items: &[TrackItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| match i {
                TrackItem::Variant(e) => e.id.clone(),
                TrackItem::Gap(g) => format!("gap:{}", g.duration_minutes),
            })
            .collect()
    }

    // ── overlap ─────────────────────────────────────────────────────────

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        assert!(!intervals_overlap(t("10:00"), t("11:00"), t("11:00"), t("12:00")));
        assert!(!intervals_overlap(t("11:00"), t("12:00"), t("10:00"), t("11:00")));
    }

    #[test]
    fn test_one_minute_overlap() {
        assert!(intervals_overlap(t("10:00"), t("11:00"), t("10:59"), t("12:00")));
        assert!(intervals_overlap(t("10:59"), t("12:00"), t("10:00"), t("11:00")));
    }

    #[test]
    fn test_containment_overlaps() {
        assert!(intervals_overlap(t("10:00"), t("13:00"), t("11:00"), t("12:00")));
    }

    // ── gaps ────────────────────────────────────────────────────────────

    #[test]
    fn test_no_gap_between_touching_entries() {
        let s = store(
            r#"{"id":"1a","date":"31.12","start_time":"10:00","duration":"1 час","end_time":"11:00"},
               {"id":"2a","date":"31.12","start_time":"11:00","duration":"1 час","end_time":"12:00"}"#,
        );
        let p = project_store(&s);
        assert_eq!(entry_ids(&p.column_a), vec!["1a", "2a"]);
    }

    #[test]
    fn test_fifteen_minute_gap() {
        let s = store(
            r#"{"id":"1a","date":"31.12","start_time":"10:00","duration":"1 час","end_time":"11:00"},
               {"id":"2a","date":"31.12","start_time":"11:15","duration":"1 час","end_time":"12:15"}"#,
        );
        let p = project_store(&s);
        assert_eq!(entry_ids(&p.column_a), vec!["1a", "gap:15", "2a"]);
        let gap = &p.column_a[1];
        assert!(gap.is_gap());
        assert_eq!(gap.start(), t("11:00"));
        assert_eq!(gap.end(), t("11:15"));
    }

    #[test]
    fn test_no_gap_between_overlapping_entries() {
        let s = store(
            r#"{"id":"1b","date":"31.12","start_time":"10:00","duration":"2 часа","end_time":"12:00"},
               {"id":"2b","date":"31.12","start_time":"11:00","duration":"1 час","end_time":"12:00"}"#,
        );
        let p = project_store(&s);
        assert_eq!(entry_ids(&p.column_b), vec!["1b", "2b"]);
    }

    // ── narrow flags ────────────────────────────────────────────────────

    #[test]
    fn test_narrow_only_when_overlapping_column_b() {
        let s = store(
            r#"{"id":"1a","date":"31.12","start_time":"10:00","duration":"1 час","end_time":"11:00"},
               {"id":"2a","date":"31.12","start_time":"11:00","duration":"1 час","end_time":"12:00"},
               {"id":"1b","date":"31.12","start_time":"11:30","duration":"1 час","end_time":"12:30"}"#,
        );
        let p = project_store(&s);
        let narrow: Vec<_> = p
            .column_a
            .iter()
            .chain(&p.column_b)
            .filter_map(|i| match i {
                TrackItem::Variant(e) => Some((e.id.as_str(), e.is_narrow)),
                TrackItem::Gap(_) => None,
            })
            .collect();
        assert_eq!(narrow, vec![("1a", false), ("2a", true), ("1b", true)]);
    }

    // ── bounds and exclusions ───────────────────────────────────────────

    #[test]
    fn test_untracked_ids_excluded() {
        let s = store(
            r#"{"id":"special_gift","date":"31.12","start_time":"09:00","duration":"30 минут","end_time":"09:30"},
               {"id":"1a","date":"31.12","start_time":"10:00","duration":"1 час","end_time":"11:00"}"#,
        );
        let p = project_store(&s);
        assert_eq!(entry_ids(&p.column_a), vec!["1a"]);
        assert!(p.column_b.is_empty());
        assert_eq!(p.min_time, Some(t("10:00")));
        assert_eq!(p.max_time, Some(t("11:00")));
        assert_eq!(p.total_minutes, 60);
    }

    #[test]
    fn test_open_entry_stretched_to_max_end() {
        let s = store(
            r#"{"id":"1b","date":"31.12","start_time":"10:00","duration":"3 часа","end_time":"13:00"},
               {"id":"2a","date":"31.12","start_time":"11:00","duration":"-","end_time":"-"}"#,
        );
        let p = project_store(&s);
        match &p.column_a[0] {
            TrackItem::Variant(e) => {
                assert_eq!(e.end_datetime, t("13:00"));
                assert!(e.is_narrow);
            }
            TrackItem::Gap(_) => panic!("expected variant"),
        }
        assert_eq!(p.total_minutes, 180);
    }

    #[test]
    fn test_open_entry_dropped_without_any_end() {
        let s = store(
            r#"{"id":"1a","date":"31.12","start_time":"10:00","duration":"-","end_time":"-"}"#,
        );
        let p = project_store(&s);
        assert_eq!(p, TimelineProjection::default());
    }

    #[test]
    fn test_fallback_end_can_precede_start() {
        let s = store(
            r#"{"id":"1a","date":"31.12","start_time":"10:00","duration":"1 час","end_time":"11:00"},
               {"id":"2a","date":"31.12","start_time":"12:00","duration":"-","end_time":"-"}"#,
        );
        let p = project_store(&s);
        assert_eq!(entry_ids(&p.column_a), vec!["1a", "gap:60", "2a"]);

        let last = p.column_a.last().unwrap();
        assert_eq!(last.start(), t("12:00"));
        assert_eq!(last.end(), t("11:00"));
        assert_eq!(p.max_time, Some(t("11:00")));
        assert_eq!(p.total_minutes, 60);
    }

    #[test]
    fn test_empty_projection() {
        let p = project_store(&store(""));
        assert!(p.column_a.is_empty() && p.column_b.is_empty());
        assert_eq!(p.min_time, None);
        assert_eq!(p.max_time, None);
        assert_eq!(p.total_minutes, 0);
    }

    #[test]
    fn test_builtin_projection() {
        let s = VariantStore::builtin().unwrap();
        let p = project_store(&s);

        assert_eq!(p.min_time, Some(t("15:30")));
        // 18a closes at 03:30 when the gift letter starts
        assert_eq!(p.max_time, Some(resolve_instant("01.01", "03:30").unwrap()));
        assert_eq!(p.total_minutes, 12 * 60);

        // 1a (15:30-20:30) overlaps 2b (19:30-21:00)
        match &p.column_a[0] {
            TrackItem::Variant(e) => {
                assert_eq!(e.id, "1a");
                assert!(e.is_narrow);
            }
            TrackItem::Gap(_) => panic!("expected 1a first"),
        }
        assert!(p.column_b.iter().all(|i| match i {
            TrackItem::Variant(e) => e.is_narrow,
            TrackItem::Gap(_) => true,
        }));
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let s = store(
            r#"{"id":"1a","date":"31.12","start_time":"10:00","duration":"1 час","end_time":"11:00"},
               {"id":"2a","date":"31.12","start_time":"11:15","duration":"1 час","end_time":"12:15"}"#,
        );
        let json = serde_json::to_value(project_store(&s)).unwrap();
        assert_eq!(json["column_a"][0]["type"], "variant");
        assert_eq!(json["column_a"][1]["type"], "gap");
        assert_eq!(json["column_a"][1]["duration_minutes"], 15);
        assert_eq!(json["total_minutes"], 135);
    }
}
