//! The query surface consumed by presentation layers.
//!
//! These functions shape store data into flat, serializable summaries. They
//! hold no logic of their own beyond filtering and ordering; resolution
//! happens in [`interval`](crate::interval) and layout in
//! [`layout`](crate::layout).

use chrono::Local;
use serde::Serialize;

use crate::datetime::{format_instant, ProgramMoment};
use crate::error::{EngineError, Result};
use crate::interval::ResolvedInterval;
use crate::layout::{project_store, TimelineProjection};
use crate::store::VariantStore;
use crate::variant::Variant;

/// One letter as a presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub duration: String,
    pub end_time: String,
    pub description: String,
    pub image: String,
    /// `"DD.MM HH:MM"`.
    pub start_datetime_str: String,
    /// `"DD.MM HH:MM"`, or `None` when the letter runs until further notice.
    pub end_datetime_str: Option<String>,
    pub duration_minutes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl VariantSummary {
    fn new(variant: &Variant, interval: &ResolvedInterval, with_flags: bool) -> Self {
        let meta = variant.meta();
        Self {
            id: variant.id().to_string(),
            title: meta.title.clone(),
            date: variant.date_text().to_string(),
            start_time: variant.start_time_text().to_string(),
            duration: variant.duration().text().to_string(),
            end_time: variant.end_time_text().to_string(),
            description: meta.description.clone(),
            image: meta.image.clone(),
            start_datetime_str: format_instant(&interval.start),
            end_datetime_str: interval.end.as_ref().map(format_instant),
            duration_minutes: variant.duration().minutes(),
            special: with_flags.then_some(variant.is_special()),
            kind: with_flags.then(|| meta.kind.clone()),
        }
    }
}

/// Letters ordered by start instant.
///
/// Without `include_special`, only the main listing is returned: special
/// letters and ids outside the `a`/`b` track convention are left out. With
/// it, every letter is returned and each summary carries its `special` flag
/// and `type`.
pub fn list_variants(store: &VariantStore, include_special: bool) -> Vec<VariantSummary> {
    let mut entries: Vec<_> = store
        .entries()
        .filter(|(variant, _)| include_special || variant.is_listed())
        .collect();
    entries.sort_by_key(|(_, interval)| interval.start);

    entries
        .into_iter()
        .map(|(variant, interval)| VariantSummary::new(variant, interval, include_special))
        .collect()
}

/// A single letter by id.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] if no letter has this id.
pub fn get_variant(store: &VariantStore, id: &str) -> Result<VariantSummary> {
    store
        .get(id)
        .map(|(variant, interval)| VariantSummary::new(variant, interval, false))
        .ok_or_else(|| EngineError::NotFound(id.to_string()))
}

/// The host clock mapped onto the store's program window.
pub fn current_instant(store: &VariantStore) -> Result<ProgramMoment> {
    store.calendar().moment_for(Local::now().naive_local())
}

/// The two-column layout of every tracked letter.
pub fn timeline_projection(store: &VariantStore) -> TimelineProjection {
    project_store(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::ProgramCalendar;

    #[test]
    fn test_main_listing_excludes_special() {
        let store = VariantStore::builtin().unwrap();
        let letters = list_variants(&store, false);
        assert_eq!(letters.len(), 15);
        assert!(letters.iter().all(|l| !l.id.starts_with("special_")));
        assert!(letters.iter().all(|l| l.special.is_none() && l.kind.is_none()));
    }

    #[test]
    fn test_listing_sorted_across_midnight() {
        let store = VariantStore::builtin().unwrap();
        let ids: Vec<_> = list_variants(&store, false)
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids.first().map(String::as_str), Some("1a"));
        assert_eq!(ids.last().map(String::as_str), Some("18a"));
        let chimes = ids.iter().position(|id| id == "14a").unwrap();
        let channels = ids.iter().position(|id| id == "4b").unwrap();
        assert!(chimes < channels);
    }

    #[test]
    fn test_full_listing_includes_special_with_flags() {
        let store = VariantStore::builtin().unwrap();
        let letters = list_variants(&store, true);
        assert_eq!(letters.len(), store.len());
        assert_eq!(letters[0].id, "special_waiting");
        assert_eq!(letters[0].special, Some(true));
        assert_eq!(letters[0].kind.as_deref(), Some("mailbox"));
        assert_eq!(letters.last().unwrap().id, "special_gift");
    }

    #[test]
    fn test_listing_skips_untracked_non_special() {
        let json = r#"{"variants":[
            {"id":"intro","date":"31.12","start_time":"09:00","duration":"30 минут","end_time":"09:30"},
            {"id":"1a","date":"31.12","start_time":"10:00","duration":"1 час","end_time":"11:00"}
        ]}"#;
        let store = VariantStore::from_json(json, ProgramCalendar::default()).unwrap();
        let ids: Vec<_> = list_variants(&store, false).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["1a"]);
    }

    #[test]
    fn test_get_variant_summary() {
        let store = VariantStore::builtin().unwrap();
        let chimes = get_variant(&store, "14a").unwrap();
        assert_eq!(chimes.date, "31.12");
        assert_eq!(chimes.start_time, "23:55");
        assert_eq!(chimes.duration, "25 минут");
        assert_eq!(chimes.end_time, "00:20");
        assert_eq!(chimes.start_datetime_str, "31.12 23:55");
        assert_eq!(chimes.end_datetime_str.as_deref(), Some("01.01 00:20"));
        assert_eq!(chimes.duration_minutes, 25);
        assert_eq!(chimes.image, "🔔");
    }

    #[test]
    fn test_get_variant_open_end_is_none() {
        let json = r#"{"variants":[
            {"id":"18a","date":"01.01","start_time":"03:00","duration":"-","end_time":"-"}
        ]}"#;
        let store = VariantStore::from_json(json, ProgramCalendar::default()).unwrap();
        let summary = get_variant(&store, "18a").unwrap();
        assert_eq!(summary.end_datetime_str, None);
        assert_eq!(summary.duration_minutes, 0);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["end_datetime_str"].is_null());
        assert!(json.get("special").is_none());
    }

    #[test]
    fn test_summary_echoes_authored_tokens() {
        let json = r#"{"variants":[
            {"id":"1a","date":"1.01","start_time":"9:05","duration":"10 минут","end_time":"9:15"}
        ]}"#;
        let store = VariantStore::from_json(json, ProgramCalendar::default()).unwrap();
        let summary = get_variant(&store, "1a").unwrap();
        assert_eq!(summary.date, "1.01");
        assert_eq!(summary.start_time, "9:05");
        assert_eq!(summary.start_datetime_str, "01.01 09:05");
    }

    #[test]
    fn test_get_variant_not_found() {
        let store = VariantStore::builtin().unwrap();
        let err = get_variant(&store, "99z").unwrap_err();
        assert_eq!(err, EngineError::NotFound("99z".to_string()));
        assert!(err.to_string().contains("99z"));
    }

    #[test]
    fn test_current_instant_within_program_window() {
        let store = VariantStore::builtin().unwrap();
        let moment = current_instant(&store).unwrap();
        let cal = store.calendar();
        assert!(moment.date == cal.eve() || moment.date == cal.next_day());
        assert_eq!(moment.time.len(), 5);
    }
}
