//! The immutable variant store.
//!
//! A store is built once from a schedule document, validated eagerly, and
//! never mutated afterwards. Every token is parsed and every interval is
//! resolved at construction, so a malformed row fails the load instead of a
//! later query. Since the store cannot change, the resolved intervals are
//! kept alongside the variants and never need invalidating.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::datetime::ProgramCalendar;
use crate::error::{EngineError, Result};
use crate::interval::{resolve_all, ResolvedInterval};
use crate::variant::{Variant, VariantRecord};

/// The New Year's Eve program shipped with the crate.
const BUILTIN_SCHEDULE: &str = include_str!("../data/schedule.json");

/// Title card of a schedule document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
}

/// A whole schedule as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    #[serde(default)]
    pub cover: Cover,
    pub variants: Vec<VariantRecord>,
}

#[derive(Debug, Clone)]
pub struct VariantStore {
    calendar: ProgramCalendar,
    cover: Cover,
    variants: Vec<Variant>,
    intervals: Vec<ResolvedInterval>,
}

impl VariantStore {
    /// Validate `records` and resolve their intervals under `calendar`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::DuplicateId`] if two rows share an id.
    /// - [`EngineError::MalformedTimeToken`] if a date or time token is bad.
    /// - [`EngineError::EmptyInterval`] if a row ends at or before its start.
    pub fn new(records: Vec<VariantRecord>, calendar: ProgramCalendar) -> Result<Self> {
        Self::from_document(
            ScheduleDocument {
                cover: Cover::default(),
                variants: records,
            },
            calendar,
        )
    }

    pub fn from_document(document: ScheduleDocument, calendar: ProgramCalendar) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in &document.variants {
            if !seen.insert(record.id.as_str()) {
                return Err(EngineError::DuplicateId(record.id.clone()));
            }
        }

        let variants = document
            .variants
            .into_iter()
            .map(Variant::from_record)
            .collect::<Result<Vec<_>>>()?;
        let intervals = resolve_all(&variants, &calendar)?;

        info!(
            variants = variants.len(),
            eve_year = calendar.eve_year(),
            "variant store loaded"
        );

        Ok(Self {
            calendar,
            cover: document.cover,
            variants,
            intervals,
        })
    }

    /// Parse a JSON schedule document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidData`] if the JSON does not match the
    /// document shape, plus any error from [`from_document`](Self::from_document).
    pub fn from_json(json: &str, calendar: ProgramCalendar) -> Result<Self> {
        let document: ScheduleDocument =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidData(e.to_string()))?;
        Self::from_document(document, calendar)
    }

    /// The built-in program under the default calendar.
    pub fn builtin() -> Result<Self> {
        Self::builtin_with(ProgramCalendar::default())
    }

    /// The built-in program under another calendar.
    pub fn builtin_with(calendar: ProgramCalendar) -> Result<Self> {
        Self::from_json(BUILTIN_SCHEDULE, calendar)
    }

    pub fn calendar(&self) -> &ProgramCalendar {
        &self.calendar
    }

    pub fn cover(&self) -> &Cover {
        &self.cover
    }

    /// Variants in document order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Resolved intervals, parallel to [`variants`](Self::variants).
    pub fn intervals(&self) -> &[ResolvedInterval] {
        &self.intervals
    }

    /// Each variant paired with its interval, in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&Variant, &ResolvedInterval)> {
        self.variants.iter().zip(&self.intervals)
    }

    /// Resolved start instants, parallel to [`variants`](Self::variants).
    pub fn starts(&self) -> Vec<NaiveDateTime> {
        self.intervals.iter().map(|i| i.start).collect()
    }

    pub fn get(&self, id: &str) -> Option<(&Variant, &ResolvedInterval)> {
        self.entries().find(|(v, _)| v.id() == id)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
