//! # letter-engine
//!
//! Temporal resolution for a hand-authored New Year's Eve program.
//!
//! Each program entry ("letter", or variant) is written with partial timing
//! information: a start, and then maybe an explicit end date, maybe a
//! free-text duration, maybe nothing at all. The engine derives a concrete
//! `[start, end)` interval for every entry and answers questions about them:
//! what is on right now, what comes next, and how the two presentation
//! columns lay out against each other.
//!
//! ## Modules
//!
//! - [`duration`] — free-text duration → minutes
//! - [`datetime`] — `"DD.MM"` / `"HH:MM"` tokens → instants, program calendar
//! - [`variant`] — raw and validated schedule rows
//! - [`store`] — immutable, eagerly validated variant store
//! - [`interval`] — start/end resolution with the three-tier end fallback
//! - [`query`] — active-at, next-after, starts-at, table of contents
//! - [`layout`] — two-track overlap and gap projection
//! - [`letters`] — summaries for presentation layers
//! - [`error`] — Error types

pub mod datetime;
pub mod duration;
pub mod error;
pub mod interval;
pub mod layout;
pub mod letters;
pub mod query;
pub mod store;
pub mod variant;

pub use datetime::{
    format_instant, parse_clock_time, resolve_instant, DateToken, ProgramCalendar, ProgramMoment,
};
pub use duration::{parse_duration_minutes, ParsedDuration};
pub use error::EngineError;
pub use interval::{resolve_all, resolve_end, resolve_start, EndSource, ResolvedInterval};
pub use layout::{
    intervals_overlap, project_store, project_timeline, Gap, TimelineProjection, TrackEntry,
    TrackItem,
};
pub use letters::{current_instant, get_variant, list_variants, timeline_projection, VariantSummary};
pub use query::{
    current_slot, next_variants_after, next_variants_after_instant, table_of_contents,
    variants_active_at, variants_starting_at, TocEntry, TocVariant,
};
pub use store::{Cover, ScheduleDocument, VariantStore};
pub use variant::{EndRule, Track, Variant, VariantMeta, VariantRecord};
