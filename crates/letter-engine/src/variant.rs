//! Schedule rows: the raw serde shape and the validated [`Variant`].

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::datetime::{parse_clock_time, DateToken};
use crate::duration::ParsedDuration;
use crate::error::Result;

/// Written in place of an end time or duration that was not declared.
pub const UNSPECIFIED: &str = "-";

/// Glyph used when a row does not name one.
const DEFAULT_IMAGE: &str = "📄";

/// Id suffix of the first presentation track.
const TRACK_A_SUFFIX: char = 'a';

/// Id suffix of the second presentation track.
const TRACK_B_SUFFIX: char = 'b';

/// One row of a schedule document, exactly as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub id: String,
    pub date: String,
    pub start_time: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tv: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default)]
    pub special: bool,
    #[serde(default, rename = "type")]
    pub kind: String,
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

/// Which of the two presentation columns a variant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    A,
    B,
}

impl Track {
    /// Classify an id by its last character. Ids outside the `a`/`b`
    /// convention (e.g. `special_gift`) have no track.
    pub fn of(id: &str) -> Option<Track> {
        match id.chars().last() {
            Some(TRACK_A_SUFFIX) => Some(Track::A),
            Some(TRACK_B_SUFFIX) => Some(Track::B),
            _ => None,
        }
    }
}

/// How a variant's end instant is obtained, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndRule {
    /// An explicit end date was given; end = that date at the end time.
    Explicit { date: DateToken, time: NaiveTime },
    /// An end time was declared; end = start + parsed duration.
    Duration,
    /// Nothing declared; end = start of the next variant, if any.
    NextVariant,
}

/// Presentation fields the engine carries but never interprets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariantMeta {
    pub title: String,
    pub description: String,
    pub location: String,
    pub tv: String,
    pub image: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A validated schedule row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    id: String,
    date: DateToken,
    date_text: String,
    start_time: NaiveTime,
    start_time_text: String,
    duration: ParsedDuration,
    end_time: String,
    end_rule: EndRule,
    special: bool,
    meta: VariantMeta,
}

impl Variant {
    /// Validate a raw row.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedTimeToken`](crate::EngineError::MalformedTimeToken)
    /// when the date, start time, or (with an end date) end time cannot be parsed.
    pub fn from_record(record: VariantRecord) -> Result<Self> {
        let date = record.date.parse::<DateToken>()?;
        let start_time = parse_clock_time(&record.start_time)?;
        let end_time = record.end_time.unwrap_or_default();

        let end_rule = match record.end_date.as_deref() {
            Some(end_date) if !end_date.is_empty() => EndRule::Explicit {
                date: end_date.parse()?,
                time: parse_clock_time(&end_time)?,
            },
            _ if !end_time.is_empty() && end_time != UNSPECIFIED => EndRule::Duration,
            _ => EndRule::NextVariant,
        };

        Ok(Self {
            id: record.id,
            date,
            date_text: record.date,
            start_time,
            start_time_text: record.start_time,
            duration: ParsedDuration::parse(record.duration),
            end_time,
            end_rule,
            special: record.special,
            meta: VariantMeta {
                title: record.title,
                description: record.description,
                location: record.location,
                tv: record.tv,
                image: record.image,
                kind: record.kind,
            },
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> DateToken {
        self.date
    }

    /// The date token as authored.
    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    /// The start time as authored.
    pub fn start_time_text(&self) -> &str {
        &self.start_time_text
    }

    pub fn duration(&self) -> &ParsedDuration {
        &self.duration
    }

    /// The end time text as authored (`""` when absent).
    pub fn end_time_text(&self) -> &str {
        &self.end_time
    }

    pub fn end_rule(&self) -> EndRule {
        self.end_rule
    }

    pub fn is_special(&self) -> bool {
        self.special
    }

    pub fn track(&self) -> Option<Track> {
        Track::of(&self.id)
    }

    /// Whether the variant belongs in the main chronological listing.
    pub fn is_listed(&self) -> bool {
        !self.special && self.track().is_some()
    }

    pub fn meta(&self) -> &VariantMeta {
        &self.meta
    }

    pub fn title(&self) -> &str {
        &self.meta.title
    }
}
