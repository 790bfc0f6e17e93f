use std::fmt::Display;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::{BlockId, StayDates, UnitId};

/// Longest note kept for blocks mirrored from a feed.
pub const SYNC_NOTE_LIMIT: usize = 120;

/// Where a block came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockSource {
    /// Entered by the administrator.
    Manual,
    /// Created by a guest booking on this site.
    Direct,
    /// Live feed event merged into public availability; never stored.
    Ical,
    /// Mirrored from the named OTA's feed (lower-cased OTA name).
    Ota(String),
}

/// Prefix keeping OTA tags apart from the reserved sources.
const OTA_PREFIX: &str = "ota:";

impl BlockSource {
    /// Tag for blocks mirrored from the feed of `ota`.
    ///
    /// Always an [`BlockSource::Ota`]: names that read as a reserved source,
    /// blank names and names already carrying the prefix are namespaced, so a
    /// feed sync can never replace manual blocks or direct bookings.
    pub fn for_ota(ota: &str) -> Self {
        let name = ota.trim().to_lowercase();
        match name.as_str() {
            "" => BlockSource::Ota(format!("{OTA_PREFIX}unknown")),
            "manual" | "direct" | "ical" => BlockSource::Ota(format!("{OTA_PREFIX}{name}")),
            _ if name.starts_with(OTA_PREFIX) => BlockSource::Ota(format!("{OTA_PREFIX}{name}")),
            _ => BlockSource::Ota(name),
        }
    }
}

impl Display for BlockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockSource::Manual => write!(f, "manual"),
            BlockSource::Direct => write!(f, "direct"),
            BlockSource::Ical => write!(f, "ical"),
            BlockSource::Ota(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for BlockSource {
    fn from(s: &str) -> Self {
        match s.trim() {
            "" | "manual" => BlockSource::Manual,
            "direct" => BlockSource::Direct,
            "ical" => BlockSource::Ical,
            other => BlockSource::Ota(other.to_string()),
        }
    }
}

impl From<String> for BlockSource {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl Serialize for BlockSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockSource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.into())
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AvailabilityBlock {
    pub id: BlockId,
    pub unit_id: UnitId,
    pub start_date: NaiveDate,
    /// Checkout day, exclusive.
    pub end_date: NaiveDate,
    pub source: BlockSource,
    pub note: String,
}

impl AvailabilityBlock {
    pub fn overlaps(&self, stay: &StayDates) -> bool {
        stay.overlaps(self.start_date, self.end_date)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAvailabilityBlock {
    pub unit_id: UnitId,
    pub dates: StayDates,
    pub source: BlockSource,
    pub note: String,
}

impl NewAvailabilityBlock {
    #[must_use]
    pub fn new(unit_id: UnitId, dates: StayDates, source: BlockSource, note: String) -> Self {
        Self {
            unit_id,
            dates,
            source,
            note: note.trim().to_string(),
        }
    }

    /// Block created from a feed event: sanitized summary, truncated.
    #[must_use]
    pub fn from_feed(unit_id: UnitId, dates: StayDates, source: BlockSource, summary: &str) -> Self {
        let cleaned = ammonia::clean(summary);
        let note: String = cleaned.trim().chars().take(SYNC_NOTE_LIMIT).collect();
        Self {
            unit_id,
            dates,
            source,
            note,
        }
    }
}

/// Entry of the public availability calendar.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, Hash)]
pub struct BusyRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: BlockSource,
    pub unit_id: UnitId,
}

impl From<&AvailabilityBlock> for BusyRange {
    fn from(block: &AvailabilityBlock) -> Self {
        Self {
            start_date: block.start_date,
            end_date: block.end_date,
            source: block.source.clone(),
            unit_id: block.unit_id,
        }
    }
}
