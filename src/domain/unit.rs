//! Bookable unit listed on one OTA.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::block::BlockSource;
use crate::domain::types::{IcalUrl, UnitId};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Unit {
    pub id: UnitId,
    /// OTA name as entered (Airbnb, Booking.com, Agoda ...).
    pub ota: String,
    /// Property or room identifier on the OTA side.
    pub property_id: String,
    /// Raw feed address. Kept unvalidated so broken rows can be reported.
    pub ical_url: Option<String>,
    /// UTC time of the last successful feed sync.
    pub last_sync: NaiveDateTime,
}

impl Unit {
    /// Source tag stored on blocks mirrored from this unit's feed.
    pub fn sync_source(&self) -> BlockSource {
        BlockSource::for_ota(&self.ota)
    }

    /// `Some` only when the configured feed passes [`IcalUrl`] validation.
    pub fn valid_ical_url(&self) -> Option<IcalUrl> {
        self.ical_url
            .as_deref()
            .and_then(|url| IcalUrl::new(url).ok())
    }

    /// Human readable label used by legacy pages and exports.
    pub fn display_name(&self) -> String {
        format!("{} — {}", self.ota, self.property_id)
    }
}

#[derive(Clone, Debug)]
pub struct NewUnit {
    pub ota: String,
    pub property_id: String,
    pub ical_url: Option<String>,
}

impl NewUnit {
    #[must_use]
    pub fn new(ota: String, property_id: String, ical_url: Option<String>) -> Self {
        Self {
            ota: ota.trim().to_string(),
            property_id: property_id.trim().to_string(),
            ical_url: ical_url
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}
