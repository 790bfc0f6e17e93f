//! DTOs rendered on the public listing and property pages.

use serde::Serialize;

use crate::domain::types::UnitId;

/// Listing card of a public property group.
#[derive(Debug, Serialize, PartialEq)]
pub struct PublicGroup {
    pub slug: String,
    pub title: String,
    pub image_url: String,
    /// Unit ids with hidden units removed.
    pub unit_ids: Vec<UnitId>,
    /// Base rate of the first public unit, when it has a positive one.
    pub price: Option<f64>,
    pub currency: String,
}

/// Data of a bookable page: a group (`slug` set) or a single legacy unit.
#[derive(Debug, Serialize)]
pub struct PropertyPage {
    pub slug: Option<String>,
    pub unit_id: Option<UnitId>,
    pub title: String,
    pub image_url: String,
    pub price: Option<f64>,
    pub currency: String,
}

/// Result of a created payment intent.
#[derive(Debug, Serialize)]
pub struct IntentResponse {
    pub ok: bool,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}
