//! DTOs used by the admin dashboard and admin pages.

use serde::Serialize;

use crate::domain::property_group::PropertyGroup;
use crate::domain::unit::Unit;

/// One dashboard row: a unit and its active plan's price.
#[derive(Debug, Serialize)]
pub struct DashboardRow {
    pub unit: Unit,
    /// Last feed sync in the configured timezone, offset included.
    pub last_sync: String,
    pub base_rate: Option<f64>,
    pub weekend_rate: Option<f64>,
    pub currency: String,
}

/// Data required to render the legacy dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub rows: Vec<DashboardRow>,
}

/// Feed URL of a unit's exported calendar.
#[derive(Debug, Serialize)]
pub struct ExportLink {
    pub unit: Unit,
    pub url: String,
}

/// Data required to render the per-group admin calendar.
#[derive(Debug, Serialize)]
pub struct AdminCalendarData {
    pub group: PropertyGroup,
    pub units: Vec<Unit>,
}
