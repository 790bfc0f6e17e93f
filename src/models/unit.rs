//! Diesel models for bookable units.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{TypeConstraintError, UnitId};
use crate::domain::unit::{NewUnit as DomainNewUnit, Unit as DomainUnit};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::units)]
/// Diesel model for [`crate::domain::unit::Unit`].
pub struct Unit {
    pub id: i32,
    pub ota: String,
    pub property_id: String,
    pub ical_url: Option<String>,
    pub last_sync: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::units)]
/// Insertable form of [`Unit`].
pub struct NewUnit<'a> {
    pub ota: &'a str,
    pub property_id: &'a str,
    pub ical_url: Option<&'a str>,
    pub last_sync: NaiveDateTime,
}

impl TryFrom<Unit> for DomainUnit {
    type Error = TypeConstraintError;

    fn try_from(unit: Unit) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UnitId::new(unit.id)?,
            ota: unit.ota,
            property_id: unit.property_id,
            ical_url: unit.ical_url,
            last_sync: unit.last_sync,
        })
    }
}

impl<'a> NewUnit<'a> {
    pub fn from_domain(unit: &'a DomainNewUnit, now: NaiveDateTime) -> Self {
        Self {
            ota: unit.ota.as_str(),
            property_id: unit.property_id.as_str(),
            ical_url: unit.ical_url.as_deref(),
            last_sync: now,
        }
    }
}
