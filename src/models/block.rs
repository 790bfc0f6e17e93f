//! Diesel models for availability blocks.

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::block::{
    AvailabilityBlock as DomainBlock, NewAvailabilityBlock as DomainNewBlock,
};
use crate::domain::types::{BlockId, TypeConstraintError, UnitId};
use crate::models::unit::Unit;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Unit, foreign_key = unit_id))]
#[diesel(table_name = crate::schema::availability_blocks)]
pub struct AvailabilityBlock {
    pub id: i32,
    pub unit_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: String,
    pub note: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::availability_blocks)]
pub struct NewAvailabilityBlock {
    pub unit_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: String,
    pub note: String,
}

impl TryFrom<AvailabilityBlock> for DomainBlock {
    type Error = TypeConstraintError;

    fn try_from(block: AvailabilityBlock) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BlockId::new(block.id)?,
            unit_id: UnitId::new(block.unit_id)?,
            start_date: block.start_date,
            end_date: block.end_date,
            source: block.source.into(),
            note: block.note,
        })
    }
}

impl<'a> From<&'a DomainNewBlock> for NewAvailabilityBlock {
    fn from(block: &'a DomainNewBlock) -> Self {
        Self {
            unit_id: block.unit_id.get(),
            start_date: block.dates.start(),
            end_date: block.dates.end(),
            source: block.source.to_string(),
            note: block.note.clone(),
        }
    }
}
