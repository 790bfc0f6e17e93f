use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::block::{AvailabilityBlock, BlockSource, NewAvailabilityBlock};
use crate::domain::property_group::PropertyGroup;
use crate::domain::rate_plan::{DateRate, NewDateRate, NewRatePlan, RatePlan};
use crate::domain::types::{BlockId, IcalUrl, StayDates, UnitId};
use crate::domain::unit::{NewUnit, Unit};
use crate::repository::errors::RepositoryResult;

pub mod block;
pub mod errors;
pub mod group;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod rate;
pub mod unit;

/// Diesel-backed repository over the SQLite pool plus the JSON group catalog.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
    catalog_path: PathBuf,
}

impl DieselRepository {
    pub fn new(pool: DbPool, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            catalog_path: catalog_path.into(),
        }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockListQuery {
    pub unit_id: Option<UnitId>,
}

impl BlockListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(mut self, unit_id: UnitId) -> Self {
        self.unit_id = Some(unit_id);
        self
    }
}

pub trait UnitReader {
    fn get_unit_by_id(&self, id: UnitId) -> RepositoryResult<Option<Unit>>;
    /// All units ordered by id.
    fn list_units(&self) -> RepositoryResult<Vec<Unit>>;
    fn list_units_by_ids(&self, ids: &[UnitId]) -> RepositoryResult<Vec<Unit>>;
}

pub trait UnitWriter {
    /// Insert units whose (OTA, property id) pair is new; returns how many were created.
    fn create_units(&self, new_units: &[NewUnit]) -> RepositoryResult<usize>;
    fn update_unit_ical_url(&self, id: UnitId, url: &IcalUrl) -> RepositoryResult<Unit>;
}

pub trait BlockReader {
    /// Blocks ordered by start date, newest first.
    fn list_blocks(&self, query: BlockListQuery) -> RepositoryResult<Vec<AvailabilityBlock>>;
    fn list_blocks_for_units(&self, ids: &[UnitId]) -> RepositoryResult<Vec<AvailabilityBlock>>;
    fn has_overlap(&self, unit_id: UnitId, dates: &StayDates) -> RepositoryResult<bool>;
}

pub trait BlockWriter {
    fn create_block(&self, block: &NewAvailabilityBlock) -> RepositoryResult<AvailabilityBlock>;
    /// Returns the number of deleted rows; deleting a missing id is not an error.
    fn delete_block(&self, id: BlockId) -> RepositoryResult<usize>;
    /// Atomically swap the unit's blocks tagged `source` for `blocks` and stamp `last_sync`.
    fn replace_synced_blocks(
        &self,
        unit_id: UnitId,
        source: &BlockSource,
        blocks: &[NewAvailabilityBlock],
        synced_at: NaiveDateTime,
    ) -> RepositoryResult<usize>;
    /// Insert all `blocks` only if none of them overlaps an existing block.
    /// Returns `false` and writes nothing on conflict.
    fn create_blocks_if_available(&self, blocks: &[NewAvailabilityBlock])
    -> RepositoryResult<bool>;
    /// Add a manual block on every unit unless an identical one exists.
    fn block_day(&self, unit_ids: &[UnitId], dates: &StayDates, note: &str)
    -> RepositoryResult<usize>;
    /// Remove manual blocks exactly matching `dates`.
    fn unblock_day(&self, unit_ids: &[UnitId], dates: &StayDates) -> RepositoryResult<usize>;
}

pub trait RateReader {
    /// The unit's active plan: the first one by id.
    fn get_rate_plan(&self, unit_id: UnitId) -> RepositoryResult<Option<RatePlan>>;
    fn list_rate_plans(&self) -> RepositoryResult<Vec<RatePlan>>;
    fn list_date_rates(&self, unit_id: UnitId, dates: &StayDates)
    -> RepositoryResult<Vec<DateRate>>;
}

pub trait RateWriter {
    fn upsert_rate_plan(&self, plan: &NewRatePlan) -> RepositoryResult<RatePlan>;
    fn upsert_date_rate(&self, rate: &NewDateRate) -> RepositoryResult<DateRate>;
    fn delete_date_rate(&self, unit_id: UnitId, date: NaiveDate) -> RepositoryResult<usize>;
}

pub trait GroupReader {
    /// Groups ordered by slug.
    fn list_groups(&self) -> RepositoryResult<Vec<PropertyGroup>>;
    fn get_group(&self, slug: &str) -> RepositoryResult<Option<PropertyGroup>>;
}
