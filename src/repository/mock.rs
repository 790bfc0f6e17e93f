//! Mock repository implementations for isolating services in tests.

use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;

use crate::domain::block::{AvailabilityBlock, BlockSource, NewAvailabilityBlock};
use crate::domain::property_group::PropertyGroup;
use crate::domain::rate_plan::{DateRate, NewDateRate, NewRatePlan, RatePlan};
use crate::domain::types::{BlockId, IcalUrl, StayDates, UnitId};
use crate::domain::unit::{NewUnit, Unit};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    BlockListQuery, BlockReader, BlockWriter, GroupReader, RateReader, RateWriter, UnitReader,
    UnitWriter,
};

mock! {
    pub Repository {}

    impl UnitReader for Repository {
        fn get_unit_by_id(&self, id: UnitId) -> RepositoryResult<Option<Unit>>;
        fn list_units(&self) -> RepositoryResult<Vec<Unit>>;
        fn list_units_by_ids(&self, ids: &[UnitId]) -> RepositoryResult<Vec<Unit>>;
    }

    impl UnitWriter for Repository {
        fn create_units(&self, new_units: &[NewUnit]) -> RepositoryResult<usize>;
        fn update_unit_ical_url(&self, id: UnitId, url: &IcalUrl) -> RepositoryResult<Unit>;
    }

    impl BlockReader for Repository {
        fn list_blocks(&self, query: BlockListQuery) -> RepositoryResult<Vec<AvailabilityBlock>>;
        fn list_blocks_for_units(&self, ids: &[UnitId]) -> RepositoryResult<Vec<AvailabilityBlock>>;
        fn has_overlap(&self, unit_id: UnitId, dates: &StayDates) -> RepositoryResult<bool>;
    }

    impl BlockWriter for Repository {
        fn create_block(&self, block: &NewAvailabilityBlock) -> RepositoryResult<AvailabilityBlock>;
        fn delete_block(&self, id: BlockId) -> RepositoryResult<usize>;
        fn replace_synced_blocks(
            &self,
            unit_id: UnitId,
            source: &BlockSource,
            blocks: &[NewAvailabilityBlock],
            synced_at: NaiveDateTime,
        ) -> RepositoryResult<usize>;
        fn create_blocks_if_available(
            &self,
            blocks: &[NewAvailabilityBlock],
        ) -> RepositoryResult<bool>;
        fn block_day(
            &self,
            unit_ids: &[UnitId],
            dates: &StayDates,
            note: &str,
        ) -> RepositoryResult<usize>;
        fn unblock_day(&self, unit_ids: &[UnitId], dates: &StayDates) -> RepositoryResult<usize>;
    }

    impl RateReader for Repository {
        fn get_rate_plan(&self, unit_id: UnitId) -> RepositoryResult<Option<RatePlan>>;
        fn list_rate_plans(&self) -> RepositoryResult<Vec<RatePlan>>;
        fn list_date_rates(
            &self,
            unit_id: UnitId,
            dates: &StayDates,
        ) -> RepositoryResult<Vec<DateRate>>;
    }

    impl RateWriter for Repository {
        fn upsert_rate_plan(&self, plan: &NewRatePlan) -> RepositoryResult<RatePlan>;
        fn upsert_date_rate(&self, rate: &NewDateRate) -> RepositoryResult<DateRate>;
        fn delete_date_rate(&self, unit_id: UnitId, date: NaiveDate) -> RepositoryResult<usize>;
    }

    impl GroupReader for Repository {
        fn list_groups(&self) -> RepositoryResult<Vec<PropertyGroup>>;
        fn get_group(&self, slug: &str) -> RepositoryResult<Option<PropertyGroup>>;
    }
}
