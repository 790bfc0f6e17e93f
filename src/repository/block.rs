use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;

use crate::domain::block::{AvailabilityBlock, BlockSource, NewAvailabilityBlock};
use crate::domain::types::{BlockId, StayDates, UnitId};
use crate::models::block::{AvailabilityBlock as DbBlock, NewAvailabilityBlock as DbNewBlock};
use crate::repository::errors::RepositoryResult;
use crate::repository::{BlockListQuery, BlockReader, BlockWriter, DieselRepository};
use crate::schema::{availability_blocks, units};

/// Half-open overlap test executed inside whatever transaction `conn` is in.
fn overlap_exists(
    conn: &mut SqliteConnection,
    unit_id: i32,
    dates: &StayDates,
) -> Result<bool, DieselError> {
    let count: i64 = availability_blocks::table
        .filter(availability_blocks::unit_id.eq(unit_id))
        .filter(availability_blocks::start_date.lt(dates.end()))
        .filter(availability_blocks::end_date.gt(dates.start()))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

fn into_domain(items: Vec<DbBlock>) -> RepositoryResult<Vec<AvailabilityBlock>> {
    items
        .into_iter()
        .map(|b| AvailabilityBlock::try_from(b).map_err(Into::into))
        .collect()
}

impl BlockReader for DieselRepository {
    fn list_blocks(&self, query: BlockListQuery) -> RepositoryResult<Vec<AvailabilityBlock>> {
        let mut conn = self.conn()?;

        let mut items = availability_blocks::table.into_boxed();
        if let Some(unit_id) = query.unit_id {
            items = items.filter(availability_blocks::unit_id.eq(unit_id.get()));
        }

        let items = items
            .order((
                availability_blocks::start_date.desc(),
                availability_blocks::id.desc(),
            ))
            .load::<DbBlock>(&mut conn)?;

        into_domain(items)
    }

    fn list_blocks_for_units(&self, ids: &[UnitId]) -> RepositoryResult<Vec<AvailabilityBlock>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = self.conn()?;
        let raw: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let items = availability_blocks::table
            .filter(availability_blocks::unit_id.eq_any(&raw))
            .order((
                availability_blocks::start_date.asc(),
                availability_blocks::id.asc(),
            ))
            .load::<DbBlock>(&mut conn)?;

        into_domain(items)
    }

    fn has_overlap(&self, unit_id: UnitId, dates: &StayDates) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;
        Ok(overlap_exists(&mut conn, unit_id.get(), dates)?)
    }
}

impl BlockWriter for DieselRepository {
    fn create_block(&self, block: &NewAvailabilityBlock) -> RepositoryResult<AvailabilityBlock> {
        let mut conn = self.conn()?;
        let insertable = DbNewBlock::from(block);

        let created = diesel::insert_into(availability_blocks::table)
            .values(&insertable)
            .get_result::<DbBlock>(&mut conn)?;

        Ok(AvailabilityBlock::try_from(created)?)
    }

    fn delete_block(&self, id: BlockId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let affected =
            diesel::delete(availability_blocks::table.find(id.get())).execute(&mut conn)?;
        Ok(affected)
    }

    fn replace_synced_blocks(
        &self,
        unit_id: UnitId,
        source: &BlockSource,
        blocks: &[NewAvailabilityBlock],
        synced_at: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let source = source.to_string();
        let insertables: Vec<DbNewBlock> = blocks.iter().map(DbNewBlock::from).collect();

        let inserted = conn.immediate_transaction::<_, DieselError, _>(|conn| {
            diesel::delete(
                availability_blocks::table
                    .filter(availability_blocks::unit_id.eq(unit_id.get()))
                    .filter(availability_blocks::source.eq(&source)),
            )
            .execute(conn)?;

            let inserted = if insertables.is_empty() {
                0
            } else {
                diesel::insert_into(availability_blocks::table)
                    .values(&insertables)
                    .execute(conn)?
            };

            diesel::update(units::table.find(unit_id.get()))
                .set(units::last_sync.eq(synced_at))
                .execute(conn)?;

            Ok(inserted)
        })?;

        Ok(inserted)
    }

    fn create_blocks_if_available(
        &self,
        blocks: &[NewAvailabilityBlock],
    ) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;
        let insertables: Vec<DbNewBlock> = blocks.iter().map(DbNewBlock::from).collect();

        let created = conn.immediate_transaction::<_, DieselError, _>(|conn| {
            for block in blocks {
                if overlap_exists(conn, block.unit_id.get(), &block.dates)? {
                    return Ok(false);
                }
            }
            diesel::insert_into(availability_blocks::table)
                .values(&insertables)
                .execute(conn)?;
            Ok(true)
        })?;

        Ok(created)
    }

    fn block_day(
        &self,
        unit_ids: &[UnitId],
        dates: &StayDates,
        note: &str,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let manual = BlockSource::Manual.to_string();

        let inserted = conn.immediate_transaction::<_, DieselError, _>(|conn| {
            let mut inserted = 0;
            for unit_id in unit_ids {
                let existing: i64 = availability_blocks::table
                    .filter(availability_blocks::unit_id.eq(unit_id.get()))
                    .filter(availability_blocks::start_date.eq(dates.start()))
                    .filter(availability_blocks::end_date.eq(dates.end()))
                    .filter(availability_blocks::source.eq(&manual))
                    .count()
                    .get_result(conn)?;
                if existing > 0 {
                    continue;
                }
                inserted += diesel::insert_into(availability_blocks::table)
                    .values(&DbNewBlock {
                        unit_id: unit_id.get(),
                        start_date: dates.start(),
                        end_date: dates.end(),
                        source: manual.clone(),
                        note: note.to_string(),
                    })
                    .execute(conn)?;
            }
            Ok(inserted)
        })?;

        Ok(inserted)
    }

    fn unblock_day(&self, unit_ids: &[UnitId], dates: &StayDates) -> RepositoryResult<usize> {
        if unit_ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;
        let raw: Vec<i32> = unit_ids.iter().map(|id| id.get()).collect();

        let affected = diesel::delete(
            availability_blocks::table
                .filter(availability_blocks::unit_id.eq_any(&raw))
                .filter(availability_blocks::start_date.eq(dates.start()))
                .filter(availability_blocks::end_date.eq(dates.end()))
                .filter(availability_blocks::source.eq(BlockSource::Manual.to_string())),
        )
        .execute(&mut conn)?;

        Ok(affected)
    }
}
