use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error as DieselError;

use crate::domain::types::{IcalUrl, UnitId};
use crate::domain::unit::{NewUnit, Unit};
use crate::models::unit::{NewUnit as DbNewUnit, Unit as DbUnit};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UnitReader, UnitWriter};
use crate::schema::units;

impl UnitReader for DieselRepository {
    fn get_unit_by_id(&self, id: UnitId) -> RepositoryResult<Option<Unit>> {
        let mut conn = self.conn()?;

        let unit = units::table
            .find(id.get())
            .first::<DbUnit>(&mut conn)
            .optional()?;

        unit.map(Unit::try_from).transpose().map_err(Into::into)
    }

    fn list_units(&self) -> RepositoryResult<Vec<Unit>> {
        let mut conn = self.conn()?;

        let items = units::table
            .order(units::id.asc())
            .load::<DbUnit>(&mut conn)?;

        items
            .into_iter()
            .map(|u| Unit::try_from(u).map_err(Into::into))
            .collect()
    }

    fn list_units_by_ids(&self, ids: &[UnitId]) -> RepositoryResult<Vec<Unit>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = self.conn()?;
        let raw: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let items = units::table
            .filter(units::id.eq_any(&raw))
            .order(units::id.asc())
            .load::<DbUnit>(&mut conn)?;

        items
            .into_iter()
            .map(|u| Unit::try_from(u).map_err(Into::into))
            .collect()
    }
}

impl UnitWriter for DieselRepository {
    fn create_units(&self, new_units: &[NewUnit]) -> RepositoryResult<usize> {
        if new_units.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let insertables: Vec<DbNewUnit> = new_units
            .iter()
            .map(|u| DbNewUnit::from_domain(u, now))
            .collect();

        let created = conn.immediate_transaction::<_, DieselError, _>(|conn| {
            let mut created = 0;
            for unit in &insertables {
                created += diesel::insert_or_ignore_into(units::table)
                    .values(unit)
                    .execute(conn)?;
            }
            Ok(created)
        })?;

        Ok(created)
    }

    fn update_unit_ical_url(&self, id: UnitId, url: &IcalUrl) -> RepositoryResult<Unit> {
        let mut conn = self.conn()?;

        let updated = diesel::update(units::table.find(id.get()))
            .set(units::ical_url.eq(Some(url.as_str())))
            .get_result::<DbUnit>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(Unit::try_from(updated)?)
    }
}
