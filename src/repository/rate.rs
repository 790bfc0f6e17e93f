use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::result::Error as DieselError;

use crate::domain::rate_plan::{DateRate, NewDateRate, NewRatePlan, RatePlan};
use crate::domain::types::{StayDates, UnitId};
use crate::models::rate_plan::{
    DateRate as DbDateRate, NewDateRate as DbNewDateRate, NewRatePlan as DbNewRatePlan,
    RatePlan as DbRatePlan,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, RateReader, RateWriter};
use crate::schema::{date_rates, rate_plans};

impl RateReader for DieselRepository {
    fn get_rate_plan(&self, unit_id: UnitId) -> RepositoryResult<Option<RatePlan>> {
        let mut conn = self.conn()?;

        let plan = rate_plans::table
            .filter(rate_plans::unit_id.eq(unit_id.get()))
            .order(rate_plans::id.asc())
            .first::<DbRatePlan>(&mut conn)
            .optional()?;

        plan.map(RatePlan::try_from).transpose().map_err(Into::into)
    }

    fn list_rate_plans(&self) -> RepositoryResult<Vec<RatePlan>> {
        let mut conn = self.conn()?;

        let items = rate_plans::table
            .order(rate_plans::id.asc())
            .load::<DbRatePlan>(&mut conn)?;

        items
            .into_iter()
            .map(|p| RatePlan::try_from(p).map_err(Into::into))
            .collect()
    }

    fn list_date_rates(
        &self,
        unit_id: UnitId,
        dates: &StayDates,
    ) -> RepositoryResult<Vec<DateRate>> {
        let mut conn = self.conn()?;

        let items = date_rates::table
            .filter(date_rates::unit_id.eq(unit_id.get()))
            .filter(date_rates::date.ge(dates.start()))
            .filter(date_rates::date.lt(dates.end()))
            .order(date_rates::date.asc())
            .load::<DbDateRate>(&mut conn)?;

        items
            .into_iter()
            .map(|r| DateRate::try_from(r).map_err(Into::into))
            .collect()
    }
}

impl RateWriter for DieselRepository {
    fn upsert_rate_plan(&self, plan: &NewRatePlan) -> RepositoryResult<RatePlan> {
        let mut conn = self.conn()?;
        let values = DbNewRatePlan::from(plan);

        let saved = conn.immediate_transaction::<_, DieselError, _>(|conn| {
            let existing = rate_plans::table
                .filter(rate_plans::unit_id.eq(plan.unit_id.get()))
                .order(rate_plans::id.asc())
                .select(rate_plans::id)
                .first::<i32>(conn)
                .optional()?;

            match existing {
                Some(id) => diesel::update(rate_plans::table.find(id))
                    .set(&values)
                    .get_result::<DbRatePlan>(conn),
                None => diesel::insert_into(rate_plans::table)
                    .values(&values)
                    .get_result::<DbRatePlan>(conn),
            }
        })?;

        Ok(RatePlan::try_from(saved)?)
    }

    fn upsert_date_rate(&self, rate: &NewDateRate) -> RepositoryResult<DateRate> {
        let mut conn = self.conn()?;
        let values = DbNewDateRate::from(rate);

        let saved = diesel::insert_into(date_rates::table)
            .values(&values)
            .on_conflict((date_rates::unit_id, date_rates::date))
            .do_update()
            .set(date_rates::price.eq(values.price))
            .get_result::<DbDateRate>(&mut conn)?;

        Ok(DateRate::try_from(saved)?)
    }

    fn delete_date_rate(&self, unit_id: UnitId, date: NaiveDate) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(
            date_rates::table
                .filter(date_rates::unit_id.eq(unit_id.get()))
                .filter(date_rates::date.eq(date)),
        )
        .execute(&mut conn)?;

        Ok(affected)
    }
}
