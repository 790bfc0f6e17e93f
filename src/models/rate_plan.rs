//! Diesel models for rate plans and per-date overrides.

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::rate_plan::{
    DateRate as DomainDateRate, NewDateRate as DomainNewDateRate, NewRatePlan as DomainNewRatePlan,
    RatePlan as DomainRatePlan,
};
use crate::domain::types::{Currency, DateRateId, RatePlanId, TypeConstraintError, UnitId};
use crate::models::unit::Unit;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Unit, foreign_key = unit_id))]
#[diesel(table_name = crate::schema::rate_plans)]
pub struct RatePlan {
    pub id: i32,
    pub unit_id: i32,
    pub base_rate: f64,
    pub currency: String,
    pub weekend_rate: Option<f64>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::rate_plans)]
#[diesel(treat_none_as_null = true)]
pub struct NewRatePlan<'a> {
    pub unit_id: i32,
    pub base_rate: f64,
    pub currency: &'a str,
    pub weekend_rate: Option<f64>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Unit, foreign_key = unit_id))]
#[diesel(table_name = crate::schema::date_rates)]
pub struct DateRate {
    pub id: i32,
    pub unit_id: i32,
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::date_rates)]
pub struct NewDateRate {
    pub unit_id: i32,
    pub date: NaiveDate,
    pub price: f64,
}

impl TryFrom<RatePlan> for DomainRatePlan {
    type Error = TypeConstraintError;

    fn try_from(plan: RatePlan) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RatePlanId::new(plan.id)?,
            unit_id: UnitId::new(plan.unit_id)?,
            base_rate: plan.base_rate,
            weekend_rate: plan.weekend_rate,
            currency: Currency::new(plan.currency)?,
        })
    }
}

impl<'a> From<&'a DomainNewRatePlan> for NewRatePlan<'a> {
    fn from(plan: &'a DomainNewRatePlan) -> Self {
        Self {
            unit_id: plan.unit_id.get(),
            base_rate: plan.base_rate.get(),
            currency: plan.currency.as_str(),
            weekend_rate: plan.weekend_rate.map(|p| p.get()),
        }
    }
}

impl TryFrom<DateRate> for DomainDateRate {
    type Error = TypeConstraintError;

    fn try_from(rate: DateRate) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DateRateId::new(rate.id)?,
            unit_id: UnitId::new(rate.unit_id)?,
            date: rate.date,
            price: rate.price,
        })
    }
}

impl From<&DomainNewDateRate> for NewDateRate {
    fn from(rate: &DomainNewDateRate) -> Self {
        Self {
            unit_id: rate.unit_id.get(),
            date: rate.date,
            price: rate.price.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Price;

    #[test]
    fn plan_into_domain_normalizes_currency() {
        let db = RatePlan {
            id: 1,
            unit_id: 3,
            base_rate: 1200.0,
            currency: "usd".into(),
            weekend_rate: Some(1500.0),
        };
        let domain = DomainRatePlan::try_from(db).expect("valid plan");
        assert_eq!(domain.currency.as_str(), "USD");
        assert_eq!(domain.weekend_rate, Some(1500.0));
    }

    #[test]
    fn new_plan_from_domain() {
        let domain = DomainNewRatePlan::new(
            UnitId::new(3).unwrap(),
            Price::new(1000.0).unwrap(),
            None,
            Currency::default(),
        );
        let new: NewRatePlan = (&domain).into();
        assert_eq!(new.unit_id, 3);
        assert_eq!(new.currency, "THB");
        assert!(new.weekend_rate.is_none());
    }
}
