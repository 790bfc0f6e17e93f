//! Nightly pricing: rate plans, per-date overrides and quotes.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::types::{
    Currency, DateRateId, Price, RatePlanId, StayDates, UnitId, is_weekend_night,
};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RatePlan {
    pub id: RatePlanId,
    pub unit_id: UnitId,
    pub base_rate: f64,
    /// Friday/Saturday price; `base_rate` applies when unset.
    pub weekend_rate: Option<f64>,
    pub currency: Currency,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewRatePlan {
    pub unit_id: UnitId,
    pub base_rate: Price,
    pub weekend_rate: Option<Price>,
    pub currency: Currency,
}

impl NewRatePlan {
    #[must_use]
    pub fn new(
        unit_id: UnitId,
        base_rate: Price,
        weekend_rate: Option<Price>,
        currency: Currency,
    ) -> Self {
        Self {
            unit_id,
            base_rate,
            weekend_rate,
            currency,
        }
    }
}

/// Price override for one night of one unit.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DateRate {
    pub id: DateRateId,
    pub unit_id: UnitId,
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewDateRate {
    pub unit_id: UnitId,
    pub date: NaiveDate,
    pub price: Price,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NightlyRate {
    pub date: NaiveDate,
    pub price: f64,
    pub is_override: bool,
    pub is_weekend: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Quote {
    pub total: f64,
    pub currency: Currency,
    pub nights: usize,
    pub breakdown: Vec<NightlyRate>,
}

impl Quote {
    /// Total in the provider's minor unit (cents, satang).
    pub fn amount_minor(&self) -> i64 {
        (self.total * 100.0).round() as i64
    }
}

impl RatePlan {
    /// Price every night of `stay`. Overrides outside the stay are ignored.
    pub fn nightly_rates(&self, stay: &StayDates, overrides: &[DateRate]) -> Vec<NightlyRate> {
        let overrides: HashMap<NaiveDate, f64> = overrides
            .iter()
            .filter(|o| o.date >= stay.start() && o.date < stay.end())
            .map(|o| (o.date, o.price))
            .collect();

        stay.each_night()
            .map(|date| {
                let is_weekend = is_weekend_night(date);
                let (price, is_override) = match overrides.get(&date) {
                    Some(price) => (*price, true),
                    None => match self.weekend_rate {
                        Some(weekend) if is_weekend => (weekend, false),
                        _ => (self.base_rate, false),
                    },
                };
                NightlyRate {
                    date,
                    price,
                    is_override,
                    is_weekend,
                }
            })
            .collect()
    }

    pub fn quote(&self, stay: &StayDates, overrides: &[DateRate]) -> Quote {
        let breakdown = self.nightly_rates(stay, overrides);
        Quote {
            total: breakdown.iter().map(|n| n.price).sum(),
            currency: self.currency.clone(),
            nights: breakdown.len(),
            breakdown,
        }
    }
}
