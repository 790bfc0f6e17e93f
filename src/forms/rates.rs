//! Rate plan and per-date override payloads.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::rate_plan::{NewDateRate, NewRatePlan};
use crate::domain::types::{Currency, Price, UnitId, parse_date};
use crate::forms::FormError;

/// Accepts numbers and numeric strings; anything else is `None`.
fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_unit(unit_id: Option<i32>) -> Result<UnitId, FormError> {
    Ok(UnitId::new(unit_id.ok_or(FormError::Required("unit_id"))?)?)
}

/// JSON body of `POST /api/rates`.
#[derive(Debug, Deserialize)]
pub struct RatePlanPayload {
    pub unit_id: Option<i32>,
    pub base_rate: Option<Value>,
    pub weekend_rate: Option<Value>,
    pub currency: Option<String>,
}

impl TryFrom<RatePlanPayload> for NewRatePlan {
    type Error = FormError;

    /// An unparsable base rate is stored as zero.
    fn try_from(payload: RatePlanPayload) -> Result<Self, Self::Error> {
        let unit_id = required_unit(payload.unit_id)?;
        let base_rate = Price::new(lenient_number(payload.base_rate.as_ref()).unwrap_or(0.0))?;
        let weekend_rate = lenient_number(payload.weekend_rate.as_ref())
            .map(Price::new)
            .transpose()?;
        let currency = Currency::new(payload.currency.unwrap_or_default())?;
        Ok(NewRatePlan::new(unit_id, base_rate, weekend_rate, currency))
    }
}

/// JSON body of `POST /api/date_rates`.
#[derive(Debug, Deserialize)]
pub struct DateRatePayload {
    pub unit_id: Option<i32>,
    #[serde(default)]
    pub date: String,
    pub price: Option<Value>,
}

impl TryFrom<DateRatePayload> for NewDateRate {
    type Error = FormError;

    fn try_from(payload: DateRatePayload) -> Result<Self, Self::Error> {
        let unit_id = required_unit(payload.unit_id)?;
        let date = parse_date(&payload.date)?;
        let price = lenient_number(payload.price.as_ref()).ok_or(FormError::InvalidPrice)?;
        Ok(NewDateRate {
            unit_id,
            date,
            price: Price::new(price)?,
        })
    }
}

/// Query of `DELETE /api/date_rates`.
#[derive(Debug, Deserialize)]
pub struct DateRateKeyQuery {
    pub unit_id: Option<i32>,
    #[serde(default)]
    pub date: String,
}

impl DateRateKeyQuery {
    pub fn into_key(self) -> Result<(UnitId, NaiveDate), FormError> {
        Ok((required_unit(self.unit_id)?, parse_date(&self.date)?))
    }
}
