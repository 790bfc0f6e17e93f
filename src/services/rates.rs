//! Rate plans, per-date overrides and price quotes.

use crate::domain::rate_plan::{DateRate, NewDateRate, NewRatePlan, Quote, RatePlan};
use crate::domain::types::StayDates;
use crate::forms::booking::StayPayload;
use crate::forms::rates::{DateRateKeyQuery, DateRatePayload, RatePlanPayload};
use crate::repository::{GroupReader, RateReader, RateWriter};
use crate::services::{ServiceError, ServiceResult};

/// Create or replace the unit's active rate plan.
pub fn save_rate_plan<R>(repo: &R, payload: RatePlanPayload) -> ServiceResult<RatePlan>
where
    R: RateWriter + ?Sized,
{
    let plan = NewRatePlan::try_from(payload)?;
    let saved = repo.upsert_rate_plan(&plan).map_err(|err| {
        log::error!("Failed to save rate plan for unit {}: {err}", plan.unit_id);
        err
    })?;
    Ok(saved)
}

pub fn set_date_rate<R>(repo: &R, payload: DateRatePayload) -> ServiceResult<DateRate>
where
    R: RateWriter + ?Sized,
{
    let rate = NewDateRate::try_from(payload)?;
    Ok(repo.upsert_date_rate(&rate)?)
}

/// Remove a per-date override. Removing a missing one is not an error.
pub fn delete_date_rate<R>(repo: &R, query: DateRateKeyQuery) -> ServiceResult<usize>
where
    R: RateWriter + ?Sized,
{
    let (unit_id, date) = query.into_key()?;
    Ok(repo.delete_date_rate(unit_id, date)?)
}

/// Price a stay at a property group using its first unit's plan.
pub fn quote_group<R>(repo: &R, slug: &str, stay: StayPayload) -> ServiceResult<Quote>
where
    R: GroupReader + RateReader + ?Sized,
{
    let group = repo.get_group(slug)?.ok_or(ServiceError::NotFound)?;
    let stay = StayDates::try_from(stay)?;
    let unit_id = group
        .pricing_unit()
        .ok_or_else(|| ServiceError::Form("no units linked to this property".to_string()))?;
    let plan = repo
        .get_rate_plan(unit_id)?
        .ok_or_else(|| ServiceError::Form("price not set for this property".to_string()))?;
    let overrides = repo.list_date_rates(unit_id, &stay)?;

    Ok(plan.quote(&stay, &overrides))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::property_group::PropertyGroup;
    use crate::domain::types::{Currency, RatePlanId, UnitId};
    use crate::repository::mock::MockRepository;
    use serde_json::json;

    fn group() -> PropertyGroup {
        PropertyGroup {
            slug: "villa".into(),
            title: "Villa".into(),
            image_url: String::new(),
            unit_ids: vec![UnitId::new(3).unwrap(), UnitId::new(4).unwrap()],
        }
    }

    #[test]
    fn save_rate_plan_upserts_normalized_plan() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_rate_plan()
            .withf(|plan| {
                plan.unit_id.get() == 2
                    && plan.base_rate.get() == 0.0
                    && plan.currency.as_str() == "THB"
            })
            .times(1)
            .returning(|plan| {
                Ok(RatePlan {
                    id: RatePlanId::new(1).unwrap(),
                    unit_id: plan.unit_id,
                    base_rate: plan.base_rate.get(),
                    weekend_rate: None,
                    currency: plan.currency.clone(),
                })
            });

        let payload = RatePlanPayload {
            unit_id: Some(2),
            base_rate: Some(json!("n/a")),
            weekend_rate: None,
            currency: None,
        };
        let saved = save_rate_plan(&repo, payload).unwrap();
        assert_eq!(saved.base_rate, 0.0);
    }

    #[test]
    fn save_rate_plan_requires_unit() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_rate_plan().times(0);
        let payload = RatePlanPayload {
            unit_id: None,
            base_rate: Some(json!(100)),
            weekend_rate: None,
            currency: None,
        };
        assert!(matches!(
            save_rate_plan(&repo, payload),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn quote_uses_first_unit_plan() {
        let mut repo = MockRepository::new();
        repo.expect_get_group().returning(|_| Ok(Some(group())));
        repo.expect_get_rate_plan()
            .withf(|id| id.get() == 3)
            .returning(|unit_id| {
                Ok(Some(RatePlan {
                    id: RatePlanId::new(1).unwrap(),
                    unit_id,
                    base_rate: 1000.0,
                    weekend_rate: None,
                    currency: Currency::default(),
                }))
            });
        repo.expect_list_date_rates().returning(|_, _| Ok(vec![]));

        let quote = quote_group(
            &repo,
            "villa",
            StayPayload {
                start_date: "2025-05-05".into(),
                end_date: "2025-05-08".into(),
            },
        )
        .unwrap();

        assert_eq!(quote.nights, 3);
        assert_eq!(quote.total, 3000.0);
    }

    #[test]
    fn quote_without_plan_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_group().returning(|_| Ok(Some(group())));
        repo.expect_get_rate_plan().returning(|_| Ok(None));

        let result = quote_group(
            &repo,
            "villa",
            StayPayload {
                start_date: "2025-05-05".into(),
                end_date: "2025-05-06".into(),
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
