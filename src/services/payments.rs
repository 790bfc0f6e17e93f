//! Payment intents for grouped bookings.

use std::time::Duration;

use log::info;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::types::StayDates;
use crate::dto::public::IntentResponse;
use crate::forms::booking::StayPayload;
use crate::repository::{GroupReader, RateReader};
use crate::services::{ServiceError, ServiceResult};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payments are not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Provider(String),
}

/// Client half of a created payment intent.
#[derive(Clone, Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// `amount_minor` is in the currency's smallest unit; `currency` is lower-case ISO.
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError>;
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe PaymentIntents over the REST API.
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    api_url: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(api_url: &str, secret_key: &str) -> Result<Self, PaymentError> {
        let client = Client::builder().timeout(Duration::from_secs(20)).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.trim().to_string(),
        })
    }
}

impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        let amount = amount_minor.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_url))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json::<PaymentIntent>().await?);
        }

        let status = response.status();
        let message = response
            .json::<StripeErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| format!("payment provider returned {status}"));
        Err(PaymentError::Provider(message))
    }
}

/// Create an intent for the full quoted price of a stay at a property group.
pub async fn create_group_intent<R, G>(
    repo: &R,
    gateway: &G,
    slug: &str,
    stay: StayPayload,
) -> ServiceResult<IntentResponse>
where
    R: GroupReader + RateReader + ?Sized,
    G: PaymentGateway + ?Sized,
{
    let group = repo.get_group(slug)?.ok_or(ServiceError::NotFound)?;
    let stay = StayDates::try_from(stay)?;
    let unit_id = group
        .pricing_unit()
        .ok_or_else(|| ServiceError::Form("no units linked to this property".to_string()))?;

    let plan = repo
        .get_rate_plan(unit_id)?
        .filter(|plan| plan.base_rate > 0.0)
        .ok_or_else(|| ServiceError::Form("price not set for this property".to_string()))?;

    let overrides = repo.list_date_rates(unit_id, &stay)?;
    let quote = plan.quote(&stay, &overrides);
    let amount = quote.amount_minor();
    if quote.nights == 0 || amount <= 0 {
        return Err(ServiceError::Form("nights must be > 0".to_string()));
    }
    let currency = quote.currency.to_provider_code();

    let intent = gateway
        .create_intent(amount, &currency)
        .await
        .map_err(|e| ServiceError::External(e.to_string()))?;
    info!("Created payment intent {} for {slug} ({stay}, {amount} {currency})", intent.id);

    Ok(IntentResponse {
        ok: true,
        client_secret: intent.client_secret,
        amount,
        currency,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::domain::property_group::PropertyGroup;
    use crate::domain::rate_plan::{DateRate, RatePlan};
    use crate::domain::types::{Currency, DateRateId, RatePlanId, UnitId, parse_date};
    use crate::repository::mock::MockRepository;

    #[derive(Default)]
    struct FakeGateway {
        calls: RefCell<Vec<(i64, String)>>,
    }

    impl PaymentGateway for FakeGateway {
        async fn create_intent(
            &self,
            amount_minor: i64,
            currency: &str,
        ) -> Result<PaymentIntent, PaymentError> {
            self.calls
                .borrow_mut()
                .push((amount_minor, currency.to_string()));
            Ok(PaymentIntent {
                id: "pi_1".into(),
                client_secret: "pi_1_secret".into(),
            })
        }
    }

    fn group(ids: &[i32]) -> PropertyGroup {
        PropertyGroup {
            slug: "villa".into(),
            title: "Villa".into(),
            image_url: String::new(),
            unit_ids: ids.iter().map(|id| UnitId::new(*id).unwrap()).collect(),
        }
    }

    fn plan(base: f64) -> RatePlan {
        RatePlan {
            id: RatePlanId::new(1).unwrap(),
            unit_id: UnitId::new(1).unwrap(),
            base_rate: base,
            weekend_rate: Some(2000.0),
            currency: Currency::default(),
        }
    }

    fn stay(start: &str, end: &str) -> StayPayload {
        StayPayload {
            start_date: start.into(),
            end_date: end.into(),
        }
    }

    #[tokio::test]
    async fn amount_uses_full_quote() {
        let mut repo = MockRepository::new();
        repo.expect_get_group()
            .returning(|_| Ok(Some(group(&[1, 2]))));
        repo.expect_get_rate_plan()
            .withf(|id| id.get() == 1)
            .returning(|_| Ok(Some(plan(1500.0))));
        repo.expect_list_date_rates().returning(|unit_id, _| {
            Ok(vec![DateRate {
                id: DateRateId::new(1).unwrap(),
                unit_id,
                date: parse_date("2025-05-01").unwrap(),
                price: 1000.0,
            }])
        });
        let gateway = FakeGateway::default();

        // Thu (override) + Fri (weekend) + Sat (weekend)
        let response = create_group_intent(&repo, &gateway, "villa", stay("2025-05-01", "2025-05-04"))
            .await
            .unwrap();

        assert_eq!(response.amount, 500_000);
        assert_eq!(response.currency, "thb");
        assert_eq!(response.client_secret, "pi_1_secret");
        assert_eq!(gateway.calls.borrow()[0], (500_000, "thb".to_string()));
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_group().returning(|_| Ok(None));
        let gateway = FakeGateway::default();

        let result = create_group_intent(&repo, &gateway, "nope", stay("2025-05-01", "2025-05-02")).await;

        assert!(matches!(result, Err(ServiceError::NotFound)));
        assert!(gateway.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn zero_base_rate_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_group().returning(|_| Ok(Some(group(&[1]))));
        repo.expect_get_rate_plan().returning(|_| Ok(Some(plan(0.0))));
        repo.expect_list_date_rates().times(0);
        let gateway = FakeGateway::default();

        let result = create_group_intent(&repo, &gateway, "villa", stay("2025-05-01", "2025-05-02")).await;

        assert!(matches!(result, Err(ServiceError::Form(msg)) if msg == "price not set for this property"));
    }

    #[tokio::test]
    async fn group_without_units_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_group().returning(|_| Ok(Some(group(&[]))));
        let gateway = FakeGateway::default();

        let result = create_group_intent(&repo, &gateway, "villa", stay("2025-05-01", "2025-05-02")).await;

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[tokio::test]
    async fn missing_dates_are_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_group().returning(|_| Ok(Some(group(&[1]))));
        let gateway = FakeGateway::default();

        let result = create_group_intent(&repo, &gateway, "villa", stay("", "2025-05-02")).await;

        assert!(matches!(result, Err(ServiceError::Form(msg)) if msg == "missing dates"));
    }
}
