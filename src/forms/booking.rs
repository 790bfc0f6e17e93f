//! Public booking, quote and payment payloads.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{GuestEmail, GuestName, StayDates};
use crate::forms::FormError;

/// Check-in / check-out pair as sent by the booking widget.
#[derive(Debug, Default, Deserialize)]
pub struct StayPayload {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl TryFrom<StayPayload> for StayDates {
    type Error = FormError;

    fn try_from(payload: StayPayload) -> Result<Self, Self::Error> {
        let start = payload.start_date.trim();
        let end = payload.end_date.trim();
        if start.is_empty() || end.is_empty() {
            return Err(FormError::MissingDates);
        }
        Ok(StayDates::parse(start, end)?)
    }
}

/// JSON body of the grouped and per-unit booking endpoints.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct BookingPayload {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
}

/// Validated booking request.
#[derive(Clone, Debug, PartialEq)]
pub struct BookingRequest {
    pub dates: StayDates,
    pub name: GuestName,
    pub email: GuestEmail,
}

impl TryFrom<BookingPayload> for BookingRequest {
    type Error = FormError;

    fn try_from(mut payload: BookingPayload) -> Result<Self, Self::Error> {
        payload.name = payload.name.trim().to_string();
        payload.email = payload.email.trim().to_string();

        let missing = [
            &payload.start_date,
            &payload.end_date,
            &payload.name,
            &payload.email,
        ]
        .iter()
        .any(|field| field.trim().is_empty());
        if missing {
            return Err(FormError::MissingFields);
        }

        let dates = StayDates::parse(&payload.start_date, &payload.end_date)?;
        payload.validate()?;

        Ok(Self {
            dates,
            name: GuestName::new(payload.name)?,
            email: GuestEmail::new(payload.email)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> BookingPayload {
        BookingPayload {
            start_date: "2025-05-01".into(),
            end_date: "2025-05-03".into(),
            name: " Ann ".into(),
            email: "Ann@Example.com".into(),
        }
    }

    #[test]
    fn valid_payload_is_normalized() {
        let request = BookingRequest::try_from(payload()).unwrap();
        assert_eq!(request.name.as_str(), "Ann");
        assert_eq!(request.email.as_str(), "ann@example.com");
        assert_eq!(request.dates.nights(), 2);
    }

    #[test]
    fn missing_name_is_rejected() {
        let mut p = payload();
        p.name = "  ".into();
        assert!(matches!(
            BookingRequest::try_from(p),
            Err(FormError::MissingFields)
        ));
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let mut p = payload();
        p.end_date = "2025-04-30".into();
        assert!(matches!(
            BookingRequest::try_from(p),
            Err(FormError::InvertedDates)
        ));
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut p = payload();
        p.email = "not-an-email".into();
        assert!(BookingRequest::try_from(p).is_err());
    }

    #[test]
    fn stay_requires_both_dates() {
        let stay = StayPayload {
            start_date: "2025-05-01".into(),
            end_date: String::new(),
        };
        assert!(matches!(
            StayDates::try_from(stay),
            Err(FormError::MissingDates)
        ));
    }
}
