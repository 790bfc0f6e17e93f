//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! normalized/validated email, ordered stay dates) so that once a value
//! reaches the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Date format used on the wire and in the database.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Provided url is not an http(s) address.
    #[error("invalid url")]
    InvalidUrl,
    /// Provided string is not a `YYYY-MM-DD` date.
    #[error("invalid date")]
    InvalidDate,
    /// Check-out is not after check-in.
    #[error("check-out must be after check-in")]
    InvertedRange,
    /// Price is negative or not a finite number.
    #[error("invalid price")]
    InvalidPrice,
}

/// Normalizes and validates an email string.
fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Parses a `YYYY-MM-DD` string after trimming whitespace.
pub fn parse_date(value: &str) -> Result<NaiveDate, TypeConstraintError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| TypeConstraintError::InvalidDate)
}

/// Friday and Saturday nights are priced as weekend nights.
pub fn is_weekend_night(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Fri | Weekday::Sat)
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(UnitId, "Unique identifier for a bookable unit.");
id_newtype!(BlockId, "Unique identifier for an availability block.");
id_newtype!(RatePlanId, "Unique identifier for a rate plan.");
id_newtype!(DateRateId, "Unique identifier for a per-date price override.");

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new(value)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

non_empty_string_newtype!(GuestName, "Guest name wrapper enforcing non-empty values.");

non_empty_string_newtype!(
    GroupSlug,
    "Public property slug enforcing trimmed, non-empty values."
);

/// Lower-cased and validated guest email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GuestEmail(String);

impl GuestEmail {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_email(email)?;
        Ok(Self(normalized))
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for GuestEmail {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for GuestEmail {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// External calendar feed address. Only `http`/`https` feeds are accepted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct IcalUrl(String);

impl IcalUrl {
    /// Trims the value and requires an `http` prefix (any case).
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let url = NonEmptyString::new(value).map_err(|_| TypeConstraintError::InvalidUrl)?;
        let url = url.into_inner();
        if url.to_lowercase().starts_with("http") {
            Ok(Self(url))
        } else {
            Err(TypeConstraintError::InvalidUrl)
        }
    }

    /// Borrow the url.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the owned url.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for IcalUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for IcalUrl {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Upper-cased ISO currency code; `THB` when blank.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Currency(String);

impl Currency {
    pub const DEFAULT: &'static str = "THB";

    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let code = value.into().trim().to_uppercase();
        if code.is_empty() {
            return Ok(Self::default());
        }
        if code.len() > 8 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TypeConstraintError::InvalidValue(code));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form expected by the payment provider.
    pub fn to_provider_code(&self) -> String {
        self.0.to_lowercase()
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative, finite nightly price.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidPrice)
        }
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

/// Check-in / check-out pair. `end` is the checkout day and is exclusive.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StayDates {
    start: NaiveDate,
    end: NaiveDate,
}

impl StayDates {
    /// Requires `start < end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TypeConstraintError> {
        if end <= start {
            return Err(TypeConstraintError::InvertedRange);
        }
        Ok(Self { start, end })
    }

    /// Parses both ends from `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, TypeConstraintError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// A single night starting at `day`.
    pub fn single_night(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day + Duration::days(1),
        }
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Every night of the stay, check-out excluded.
    pub fn each_night(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d < self.end)
    }

    /// Half-open interval intersection.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start < end && start < self.end
    }
}

impl Display for StayDates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}–{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).expect("valid date")
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(UnitId::new(1).is_ok());
        assert_eq!(UnitId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(BlockId::new(-3), Err(TypeConstraintError::NonPositiveId));
    }

    #[test]
    fn ical_url_requires_http_prefix() {
        assert!(IcalUrl::new(" HTTPS://example.com/feed.ics ").is_ok());
        assert_eq!(
            IcalUrl::new("webcal://example.com"),
            Err(TypeConstraintError::InvalidUrl)
        );
        assert_eq!(IcalUrl::new("   "), Err(TypeConstraintError::InvalidUrl));
    }

    #[test]
    fn currency_defaults_and_normalizes() {
        assert_eq!(Currency::new("").unwrap().as_str(), "THB");
        assert_eq!(Currency::new(" usd ").unwrap().as_str(), "USD");
        assert_eq!(Currency::new("usd").unwrap().to_provider_code(), "usd");
        assert!(Currency::new("12$").is_err());
    }

    #[test]
    fn stay_dates_reject_inverted_and_empty_ranges() {
        assert_eq!(
            StayDates::parse("2025-03-02", "2025-03-02"),
            Err(TypeConstraintError::InvertedRange)
        );
        assert_eq!(
            StayDates::parse("2025-03-02", "2025-03-01"),
            Err(TypeConstraintError::InvertedRange)
        );
        assert_eq!(
            StayDates::parse("2025-3-x", "2025-03-01"),
            Err(TypeConstraintError::InvalidDate)
        );
    }

    #[test]
    fn stay_dates_count_nights_and_iterate() {
        let stay = StayDates::parse("2025-03-01", "2025-03-04").unwrap();
        assert_eq!(stay.nights(), 3);
        let nights: Vec<_> = stay.each_night().collect();
        assert_eq!(
            nights,
            vec![date("2025-03-01"), date("2025-03-02"), date("2025-03-03")]
        );
    }

    #[test]
    fn overlap_is_half_open() {
        let stay = StayDates::parse("2025-03-05", "2025-03-08").unwrap();
        assert!(!stay.overlaps(date("2025-03-01"), date("2025-03-05")));
        assert!(!stay.overlaps(date("2025-03-08"), date("2025-03-10")));
        assert!(stay.overlaps(date("2025-03-07"), date("2025-03-09")));
        assert!(stay.overlaps(date("2025-03-01"), date("2025-03-20")));
    }

    #[test]
    fn weekend_nights_are_friday_and_saturday() {
        // 2025-03-07 is a Friday.
        assert!(is_weekend_night(date("2025-03-07")));
        assert!(is_weekend_night(date("2025-03-08")));
        assert!(!is_weekend_night(date("2025-03-09")));
        assert!(!is_weekend_night(date("2025-03-06")));
    }

    #[test]
    fn guest_email_is_normalized() {
        let email = GuestEmail::new("  Guest@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "guest@example.com");
        assert!(GuestEmail::new("nope").is_err());
    }
}
