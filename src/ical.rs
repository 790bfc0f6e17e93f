//! Calendar feed parsing, fetching and export.

use std::time::Duration;

use chrono::NaiveDate;
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
    Property,
};
use reqwest::Client;
use thiserror::Error;

use crate::domain::block::AvailabilityBlock;
use crate::domain::unit::Unit;

/// Product identifier written into exported calendars.
pub const EXPORT_DOMAIN: &str = "channel-manager";

/// `PRODID` of exported calendars.
pub const EXPORT_PRODID: &str = "-//channel-manager//EN";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("invalid calendar: {0}")]
    Parse(String),
}

/// One VEVENT reduced to the dates it occupies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedEvent {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub summary: String,
}

fn date_part(value: DatePerhapsTime) -> NaiveDate {
    match value {
        DatePerhapsTime::Date(date) => date,
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(dt)) => dt.date(),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt.date_naive(),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, .. }) => {
            date_time.date()
        }
    }
}

/// Parse feed text into events. Events without both DTSTART and DTEND are skipped.
pub fn parse_feed(text: &str) -> Result<Vec<FeedEvent>, FeedError> {
    let calendar: Calendar = text.parse().map_err(FeedError::Parse)?;

    let events = calendar
        .components
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(event),
            _ => None,
        })
        .filter_map(|event| {
            let start = event.get_start()?;
            let end = event.get_end()?;
            Some(FeedEvent {
                start: date_part(start),
                end: date_part(end),
                summary: event.property_value("SUMMARY").unwrap_or_default().to_string(),
            })
        })
        .collect();

    Ok(events)
}

/// Source of raw calendar text for a feed URL.
#[allow(async_fn_in_trait)]
pub trait CalendarFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FeedError>;
}

/// Fetches feeds over HTTP(S).
#[derive(Clone)]
pub struct HttpCalendarFetcher {
    client: Client,
}

impl HttpCalendarFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl CalendarFetcher for HttpCalendarFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Render all blocks of a unit as an all-day ICS calendar.
pub fn export_unit_calendar(unit: &Unit, blocks: &[AvailabilityBlock]) -> String {
    let mut calendar = Calendar::empty();
    calendar
        .append_property(Property::new("VERSION", "2.0"))
        .append_property(Property::new("PRODID", EXPORT_PRODID))
        .append_property(Property::new("CALSCALE", "GREGORIAN"));
    let summary = format!("BLOCKED ({} {})", unit.ota, unit.property_id);

    for block in blocks {
        let event = Event::new()
            .uid(&format!("cm-{}-{}@{EXPORT_DOMAIN}", unit.id, block.id))
            .summary(&summary)
            .starts(block.start_date)
            .ends(block.end_date)
            .done();
        calendar.push(event);
    }

    calendar.to_string()
}
