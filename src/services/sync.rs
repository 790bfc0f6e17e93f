//! Mirroring OTA calendar feeds into availability blocks.

use std::time::Duration;

use chrono::Utc;
use log::{error, info};

use crate::domain::block::{BlockSource, NewAvailabilityBlock};
use crate::domain::types::StayDates;
use crate::domain::unit::Unit;
use crate::dto::sync::{FeedCheck, SyncResult};
use crate::ical::{CalendarFetcher, FeedError, parse_feed};
use crate::repository::{BlockWriter, GroupReader, UnitReader};
use crate::services::{ServiceError, ServiceResult};

const SYNC_ERROR_LIMIT: usize = 140;
const CHECK_ERROR_LIMIT: usize = 80;

fn truncate(message: &str, limit: usize) -> String {
    message.chars().take(limit).collect()
}

fn result(unit: &Unit, status: String) -> SyncResult {
    SyncResult {
        unit_id: unit.id,
        ota: unit.ota.clone(),
        property_id: unit.property_id.clone(),
        status,
    }
}

/// Fetch and parse one feed into blocks tagged with the unit's OTA source.
/// Events ending on or before their start are skipped.
async fn fetch_blocks<F>(
    fetcher: &F,
    unit: &Unit,
    url: &str,
    source: &BlockSource,
) -> Result<Vec<NewAvailabilityBlock>, FeedError>
where
    F: CalendarFetcher + ?Sized,
{
    let text = fetcher.fetch(url).await?;
    let events = parse_feed(&text)?;

    Ok(events
        .into_iter()
        .filter_map(|event| {
            let dates = StayDates::new(event.start, event.end).ok()?;
            Some(NewAvailabilityBlock::from_feed(
                unit.id,
                dates,
                source.clone(),
                &event.summary,
            ))
        })
        .collect())
}

/// Sync each unit independently; one failing feed never affects the others.
pub async fn sync_units<R, F>(repo: &R, fetcher: &F, units: &[Unit]) -> Vec<SyncResult>
where
    R: BlockWriter + ?Sized,
    F: CalendarFetcher + ?Sized,
{
    let mut results = Vec::with_capacity(units.len());

    for unit in units {
        if unit.ical_url.as_deref().is_none_or(|url| url.trim().is_empty()) {
            results.push(result(unit, "skipped (no iCal URL)".to_string()));
            continue;
        }
        let Some(url) = unit.valid_ical_url() else {
            results.push(result(unit, "ERROR — invalid iCal URL".to_string()));
            continue;
        };

        let source = unit.sync_source();
        let status = match fetch_blocks(fetcher, unit, url.as_str(), &source).await {
            Ok(blocks) => {
                match repo.replace_synced_blocks(unit.id, &source, &blocks, Utc::now().naive_utc())
                {
                    Ok(inserted) => format!("OK — {inserted} events"),
                    Err(e) => format!("ERROR — {}", truncate(&e.to_string(), SYNC_ERROR_LIMIT)),
                }
            }
            Err(e) => format!("ERROR — {}", truncate(&e.to_string(), SYNC_ERROR_LIMIT)),
        };
        results.push(result(unit, status));
    }

    results
}

pub async fn sync_all<R, F>(repo: &R, fetcher: &F) -> ServiceResult<Vec<SyncResult>>
where
    R: UnitReader + BlockWriter + ?Sized,
    F: CalendarFetcher + ?Sized,
{
    let units = repo.list_units()?;
    Ok(sync_units(repo, fetcher, &units).await)
}

/// Sync only the units of one property group.
pub async fn sync_group<R, F>(repo: &R, fetcher: &F, slug: &str) -> ServiceResult<Vec<SyncResult>>
where
    R: GroupReader + UnitReader + BlockWriter + ?Sized,
    F: CalendarFetcher + ?Sized,
{
    let group = repo
        .get_group(slug)?
        .ok_or_else(|| ServiceError::Form("group not found".to_string()))?;
    if group.unit_ids.is_empty() {
        return Err(ServiceError::Form("no units linked".to_string()));
    }
    let units = repo.list_units_by_ids(&group.unit_ids)?;
    Ok(sync_units(repo, fetcher, &units).await)
}

/// Probe every feed without storing anything.
pub async fn check_feeds<R, F>(repo: &R, fetcher: &F) -> ServiceResult<Vec<FeedCheck>>
where
    R: UnitReader + ?Sized,
    F: CalendarFetcher + ?Sized,
{
    let units = repo.list_units()?;
    let mut checks = Vec::with_capacity(units.len());

    for unit in &units {
        let status = match unit.ical_url.as_deref().map(str::trim) {
            None | Some("") => "(empty — add later)".to_string(),
            Some(url) => match fetcher.fetch(url).await {
                Ok(text) if text.contains("BEGIN:VCALENDAR") => match parse_feed(&text) {
                    Ok(events) => format!("OK ({} events)", events.len()),
                    Err(_) => "OK".to_string(),
                },
                Ok(_) => "Unexpected (200)".to_string(),
                Err(FeedError::Status(code)) => format!("Unexpected ({code})"),
                Err(e) => format!("Error: {}", truncate(&e.to_string(), CHECK_ERROR_LIMIT)),
            },
        };
        checks.push(FeedCheck {
            ota: unit.ota.clone(),
            property_id: unit.property_id.clone(),
            status,
        });
    }

    Ok(checks)
}

/// Run [`sync_all`] forever every `interval`, logging one line per unit.
pub async fn run_periodic_sync<R, F>(repo: R, fetcher: F, interval: Duration)
where
    R: UnitReader + BlockWriter,
    F: CalendarFetcher,
{
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match sync_all(&repo, &fetcher).await {
            Ok(results) => {
                for row in results {
                    info!("[SYNC] Unit {}: {}", row.unit_id, row.status);
                }
            }
            Err(e) => error!("Sync loop error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::property_group::PropertyGroup;
    use crate::domain::types::UnitId;
    use crate::repository::mock::MockRepository;

    /// Serves canned feed bodies keyed by URL.
    #[derive(Default)]
    struct FakeFetcher {
        feeds: HashMap<String, Result<String, u16>>,
    }

    impl FakeFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.feeds.insert(url.to_string(), Ok(body.to_string()));
            self
        }

        fn failing(mut self, url: &str, status: u16) -> Self {
            self.feeds.insert(url.to_string(), Err(status));
            self
        }
    }

    impl CalendarFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FeedError> {
            match self.feeds.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FeedError::Status(*status)),
                None => Err(FeedError::Parse("no such feed".into())),
            }
        }
    }

    const FEED: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\n\
BEGIN:VEVENT\r\nDTSTART;VALUE=DATE:20250501\r\nDTEND;VALUE=DATE:20250503\r\nSUMMARY:Reserved\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nDTSTART;VALUE=DATE:20250510\r\nDTEND;VALUE=DATE:20250510\r\nSUMMARY:Zero\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn unit(id: i32, ota: &str, url: Option<&str>) -> Unit {
        Unit {
            id: UnitId::new(id).unwrap(),
            ota: ota.into(),
            property_id: format!("P{id}"),
            ical_url: url.map(str::to_string),
            last_sync: Utc::now().naive_utc(),
        }
    }

    #[tokio::test]
    async fn statuses_cover_every_outcome() {
        let mut repo = MockRepository::new();
        repo.expect_replace_synced_blocks()
            .withf(|unit_id, source, blocks, _| {
                unit_id.get() == 3
                    && *source == BlockSource::Ota("airbnb".into())
                    && blocks.len() == 1
                    && blocks[0].note == "Reserved"
            })
            .times(1)
            .returning(|_, _, blocks, _| Ok(blocks.len()));
        let fetcher = FakeFetcher::default()
            .with("https://a/ok.ics", FEED)
            .failing("https://a/gone.ics", 404);

        let units = vec![
            unit(1, "Agoda", None),
            unit(2, "Agoda", Some("webcal://x")),
            unit(3, "Airbnb", Some("https://a/ok.ics")),
            unit(4, "Booking.com", Some("https://a/gone.ics")),
        ];
        let results = sync_units(&repo, &fetcher, &units).await;

        let statuses: Vec<&str> = results.iter().map(|r| r.status.as_str()).collect();
        assert_eq!(statuses[0], "skipped (no iCal URL)");
        assert_eq!(statuses[1], "ERROR — invalid iCal URL");
        assert_eq!(statuses[2], "OK — 1 events");
        assert_eq!(statuses[3], "ERROR — unexpected status 404");
    }

    #[tokio::test]
    async fn sync_group_requires_known_group() {
        let mut repo = MockRepository::new();
        repo.expect_get_group().returning(|_| Ok(None));
        let fetcher = FakeFetcher::default();

        let result = sync_group(&repo, &fetcher, "nope").await;

        assert!(matches!(result, Err(ServiceError::Form(msg)) if msg == "group not found"));
    }

    #[tokio::test]
    async fn sync_group_requires_units() {
        let mut repo = MockRepository::new();
        repo.expect_get_group().returning(|slug| {
            Ok(Some(PropertyGroup {
                slug: slug.to_string(),
                title: slug.to_string(),
                image_url: String::new(),
                unit_ids: vec![],
            }))
        });
        let fetcher = FakeFetcher::default();

        let result = sync_group(&repo, &fetcher, "empty").await;

        assert!(matches!(result, Err(ServiceError::Form(msg)) if msg == "no units linked"));
    }

    #[tokio::test]
    async fn check_feeds_reports_without_writing() {
        let mut repo = MockRepository::new();
        repo.expect_list_units().returning(|| {
            Ok(vec![
                unit(1, "Agoda", None),
                unit(2, "Airbnb", Some("https://a/ok.ics")),
                unit(3, "Airbnb", Some("https://a/html")),
                unit(4, "Airbnb", Some("https://a/gone.ics")),
            ])
        });
        repo.expect_replace_synced_blocks().times(0);
        let fetcher = FakeFetcher::default()
            .with("https://a/ok.ics", FEED)
            .with("https://a/html", "<html></html>")
            .failing("https://a/gone.ics", 500);

        let checks = check_feeds(&repo, &fetcher).await.unwrap();

        assert_eq!(checks[0].status, "(empty — add later)");
        assert_eq!(checks[1].status, "OK (2 events)");
        assert_eq!(checks[2].status, "Unexpected (200)");
        assert_eq!(checks[3].status, "Unexpected (500)");
    }
}
