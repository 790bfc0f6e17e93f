//! Public availability and direct bookings.

use std::collections::HashSet;

use log::{info, warn};

use crate::domain::block::{BlockSource, BusyRange, NewAvailabilityBlock};
use crate::domain::types::UnitId;
use crate::forms::booking::{BookingPayload, BookingRequest};
use crate::ical::{CalendarFetcher, parse_feed};
use crate::repository::{BlockReader, BlockWriter, GroupReader, UnitReader};
use crate::services::notify::{Notifier, send_alert, send_best_effort};
use crate::services::{ServiceError, ServiceResult};

const NOT_AVAILABLE: &str = "Dates not available";

/// Stored blocks of every unit in the group merged with live feed events.
/// Feed failures are ignored. Duplicates are dropped keeping first-seen order.
pub async fn group_availability<R, F>(
    repo: &R,
    fetcher: &F,
    slug: &str,
) -> ServiceResult<Vec<BusyRange>>
where
    R: GroupReader + UnitReader + BlockReader + ?Sized,
    F: CalendarFetcher + ?Sized,
{
    let group = repo.get_group(slug)?.ok_or(ServiceError::NotFound)?;

    let mut ranges: Vec<BusyRange> = repo
        .list_blocks_for_units(&group.unit_ids)?
        .iter()
        .map(BusyRange::from)
        .collect();

    for unit in repo.list_units_by_ids(&group.unit_ids)? {
        let Some(url) = unit.valid_ical_url() else {
            continue;
        };
        let events = match fetcher.fetch(url.as_str()).await {
            Ok(text) => parse_feed(&text),
            Err(e) => Err(e),
        };
        match events {
            Ok(events) => ranges.extend(events.into_iter().map(|event| BusyRange {
                start_date: event.start,
                end_date: event.end,
                source: BlockSource::Ical,
                unit_id: unit.id,
            })),
            Err(e) => warn!("Live feed of unit {} unavailable: {e}", unit.id),
        }
    }

    let mut seen = HashSet::new();
    ranges.retain(|range| seen.insert(range.clone()));
    Ok(ranges)
}

/// Insert `direct` blocks for all `unit_ids` unless any of them is taken.
fn reserve<R>(
    repo: &R,
    unit_ids: &[UnitId],
    request: &BookingRequest,
    note: &str,
) -> ServiceResult<()>
where
    R: BlockWriter + ?Sized,
{
    let blocks: Vec<NewAvailabilityBlock> = unit_ids
        .iter()
        .map(|unit_id| {
            NewAvailabilityBlock::new(
                *unit_id,
                request.dates,
                BlockSource::Direct,
                note.to_string(),
            )
        })
        .collect();

    if repo.create_blocks_if_available(&blocks)? {
        Ok(())
    } else {
        Err(ServiceError::Conflict(NOT_AVAILABLE.to_string()))
    }
}

/// Book a property group: every OTA listing of it gets blocked, or none does.
pub async fn book_group<R, N>(
    repo: &R,
    notifier: &N,
    alert_to: &str,
    slug: &str,
    payload: BookingPayload,
) -> ServiceResult<()>
where
    R: GroupReader + BlockWriter + ?Sized,
    N: Notifier + ?Sized,
{
    let group = repo.get_group(slug)?.ok_or(ServiceError::NotFound)?;
    let request = BookingRequest::try_from(payload)?;
    if group.unit_ids.is_empty() {
        return Err(ServiceError::Form(
            "no units linked to this property".to_string(),
        ));
    }

    let note = format!("Guest: {} {} (group:{slug})", request.name, request.email);
    reserve(repo, &group.unit_ids, &request, &note)?;
    info!("Booked {slug} {} for {}", request.dates, request.email);

    let (start, end) = (request.dates.start(), request.dates.end());
    let html = format!(
        "<p>Thank you {name},</p>\
<p>Your booking for <strong>{title}</strong> from {start} to {end} is confirmed.</p>\
<p>Guest: {name} — {email}</p>",
        name = ammonia::clean_text(request.name.as_str()),
        title = ammonia::clean_text(&group.title),
        email = request.email,
    );
    send_best_effort(
        notifier,
        request.email.as_str(),
        &format!("Booking confirmed — {slug} {start}–{end}"),
        &html,
        &format!("Booking confirmed: {start}–{end}"),
    )
    .await;
    send_alert(
        notifier,
        alert_to,
        "New Direct Booking (Grouped)",
        &format!(
            "Property {slug}: {start}–{end} Guest: {} ({}) on {} OTA listings",
            request.name,
            request.email,
            group.unit_ids.len()
        ),
    )
    .await;

    Ok(())
}

/// Book a single unit (legacy per-unit pages).
pub async fn book_unit<R, N>(
    repo: &R,
    notifier: &N,
    alert_to: &str,
    unit_id: i32,
    payload: BookingPayload,
) -> ServiceResult<()>
where
    R: UnitReader + BlockWriter + ?Sized,
    N: Notifier + ?Sized,
{
    let request = BookingRequest::try_from(payload)?;
    let unit_id = UnitId::new(unit_id).map_err(|_| ServiceError::NotFound)?;
    let unit = repo.get_unit_by_id(unit_id)?.ok_or(ServiceError::NotFound)?;

    let note = format!("Guest: {} {}", request.name, request.email);
    reserve(repo, &[unit.id], &request, &note)?;
    info!("Booked unit {} {} for {}", unit.id, request.dates, request.email);

    let (start, end) = (request.dates.start(), request.dates.end());
    let html = format!(
        "<p>Thank you {},<br/>Your booking for unit {} from {start} to {end} is confirmed.</p>",
        ammonia::clean_text(request.name.as_str()),
        unit.id
    );
    send_best_effort(
        notifier,
        request.email.as_str(),
        &format!("Booking confirmed — unit {}", unit.id),
        &html,
        &format!("Booking confirmed: {start}–{end}"),
    )
    .await;
    send_alert(
        notifier,
        alert_to,
        "New Direct Booking",
        &format!(
            "Unit {}: {start}–{end} Guest: {} ({})",
            unit.id, request.name, request.email
        ),
    )
    .await;

    Ok(())
}
