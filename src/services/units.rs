//! Units: feed URLs, CSV import, dashboard and public listings.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use chrono::FixedOffset;

use crate::domain::property_group::DEFAULT_IMAGE_URL;
use crate::domain::types::{Currency, IcalUrl, UnitId};
use crate::domain::unit::Unit;
use crate::dto::admin::{AdminCalendarData, DashboardData, DashboardRow, ExportLink};
use crate::dto::public::{PropertyPage, PublicGroup};
use crate::forms::units::{IcalUrlPayload, parse_units_csv};
use crate::ical::export_unit_calendar;
use crate::repository::{
    BlockListQuery, BlockReader, GroupReader, RateReader, UnitReader, UnitWriter,
};
use crate::services::{ServiceError, ServiceResult};

/// Point a unit at a new OTA feed.
pub fn update_ical_url<R>(repo: &R, unit_id: i32, payload: IcalUrlPayload) -> ServiceResult<Unit>
where
    R: UnitReader + UnitWriter + ?Sized,
{
    let url = IcalUrl::try_from(payload)?;
    let unit_id = UnitId::new(unit_id).map_err(|_| ServiceError::NotFound)?;
    repo.get_unit_by_id(unit_id)?.ok_or(ServiceError::NotFound)?;

    Ok(repo.update_unit_ical_url(unit_id, &url)?)
}

/// Create one unit per CSV row. Rows naming an existing (OTA, property) pair
/// are skipped, so importing the same file again changes nothing. Returns the
/// number of units created.
pub fn import_units<R, Rd>(repo: &R, reader: Rd) -> ServiceResult<usize>
where
    R: UnitWriter + ?Sized,
    Rd: Read,
{
    let units = parse_units_csv(reader)?;
    let created = repo.create_units(&units)?;
    log::info!(
        "Imported {created} unit(s), skipped {} existing",
        units.len().saturating_sub(created)
    );
    Ok(created)
}

/// [`import_units`] from a file on disk; a missing file is `NotFound`.
pub fn import_units_file<R>(repo: &R, path: &Path) -> ServiceResult<usize>
where
    R: UnitWriter + ?Sized,
{
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ServiceError::NotFound,
        _ => ServiceError::Form(format!("cannot read {}: {e}", path.display())),
    })?;
    import_units(repo, file)
}

/// Units ordered by id with their active plan's price. `last_sync` is kept in
/// UTC and shown in `offset`.
pub fn load_dashboard<R>(repo: &R, offset: FixedOffset) -> ServiceResult<DashboardData>
where
    R: UnitReader + RateReader + ?Sized,
{
    let units = repo.list_units()?;
    let mut plans = HashMap::new();
    for plan in repo.list_rate_plans()? {
        // first plan per unit wins
        plans.entry(plan.unit_id).or_insert(plan);
    }

    let rows = units
        .into_iter()
        .map(|unit| {
            let plan = plans.get(&unit.id);
            DashboardRow {
                last_sync: unit
                    .last_sync
                    .and_utc()
                    .with_timezone(&offset)
                    .format("%Y-%m-%d %H:%M %:z")
                    .to_string(),
                base_rate: plan.map(|p| p.base_rate),
                weekend_rate: plan.and_then(|p| p.weekend_rate),
                currency: plan
                    .map(|p| p.currency.to_string())
                    .unwrap_or_else(|| Currency::DEFAULT.to_string()),
                unit,
            }
        })
        .collect();

    Ok(DashboardData { rows })
}

/// Price shown for a unit: its plan's positive base rate.
fn listed_price<R>(repo: &R, unit_id: Option<UnitId>) -> ServiceResult<(Option<f64>, String)>
where
    R: RateReader + ?Sized,
{
    let plan = match unit_id {
        Some(unit_id) => repo.get_rate_plan(unit_id)?,
        None => None,
    };
    Ok(match plan {
        Some(plan) if plan.base_rate > 0.0 => (Some(plan.base_rate), plan.currency.to_string()),
        Some(plan) => (None, plan.currency.to_string()),
        None => (None, Currency::DEFAULT.to_string()),
    })
}

/// Public property cards. Units in `hidden` are removed from the output only.
pub fn list_public_groups<R>(repo: &R, hidden: &HashSet<i32>) -> ServiceResult<Vec<PublicGroup>>
where
    R: GroupReader + RateReader + ?Sized,
{
    repo.list_groups()?
        .into_iter()
        .map(|group| {
            let unit_ids: Vec<UnitId> = group
                .unit_ids
                .into_iter()
                .filter(|id| !hidden.contains(&id.get()))
                .collect();
            let (price, currency) = listed_price(repo, unit_ids.first().copied())?;
            Ok(PublicGroup {
                slug: group.slug,
                title: group.title,
                image_url: group.image_url,
                unit_ids,
                price,
                currency,
            })
        })
        .collect()
}

pub fn load_property_page<R>(repo: &R, slug: &str) -> ServiceResult<PropertyPage>
where
    R: GroupReader + RateReader + ?Sized,
{
    let group = repo.get_group(slug)?.ok_or(ServiceError::NotFound)?;
    let (price, currency) = listed_price(repo, group.pricing_unit())?;

    Ok(PropertyPage {
        slug: Some(group.slug),
        unit_id: None,
        title: group.title,
        image_url: group.image_url,
        price,
        currency,
    })
}

/// Legacy single-unit booking page.
pub fn load_unit_page<R>(repo: &R, unit_id: i32) -> ServiceResult<PropertyPage>
where
    R: UnitReader + RateReader + ?Sized,
{
    let unit_id = UnitId::new(unit_id).map_err(|_| ServiceError::NotFound)?;
    let unit = repo.get_unit_by_id(unit_id)?.ok_or(ServiceError::NotFound)?;
    let (price, currency) = listed_price(repo, Some(unit.id))?;

    Ok(PropertyPage {
        slug: None,
        unit_id: Some(unit.id),
        title: unit.display_name(),
        image_url: DEFAULT_IMAGE_URL.to_string(),
        price,
        currency,
    })
}

pub fn list_units<R>(repo: &R) -> ServiceResult<Vec<Unit>>
where
    R: UnitReader + ?Sized,
{
    Ok(repo.list_units()?)
}

/// Export feed URL of every unit, rooted at `base_url`.
pub fn list_export_links<R>(repo: &R, base_url: &str) -> ServiceResult<Vec<ExportLink>>
where
    R: UnitReader + ?Sized,
{
    let base = base_url.trim_end_matches('/');
    Ok(repo
        .list_units()?
        .into_iter()
        .map(|unit| ExportLink {
            url: format!("{base}/ical/export/{}.ics", unit.id),
            unit,
        })
        .collect())
}

/// ICS calendar of all blocks of one unit.
pub fn export_unit_ics<R>(repo: &R, unit_id: i32) -> ServiceResult<String>
where
    R: UnitReader + BlockReader + ?Sized,
{
    let unit_id = UnitId::new(unit_id).map_err(|_| ServiceError::NotFound)?;
    let unit = repo.get_unit_by_id(unit_id)?.ok_or(ServiceError::NotFound)?;
    let blocks = repo.list_blocks(BlockListQuery::new().unit(unit_id))?;
    Ok(export_unit_calendar(&unit, &blocks))
}

pub fn load_admin_calendar<R>(repo: &R, slug: &str) -> ServiceResult<AdminCalendarData>
where
    R: GroupReader + UnitReader + ?Sized,
{
    let group = repo.get_group(slug)?.ok_or(ServiceError::NotFound)?;
    let units = repo.list_units_by_ids(&group.unit_ids)?;
    Ok(AdminCalendarData { group, units })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Offset, Utc};

    use super::*;
    use crate::domain::property_group::PropertyGroup;
    use crate::domain::rate_plan::RatePlan;
    use crate::domain::types::RatePlanId;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn unit(id: i32) -> Unit {
        Unit {
            id: UnitId::new(id).unwrap(),
            ota: "Airbnb".into(),
            property_id: format!("P{id}"),
            ical_url: None,
            last_sync: Utc::now().naive_utc(),
        }
    }

    fn plan(id: i32, unit_id: i32, base: f64, currency: &str) -> RatePlan {
        RatePlan {
            id: RatePlanId::new(id).unwrap(),
            unit_id: UnitId::new(unit_id).unwrap(),
            base_rate: base,
            weekend_rate: None,
            currency: Currency::new(currency).unwrap(),
        }
    }

    #[test]
    fn update_url_rejects_non_http() {
        let mut repo = MockRepository::new();
        repo.expect_update_unit_ical_url().times(0);
        let result = update_ical_url(
            &repo,
            1,
            IcalUrlPayload {
                ical_url: "calendar.ics".into(),
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(msg)) if msg == "invalid url"));
    }

    #[test]
    fn update_url_unknown_unit_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_unit_by_id().returning(|_| Ok(None));
        repo.expect_update_unit_ical_url().times(0);
        let result = update_ical_url(
            &repo,
            5,
            IcalUrlPayload {
                ical_url: "https://a/b.ics".into(),
            },
        );
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn import_creates_one_unit_per_row() {
        let mut repo = MockRepository::new();
        repo.expect_create_units()
            .withf(|units| units.len() == 2 && units[1].ota == "Agoda")
            .times(1)
            .returning(|units| Ok(units.len()));
        let csv = "OTA Name,Property ID / Room ID,iCal URL\nAirbnb,1,\nAgoda,2,https://x\n";

        assert_eq!(import_units(&repo, csv.as_bytes()).unwrap(), 2);
    }

    #[test]
    fn import_missing_file_is_not_found() {
        let repo = MockRepository::new();
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            import_units_file(&repo, &dir.path().join("missing.csv")),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn dashboard_uses_first_plan_per_unit() {
        let mut repo = MockRepository::new();
        repo.expect_list_units()
            .returning(|| Ok(vec![unit(1), unit(2)]));
        repo.expect_list_rate_plans().returning(|| {
            Ok(vec![
                plan(1, 1, 1200.0, "USD"),
                plan(2, 1, 9999.0, "EUR"),
            ])
        });

        let data = load_dashboard(&repo, Utc.fix()).unwrap();

        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0].base_rate, Some(1200.0));
        assert_eq!(data.rows[0].currency, "USD");
        assert_eq!(data.rows[1].base_rate, None);
        assert_eq!(data.rows[1].currency, "THB");
    }

    #[test]
    fn dashboard_shows_last_sync_in_configured_offset() {
        let mut repo = MockRepository::new();
        repo.expect_list_units().returning(|| {
            let mut synced = unit(1);
            synced.last_sync = NaiveDate::from_ymd_opt(2025, 5, 1)
                .unwrap()
                .and_hms_opt(20, 30, 0)
                .unwrap();
            Ok(vec![synced])
        });
        repo.expect_list_rate_plans().returning(|| Ok(vec![]));

        let bangkok = FixedOffset::east_opt(7 * 3600).unwrap();
        let data = load_dashboard(&repo, bangkok).unwrap();

        assert_eq!(data.rows[0].last_sync, "2025-05-02 03:30 +07:00");
    }

    #[test]
    fn public_listing_hides_ignored_units() {
        let mut repo = MockRepository::new();
        repo.expect_list_groups().returning(|| {
            Ok(vec![PropertyGroup {
                slug: "villa".into(),
                title: "Villa".into(),
                image_url: DEFAULT_IMAGE_URL.into(),
                unit_ids: vec![UnitId::new(1).unwrap(), UnitId::new(2).unwrap()],
            }])
        });
        repo.expect_get_rate_plan()
            .withf(|id| id.get() == 2)
            .times(1)
            .returning(|id| Ok(Some(plan(5, id.get(), 1800.0, "THB"))));

        let hidden: HashSet<i32> = [1].into_iter().collect();
        let groups = list_public_groups(&repo, &hidden).unwrap();

        assert_eq!(groups[0].unit_ids, vec![UnitId::new(2).unwrap()]);
        assert_eq!(groups[0].price, Some(1800.0));
    }

    #[test]
    fn public_listing_without_units_has_no_price() {
        let mut repo = MockRepository::new();
        repo.expect_list_groups().returning(|| {
            Ok(vec![PropertyGroup {
                slug: "empty".into(),
                title: "Empty".into(),
                image_url: DEFAULT_IMAGE_URL.into(),
                unit_ids: vec![],
            }])
        });
        repo.expect_get_rate_plan().times(0);

        let groups = list_public_groups(&repo, &HashSet::new()).unwrap();

        assert_eq!(groups[0].price, None);
        assert_eq!(groups[0].currency, "THB");
    }

    #[test]
    fn export_links_are_rooted_at_base() {
        let mut repo = MockRepository::new();
        repo.expect_list_units().returning(|| Ok(vec![unit(3)]));

        let links = list_export_links(&repo, "https://cm.example.com/").unwrap();

        assert_eq!(links[0].url, "https://cm.example.com/ical/export/3.ics");
    }

    #[test]
    fn export_unknown_unit_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_unit_by_id().returning(|_| Ok(None));
        assert!(matches!(
            export_unit_ics(&repo, 3),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn repository_errors_propagate() {
        let mut repo = MockRepository::new();
        repo.expect_list_units()
            .returning(|| Err(RepositoryError::ConnectionError("down".into())));
        assert!(matches!(
            list_units(&repo),
            Err(ServiceError::Repository(_))
        ));
    }
}
