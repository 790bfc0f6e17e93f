//! Admin JSON endpoints. Every handler requires a signed-in administrator and
//! answers `401 {"error": "unauthorized"}` otherwise.

use actix_web::{HttpResponse, delete, get, post, web};
use serde_json::json;

use crate::forms::blocks::{BlocksQuery, CreateBlockPayload, DeleteBlockQuery, ToggleDayPayload};
use crate::forms::rates::{DateRateKeyQuery, DateRatePayload, RatePlanPayload};
use crate::forms::units::IcalUrlPayload;
use crate::ical::HttpCalendarFetcher;
use crate::models::auth::AdminUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::ApiResult;
use crate::services::notify::Mailer;
use crate::services::{blocks, rates, sync, units};

#[post("/api/unit/{unit_id}/ical")]
pub async fn update_unit_ical(
    _user: AdminUser,
    unit_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Json(payload): web::Json<IcalUrlPayload>,
) -> ApiResult<HttpResponse> {
    units::update_ical_url(repo.get_ref(), unit_id.into_inner(), payload)?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

#[get("/api/check_ical")]
pub async fn check_ical(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    fetcher: web::Data<HttpCalendarFetcher>,
) -> ApiResult<HttpResponse> {
    let checks = sync::check_feeds(repo.get_ref(), fetcher.get_ref()).await?;
    Ok(HttpResponse::Ok().json(checks))
}

#[post("/api/rates")]
pub async fn save_rates(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    web::Json(payload): web::Json<RatePlanPayload>,
) -> ApiResult<HttpResponse> {
    let plan = rates::save_rate_plan(repo.get_ref(), payload)?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "rate_plan": plan })))
}

#[post("/api/date_rates")]
pub async fn save_date_rate(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    web::Json(payload): web::Json<DateRatePayload>,
) -> ApiResult<HttpResponse> {
    let rate = rates::set_date_rate(repo.get_ref(), payload)?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "date_rate": rate })))
}

#[delete("/api/date_rates")]
pub async fn delete_date_rate(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<DateRateKeyQuery>,
) -> ApiResult<HttpResponse> {
    rates::delete_date_rate(repo.get_ref(), query.into_inner())?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

#[get("/api/blocks")]
pub async fn list_blocks(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<BlocksQuery>,
) -> ApiResult<HttpResponse> {
    let blocks = blocks::list_blocks(repo.get_ref(), query.into_inner())?;
    Ok(HttpResponse::Ok().json(blocks))
}

#[post("/api/blocks")]
pub async fn create_block(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    mailer: web::Data<Mailer>,
    server_config: web::Data<ServerConfig>,
    web::Json(payload): web::Json<CreateBlockPayload>,
) -> ApiResult<HttpResponse> {
    let block = blocks::create_block(
        repo.get_ref(),
        mailer.get_ref(),
        &server_config.alert_to,
        payload,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "id": block.id })))
}

#[delete("/api/blocks")]
pub async fn delete_block(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<DeleteBlockQuery>,
) -> ApiResult<HttpResponse> {
    blocks::delete_block(repo.get_ref(), query.into_inner())?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

#[post("/api/admin/sync_now")]
pub async fn sync_now(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    fetcher: web::Data<HttpCalendarFetcher>,
) -> ApiResult<HttpResponse> {
    let summary = sync::sync_all(repo.get_ref(), fetcher.get_ref()).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "summary": summary })))
}

#[post("/api/admin/sync_property/{slug}")]
pub async fn sync_property(
    _user: AdminUser,
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    fetcher: web::Data<HttpCalendarFetcher>,
) -> ApiResult<HttpResponse> {
    let summary = sync::sync_group(repo.get_ref(), fetcher.get_ref(), &slug).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "summary": summary })))
}

#[post("/api/admin/toggle_day/{slug}")]
pub async fn toggle_day(
    _user: AdminUser,
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    web::Json(payload): web::Json<ToggleDayPayload>,
) -> ApiResult<HttpResponse> {
    blocks::toggle_day(repo.get_ref(), &slug, payload)?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}
