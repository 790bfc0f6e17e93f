//! Guest-facing pages and booking endpoints. None of these require a session.

use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use log::error;
use serde_json::json;
use tera::{Context, Tera};

use crate::dto::public::PropertyPage;
use crate::forms::booking::{BookingPayload, StayPayload};
use crate::ical::HttpCalendarFetcher;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, base_context, render_template};
use crate::services::notify::Mailer;
use crate::services::payments::StripeGateway;
use crate::services::{ServiceError, booking, payments, rates, units};

/// Context of pages that take payments.
fn checkout_context(
    flash_messages: &IncomingFlashMessages,
    session: &Session,
    config: &ServerConfig,
    current_page: &str,
) -> Context {
    let mut context = base_context(flash_messages, session, config, current_page);
    context.insert("publishable_key", &config.stripe_publishable_key);
    context.insert("test_mode", &config.payments_test_mode());
    context.insert("support_email", &config.alert_to);
    context
}

fn render_property(tera: &Tera, mut context: Context, page: &PropertyPage) -> HttpResponse {
    context.insert("page", page);
    render_template(tera, "public/room.html", &context)
}

fn page_error(e: ServiceError) -> HttpResponse {
    match e {
        ServiceError::NotFound => HttpResponse::NotFound().body("Not found"),
        e => {
            error!("Failed to load page: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/properties")]
pub async fn show_properties(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    session: Session,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let hidden = server_config.ignored_public_units();
    let groups = match units::list_public_groups(repo.get_ref(), &hidden) {
        Ok(groups) => groups,
        Err(e) => return page_error(e),
    };

    let mut context = checkout_context(&flash_messages, &session, &server_config, "properties");
    context.insert("groups", &groups);
    render_template(&tera, "public/properties.html", &context)
}

#[get("/prop/{slug}")]
pub async fn show_property(
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    session: Session,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match units::load_property_page(repo.get_ref(), &slug) {
        Ok(page) => {
            let context = checkout_context(&flash_messages, &session, &server_config, "property");
            render_property(&tera, context, &page)
        }
        Err(e) => page_error(e),
    }
}

#[get("/r")]
pub async fn show_public_links(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    session: Session,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let units = match units::list_units(repo.get_ref()) {
        Ok(units) => units,
        Err(e) => return page_error(e),
    };

    let mut context = base_context(&flash_messages, &session, &server_config, "links");
    context.insert("units", &units);
    render_template(&tera, "public/links.html", &context)
}

#[get("/r/{unit_id}")]
pub async fn show_unit(
    unit_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    session: Session,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match units::load_unit_page(repo.get_ref(), unit_id.into_inner()) {
        Ok(page) => {
            let context = checkout_context(&flash_messages, &session, &server_config, "property");
            render_property(&tera, context, &page)
        }
        Err(e) => page_error(e),
    }
}

#[get("/api/public/availability/{slug}")]
pub async fn group_availability(
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    fetcher: web::Data<HttpCalendarFetcher>,
) -> ApiResult<HttpResponse> {
    let ranges = booking::group_availability(repo.get_ref(), fetcher.get_ref(), &slug).await?;
    Ok(HttpResponse::Ok().json(ranges))
}

#[get("/api/public/quote/{slug}")]
pub async fn quote(
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    query: web::Query<StayPayload>,
) -> ApiResult<HttpResponse> {
    let quote = rates::quote_group(repo.get_ref(), &slug, query.into_inner())?;
    Ok(HttpResponse::Ok().json(quote))
}

#[post("/api/public/create_intent/{slug}")]
pub async fn create_intent(
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<StripeGateway>,
    web::Json(payload): web::Json<StayPayload>,
) -> ApiResult<HttpResponse> {
    let intent =
        payments::create_group_intent(repo.get_ref(), gateway.get_ref(), &slug, payload).await?;
    Ok(HttpResponse::Ok().json(intent))
}

#[post("/api/public/book_group/{slug}")]
pub async fn book_group(
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    mailer: web::Data<Mailer>,
    server_config: web::Data<ServerConfig>,
    web::Json(payload): web::Json<BookingPayload>,
) -> ApiResult<HttpResponse> {
    booking::book_group(
        repo.get_ref(),
        mailer.get_ref(),
        &server_config.alert_to,
        &slug,
        payload,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

#[post("/api/public/book/{unit_id}")]
pub async fn book_unit(
    unit_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    mailer: web::Data<Mailer>,
    server_config: web::Data<ServerConfig>,
    web::Json(payload): web::Json<BookingPayload>,
) -> ApiResult<HttpResponse> {
    booking::book_unit(
        repo.get_ref(),
        mailer.get_ref(),
        &server_config.alert_to,
        unit_id.into_inner(),
        payload,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}
