use std::time::Duration;

use actix_cors::Cors;
use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::middleware::{Compress, Logger};
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use log::{info, warn};
use tera::Tera;

use crate::db::{establish_connection_pool, run_migrations};
use crate::ical::HttpCalendarFetcher;
use crate::middleware::RedirectUnauthorized;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::admin::{
    reimport_units, show_calendar, show_export_links, show_groups, test_email, upload_units,
};
use crate::routes::api::{
    check_ical, create_block, delete_block, delete_date_rate, list_blocks, save_date_rate,
    save_rates, sync_now, sync_property, toggle_day, update_unit_ical,
};
use crate::routes::ical::export_unit;
use crate::routes::main::{health, hello, login, logout, set_lang, show_dashboard, show_login};
use crate::routes::public::{
    book_group, book_unit, create_intent, group_availability, quote, show_properties,
    show_property, show_public_links, show_unit,
};
use crate::services::notify::Mailer;
use crate::services::payments::StripeGateway;
use crate::services::sync::run_periodic_sync;

pub mod db;
pub mod domain;
pub mod dto;
mod error_conversions;
pub mod forms;
pub mod i18n;
pub mod ical;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    let repo = DieselRepository::new(pool, &server_config.group_catalog_path);

    let fetcher = HttpCalendarFetcher::new(Duration::from_secs(server_config.feed_timeout_secs))
        .map_err(|e| std::io::Error::other(format!("Failed to build feed client: {e}")))?;
    let gateway = StripeGateway::new(
        &server_config.stripe_api_url,
        &server_config.stripe_secret_key,
    )
    .map_err(|e| std::io::Error::other(format!("Failed to build payment client: {e}")))?;
    let mailer = Mailer::from_config(&server_config);

    if server_config.sync_interval_secs > 0 {
        info!(
            "Starting feed sync every {} seconds",
            server_config.sync_interval_secs
        );
        actix_web::rt::spawn(run_periodic_sync(
            repo.clone(),
            fetcher.clone(),
            Duration::from_secs(server_config.sync_interval_secs),
        ));
    } else {
        warn!("Background feed sync disabled");
    }

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::try_from(server_config.secret.as_bytes())
        .map_err(|e| std::io::Error::other(format!("Invalid session secret: {e}")))?;

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    let workers = server_config.workers.max(1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(server_config.cookie_secure)
                    .build(),
            )
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(Files::new("/assets", &server_config.assets_dir))
            .service(
                Files::new(&server_config.dashboard_path, &server_config.dashboard_dir)
                    .index_file("index.html"),
            )
            .service(health)
            .service(hello)
            .service(show_login)
            .service(login)
            .service(
                web::resource("/logout")
                    .route(web::get().to(logout))
                    .route(web::post().to(logout)),
            )
            .service(export_unit)
            .service(show_properties)
            .service(show_property)
            .service(show_public_links)
            .service(show_unit)
            .service(group_availability)
            .service(quote)
            .service(create_intent)
            .service(book_group)
            .service(book_unit)
            .service(update_unit_ical)
            .service(check_ical)
            .service(save_rates)
            .service(save_date_rate)
            .service(delete_date_rate)
            .service(list_blocks)
            .service(create_block)
            .service(delete_block)
            .service(sync_now)
            .service(sync_property)
            .service(toggle_day)
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_dashboard)
                    .service(set_lang)
                    .service(show_groups)
                    .service(show_calendar)
                    .service(show_export_links)
                    .service(reimport_units)
                    .service(upload_units)
                    .service(test_email),
            )
            .app_data(routes::json_config())
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(fetcher.clone()))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .workers(workers)
    .bind(bind_address)?
    .run()
    .await
}
