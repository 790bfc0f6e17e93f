//! Seed the units table from the OTA properties CSV.
//!
//! Usage: `import_properties [path/to/file.csv]`. Without an argument the
//! configured `properties_csv_path` is used.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

use channel_manager::db::{establish_connection_pool, run_migrations};
use channel_manager::models::config::load_server_config;
use channel_manager::repository::DieselRepository;
use channel_manager::services::units::import_units_file;

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match load_server_config() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&server_config.properties_csv_path));

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = run_migrations(&pool) {
        log::error!("{e}");
        std::process::exit(1);
    }

    let repo = DieselRepository::new(pool, &server_config.group_catalog_path);
    match import_units_file(&repo, &path) {
        Ok(count) => log::info!("Imported {count} units from {}", path.display()),
        Err(e) => {
            log::error!("Failed to import {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}
