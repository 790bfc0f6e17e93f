use actix_web::{App, http::StatusCode, test};
use actix_web_flash_messages::Level;
use channel_manager::routes::alert_level_to_str;
use channel_manager::routes::main::{health, hello};

#[::core::prelude::v1::test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[actix_web::test]
async fn liveness_endpoints_answer_plain_text() {
    let app = test::init_service(App::new().service(health).service(hello)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "ok");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/hello").to_request()).await;
    assert_eq!(test::read_body(resp).await, "hello");
}

mod common;

mod public_api {
    use actix_web::{App, http::StatusCode, test, web};
    use channel_manager::domain::block::{BlockSource, NewAvailabilityBlock};
    use channel_manager::domain::types::StayDates;
    use channel_manager::domain::unit::NewUnit;
    use channel_manager::models::config::ServerConfig;
    use channel_manager::repository::{
        BlockListQuery, BlockReader, BlockWriter, DieselRepository, UnitReader, UnitWriter,
    };
    use channel_manager::routes::api::save_rates;
    use channel_manager::routes::json_config;
    use channel_manager::routes::public::book_group;
    use channel_manager::services::notify::{LogNotifier, Mailer};
    use serde_json::json;

    use super::common::TestDb;

    fn default_config() -> ServerConfig {
        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    fn seeded_repo(test_db: &TestDb) -> DieselRepository {
        let repo = DieselRepository::new(test_db.pool(), test_db.catalog_path());
        repo.create_units(&[
            NewUnit::new("Airbnb".into(), "A-1".into(), None),
            NewUnit::new("Agoda".into(), "G-1".into(), None),
        ])
        .unwrap();
        let ids: Vec<i32> = repo.list_units().unwrap().iter().map(|u| u.id.get()).collect();
        std::fs::write(
            test_db.catalog_path(),
            json!({ "groups": { "villa": { "title": "Villa", "unit_ids": ids } } }).to_string(),
        )
        .unwrap();
        repo
    }

    #[actix_web::test]
    async fn group_booking_conflict_returns_409_and_books_nothing() {
        let test_db = TestDb::new("group_booking_conflict.db");
        let repo = seeded_repo(&test_db);
        let units = repo.list_units().unwrap();
        repo.create_block(&NewAvailabilityBlock::new(
            units[1].id,
            StayDates::parse("2025-08-03", "2025-08-05").unwrap(),
            BlockSource::Manual,
            String::new(),
        ))
        .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(repo.clone()))
                .app_data(web::Data::new(Mailer::Log(LogNotifier)))
                .app_data(web::Data::new(default_config()))
                .service(book_group),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/public/book_group/villa")
            .set_json(json!({
                "start_date": "2025-08-01",
                "end_date": "2025-08-04",
                "name": "Ann",
                "email": "ann@example.com"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Dates not available");
        assert!(
            repo.list_blocks(BlockListQuery::new().unit(units[0].id))
                .unwrap()
                .is_empty()
        );
    }

    #[actix_web::test]
    async fn group_booking_blocks_every_unit() {
        let test_db = TestDb::new("group_booking_success.db");
        let repo = seeded_repo(&test_db);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(repo.clone()))
                .app_data(web::Data::new(Mailer::Log(LogNotifier)))
                .app_data(web::Data::new(default_config()))
                .service(book_group),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/public/book_group/villa")
            .set_json(json!({
                "start_date": "2025-08-01",
                "end_date": "2025-08-04",
                "name": "Ann",
                "email": "ann@example.com"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let blocks = repo.list_blocks(BlockListQuery::new()).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.source == BlockSource::Direct));
        assert!(blocks.iter().all(|b| b.note.ends_with("(group:villa)")));
    }

    #[actix_web::test]
    async fn unknown_property_returns_404() {
        let test_db = TestDb::new("group_booking_unknown.db");
        let repo = seeded_repo(&test_db);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(repo))
                .app_data(web::Data::new(Mailer::Log(LogNotifier)))
                .app_data(web::Data::new(default_config()))
                .service(book_group),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/public/book_group/nowhere")
            .set_json(json!({
                "start_date": "2025-08-01",
                "end_date": "2025-08-04",
                "name": "Ann",
                "email": "ann@example.com"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn malformed_booking_body_returns_json_error() {
        let test_db = TestDb::new("group_booking_malformed.db");
        let repo = seeded_repo(&test_db);

        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(web::Data::new(repo.clone()))
                .app_data(web::Data::new(Mailer::Log(LogNotifier)))
                .app_data(web::Data::new(default_config()))
                .service(book_group),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/public/book_group/villa")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"start_date": "2025-08-01","#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
        assert!(repo.list_blocks(BlockListQuery::new()).unwrap().is_empty());
    }

    #[actix_web::test]
    async fn admin_api_requires_session() {
        let test_db = TestDb::new("admin_api_requires_session.db");
        let repo = seeded_repo(&test_db);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(repo))
                .service(save_rates),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/rates")
            .set_json(json!({ "unit_id": 1, "base_rate": 1500 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "unauthorized");
    }
}
