//! HTTP handlers. HTML pages render Tera templates and report problems through
//! flash messages; JSON endpoints answer `{"error": ...}` through [`ApiError`].

use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use log::error;
use serde_json::json;
use tera::{Context, Tera};

use crate::i18n;
use crate::models::config::ServerConfig;
use crate::services::ServiceError;

pub mod admin;
pub mod api;
pub mod ical;
pub mod main;
pub mod public;

pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(e) => {
            error!("Failed to render template '{template}': {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Language stored in the session, or the configured default.
pub fn session_lang(session: &Session, config: &ServerConfig) -> String {
    let chosen = session.get::<String>(i18n::SESSION_KEY).ok().flatten();
    i18n::resolve_lang(chosen.as_deref(), &config.default_lang).to_string()
}

/// Context shared by every page: alerts, language and its strings, branding.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    session: &Session,
    config: &ServerConfig,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();
    let lang = session_lang(session, config);

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context.insert("t", &i18n::translations(&lang, &config.default_lang));
    context.insert("lang", &lang);
    context.insert("brand_name", &config.brand_name);
    context.insert("dashboard_path", &config.dashboard_path);
    context
}

/// JSON error body for API endpoints.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Form(_) | ServiceError::TypeConstraint(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Repository(_) | ServiceError::External(_) | ServiceError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self.0);
            match &self.0 {
                ServiceError::External(msg) => msg.clone(),
                _ => "internal error".to_string(),
            }
        } else {
            self.0.to_string()
        };
        HttpResponse::build(status).json(json!({ "error": message }))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// JSON extractor settings: malformed bodies answer like any other API error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "expected application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("invalid json: {e}"),
        other => other.to_string(),
    };
    ApiError(ServiceError::Form(message)).into()
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;
    use crate::repository::errors::RepositoryError;

    async fn body_of(err: ServiceError) -> (StatusCode, serde_json::Value) {
        let resp = ApiError(err).error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn conflict_maps_to_409() {
        let (status, body) = body_of(ServiceError::Conflict("Dates not available".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Dates not available");
    }

    #[actix_web::test]
    async fn validation_maps_to_400() {
        let (status, body) = body_of(ServiceError::Form("missing dates".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing dates");
    }

    #[actix_web::test]
    async fn not_found_maps_to_404() {
        let (status, body) = body_of(ServiceError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found");
    }

    #[actix_web::test]
    async fn malformed_json_body_maps_to_json_400() {
        use actix_web::{App, post, test};

        #[post("/echo")]
        async fn echo(body: web::Json<serde_json::Value>) -> HttpResponse {
            HttpResponse::Ok().json(body.into_inner())
        }

        let app = test::init_service(App::new().app_data(json_config()).service(echo)).await;

        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("invalid json"));

        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("{}")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "expected application/json");
    }

    #[actix_web::test]
    async fn repository_details_are_hidden() {
        let (status, body) = body_of(ServiceError::Repository(
            RepositoryError::DatabaseError("disk I/O error".into()),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal error");
    }
}
