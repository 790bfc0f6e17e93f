use actix_identity::Identity;
use actix_session::Session;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use log::error;
use tera::Tera;

use crate::forms::auth::{LoginForm, NextQuery};
use crate::i18n;
use crate::middleware::{LOGIN_PATH, login_url, safe_next};
use crate::models::auth::AdminUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::auth::check_credentials;
use crate::services::units::load_dashboard;

#[get("/")]
pub async fn show_dashboard(
    user: AdminUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    session: Session,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = match load_dashboard(repo.get_ref(), server_config.utc_offset()) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to load dashboard: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, &session, &server_config, "index");
    context.insert("current_user", &user);
    context.insert("rows", &data.rows);
    render_template(&tera, "main/dashboard.html", &context)
}

#[get("/login")]
pub async fn show_login(
    query: web::Query<NextQuery>,
    flash_messages: IncomingFlashMessages,
    session: Session,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, &session, &server_config, "login");
    context.insert("next", safe_next(query.next.as_deref()));
    render_template(&tera, "main/login.html", &context)
}

#[post("/login")]
pub async fn login(
    request: HttpRequest,
    query: web::Query<NextQuery>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let next = safe_next(query.next.as_deref()).to_string();
    match check_credentials(&server_config, &form) {
        Ok(email) => match Identity::login(&request.extensions(), email) {
            Ok(_) => redirect(&next),
            Err(e) => {
                error!("Failed to start admin session: {e}");
                HttpResponse::InternalServerError().finish()
            }
        },
        Err(ServiceError::Unauthorized | ServiceError::Form(_)) => {
            FlashMessage::error("Invalid credentials").send();
            redirect(&login_url(&next))
        }
        Err(e) => {
            error!("Failed to sign in: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Sign-out is reachable both from a link and from a form.
pub async fn logout(user: Option<Identity>) -> impl Responder {
    if let Some(user) = user {
        user.logout();
    }
    redirect(LOGIN_PATH)
}

#[get("/lang/{code}")]
pub async fn set_lang(
    _user: AdminUser,
    code: web::Path<String>,
    session: Session,
) -> impl Responder {
    let code = code.into_inner();
    if i18n::is_supported(&code) {
        if let Err(e) = session.insert(i18n::SESSION_KEY, code) {
            error!("Failed to store language: {e}");
        }
    }
    redirect("/")
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[get("/hello")]
pub async fn hello() -> impl Responder {
    HttpResponse::Ok().body("hello")
}
