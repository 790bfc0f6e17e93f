//! Admin HTML pages and maintenance actions.

use std::collections::HashSet;
use std::path::Path;

use actix_multipart::form::MultipartForm;
use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use log::error;
use tera::Tera;

use crate::forms::units::UploadUnitsForm;
use crate::models::auth::AdminUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::notify::{Mailer, send_test_email};
use crate::services::units::{
    import_units, import_units_file, list_export_links, list_public_groups, load_admin_calendar,
};

#[get("/admin/groups")]
pub async fn show_groups(
    user: AdminUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    session: Session,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    // Admins see every unit, hidden ones included.
    let groups = match list_public_groups(repo.get_ref(), &HashSet::new()) {
        Ok(groups) => groups,
        Err(e) => {
            error!("Failed to list groups: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, &session, &server_config, "groups");
    context.insert("current_user", &user);
    context.insert("groups", &groups);
    render_template(&tera, "admin/groups.html", &context)
}

#[get("/admin/calendar/{slug}")]
pub async fn show_calendar(
    user: AdminUser,
    slug: web::Path<String>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    session: Session,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = match load_admin_calendar(repo.get_ref(), &slug) {
        Ok(data) => data,
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Property not found.").send();
            return redirect("/admin/groups");
        }
        Err(e) => {
            error!("Failed to load calendar of {slug}: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, &session, &server_config, "groups");
    context.insert("current_user", &user);
    context.insert("group", &data.group);
    context.insert("units", &data.units);
    context.insert("today", &server_config.today());
    render_template(&tera, "admin/calendar.html", &context)
}

#[get("/admin/export_links")]
pub async fn show_export_links(
    user: AdminUser,
    request: HttpRequest,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    session: Session,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let info = request.connection_info();
    let base_url = format!("{}://{}", info.scheme(), info.host());

    let links = match list_export_links(repo.get_ref(), &base_url) {
        Ok(links) => links,
        Err(e) => {
            error!("Failed to list export links: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, &session, &server_config, "export_links");
    context.insert("current_user", &user);
    context.insert("links", &links);
    render_template(&tera, "admin/export_links.html", &context)
}

#[get("/admin/reimport")]
pub async fn reimport_units(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let path = Path::new(&server_config.properties_csv_path);
    match import_units_file(repo.get_ref(), path) {
        Ok(count) => {
            FlashMessage::success(format!("CSV reimported successfully ({count} units).")).send();
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("CSV not found.").send();
        }
        Err(e) => {
            error!("Failed to reimport {}: {e}", path.display());
            FlashMessage::error(format!("Reimport failed: {e}")).send();
        }
    }
    redirect("/")
}

#[post("/admin/import")]
pub async fn upload_units(
    _user: AdminUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadUnitsForm>,
) -> impl Responder {
    match import_units(repo.get_ref(), form.csv.file) {
        Ok(count) => {
            FlashMessage::success(format!("Imported {count} units.")).send();
        }
        Err(e) => {
            error!("Failed to import units: {e}");
            FlashMessage::error(format!("Import failed: {e}")).send();
        }
    }
    redirect("/")
}

#[get("/admin/test_email")]
pub async fn test_email(
    _user: AdminUser,
    mailer: web::Data<Mailer>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let Some(recipient) = server_config.test_email_recipient() else {
        FlashMessage::error("Alert address is not configured.").send();
        return redirect("/");
    };

    match send_test_email(mailer.get_ref(), recipient, &server_config.brand_name).await {
        Ok(to) => FlashMessage::success(format!("Test email sent to {to}.")).send(),
        Err(e) => {
            error!("Test email failed: {e}");
            FlashMessage::error(format!("Test email failed: {e}")).send();
        }
    }
    redirect("/")
}
