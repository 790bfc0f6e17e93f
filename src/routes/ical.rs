use actix_web::http::header;
use actix_web::{HttpResponse, Responder, get, web};
use log::error;

use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::units::export_unit_ics;

/// Calendar of one unit's blocks for OTAs to import.
#[get("/ical/export/{unit_id}.ics")]
pub async fn export_unit(
    unit_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let unit_id = unit_id.into_inner();
    match export_unit_ics(repo.get_ref(), unit_id) {
        Ok(ics) => HttpResponse::Ok()
            .content_type("text/calendar; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=unit-{unit_id}.ics"),
            ))
            .body(ics),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().body("Not found"),
        Err(e) => {
            error!("Failed to export calendar of unit {unit_id}: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
