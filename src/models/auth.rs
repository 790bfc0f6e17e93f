//! Session-backed administrator identity.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::json;

/// Administrator signed in through the login form.
///
/// Extraction fails with `401` and a JSON `{"error": "unauthorized"}` body;
/// HTML scopes turn that into a redirect with
/// [`crate::middleware::RedirectUnauthorized`].
#[derive(Clone, Debug, Serialize)]
pub struct AdminUser {
    pub email: String,
}

fn unauthorized() -> actix_web::Error {
    InternalError::from_response(
        "unauthorized",
        HttpResponse::Unauthorized().json(json!({ "error": "unauthorized" })),
    )
    .into()
}

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = req
            .get_identity()
            .ok()
            .and_then(|identity| identity.id().ok())
            .map(|email| AdminUser { email })
            .ok_or_else(unauthorized);
        ready(result)
    }
}
