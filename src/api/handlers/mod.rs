use actix_web::{error::InternalError, HttpResponse};
use log::{error, warn};
use serde::de::DeserializeOwned;

use crate::utils::error::{AppError, AppResult};

pub mod exchanges;
pub mod export;
pub mod filters;

fn error_body(message: String) -> serde_json::Value {
    serde_json::json!({
        "status": "error",
        "message": message
    })
}

/// Map an application error onto the JSON error body
pub fn error_response(context: &str, e: &AppError) -> HttpResponse {
    let body = error_body(format!("{}: {}", context, e));

    if e.is_client_error() {
        HttpResponse::BadRequest().json(body)
    } else if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else {
        error!("{}: {}", context, e);
        HttpResponse::InternalServerError().json(body)
    }
}

/// Turn an extractor failure into a 400 with the JSON error body
pub fn extractor_error<E>(context: &str, err: E) -> actix_web::Error
where
    E: std::fmt::Display + std::fmt::Debug + 'static,
{
    warn!("{}: {}", context, err);
    let response = HttpResponse::BadRequest().json(error_body(format!("{}: {}", context, err)));
    InternalError::from_response(err, response).into()
}

/// Parse an optional JSON body; only an empty body yields the default
pub fn optional_json<T>(body: &[u8]) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}
