use actix_web::{web, HttpResponse, Responder};
use log::info;

use crate::api::handlers::error_response;
use crate::capture::manager::{Action, Outcome};
use crate::capture::session::{unexpected, SessionHandle};
use crate::models::filter::FilterConfig;

/// Get the stored filter
pub async fn get_filter(session: web::Data<SessionHandle>) -> impl Responder {
    match session.status().await {
        Ok(status) => HttpResponse::Ok().json(status.filter),
        Err(e) => error_response("Failed to get filter", &e),
    }
}

/// Replace the stored filter; the view changes on the next apply
pub async fn update_filter(
    session: web::Data<SessionHandle>,
    request: web::Json<FilterConfig>,
) -> impl Responder {
    match session.dispatch(Action::SetFilter(request.into_inner())).await {
        Ok(Outcome::Filter(filter)) => HttpResponse::Ok().json(filter),
        Ok(other) => error_response("Failed to update filter", &unexpected(other)),
        Err(e) => error_response("Failed to update filter", &e),
    }
}

/// Recompute the filtered view
pub async fn apply_filter(session: web::Data<SessionHandle>) -> impl Responder {
    match session.dispatch(Action::ApplyFilter).await {
        Ok(Outcome::Status(status)) => {
            info!(
                "Filter applied: {} of {} visible",
                status.visible, status.captured
            );
            HttpResponse::Ok().json(status)
        }
        Ok(other) => error_response("Failed to apply filter", &unexpected(other)),
        Err(e) => error_response("Failed to apply filter", &e),
    }
}

/// Add an empty URI pattern slot
pub async fn add_uri_pattern(session: web::Data<SessionHandle>) -> impl Responder {
    match session.dispatch(Action::AddUriPattern).await {
        Ok(Outcome::Filter(filter)) => HttpResponse::Ok().json(filter),
        Ok(other) => error_response("Failed to add URI pattern", &unexpected(other)),
        Err(e) => error_response("Failed to add URI pattern", &e),
    }
}
