use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};

use crate::api::handlers::error_response;
use crate::capture::manager::{Action, Direction, Outcome};
use crate::capture::session::{unexpected, SessionHandle};
use crate::models::exchange::{ExchangeRow, HostRecord};

/// Capture event from the proxy history
#[derive(Deserialize)]
pub struct CaptureRequest {
    /// Records selected in the proxy
    pub records: Vec<HostRecord>,
}

/// Request for moving the selection
#[derive(Deserialize)]
pub struct NavigateRequest {
    pub direction: Direction,
}

/// Response for listing the filtered view
#[derive(Serialize)]
struct RowsResponse {
    rows: Vec<ExchangeRow>,
    total: usize,
}

/// Add records to the capture list
pub async fn capture_exchanges(
    session: web::Data<SessionHandle>,
    request: web::Json<CaptureRequest>,
) -> impl Responder {
    let records = request.into_inner().records;
    info!("Received {} records from proxy", records.len());

    match session.dispatch(Action::Capture(records)).await {
        Ok(Outcome::Captured { added, rejected }) => HttpResponse::Ok().json(serde_json::json!({
            "status": "success",
            "added": added,
            "rejected": rejected
        })),
        Ok(other) => error_response("Failed to capture", &unexpected(other)),
        Err(e) => error_response("Failed to capture", &e),
    }
}

/// Get the rows of the filtered view
pub async fn get_rows(session: web::Data<SessionHandle>) -> impl Responder {
    match session.dispatch(Action::Rows).await {
        Ok(Outcome::Rows(rows)) => {
            let total = rows.len();
            HttpResponse::Ok().json(RowsResponse { rows, total })
        }
        Ok(other) => error_response("Failed to list exchanges", &unexpected(other)),
        Err(e) => error_response("Failed to list exchanges", &e),
    }
}

/// Remove every captured exchange
pub async fn clear_exchanges(session: web::Data<SessionHandle>) -> impl Responder {
    match session.dispatch(Action::Clear).await {
        Ok(Outcome::Status(status)) => HttpResponse::Ok().json(status),
        Ok(other) => error_response("Failed to clear", &unexpected(other)),
        Err(e) => error_response("Failed to clear", &e),
    }
}

/// Select a row in the filtered view
pub async fn select_row(
    session: web::Data<SessionHandle>,
    path: web::Path<usize>,
) -> impl Responder {
    let row = path.into_inner();

    match session.dispatch(Action::Select(row)).await {
        Ok(Outcome::Selection(selected)) => {
            HttpResponse::Ok().json(serde_json::json!({ "selected": selected }))
        }
        Ok(other) => error_response("Failed to select", &unexpected(other)),
        Err(e) => error_response("Failed to select", &e),
    }
}

/// Move the selection to the previous or next row
pub async fn navigate(
    session: web::Data<SessionHandle>,
    request: web::Json<NavigateRequest>,
) -> impl Responder {
    match session.dispatch(Action::Navigate(request.direction)).await {
        Ok(Outcome::Selection(selected)) => {
            HttpResponse::Ok().json(serde_json::json!({ "selected": selected }))
        }
        Ok(other) => error_response("Failed to navigate", &unexpected(other)),
        Err(e) => error_response("Failed to navigate", &e),
    }
}

/// Get request and response of the selected row
pub async fn get_selected(session: web::Data<SessionHandle>) -> impl Responder {
    match session.dispatch(Action::Selected).await {
        Ok(Outcome::Detail(Some(detail))) => HttpResponse::Ok().json(detail),
        Ok(Outcome::Detail(None)) => HttpResponse::NotFound().json(serde_json::json!({
            "status": "error",
            "message": "No exchange is selected"
        })),
        Ok(other) => error_response("Failed to get selection", &unexpected(other)),
        Err(e) => error_response("Failed to get selection", &e),
    }
}

/// Get session status
pub async fn get_status(session: web::Data<SessionHandle>) -> impl Responder {
    match session.status().await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => error_response("Failed to get status", &e),
    }
}
