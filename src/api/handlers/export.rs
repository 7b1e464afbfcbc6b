use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::Deserialize;
use std::path::PathBuf;

use crate::api::handlers::{error_response, optional_json};
use crate::capture::manager::{Action, Outcome};
use crate::capture::session::{unexpected, SessionHandle};

/// Request for saving the selected exchange
#[derive(Deserialize, Default)]
pub struct ExportSelectedRequest {
    /// Target file; defaults to the export directory and derived name
    pub path: Option<PathBuf>,
}

/// Request for saving the filtered view
#[derive(Deserialize, Default)]
pub struct ExportAllRequest {
    /// Target directory; defaults to the export directory
    pub directory: Option<PathBuf>,
}

/// Save the selected exchange as a .http file
pub async fn export_selected(
    session: web::Data<SessionHandle>,
    body: web::Bytes,
) -> impl Responder {
    let path = match optional_json::<ExportSelectedRequest>(&body) {
        Ok(request) => request.path,
        Err(e) => return error_response("Invalid export request", &e),
    };

    match session.dispatch(Action::ExportSelected(path)).await {
        Ok(Outcome::Saved(path)) => HttpResponse::Ok().json(serde_json::json!({
            "status": "success",
            "path": path
        })),
        Ok(other) => error_response("Failed to save request", &unexpected(other)),
        Err(e) => error_response("Failed to save request", &e),
    }
}

/// Save every exchange of the filtered view into a directory
pub async fn export_all(
    session: web::Data<SessionHandle>,
    body: web::Bytes,
) -> impl Responder {
    let directory = match optional_json::<ExportAllRequest>(&body) {
        Ok(request) => request.directory,
        Err(e) => return error_response("Invalid export request", &e),
    };

    match session.dispatch(Action::ExportAll(directory)).await {
        Ok(Outcome::Exported(report)) => {
            info!(
                "Export finished: {} saved, {} errors",
                report.saved, report.errors
            );
            HttpResponse::Ok().json(report)
        }
        Ok(other) => error_response("Failed to save requests", &unexpected(other)),
        Err(e) => error_response("Failed to save requests", &e),
    }
}
