use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use crate::api::handlers::extractor_error;
use crate::api::handlers::{
    exchanges::{
        capture_exchanges,
        clear_exchanges,
        get_rows,
        get_selected,
        get_status,
        navigate,
        select_row,
    },
    export::{
        export_all,
        export_selected,
    },
    filters::{
        add_uri_pattern,
        apply_filter,
        get_filter,
        update_filter,
    },
};
use crate::api::websocket::ws_index;

/// Root endpoint to provide information about the API
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "reqcollector API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Collects, filters and exports captured HTTP exchanges",
        "endpoints": [
            { "path": "/api/status", "method": "GET", "description": "Get session status" },
            { "path": "/api/exchanges", "method": "POST", "description": "Capture records from the proxy" },
            { "path": "/api/exchanges", "method": "GET", "description": "List the filtered view" },
            { "path": "/api/exchanges", "method": "DELETE", "description": "Clear all captured exchanges" },
            { "path": "/api/exchanges/select/{row}", "method": "POST", "description": "Select a row" },
            { "path": "/api/exchanges/navigate", "method": "POST", "description": "Select the previous or next row" },
            { "path": "/api/exchanges/selected", "method": "GET", "description": "Get request and response of the selected row" },
            { "path": "/api/filter", "method": "GET", "description": "Get the stored filter" },
            { "path": "/api/filter", "method": "PUT", "description": "Replace the stored filter" },
            { "path": "/api/filter/apply", "method": "POST", "description": "Recompute the filtered view" },
            { "path": "/api/filter/uri-patterns", "method": "POST", "description": "Add an empty URI pattern" },
            { "path": "/api/export/selected", "method": "POST", "description": "Save the selected request as a .http file" },
            { "path": "/api/export/all", "method": "POST", "description": "Save all filtered requests to a folder" },
            { "path": "/api/ws", "method": "GET", "description": "WebSocket endpoint for session events" }
        ]
    }))
}

/// Configure API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Extractor failures use the same JSON error body as handlers
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| extractor_error("Invalid JSON body", err)),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _req| extractor_error("Invalid path", err)),
        )
        // Root endpoint
        .route("/", web::get().to(index))
        .service(
            web::scope("/api")
                // WebSocket route for session events
                .route("/ws", web::get().to(ws_index))
                .route("/status", web::get().to(get_status))
                .service(
                    web::scope("/exchanges")
                        .route("", web::post().to(capture_exchanges))
                        .route("", web::get().to(get_rows))
                        .route("", web::delete().to(clear_exchanges))
                        .route("/select/{row}", web::post().to(select_row))
                        .route("/navigate", web::post().to(navigate))
                        .route("/selected", web::get().to(get_selected))
                )
                .service(
                    web::scope("/filter")
                        .route("", web::get().to(get_filter))
                        .route("", web::put().to(update_filter))
                        .route("/apply", web::post().to(apply_filter))
                        .route("/uri-patterns", web::post().to(add_uri_pattern))
                )
                .service(
                    web::scope("/export")
                        .route("/selected", web::post().to(export_selected))
                        .route("/all", web::post().to(export_all))
                )
        );
}
