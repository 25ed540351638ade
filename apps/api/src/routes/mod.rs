pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::document::handlers as itinerary;
use crate::export::handlers as export;
use crate::generation::handlers as generation;
use crate::history::handlers as history;
use crate::ingest::handlers as ingest;
use crate::layout::handlers as page_heights;
use crate::render::handlers as render;
use crate::state::AppState;

/// Uploaded photos and source documents are carried in the request body.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Itinerary
        .route(
            "/api/v1/itinerary",
            get(itinerary::handle_get_itinerary).patch(itinerary::handle_update_plan),
        )
        .route(
            "/api/v1/itinerary/generate",
            post(generation::handle_generate),
        )
        .route("/api/v1/itinerary/commit", post(itinerary::handle_commit))
        .route(
            "/api/v1/itinerary/days/:day",
            patch(itinerary::handle_update_day),
        )
        .route(
            "/api/v1/itinerary/days/:day/timeline",
            post(itinerary::handle_add_timeline_item),
        )
        .route(
            "/api/v1/itinerary/days/:day/timeline/:item",
            patch(itinerary::handle_update_timeline_item)
                .delete(itinerary::handle_remove_timeline_item),
        )
        .route(
            "/api/v1/itinerary/days/:day/images",
            post(itinerary::handle_upload_images),
        )
        .route(
            "/api/v1/itinerary/days/:day/images/regenerate",
            post(generation::handle_regenerate_day),
        )
        .route(
            "/api/v1/itinerary/days/:day/images/:image",
            delete(itinerary::handle_remove_image),
        )
        .route(
            "/api/v1/itinerary/days/:day/image-count",
            put(itinerary::handle_set_image_count),
        )
        // Ingest
        .route("/api/v1/ingest", post(ingest::handle_ingest))
        // Session and rendering
        .route("/api/v1/session", get(render::handle_get_session))
        .route("/api/v1/session/mode", put(render::handle_set_mode))
        .route("/api/v1/session/editing", put(render::handle_set_editing))
        .route("/api/v1/render", get(render::handle_render))
        // Page heights
        .route(
            "/api/v1/page-heights",
            get(page_heights::handle_get_page_heights),
        )
        .route(
            "/api/v1/page-heights/drag/begin",
            post(page_heights::handle_begin_drag),
        )
        .route(
            "/api/v1/page-heights/drag/move",
            post(page_heights::handle_move_drag),
        )
        .route(
            "/api/v1/page-heights/drag/end",
            post(page_heights::handle_end_drag),
        )
        .route(
            "/api/v1/page-heights/uniform",
            put(page_heights::handle_set_uniform),
        )
        // Quotation
        .route(
            "/api/v1/quotation",
            get(itinerary::handle_get_quotation).put(itinerary::handle_edit_quotation),
        )
        .route(
            "/api/v1/quotation/generate",
            post(generation::handle_generate_quotation),
        )
        // History
        .route(
            "/api/v1/history",
            get(history::handle_list_history).post(history::handle_save_history),
        )
        .route(
            "/api/v1/history/:id",
            delete(history::handle_delete_history),
        )
        .route(
            "/api/v1/history/:id/load",
            post(history::handle_load_history),
        )
        // Export
        .route("/api/v1/export/download", get(export::handle_download))
        .route("/api/v1/export/print", get(export::handle_print_page))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
