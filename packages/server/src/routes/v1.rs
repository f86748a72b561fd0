use std::sync::Arc;

use axum::middleware;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::gateway::{AuthGateway, require_auth};
use crate::handlers;
use crate::state::AppState;

/// Every v1 route sits behind the auth gateway.
pub fn routes(gateway: Arc<AuthGateway>) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(file_routes())
        .merge(owner_routes())
        .routes(routes!(handlers::format::list_formats))
        .routes(routes!(handlers::information::available_models))
        .layer(middleware::from_fn_with_state(gateway, require_auth))
}

fn file_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::file::list_files,
            handlers::file::upload_file
        ))
        .routes(routes!(
            handlers::file::get_file,
            handlers::file::delete_file
        ))
        .routes(routes!(
            handlers::file::get_content,
            handlers::file::replace_content
        ))
        .routes(routes!(handlers::file::get_lineage))
        .routes(routes!(
            handlers::file::get_editable,
            handlers::file::save_editable
        ))
        .routes(routes!(handlers::file::render_pdf))
        .layer(handlers::file::upload_body_limit())
}

fn owner_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::owner::register_owner))
        .routes(routes!(handlers::owner::get_owner))
        .routes(routes!(handlers::owner::list_owner_files))
}
