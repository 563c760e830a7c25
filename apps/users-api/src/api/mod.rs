//! HTTP routes for the users API

pub mod health;

use axum::Router;
use domain_users::{UserRepository, UserService};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Assemble the full application router
///
/// - `/api/users`: users domain
/// - `/health`, `/ready`: probes
/// - `/swagger-ui`: docs backed by `/api-docs/openapi.json`
pub fn routes<R: UserRepository + 'static>(state: &AppState, service: UserService<R>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest(
            "/api/users",
            domain_users::handlers::router(service, state.shutdown.clone()),
        )
        .merge(health::router(state.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
