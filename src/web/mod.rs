pub mod middleware;
pub mod routes;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, get_service, post},
    Router,
};
use http::header::{HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use http::Method;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;
use middleware::auth::require_session;
use routes::{events, gallery, participants, registrations, teams};

// Multipart framing on top of the largest accepted image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/add-user", post(participants::add_user_handler))
        .route(
            "/update-user",
            post(participants::update_user_handler).layer(DefaultBodyLimit::max(
                state.config.max_image_bytes + FORM_OVERHEAD_BYTES,
            )),
        )
        .route("/registrations", post(registrations::registration_handler))
        .route("/create-team", post(teams::create_team_handler))
        .route("/delete-team", post(teams::delete_team_handler))
        .route_layer(from_fn(require_session));

    let public_routes = Router::new()
        .route(
            "/participant-details",
            get(participants::participant_details_handler),
        )
        .route("/allEvents", get(events::all_events_handler))
        .route("/eventDetails", get(events::event_details_handler))
        .route("/team-details", get(teams::crew_handler))
        .route("/gallery/:year", get(gallery::gallery_year_handler))
        .route(
            "/get_user_event_names",
            get(participants::user_event_names_handler),
        )
        .route("/get_user_teams", get(participants::user_teams_handler));

    let storage_service = get_service(ServeDir::new(state.storage.root())).layer(
        SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        ),
    );

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .nest_service("/storage", storage_service)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors_layer(&state.config.cors_origin))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = match HeaderValue::from_str(origin) {
        Ok(v) => vec![v],
        Err(e) => {
            warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
            Vec::new()
        }
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
