// File: services/meetslot_backend/src/main.rs
use axum::{routing::get, Router};
use meetslot_booking::{routes as booking_routes, BookingState};
use meetslot_common::logging;
use meetslot_config::load_config;
use meetslot_scheduler::SchedulingPolicy;
use std::process::ExitCode;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod service_factory;
use service_factory::MeetslotServiceFactory;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Keep the guard alive so the file writer flushes on shutdown
    let _log_guard = logging::init_from_config(&config.logging);

    // A bad policy must stop startup, not surface on the first request
    let policy = match SchedulingPolicy::try_from(&config.scheduling) {
        Ok(policy) => policy,
        Err(e) => {
            logging::log_error(e, "Invalid scheduling configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Scheduling {} minute meetings in {} ({}:00-{}:00)",
        policy.duration_minutes,
        policy.time_zone,
        policy.workday_start_hour,
        policy.workday_end_hour
    );

    let factory = MeetslotServiceFactory::new(&config).await;
    let state = std::sync::Arc::new(BookingState::new(&config, policy, &factory));

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the meetslot API!" }))
        .merge(booking_routes(state));

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use meetslot_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Meetslot API",
                version = "0.1.0",
                description = "Meeting slot search and booking",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            logging::log_error(e, &format!("Failed to bind {}", addr));
            return ExitCode::FAILURE;
        }
    };
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        logging::log_error(e, "Server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
