use axum::{
    routing::{get, post},
    Extension, Router,
};
use ecotrack_server::ai::ImpactAnalyzer;
use ecotrack_server::notifications::Mailer;
use ecotrack_server::scoring::{AchievementEngine, DEFAULT_CATALOG};
use ecotrack_server::{api, migrator};
use sea_orm::{Database, DatabaseConnection};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    ecotrack_server::telemetry::init_telemetry("ecotrack-server");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    use sea_orm_migration::MigratorTrait;
    migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    ecotrack_server::metrics::init_metrics(&db).await;

    let engine = AchievementEngine::new(DEFAULT_CATALOG);
    let analyzer = ImpactAnalyzer::new();
    let mailer = Mailer::new();

    let app = app(db, engine, analyzer, mailer, prometheus_layer, metric_handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health_check() -> &'static str {
    "OK"
}

fn app(
    db: DatabaseConnection,
    engine: AchievementEngine,
    analyzer: ImpactAnalyzer,
    mailer: Mailer,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    let protected_routes = Router::new()
        .route(
            "/entries",
            get(api::entry::list_entries).post(api::entry::create_entry),
        )
        .route("/entries/:date", get(api::entry::get_entry))
        .route("/streak", get(api::entry::get_streak))
        .route(
            "/users/me",
            get(api::user::get_profile).patch(api::user::update_profile),
        )
        .route("/users/me/friends", post(api::user::add_friend))
        .route("/users/me/quiz", post(api::user::record_quiz_result))
        .route("/achievements", get(api::achievements::list_achievements))
        .route("/achievements/earned", get(api::achievements::list_earned))
        .route(
            "/achievements/evaluate",
            post(api::achievements::evaluate_achievements),
        )
        .route(
            "/challenges/:id/complete",
            post(api::challenge::complete_challenge),
        )
        .route_layer(axum::middleware::from_fn(api::middleware::auth_middleware));

    let cors_origin = std::env::var("CORS_ALLOWED_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());

    Router::new()
        .route("/health", get(health_check))
        // Leaderboard is public; it already excludes private profiles.
        .route("/leaderboard", get(api::leaderboard::get_leaderboard))
        .merge(protected_routes)
        .layer(Extension(db))
        .layer(Extension(engine))
        .layer(Extension(analyzer))
        .layer(Extension(mailer))
        .layer(tower_cookies::CookieManagerLayer::new())
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // Span name "METHOD /path" so traces group by route
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(
                    cors_origin
                        .parse::<axum::http::HeaderValue>()
                        .expect("CORS_ALLOWED_ORIGIN must be a valid origin"),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PATCH,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true),
        )
        .route("/metrics", get(|| async move { metric_handle.render() }))
}
