use actix_web::{App, HttpServer, middleware::Compress};
use actix_cors::Cors;
use utoipa_swagger_ui::SwaggerUi;

use lostfound::config::AppConfig;
use lostfound::openapi::ApiDoc;
use lostfound::rate_limit::{InMemoryRateLimiter, RateLimiterFacade};
use lostfound::repo::{inmem::InMemRepo, Repo};
use lostfound::{config, sweeper, telemetry, AppState, SecurityHeaders};
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds; production sets the environment externally.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    // Structured logging initialisation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cfg = AppConfig::from_env()?;
    info!(bind = %cfg.bind_addr, max_sessions = cfg.max_sessions, idle_ttl_secs = cfg.session_idle_ttl.as_secs(), "Bootstrapping Lost & Found Hub");

    let repo: Arc<dyn Repo> = Arc::new(InMemRepo::with_max_sessions(cfg.max_sessions));
    let mut state = AppState::new(repo.clone()).with_rate_limiter(RateLimiterFacade::new(
        InMemoryRateLimiter::new(cfg.rate_limit_enabled),
        cfg.rate_limit.clone(),
    ));
    if cfg.metrics_enabled {
        match telemetry::install_recorder() {
            Ok(handle) => state = state.with_metrics(handle),
            Err(e) => warn!("metrics recorder not installed: {e}"),
        }
    }

    actix_web::rt::spawn(sweeper::run(
        repo,
        state.rate_limiter.clone(),
        cfg.session_idle_ttl,
        cfg.session_sweep_interval,
    ));

    let openapi = ApiDoc::openapi();
    info!("OpenAPI spec generated");

    let app_cfg = cfg.clone();
    let server = HttpServer::new(move || {
        let cors = {
            let mut c = Cors::default()
                // local frontend dev servers
                .allowed_origin("http://localhost:5173")
                .allowed_origin("http://127.0.0.1:5173")
                .allow_any_header()
                .allowed_methods(["GET", "POST", "DELETE", "OPTIONS"])
                .max_age(3600);
            if let Some(front) = &app_cfg.frontend_url {
                c = c.allowed_origin(front);
            }
            c
        };

        let app = App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(SecurityHeaders::from(&app_cfg))
            .wrap(cors)
            .app_data(actix_web::web::Data::new(state.clone()))
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()));

        #[cfg(feature = "embed-frontend")]
        let app = app.configure(lostfound::frontend::config);

        app
    })
    .bind(cfg.bind_addr.as_str())?;

    info!("Listening on http://{}", cfg.bind_addr);

    server.run().await?;
    Ok(())
}
