use std::sync::Arc;
use actix_web::{web, HttpResponse};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;
use crate::rate_limit::RateLimiterFacade;
use crate::repo::Repo;
use crate::session::SessionKey;
use crate::telemetry;
use crate::validation::validate;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("invalid report body: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("invalid path: {err}")).into()
    }))
    .service(
        web::scope("/api/v1")
            .service(web::resource("/sessions").route(web::post().to(open_session)))
            .service(web::resource("/sessions/{id}").route(web::delete().to(close_session)))
            .service(
                web::resource("/reports")
                    .route(web::get().to(list_reports))
                    .route(web::post().to(create_report)),
            )
            // fixed segments before the positional resource
            .service(
                web::resource("/reports/count")
                    .route(web::get().to(count_reports))
                    .route(web::delete().to(count_is_not_a_position)),
            )
            .service(web::resource("/reports/by-id/{id}").route(web::delete().to(delete_report_by_id)))
            .service(web::resource("/reports/{position}").route(web::delete().to(delete_report_at))),
    );
    cfg.route("/metrics", web::get().to(metrics_endpoint));
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
    pub rate_limiter: Option<RateLimiterFacade>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repo>) -> Self {
        Self { repo, rate_limiter: None, metrics: None }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiterFacade) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    responses(
        (status = 201, description = "Session opened with an empty report list", body = SessionCreated),
        (status = 503, description = "Session limit reached")
    )
)]
pub async fn open_session(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let session_id = data.repo.open_session().await?;
    telemetry::session_opened();
    telemetry::sessions_active(data.repo.session_count().await);
    Ok(HttpResponse::Created().json(SessionCreated { session_id }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session ended, its reports discarded"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn close_session(data: web::Data<AppState>, path: web::Path<SessionId>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    data.repo.close_session(id).await?;
    if let Some(rl) = &data.rate_limiter { rl.forget_session(id); }
    telemetry::sessions_active(data.repo.session_count().await);
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(("X-Session-Id" = Uuid, Header, description = "Session id")),
    responses(
        (status = 200, description = "Reports, newest first", body = [ReportRecord]),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn list_reports(session: SessionKey, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let reports = data.repo.list_reports(session.0).await?;
    Ok(HttpResponse::Ok().json(reports))
}

#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = NewReport,
    params(("X-Session-Id" = Uuid, Header, description = "Session id")),
    responses(
        (status = 201, description = "Report stored at position 0"),
        (status = 400, description = "Item name or location missing", body = crate::error::ApiErrorBody),
        (status = 404, description = "Unknown session"),
        (status = 429, description = "Too many reports for this session")
    )
)]
pub async fn create_report(
    session: SessionKey,
    data: web::Data<AppState>,
    payload: web::Json<NewReport>,
) -> Result<HttpResponse, ApiError> {
    let SessionKey(session) = session;
    let report = validate(payload.into_inner()).map_err(|e| {
        telemetry::validation_rejected();
        info!(session = %session, fields = ?e.fields, "report rejected");
        e
    })?;
    if let Some(rl) = &data.rate_limiter {
        // only count submissions against sessions that exist
        data.repo.report_count(session).await?;
        if !rl.allow_report(session) { return Err(ApiError::TooManyRequests); }
    }
    let record = match data.repo.insert_report(session, report).await {
        Ok(record) => record,
        Err(e) => {
            // session closed after the budget check; don't resurrect its window
            if let Some(rl) = &data.rate_limiter { rl.forget_session(session); }
            return Err(e.into());
        }
    };
    telemetry::report_created();
    info!(session = %session, report = %record.id, item = %record.item_name, kind = record.kind.label(), "report saved");
    Ok(HttpResponse::Created().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/count",
    params(("X-Session-Id" = Uuid, Header, description = "Session id")),
    responses(
        (status = 200, description = "Number of stored reports", body = ReportCount),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn count_reports(session: SessionKey, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let count = data.repo.report_count(session.0).await?;
    Ok(HttpResponse::Ok().json(ReportCount { count }))
}

/// `DELETE /reports/count` would otherwise fall through to 405; `count` is
/// just another non-integer position.
pub async fn count_is_not_a_position() -> Result<HttpResponse, ApiError> {
    Err(ApiError::BadRequest("invalid path: position must be an integer".into()))
}

/// Deletes by list position. Positions shift after every mutation, so a
/// client holding a stale listing can remove the wrong record; prefer
/// `delete_report_by_id` when the id is at hand.
#[utoipa::path(
    delete,
    path = "/api/v1/reports/{position}",
    params(
        ("position" = i64, Path, description = "Zero-based position in the current listing"),
        ("X-Session-Id" = Uuid, Header, description = "Session id")
    ),
    responses(
        (status = 204, description = "Report removed"),
        (status = 400, description = "Position is not an integer"),
        (status = 404, description = "Position out of range or unknown session")
    )
)]
pub async fn delete_report_at(
    session: SessionKey,
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let position = path.into_inner();
    let removed = data.repo.delete_report_at(session.0, position).await?;
    telemetry::report_deleted();
    info!(session = %session.0, position, report = %removed.id, "report deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/api/v1/reports/by-id/{id}",
    params(
        ("id" = Uuid, Path, description = "Report id"),
        ("X-Session-Id" = Uuid, Header, description = "Session id")
    ),
    responses(
        (status = 204, description = "Report removed"),
        (status = 404, description = "No such report in this session")
    )
)]
pub async fn delete_report_by_id(
    session: SessionKey,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let removed = data.repo.delete_report_by_id(session.0, path.into_inner()).await?;
    telemetry::report_deleted();
    info!(session = %session.0, report = %removed.id, "report deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub async fn metrics_endpoint(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    match &data.metrics {
        Some(handle) => Ok(HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(handle.render())),
        None => Err(ApiError::NotFound("metrics disabled".into())),
    }
}
