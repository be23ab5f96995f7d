use crate::error::ApiErrorBody;
use crate::models::{NewReport, ReportCount, ReportKind, ReportRecord, SessionCreated};
use crate::validation::FieldError;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::open_session,
        crate::routes::close_session,
        crate::routes::list_reports,
        crate::routes::create_report,
        crate::routes::count_reports,
        crate::routes::delete_report_at,
        crate::routes::delete_report_by_id,
    ),
    components(schemas(
        ReportKind, ReportRecord, NewReport, ReportCount, SessionCreated,
        ApiErrorBody, FieldError
    )),
    tags(
        (name = "reports", description = "Lost and found reports, newest first"),
        (name = "sessions", description = "Per-visitor report collections"),
    )
)]
pub struct ApiDoc;
