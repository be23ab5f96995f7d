use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const REPORTS_CREATED: &str = "reports_created_total";
pub const REPORTS_DELETED: &str = "reports_deleted_total";
pub const VALIDATION_REJECTIONS: &str = "report_validation_rejections_total";
pub const SESSIONS_OPENED: &str = "sessions_opened_total";
pub const SESSIONS_EVICTED: &str = "sessions_evicted_total";
pub const SESSIONS_ACTIVE: &str = "sessions_active";

/// Installs the global Prometheus recorder. Call once at startup.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn report_created() { metrics::counter!(REPORTS_CREATED).increment(1); }
pub fn report_deleted() { metrics::counter!(REPORTS_DELETED).increment(1); }
pub fn validation_rejected() { metrics::counter!(VALIDATION_REJECTIONS).increment(1); }
pub fn session_opened() { metrics::counter!(SESSIONS_OPENED).increment(1); }

pub fn sessions_evicted(n: usize) {
    metrics::counter!(SESSIONS_EVICTED).increment(n as u64);
}

pub fn sessions_active(n: usize) {
    metrics::gauge!(SESSIONS_ACTIVE).set(n as f64);
}
