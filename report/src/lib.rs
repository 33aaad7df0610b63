pub mod aggregator;
pub mod config;
pub mod errors;
pub mod metrics_defs;
pub mod pipeline;
pub mod publisher;
pub mod serializer;
pub mod service;

#[cfg(test)]
mod testutils;

pub use aggregator::{Aggregator, DriverRow, RaceSummary, Report};
pub use errors::{PublishError, ReportError};
pub use pipeline::Pipeline;

use service::ReportService;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;

pub async fn run(config: config::Config) -> Result<(), ReportError> {
    let pipeline = Arc::new(Pipeline::from_config(&config)?);

    let report_task = run_http_service(
        &config.listener.host,
        config.listener.port,
        ReportService::new(pipeline),
    );
    // Nothing to warm up: ready as soon as the listeners are bound.
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<_, ReportError>::new(|| true),
    );

    tokio::try_join!(report_task, admin_task)?;
    Ok(())
}
