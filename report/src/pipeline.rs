use crate::aggregator::{Aggregator, Report};
use crate::config::Config;
use crate::errors::ReportError;
use crate::metrics_defs::{REPORT_DURATION, REPORT_RUNS};
use crate::publisher::{HttpUploader, Published, Publisher};
use crate::serializer::to_csv;
use bytes::Bytes;
use race_api::RaceApiClient;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Aggregate, serialize, publish. Runs are serialized: every run uploads to
/// the same destination.
pub struct Pipeline {
    aggregator: Aggregator,
    publisher: Publisher,
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(aggregator: Aggregator, publisher: Publisher) -> Self {
        Pipeline {
            aggregator,
            publisher,
            run_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ReportError> {
        let source = RaceApiClient::new(&config.race_api.base_url, config.race_api.timeout())?;
        let uploader = HttpUploader::new(config.publisher.url.clone(), config.publisher.timeout())?;

        Ok(Pipeline::new(
            Aggregator::new(Arc::new(source), config.missing_points),
            Publisher::new(
                Arc::new(uploader),
                config.publisher.max_attempts,
                config.publisher.backoff_base(),
            ),
        ))
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Builds the report and renders it, without uploading.
    pub async fn generate(&self) -> Result<(Report, Bytes), ReportError> {
        let report = self.aggregator.build_report().await?;
        tracing::info!(
            race = %report.race.race_name,
            season = report.race.year,
            drivers = report.rows.len(),
            "Built report"
        );
        let csv = Bytes::from(to_csv(&report)?);
        Ok((report, csv))
    }

    pub async fn run(&self) -> Result<Published, ReportError> {
        let _guard = self.run_lock.lock().await;
        let start = Instant::now();

        let result = self.generate_and_publish().await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        shared::counter!(REPORT_RUNS, "outcome" => outcome).increment(1);
        shared::histogram!(REPORT_DURATION, "outcome" => outcome)
            .record(start.elapsed().as_secs_f64());

        result
    }

    async fn generate_and_publish(&self) -> Result<Published, ReportError> {
        let (_, csv) = self.generate().await?;
        Ok(self.publisher.publish(csv).await?)
    }
}
