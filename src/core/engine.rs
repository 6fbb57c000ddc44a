use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load once, in order. Any failure aborts the
    /// run; nothing is retried.
    pub async fn run(&self) -> Result<Vec<String>> {
        let started = Instant::now();
        tracing::info!("Starting report run");

        tracing::debug!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;

        tracing::debug!("Transforming data...");
        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Transformed {} records into {} CSV file(s)",
            transformed.processed_records.len(),
            transformed.outputs.len()
        );

        tracing::debug!("Loading data...");
        let written = self.pipeline.load(transformed).await?;
        for path in &written {
            tracing::info!("📁 Output saved to: {}", path);
        }

        tracing::debug!("Report run finished in {:?}", started.elapsed());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CsvOutput, Record, TransformResult, WriteMode};
    use crate::utils::error::DcubeError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
        fail_extract: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        type Extracted = Vec<Record>;

        async fn extract(&self) -> Result<Vec<Record>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_extract {
                return Err(DcubeError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(vec![Record::new(), Record::new()])
        }

        async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TransformResult {
                processed_records: data,
                outputs: vec![CsvOutput {
                    filename: "out.csv".to_string(),
                    content: String::new(),
                    mode: WriteMode::Truncate,
                }],
            })
        }

        async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(result.outputs.into_iter().map(|o| o.filename).collect())
        }
    }

    #[tokio::test]
    async fn test_run_executes_all_phases() {
        let engine = ReportEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_extract: false,
        });

        let written = engine.run().await.unwrap();

        assert_eq!(written, vec!["out.csv".to_string()]);
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_extract_failure_aborts_run() {
        let engine = ReportEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_extract: true,
        });

        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 1);
    }
}
