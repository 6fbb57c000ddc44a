use crate::adapters::http::{DcubeClient, MetricQuery};
use crate::core::csv_writer::CsvWriter;
use crate::core::normalizer::{job_ids, normalize_jobs};
use crate::core::remapper::{remap, View};
use crate::core::{ConfigProvider, CsvData, CsvOutput, Pipeline, Storage, TransformResult, WriteMode};
use crate::utils::error::Result;
use serde_json::Value;

pub const JOBS_LIST_FILE: &str = "dcube_jobs_list.csv";
pub const JOBS_READABLE_FILE: &str = "dcube_jobs_list_readable.csv";

#[derive(Debug, Clone, Default)]
pub struct JobsOptions {
    pub query: MetricQuery,
    /// Every job field plus a readable summary, instead of bare ids.
    pub detailed: bool,
    /// Compact listing as `id,<job id>` pairs instead of bare ids.
    pub id_list: bool,
}

/// Writes the job listing. Both files are rewritten on every run.
pub struct JobsPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: DcubeClient,
    pub(crate) options: JobsOptions,
}

impl<S: Storage, C: ConfigProvider> JobsPipeline<S, C> {
    pub fn new(storage: S, config: C, options: JobsOptions) -> Result<Self> {
        let client = DcubeClient::new(&config)?;
        Ok(Self {
            storage,
            config,
            client,
            options,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for JobsPipeline<S, C> {
    type Extracted = Value;

    async fn extract(&self) -> Result<Value> {
        let query = &self.options.query;
        if let Some(last) = query.last {
            tracing::info!("Get last {} jobs...", last);
        }
        if let Some(days) = query.filter.days {
            tracing::info!("Filter {} days of jobs...", days);
        }
        if let Some(name) = &query.filter.name {
            tracing::info!("Filter jobs with name: {}", name);
        }

        let listing = self.client.fetch_metrics(query).await?;
        match listing.as_array() {
            Some(entries) => tracing::debug!("Metric listing holds {} entries", entries.len()),
            None => tracing::warn!("Metric listing is not an array, no jobs to write"),
        }
        Ok(listing)
    }

    async fn transform(&self, listing: Value) -> Result<TransformResult> {
        if !self.options.detailed {
            let ids = job_ids(&listing);
            let data = if self.options.id_list {
                CsvData::IdList {
                    value_column: "job".to_string(),
                    values: ids.iter().filter_map(|r| r.get("id").cloned()).collect(),
                }
            } else {
                CsvData::Table(ids.clone())
            };
            tracing::debug!("Writing {} job ids", data.row_count());
            let content = CsvWriter::new(false).write(&data)?;
            return Ok(TransformResult {
                processed_records: ids,
                outputs: vec![CsvOutput {
                    filename: JOBS_LIST_FILE.to_string(),
                    content,
                    mode: WriteMode::Truncate,
                }],
            });
        }

        let jobs = normalize_jobs(&listing);
        let full = CsvWriter::new(true).write(&CsvData::Table(jobs.clone()))?;

        let readable: Vec<_> = jobs
            .iter()
            .map(|job| remap(job, View::JobsReadable))
            .collect();
        let readable = CsvWriter::new(true)
            .with_columns(View::JobsReadable.header())
            .write(&CsvData::Table(readable))?;

        Ok(TransformResult {
            processed_records: jobs,
            outputs: vec![
                CsvOutput {
                    filename: JOBS_LIST_FILE.to_string(),
                    content: full,
                    mode: WriteMode::Truncate,
                },
                CsvOutput {
                    filename: JOBS_READABLE_FILE.to_string(),
                    content: readable,
                    mode: WriteMode::Truncate,
                },
            ],
        })
    }

    async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(result.outputs.len());
        for output in result.outputs {
            self.storage
                .write_file(&output.filename, output.content.as_bytes())
                .await?;
            written.push(format!("{}/{}", self.config.output_path(), output.filename));
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::JobFilter;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.entry(path.to_string()).or_default().extend_from_slice(data);
            Ok(())
        }
    }

    struct MockConfig {
        base_url: String,
    }

    impl ConfigProvider for MockConfig {
        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn api_key(&self) -> &str {
            "test-key"
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn request_timeout(&self) -> Option<Duration> {
            Some(Duration::from_secs(5))
        }
    }

    fn pipeline(base_url: String, options: JobsOptions) -> JobsPipeline<MockStorage, MockConfig> {
        JobsPipeline::new(MockStorage::default(), MockConfig { base_url }, options).unwrap()
    }

    fn listing() -> Value {
        serde_json::json!([
            {
                "job": {
                    "id": 101,
                    "name": "osf",
                    "description": "run a",
                    "protocol": 4,
                    "jamming": 0,
                    "message_length": 64,
                    "priority": false,
                    "evaluated": true,
                    "finished": true,
                    "result": {"reliability": 99.0}
                }
            },
            {
                "job": {
                    "id": 102,
                    "name": "osf",
                    "description": "run b",
                    "protocol": 4,
                    "jamming": 1,
                    "message_length": 64,
                    "priority": false,
                    "evaluated": false,
                    "finished": false,
                    "periodicity": 500
                }
            }
        ])
    }

    #[tokio::test]
    async fn test_extract_uses_last_resource() {
        let server = MockServer::start();
        let metric_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/metric/adv/2")
                .query_param("key", "test-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(listing());
        });

        let options = JobsOptions {
            query: MetricQuery {
                filter: JobFilter::default(),
                last: Some(2),
            },
            detailed: true,
            id_list: false,
        };
        let listing = pipeline(server.base_url(), options).extract().await.unwrap();

        metric_mock.assert();
        assert_eq!(listing.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_transform_detailed() {
        let options = JobsOptions {
            detailed: true,
            ..Default::default()
        };
        let result = pipeline("http://test.invalid".to_string(), options)
            .transform(listing())
            .await
            .unwrap();

        assert_eq!(result.processed_records.len(), 2);
        assert_eq!(result.outputs.len(), 2);

        let full: Vec<&str> = result.outputs[0].content.lines().collect();
        assert_eq!(
            full[0],
            "id,name,description,protocol,jamming,message_length,priority,evaluated,finished,periodicity"
        );
        assert_eq!(full[1], "101,osf,run a,4,0,64,0,1,1,0");
        assert_eq!(full[2], "102,osf,run b,4,1,64,0,0,0,500");

        let readable: Vec<&str> = result.outputs[1].content.lines().collect();
        assert_eq!(readable[0], "id,name,description,proto,jam,len,period,eval,fin");
        assert_eq!(readable[1], "101,osf,run a,4,0,64,0,1,1");
        assert_eq!(readable[2], "102,osf,run b,4,1,64,500,0,0");
    }

    #[tokio::test]
    async fn test_transform_compact_ids_without_header() {
        let result = pipeline("http://test.invalid".to_string(), JobsOptions::default())
            .transform(listing())
            .await
            .unwrap();

        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.outputs[0].filename, JOBS_LIST_FILE);
        assert_eq!(result.outputs[0].content, "101\n102\n");
    }

    #[tokio::test]
    async fn test_transform_compact_id_pairs() {
        let options = JobsOptions {
            id_list: true,
            ..Default::default()
        };
        let result = pipeline("http://test.invalid".to_string(), options)
            .transform(listing())
            .await
            .unwrap();

        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.outputs[0].content, "id,101\nid,102\n");
        assert_eq!(result.processed_records.len(), 2);
    }

    #[tokio::test]
    async fn test_transform_unexpected_listing_writes_nothing() {
        let result = pipeline("http://test.invalid".to_string(), JobsOptions::default())
            .transform(serde_json::json!({"error": "bad key"}))
            .await
            .unwrap();

        assert!(result.processed_records.is_empty());
        assert_eq!(result.outputs[0].content, "");
    }

    #[tokio::test]
    async fn test_load_always_truncates() {
        let pipeline = pipeline("http://test.invalid".to_string(), JobsOptions::default());
        pipeline
            .storage
            .write_file(JOBS_LIST_FILE, b"stale\n")
            .await
            .unwrap();

        let written = pipeline
            .load(TransformResult {
                processed_records: Vec::new(),
                outputs: vec![CsvOutput {
                    filename: JOBS_LIST_FILE.to_string(),
                    content: "7\n".to_string(),
                    mode: WriteMode::Truncate,
                }],
            })
            .await
            .unwrap();

        assert_eq!(written, vec![format!("out/{}", JOBS_LIST_FILE)]);
        let content = pipeline.storage.get_file(JOBS_LIST_FILE).await.unwrap();
        assert_eq!(content, b"7\n");
    }
}
