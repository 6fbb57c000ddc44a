use crate::adapters::http::{DcubeClient, JobFilter};
use crate::core::combiner::combine;
use crate::core::csv_writer::CsvWriter;
use crate::core::remapper::{remap_combined, simplify_scenario, View};
use crate::core::{ConfigProvider, CsvOutput, Pipeline, Record, Storage, TransformResult, WriteMode};
use crate::utils::error::Result;
use serde_json::Value;

pub const PLOTTING_FILE: &str = "dcube_results_plotting.csv";
pub const READABLE_FILE: &str = "dcube_results_readable.csv";

#[derive(Debug, Clone, Default)]
pub struct ResultsOptions {
    pub job_id: u64,
    pub filter: JobFilter,
    pub append: bool,
    pub headers: bool,
}

/// Raw material of one results report.
#[derive(Debug, Clone, Default)]
pub struct ScenarioData {
    pub scenario: Vec<Record>,
    pub queue: Record,
}

/// Scenario metrics joined with the job definition, written as the plotting
/// and readable result CSVs.
pub struct ResultsPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: DcubeClient,
    pub(crate) options: ResultsOptions,
}

impl<S: Storage, C: ConfigProvider> ResultsPipeline<S, C> {
    pub fn new(storage: S, config: C, options: ResultsOptions) -> Result<Self> {
        let client = DcubeClient::new(&config)?;
        Ok(Self {
            storage,
            config,
            client,
            options,
        })
    }

    fn write_mode(&self) -> WriteMode {
        if self.options.append {
            WriteMode::Append
        } else {
            WriteMode::Truncate
        }
    }
}

/// Scenario rows with short column names. Anything but an array of objects
/// is treated as "no rows".
pub fn scenario_rows(document: Value) -> Vec<Record> {
    match document {
        Value::Array(items) => items
            .into_iter()
            .filter_map(Record::from_json)
            .map(|raw| simplify_scenario(&raw))
            .collect(),
        other => {
            tracing::warn!("Unexpected scenario document, expected an array: {}", other);
            Vec::new()
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ResultsPipeline<S, C> {
    type Extracted = ScenarioData;

    async fn extract(&self) -> Result<ScenarioData> {
        let job_id = self.options.job_id;
        if let Some(days) = self.options.filter.days {
            tracing::info!("Filter {} days of jobs...", days);
        }
        if let Some(name) = &self.options.filter.name {
            tracing::info!("Filter jobs with name: {}", name);
        }

        let scenario = self.client.fetch_scenario(job_id, &self.options.filter).await?;
        let scenario = scenario_rows(scenario);
        tracing::debug!("Job {}: {} scenario rows", job_id, scenario.len());

        let queue = self.client.fetch_queue(job_id, &self.options.filter).await?;
        let queue = Record::from_json(queue).unwrap_or_else(|| {
            tracing::warn!("Job {}: queue entry is not an object, job fields stay empty", job_id);
            Record::new()
        });

        Ok(ScenarioData { scenario, queue })
    }

    async fn transform(&self, data: ScenarioData) -> Result<TransformResult> {
        let combined = combine(data.scenario, &data.queue);
        let mode = self.write_mode();

        tracing::info!(
            "Write results to CSV... APPEND={} WRITE_HEADERS={}",
            self.options.append,
            self.options.headers
        );

        let mut outputs = Vec::new();
        for (view, filename) in [(View::Plotting, PLOTTING_FILE), (View::Readable, READABLE_FILE)] {
            let content = CsvWriter::new(self.options.headers)
                .with_columns(view.header())
                .write(&remap_combined(&combined, view))?;
            outputs.push(CsvOutput {
                filename: filename.to_string(),
                content,
                mode,
            });
        }

        Ok(TransformResult {
            processed_records: combined.into_records(),
            outputs,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(result.outputs.len());

        for output in result.outputs {
            match output.mode {
                WriteMode::Append => {
                    self.storage
                        .append_file(&output.filename, output.content.as_bytes())
                        .await?
                }
                WriteMode::Truncate => {
                    self.storage
                        .write_file(&output.filename, output.content.as_bytes())
                        .await?
                }
            }
            written.push(format!("{}/{}", self.config.output_path(), output.filename));
        }

        Ok(written)
    }
}
