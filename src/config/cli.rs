use crate::adapters::http::{encode_firmware, ConfigOverrides, JobFilter, JobRequest, MetricQuery};
use crate::config::SettingsOverrides;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "dcube")]
#[command(about = "Query the DCUBE testbed API and write CSV reports")]
pub struct CliConfig {
    /// API key, sent as the `key` query parameter
    #[arg(long, env = "DCUBE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the DCUBE server, e.g. https://dcube.example.org
    #[arg(long, env = "DCUBE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// TOML file with [api] and [output] settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory the CSV files are written to
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn settings_overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            output_path: self.output_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch a job's scenario results and write the plotting/readable CSVs
    Results(ResultsArgs),
    /// List jobs into dcube_jobs_list.csv
    Jobs(JobsArgs),
    /// Print a job's description (commas removed)
    Description { job_id: u64 },
    /// Queue a new job
    Queue(QueueArgs),
    /// Delete a queued job
    Delete { job_id: u64 },
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Only consider the last N days
    #[arg(long)]
    pub days: Option<u32>,

    /// Only consider jobs with this name
    #[arg(long)]
    pub name: Option<String>,
}

impl From<&FilterArgs> for JobFilter {
    fn from(args: &FilterArgs) -> Self {
        JobFilter {
            days: args.days,
            name: args.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ResultsArgs {
    pub job_id: u64,

    /// Append to existing CSV files instead of overwriting them
    #[arg(long)]
    pub append: bool,

    /// Write a header row
    #[arg(long)]
    pub headers: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Clone, Args)]
pub struct JobsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Only the most recent N jobs
    #[arg(long)]
    pub last: Option<u32>,

    /// Write every job field plus a readable summary instead of bare ids
    #[arg(long)]
    pub detailed: bool,

    /// Write the compact listing as `id,<job id>` pairs
    #[arg(long, conflicts_with = "detailed")]
    pub id_list: bool,
}

impl JobsArgs {
    pub fn metric_query(&self) -> MetricQuery {
        MetricQuery {
            filter: JobFilter::from(&self.filter),
            last: self.last,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct QueueArgs {
    #[arg(long)]
    pub protocol: i64,

    #[arg(long)]
    pub layout: String,

    #[arg(long, default_value_t = 0)]
    pub periodicity: i64,

    #[arg(long)]
    pub message_length: i64,

    #[arg(long, default_value_t = 0)]
    pub patching: i64,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Run time in seconds
    #[arg(long)]
    pub duration: i64,

    #[arg(long, default_value_t = 0)]
    pub logs: i64,

    #[arg(long, default_value_t = 0)]
    pub jamming: i64,

    #[arg(long)]
    pub priority: bool,

    /// Firmware image to flash
    #[arg(long)]
    pub firmware: PathBuf,

    #[arg(long)]
    pub temp_profile: Option<String>,

    #[arg(long)]
    pub override_start: Option<i64>,

    #[arg(long)]
    pub override_delta: Option<i64>,
}

impl QueueArgs {
    /// Reads the firmware image and builds the request body.
    pub fn job_request(&self) -> Result<JobRequest> {
        let firmware = std::fs::read(&self.firmware)?;
        let overrides = ConfigOverrides {
            start: self.override_start,
            delta: self.override_delta,
        };

        Ok(JobRequest {
            protocol: self.protocol,
            layout: self.layout.clone(),
            periodicity: self.periodicity,
            message_length: self.message_length,
            patching: self.patching,
            name: self.name.clone(),
            description: self.description.clone(),
            duration: self.duration,
            logs: self.logs,
            jamming: self.jamming,
            priority: self.priority,
            file: encode_firmware(&firmware),
            temp_profile: self.temp_profile.clone(),
            config_overrides: (!overrides.is_empty()).then_some(overrides),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_results_command() {
        let cli = CliConfig::try_parse_from([
            "dcube",
            "--api-key",
            "k",
            "results",
            "42",
            "--append",
            "--days",
            "0",
        ])
        .unwrap();

        match cli.command {
            Command::Results(args) => {
                assert_eq!(args.job_id, 42);
                assert!(args.append);
                assert!(!args.headers);
                assert_eq!(args.filter.days, Some(0));
                assert_eq!(args.filter.name, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_parse_jobs_command() {
        let cli = CliConfig::try_parse_from(["dcube", "jobs", "--last", "5", "--detailed", "-v"])
            .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Jobs(args) => {
                assert!(args.detailed);
                assert_eq!(args.metric_query().resource(), "metric/adv/5");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_id_list_conflicts_with_detailed() {
        let cli = CliConfig::try_parse_from(["dcube", "jobs", "--id-list"]).unwrap();
        let Command::Jobs(args) = cli.command else {
            panic!("expected jobs command");
        };
        assert!(args.id_list);
        assert!(!args.detailed);

        assert!(CliConfig::try_parse_from(["dcube", "jobs", "--id-list", "--detailed"]).is_err());
    }

    #[test]
    fn test_job_id_must_be_numeric() {
        assert!(CliConfig::try_parse_from(["dcube", "delete", "abc"]).is_err());
    }

    #[test]
    fn test_queue_args_build_request() {
        let mut firmware = NamedTempFile::new().unwrap();
        firmware.write_all(b"hex").unwrap();
        let path = firmware.path().to_str().unwrap().to_string();

        let cli = CliConfig::try_parse_from([
            "dcube",
            "queue",
            "--protocol",
            "3",
            "--layout",
            "1",
            "--message-length",
            "64",
            "--name",
            "osf",
            "--duration",
            "600",
            "--firmware",
            &path,
            "--override-delta",
            "0",
        ])
        .unwrap();

        let Command::Queue(args) = cli.command else {
            panic!("expected queue command");
        };
        let job = args.job_request().unwrap();

        assert_eq!(job.file, "aGV4");
        assert_eq!(job.periodicity, 0);
        assert!(!job.priority);
        assert_eq!(
            job.config_overrides,
            Some(ConfigOverrides {
                start: None,
                delta: Some(0)
            })
        );
    }
}
