use clap::Parser;
use dcube_reporter::app::actions;
use dcube_reporter::app::pipelines::{JobsOptions, ResultsOptions};
use dcube_reporter::config::cli::Command;
use dcube_reporter::config::toml_config::DcubeConfig;
use dcube_reporter::utils::error::ErrorSeverity;
use dcube_reporter::utils::logger;
use dcube_reporter::{
    CliConfig, DcubeClient, DcubeError, JobsPipeline, LocalStorage, ReportEngine, ResultsPipeline,
    Settings,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.log_format);
    tracing::debug!("Starting dcube {:?}", cli.command);

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
        }
    };

    if let Err(e) = run(cli.command, settings).await {
        tracing::error!(
            "❌ dcube failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }
}

fn load_settings(cli: &CliConfig) -> dcube_reporter::Result<Settings> {
    let file = cli.config.as_ref().map(DcubeConfig::from_file).transpose()?;
    Settings::resolve(cli.settings_overrides(), file.as_ref())
}

async fn run(command: Command, settings: Settings) -> dcube_reporter::Result<()> {
    match command {
        Command::Results(args) => {
            let storage = LocalStorage::new(settings.output_path.clone());
            let options = ResultsOptions {
                job_id: args.job_id,
                filter: (&args.filter).into(),
                append: args.append,
                headers: args.headers,
            };
            let pipeline = ResultsPipeline::new(storage, settings, options)?;
            ReportEngine::new(pipeline).run().await?;
        }
        Command::Jobs(args) => {
            let storage = LocalStorage::new(settings.output_path.clone());
            let options = JobsOptions {
                query: args.metric_query(),
                detailed: args.detailed,
                id_list: args.id_list,
            };
            let pipeline = JobsPipeline::new(storage, settings, options)?;
            ReportEngine::new(pipeline).run().await?;
        }
        Command::Queue(args) => {
            let job = args.job_request()?;
            let client = DcubeClient::new(&settings)?;
            let id = actions::queue_job(&client, &job).await?;
            println!("{}", id);
        }
        Command::Delete { job_id } => {
            let client = DcubeClient::new(&settings)?;
            let id = actions::delete_job(&client, job_id).await?;
            println!("{}", id);
        }
        Command::Description { job_id } => {
            // shell scripts embed this output, so failures print an empty line
            let description = match DcubeClient::new(&settings) {
                Ok(client) => actions::description_or_empty(&client, job_id).await,
                Err(e) => {
                    tracing::warn!("Job {}: no description ({})", job_id, e);
                    String::new()
                }
            };
            println!("{}", description);
        }
    }
    Ok(())
}

fn exit_with(e: &DcubeError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
