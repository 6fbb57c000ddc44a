use thiserror::Error;

#[derive(Error, Debug)]
pub enum DcubeError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for {resource}")]
    ApiStatus { status: u16, resource: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    FileSystem,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DcubeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DcubeError::ApiError(_) | DcubeError::ApiStatus { .. } => ErrorCategory::Network,
            DcubeError::CsvError(_)
            | DcubeError::SerializationError(_)
            | DcubeError::ProcessingError { .. } => ErrorCategory::Data,
            DcubeError::IoError(_) => ErrorCategory::FileSystem,
            DcubeError::UrlError(_)
            | DcubeError::ConfigValidationError { .. }
            | DcubeError::MissingConfigError { .. }
            | DcubeError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::FileSystem => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DcubeError::ApiError(_) => "Check the base URL and that the DCUBE server is reachable",
            DcubeError::ApiStatus { status: 401 | 403, .. } => "Check that the API key is valid",
            DcubeError::ApiStatus { status: 404, .. } => "Check that the job id exists",
            DcubeError::ApiStatus { .. } => "The DCUBE server rejected the request, try again later",
            DcubeError::CsvError(_) | DcubeError::ProcessingError { .. } => {
                "Inspect the API response, its shape may have changed"
            }
            DcubeError::SerializationError(_) => "The API did not return valid JSON",
            DcubeError::IoError(_) => "Check permissions and free space in the output directory",
            DcubeError::UrlError(_) => "Pass a full URL such as https://dcube.example.org",
            DcubeError::ConfigValidationError { .. }
            | DcubeError::InvalidConfigValueError { .. } => "Fix the value in the config file or on the command line",
            DcubeError::MissingConfigError { .. } => {
                "Pass the value on the command line, via the environment or in the config file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DcubeError::ApiError(e) if e.is_timeout() => "The DCUBE API timed out".to_string(),
            DcubeError::ApiError(_) => "Could not reach the DCUBE API".to_string(),
            DcubeError::ApiStatus { status, resource } => {
                format!("DCUBE API answered {} for '{}'", status, resource)
            }
            DcubeError::MissingConfigError { field } => format!("Missing setting: {}", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DcubeError>;
