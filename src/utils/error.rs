use thiserror::Error;

pub const NO_RESPONSE_MESSAGE: &str =
    "Error: No response received from the server. Please try again later.";

/// 單一遠端呼叫的失敗，`Display` 即為顯示給使用者的文字
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 服務回應了非 2xx 狀態碼
    #[error("Error: {status} - {}", server_reason(.detail, .status_text))]
    Server {
        status: u16,
        detail: Option<String>,
        status_text: String,
    },

    /// 請求已送出但沒有收到回應
    #[error("{}", NO_RESPONSE_MESSAGE)]
    NoResponse,

    /// 請求無法建立，或回應內容無法解析
    #[error("Error: {message}")]
    RequestSetup { message: String },
}

fn server_reason<'a>(detail: &'a Option<String>, status_text: &'a str) -> &'a str {
    match detail.as_deref() {
        Some(d) if !d.is_empty() => d,
        _ => status_text,
    }
}

impl FetchError {
    pub fn server(status: u16, detail: Option<String>, status_text: impl Into<String>) -> Self {
        FetchError::Server {
            status,
            detail,
            status_text: status_text.into(),
        }
    }

    pub fn request_setup(message: impl Into<String>) -> Self {
        FetchError::RequestSetup {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Server { .. } => "server_error",
            FetchError::NoResponse => "no_response",
            FetchError::RequestSetup { .. } => "request_setup_error",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration parse error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("{0}")]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Io,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AppError::HttpClientError(_) | AppError::Fetch(_) => ErrorCategory::Network,
            AppError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Network => 2,
            ErrorCategory::Io => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::ConfigValidationError { field, .. } => {
                format!("The configuration could not be read ({})", field)
            }
            AppError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            AppError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            AppError::HttpClientError(e) => format!("Could not set up the HTTP client: {}", e),
            AppError::IoError(e) => format!("File operation failed: {}", e),
            AppError::Fetch(e) => e.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the config file and command line flags",
            ErrorCategory::Network => "Check that the services are reachable and run the query again",
            ErrorCategory::Io => "Check that the output path exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
