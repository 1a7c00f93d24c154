use crate::utils::error::{AppError, Result};
use crate::utils::validation::{invalid, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_OPTIMIZE_ROUTE_PATH: &str = "/transportation-api/optimize-route/";
pub const DEFAULT_HOSPITALS_PATH: &str = "/hospital-api/hospitals/";
pub const DEFAULT_MANUFACTURING_SITES_PATH: &str = "/manufacture-api/manufacture/";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_optimize_route")]
    pub optimize_route: String,
    #[serde(default = "default_hospitals")]
    pub hospitals: String,
    #[serde(default = "default_manufacturing_sites")]
    pub manufacturing_sites: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            optimize_route: default_optimize_route(),
            hospitals: default_hospitals(),
            manufacturing_sites: default_manufacturing_sites(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "html" => Ok(OutputFormat::Html),
            other => Err(AppError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: text, html".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    pub path: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_optimize_route() -> String {
    DEFAULT_OPTIMIZE_ROUTE_PATH.to_string()
}

fn default_hospitals() -> String {
    DEFAULT_HOSPITALS_PATH.to_string()
}

fn default_manufacturing_sites() -> String {
    DEFAULT_MANUFACTURING_SITES_PATH.to_string()
}

impl AppConfig {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 解析 TOML 字串，先替換 `${VAR}` 環境變數
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數，未設定的變數保留原樣交給驗證回報
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn base_url(&self) -> &str {
        &self.service.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.service.timeout_seconds.map(Duration::from_secs)
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output.format
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        let base_url = &self.service.base_url;
        let parsed = Url::parse(base_url)
            .map_err(|e| invalid("service.base_url", base_url, format!("Invalid URL format: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(
                "service.base_url",
                base_url,
                format!("Route services are reached over http(s), not {}", parsed.scheme()),
            ));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("service.base_url", base_url, "URL cannot hold endpoint paths"));
        }

        if let Some(timeout) = self.service.timeout_seconds {
            if timeout == 0 {
                return Err(invalid(
                    "service.timeout_seconds",
                    timeout,
                    "Timeout is in whole seconds and must be at least 1; omit it to wait indefinitely",
                ));
            }
        }

        for (field, path) in [
            ("endpoints.optimize_route", &self.endpoints.optimize_route),
            ("endpoints.hospitals", &self.endpoints.hospitals),
            ("endpoints.manufacturing_sites", &self.endpoints.manufacturing_sites),
        ] {
            // 端點以絕對路徑接在 base_url 之後
            if !path.starts_with('/') {
                return Err(invalid(field, path, "Endpoint path must start with '/'"));
            }
            if path.chars().any(char::is_whitespace) {
                return Err(invalid(field, path, "Endpoint path cannot contain whitespace"));
            }
        }

        if let Some(path) = &self.output.path {
            if path.trim().is_empty() || path.contains('\0') {
                return Err(invalid("output.path", path, "Output path must name a file"));
            }
        }

        Ok(())
    }
}
