use crate::config::toml_config::{AppConfig, OutputFormat};
use crate::domain::model::RouteQuery;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "route-view")]
#[command(about = "Fetch and render the optimized route between a manufacturing site and a hospital")]
pub struct CliConfig {
    #[arg(long, help = "Manufacturing site identifier")]
    pub site_id: Option<String>,

    #[arg(long, help = "Hospital identifier")]
    pub hospital_id: Option<String>,

    #[arg(short, long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Override `service.base_url`")]
    pub base_url: Option<String>,

    #[arg(long, help = "Output format: text or html")]
    pub format: Option<OutputFormat>,

    #[arg(short, long, help = "Write the rendered view to this file instead of stdout")]
    pub output: Option<String>,

    #[arg(long, help = "Read `SITE HOSPITAL` pairs from stdin; the latest pair wins")]
    pub interactive: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// 載入設定檔 (或預設值) 後套用命令列覆寫，最後驗證
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(output) = &self.output {
            config.output.path = Some(output.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// 命令列指定的查詢，兩個識別碼都必須提供
    pub fn query(&self) -> Result<RouteQuery> {
        let missing = |field: &str| AppError::MissingConfigError {
            field: field.to_string(),
        };
        let site_id = self.site_id.as_deref().ok_or_else(|| missing("site_id"))?;
        let hospital_id = self
            .hospital_id
            .as_deref()
            .ok_or_else(|| missing("hospital_id"))?;
        Ok(RouteQuery::new(site_id, hospital_id))
    }
}

/// 解析一行 `SITE HOSPITAL`，空行與 `#` 註解回傳 `None`
pub fn parse_query_line(line: &str) -> Option<RouteQuery> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(site), Some(hospital), None) => Some(RouteQuery::new(site, hospital)),
        _ => None,
    }
}

/// 將渲染結果寫入檔案，未指定路徑時輸出到 stdout
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: Option<String>,
}

impl OutputSink {
    pub fn new(path: Option<String>) -> Self {
        Self { path }
    }

    pub fn write(&self, rendered: &str) -> Result<()> {
        match &self.path {
            Some(path) => {
                let full_path = Path::new(path);
                if let Some(parent) = full_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(full_path, rendered)?;
                tracing::info!("Wrote route view to {}", path);
            }
            None => println!("{}", rendered),
        }
        Ok(())
    }
}
