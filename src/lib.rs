pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpRouteServices;
pub use config::toml_config::AppConfig;
pub use core::{orchestrator::FetchOrchestrator, view_state::ViewController};
pub use domain::model::{
    Hospital, ManufacturingSite, RouteQuery, RouteVisualization, ViewSnapshot, ViewState,
};
pub use utils::error::{AppError, FetchError, Result};
