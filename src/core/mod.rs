pub mod orchestrator;
pub mod render;
pub mod view_state;

pub use crate::domain::model::{RouteQuery, ViewSnapshot, ViewState};
pub use crate::domain::ports::RouteServices;
pub use crate::utils::error::Result;
