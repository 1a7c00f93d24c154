use crate::domain::model::{Hospital, ManufacturingSite, RouteQuery, RouteVisualization};
use crate::utils::error::FetchError;
use async_trait::async_trait;

pub type FetchOutcome<T> = std::result::Result<T, FetchError>;

/// 一個路線畫面背後的三個遠端呼叫
#[async_trait]
pub trait RouteServices: Send + Sync {
    async fn optimize_route(&self, query: &RouteQuery) -> FetchOutcome<RouteVisualization>;
    async fn get_hospitals(&self, hospital_id: &str) -> FetchOutcome<Vec<Hospital>>;
    async fn get_manufacturing_sites(&self, site_id: &str)
        -> FetchOutcome<Vec<ManufacturingSite>>;
}
