use crate::domain::model::{RouteQuery, ViewState};
use crate::domain::ports::{FetchOutcome, RouteServices};
use std::future::Future;
use std::sync::Arc;

/// 執行路線畫面背後的三個查詢，並收斂成一個終態 `ViewState`
pub struct FetchOrchestrator<S: RouteServices> {
    services: Arc<S>,
}

impl<S: RouteServices> Clone for FetchOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            services: Arc::clone(&self.services),
        }
    }
}

impl<S: RouteServices> FetchOrchestrator<S> {
    pub fn new(services: S) -> Self {
        Self {
            services: Arc::new(services),
        }
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    /// 三個請求同時發出。第一個失敗即為結果，其餘仍在進行的請求直接丟棄；
    /// 全部成功則為 `Ready`。不會回傳 `Loading`。
    pub async fn run(&self, query: &RouteQuery) -> ViewState {
        tracing::debug!("Fetching route view for {}", query);

        let route = logged("optimize-route", self.services.optimize_route(query));
        let hospitals = logged(
            "hospital lookup",
            self.services.get_hospitals(&query.hospital_id),
        );
        let sites = logged(
            "manufacturing-site lookup",
            self.services.get_manufacturing_sites(&query.site_id),
        );

        match tokio::try_join!(route, hospitals, sites) {
            Ok((route, hospitals, sites)) => {
                tracing::debug!("Route document received ({} bytes)", route.len());
                // 查詢結果為空列表時視為無資料，不算錯誤
                let hospital = hospitals.into_iter().next();
                let site = sites.into_iter().next();
                if hospital.is_none() {
                    tracing::debug!("No hospital record for '{}'", query.hospital_id);
                }
                if site.is_none() {
                    tracing::debug!("No manufacturing site record for '{}'", query.site_id);
                }
                ViewState::Ready {
                    route,
                    hospital,
                    site,
                }
            }
            Err(e) => ViewState::Error(e.to_string()),
        }
    }
}

async fn logged<T>(
    call: &'static str,
    fut: impl Future<Output = FetchOutcome<T>>,
) -> FetchOutcome<T> {
    let outcome = fut.await;
    match &outcome {
        Ok(_) => tracing::debug!("{} succeeded", call),
        Err(e) => tracing::warn!("{} failed ({}): {}", call, e.kind(), e),
    }
    outcome
}
