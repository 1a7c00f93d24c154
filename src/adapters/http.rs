use crate::config::toml_config::{AppConfig, EndpointConfig};
use crate::domain::model::{Hospital, ManufacturingSite, RouteQuery, RouteVisualization};
use crate::domain::ports::{FetchOutcome, RouteServices};
use crate::utils::error::{FetchError, Result};
use crate::utils::validation::invalid;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
struct OptimizeRouteRequest<'a> {
    site_id: &'a str,
    hospital_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct OptimizeRouteResponse {
    route_map_html: RouteVisualization,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// 透過 HTTP/JSON 實作 `RouteServices`
pub struct HttpRouteServices {
    client: Client,
    base_url: Url,
    endpoints: EndpointConfig,
}

impl HttpRouteServices {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = Url::parse(config.base_url()).map_err(|e| {
            invalid("service.base_url", config.base_url(), format!("Invalid URL format: {}", e))
        })?;

        Ok(Self {
            client,
            base_url,
            endpoints: config.endpoints.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> FetchOutcome<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::request_setup(format!("invalid endpoint '{}': {}", path, e)))
    }

    fn lookup_url(&self, path: &str, key: &str, value: &str) -> FetchOutcome<Url> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        call: &str,
        request: RequestBuilder,
    ) -> FetchOutcome<T> {
        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();
        tracing::debug!("{} responded with {}", call, status);

        if !status.is_success() {
            // 錯誤內容讀不到時只少了 detail，狀態碼照樣回報
            let body = response.bytes().await.unwrap_or_default();
            let detail = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail);
            return Err(FetchError::server(
                status.as_u16(),
                detail,
                status.canonical_reason().unwrap_or("Unknown Status"),
            ));
        }

        let body = response.bytes().await.map_err(classify_transport_error)?;
        serde_json::from_slice(&body)
            .map_err(|e| FetchError::request_setup(format!("invalid {} response: {}", call, e)))
    }
}

/// 將 reqwest 錯誤分成「請求沒送出」與「送出但沒有回應」兩類
pub fn classify_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_builder() || err.is_redirect() || err.is_decode() {
        FetchError::request_setup(err.to_string())
    } else {
        FetchError::NoResponse
    }
}

#[async_trait]
impl RouteServices for HttpRouteServices {
    async fn optimize_route(&self, query: &RouteQuery) -> FetchOutcome<RouteVisualization> {
        let url = self.endpoint(&self.endpoints.optimize_route)?;
        let body = OptimizeRouteRequest {
            site_id: &query.site_id,
            hospital_id: &query.hospital_id,
        };

        let response: OptimizeRouteResponse = self
            .send_json("optimize-route", self.client.post(url).json(&body))
            .await?;
        Ok(response.route_map_html)
    }

    async fn get_hospitals(&self, hospital_id: &str) -> FetchOutcome<Vec<Hospital>> {
        let url = self.lookup_url(&self.endpoints.hospitals, "hospital_id", hospital_id)?;
        self.send_json("hospital lookup", self.client.get(url)).await
    }

    async fn get_manufacturing_sites(&self, site_id: &str) -> FetchOutcome<Vec<ManufacturingSite>> {
        let url = self.lookup_url(&self.endpoints.manufacturing_sites, "site_id", site_id)?;
        self.send_json("manufacturing-site lookup", self.client.get(url)).await
    }
}
