use httpmock::prelude::*;
use route_view::utils::error::NO_RESPONSE_MESSAGE;
use route_view::{
    AppConfig, FetchOrchestrator, HttpRouteServices, RouteQuery, ViewController, ViewState,
};
use serde_json::json;
use std::time::Duration;

const OPTIMIZE_PATH: &str = "/transportation-api/optimize-route/";
const HOSPITALS_PATH: &str = "/hospital-api/hospitals/";
const SITES_PATH: &str = "/manufacture-api/manufacture/";

fn config_for(base_url: String) -> AppConfig {
    let mut config = AppConfig::default();
    config.service.base_url = base_url;
    config
}

fn controller_for(config: &AppConfig) -> ViewController<HttpRouteServices> {
    let services = HttpRouteServices::new(config).unwrap();
    ViewController::new(FetchOrchestrator::new(services))
}

fn hospital_json(id: &str) -> serde_json::Value {
    json!({
        "id": 7,
        "hospital_id": id,
        "hospital_name": format!("Hospital {}", id),
        "hospital_latitude": 40.71,
        "hospital_longitude": -74.0,
        "street_address": "5 Health Ave",
        "city": "New York",
        "state": "NY",
        "postal_code": "10001",
        "country": "USA"
    })
}

fn site_json(id: &str) -> serde_json::Value {
    json!({
        "site_id": id,
        "name": format!("Plant {}", id),
        "latitude": 41.88,
        "longitude": -87.63,
        "street_address": "100 Industry Rd",
        "city": "Chicago",
        "state": "IL",
        "postal_code": "60601",
        "country": "USA",
        "production_capacity": 2500,
        "production_schedule": "Mon-Fri",
        "expire_in": "30 days"
    })
}

async fn mock_lookups(server: &MockServer, site_id: &str, hospital_id: &str) {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(HOSPITALS_PATH)
                .query_param("hospital_id", hospital_id);
            then.status(200).json_body(json!([hospital_json(hospital_id)]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(SITES_PATH).query_param("site_id", site_id);
            then.status(200).json_body(json!([site_json(site_id)]));
        })
        .await;
}

#[tokio::test]
async fn test_all_three_calls_succeed() {
    let server = MockServer::start_async().await;
    let route_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(OPTIMIZE_PATH)
                .json_body(json!({"site_id": "S1", "hospital_id": "H1"}));
            then.status(200)
                .json_body(json!({"route_map_html": "<div>route S1-H1</div>"}));
        })
        .await;
    mock_lookups(&server, "S1", "H1").await;

    let controller = controller_for(&config_for(server.base_url()));
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    route_mock.assert_async().await;
    match state {
        ViewState::Ready {
            route,
            hospital,
            site,
        } => {
            assert_eq!(route.as_str(), "<div>route S1-H1</div>");
            let hospital = hospital.unwrap();
            assert_eq!(hospital.hospital_name, "Hospital H1");
            assert_eq!(hospital.id, Some(7));
            let site = site.unwrap();
            assert_eq!(site.production_capacity, Some(2500));
            assert_eq!(site.expire_in.as_deref(), Some("30 days"));
        }
        other => panic!("expected Ready, got {:?}", other),
    }
}

#[tokio::test]
async fn test_route_not_found_uses_detail() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(OPTIMIZE_PATH);
            then.status(404).json_body(json!({"detail": "not found"}));
        })
        .await;
    mock_lookups(&server, "S1", "H1").await;

    let controller = controller_for(&config_for(server.base_url()));
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    assert_eq!(state, ViewState::Error("Error: 404 - not found".to_string()));
}

#[tokio::test]
async fn test_server_error_without_detail_uses_status_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(OPTIMIZE_PATH);
            then.status(200)
                .json_body(json!({"route_map_html": "<div></div>"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(HOSPITALS_PATH);
            then.status(500).body("boom");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(SITES_PATH);
            then.status(200).json_body(json!([]));
        })
        .await;

    let controller = controller_for(&config_for(server.base_url()));
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    assert_eq!(
        state,
        ViewState::Error("Error: 500 - Internal Server Error".to_string())
    );
}

#[tokio::test]
async fn test_manufacturing_site_unavailable_fails_the_view() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(OPTIMIZE_PATH);
            then.status(200)
                .json_body(json!({"route_map_html": "<div>route</div>"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(HOSPITALS_PATH)
                .query_param("hospital_id", "H1");
            then.status(200).json_body(json!([hospital_json("H1")]));
        })
        .await;
    let sites_mock = server
        .mock_async(|when, then| {
            when.method(GET).path(SITES_PATH).query_param("site_id", "S1");
            then.status(503).body("");
        })
        .await;

    let controller = controller_for(&config_for(server.base_url()));
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    sites_mock.assert_async().await;
    assert_eq!(
        state,
        ViewState::Error("Error: 503 - Service Unavailable".to_string())
    );
}

#[tokio::test]
async fn test_decimal_string_coordinates_and_null_fields_still_render() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(OPTIMIZE_PATH);
            then.status(200)
                .json_body(json!({"route_map_html": "<div>route</div>"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(HOSPITALS_PATH);
            then.status(200).json_body(json!([{
                "id": 3,
                "hospital_id": "H1",
                "hospital_name": "City Hospital",
                "hospital_latitude": "18.520430",
                "hospital_longitude": "73.856743",
                "street_address": null,
                "city": "Pune",
                "state": "MH",
                "postal_code": "411001",
                "country": "India"
            }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(SITES_PATH);
            then.status(200).json_body(json!([{
                "site_id": "S1",
                "name": "Plant S1",
                "latitude": "19.076090",
                "longitude": null,
                "street_address": "9 Works Ln",
                "city": null,
                "state": "MH",
                "postal_code": "400001",
                "country": "India",
                "production_capacity": "1200",
                "production_schedule": null,
                "expire_in": null
            }]));
        })
        .await;

    let controller = controller_for(&config_for(server.base_url()));
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    let ViewState::Ready { hospital, site, .. } = state else {
        panic!("expected Ready");
    };
    let hospital = hospital.unwrap();
    assert_eq!(hospital.hospital_latitude, Some(18.520430));
    assert_eq!(hospital.street_address, "");
    assert_eq!(hospital.address_line(), " Pune MH India - 411001");
    let site = site.unwrap();
    assert_eq!(site.longitude, None);
    assert_eq!(site.production_capacity, Some(1200));
    assert_eq!(site.address_line(), "9 Works Ln  MH India - 400001");
}

#[tokio::test]
async fn test_unreachable_service_reports_no_response() {
    // 先佔用一個 port 再釋放，確保沒有服務在監聽
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let controller = controller_for(&config_for(format!("http://127.0.0.1:{}", port)));
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    assert_eq!(state, ViewState::Error(NO_RESPONSE_MESSAGE.to_string()));
}

#[tokio::test]
async fn test_timeout_reports_no_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(OPTIMIZE_PATH);
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"route_map_html": "<div></div>"}));
        })
        .await;
    mock_lookups(&server, "S1", "H1").await;

    let mut config = config_for(server.base_url());
    config.service.timeout_seconds = Some(1);
    let controller = controller_for(&config);
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    assert_eq!(state, ViewState::Error(NO_RESPONSE_MESSAGE.to_string()));
}

#[tokio::test]
async fn test_undecodable_success_body_is_request_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(OPTIMIZE_PATH);
            then.status(200).body("<html>not json</html>");
        })
        .await;
    mock_lookups(&server, "S1", "H1").await;

    let controller = controller_for(&config_for(server.base_url()));
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    let message = state.error_message().unwrap().to_string();
    assert!(message.starts_with("Error: invalid optimize-route response"));
}

#[tokio::test]
async fn test_empty_hospital_lookup_is_absent_not_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(OPTIMIZE_PATH);
            then.status(200)
                .json_body(json!({"route_map_html": "<div>map</div>"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(HOSPITALS_PATH);
            then.status(200).json_body(json!([]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(SITES_PATH).query_param("site_id", "S1");
            then.status(200).json_body(json!([site_json("S1")]));
        })
        .await;

    let controller = controller_for(&config_for(server.base_url()));
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H404"))
        .await;

    match state {
        ViewState::Ready {
            route,
            hospital,
            site,
        } => {
            assert_eq!(route.as_str(), "<div>map</div>");
            assert!(hospital.is_none());
            assert_eq!(site.unwrap().site_id, "S1");
        }
        other => panic!("expected Ready, got {:?}", other),
    }
}

#[tokio::test]
async fn test_route_document_passes_through_unmodified() {
    let document = "<!DOCTYPE html>\n<div id=\"map_1\" style='w:100%'>\u{00e9}\u{2192} &amp; &lt;</div>\n<script>L.polyline([[1.5,2.5]]).addTo(m);</script>\r\n";

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(OPTIMIZE_PATH);
            then.status(200)
                .json_body(json!({ "route_map_html": document }));
        })
        .await;
    mock_lookups(&server, "S1", "H1").await;

    let controller = controller_for(&config_for(server.base_url()));
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    let ViewState::Ready { route, .. } = state else {
        panic!("expected Ready");
    };
    assert_eq!(route.as_str().as_bytes(), document.as_bytes());
    assert!(route_view::core::render::render_html_page(&ViewState::Ready {
        route,
        hospital: None,
        site: None,
    })
    .contains(document));
}

#[tokio::test]
async fn test_latest_query_wins_over_slow_earlier_query() {
    let server = MockServer::start_async().await;
    let slow_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(OPTIMIZE_PATH)
                .json_body(json!({"site_id": "S1", "hospital_id": "H1"}));
            then.status(200)
                .delay(Duration::from_millis(800))
                .json_body(json!({"route_map_html": "<div>old</div>"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(OPTIMIZE_PATH)
                .json_body(json!({"site_id": "S2", "hospital_id": "H2"}));
            then.status(200)
                .json_body(json!({"route_map_html": "<div>new</div>"}));
        })
        .await;
    mock_lookups(&server, "S1", "H1").await;
    mock_lookups(&server, "S2", "H2").await;

    let controller = controller_for(&config_for(server.base_url()));
    controller.submit(RouteQuery::new("S1", "H1"));
    let state = controller
        .submit_and_wait(RouteQuery::new("S2", "H2"))
        .await;

    let ViewState::Ready { route, .. } = &state else {
        panic!("expected Ready");
    };
    assert_eq!(route.as_str(), "<div>new</div>");

    // 等到被取代的查詢確定已收到回應
    tokio::time::sleep(Duration::from_millis(1200)).await;
    slow_mock.assert_async().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.query, Some(RouteQuery::new("S2", "H2")));
    assert_eq!(snapshot.state, state);
}

#[tokio::test]
async fn test_custom_endpoints_from_config() {
    let server = MockServer::start_async().await;
    let route_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/route/");
            then.status(200)
                .json_body(json!({"route_map_html": "<div>v2</div>"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/hospitals/");
            then.status(200).json_body(json!([hospital_json("H1")]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/sites/");
            then.status(200).json_body(json!([site_json("S1")]));
        })
        .await;

    let config = AppConfig::from_toml_str(&format!(
        r#"
[service]
base_url = "{}"

[endpoints]
optimize_route = "/v2/route/"
hospitals = "/v2/hospitals/"
manufacturing_sites = "/v2/sites/"
"#,
        server.base_url()
    ))
    .unwrap();

    let controller = controller_for(&config);
    let state = controller
        .submit_and_wait(RouteQuery::new("S1", "H1"))
        .await;

    route_mock.assert_async().await;
    assert!(state.error_message().is_none());
}
