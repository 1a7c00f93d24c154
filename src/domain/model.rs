use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// 一次查詢的 (製造廠, 醫院) 參數組合
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteQuery {
    pub site_id: String,
    pub hospital_id: String,
}

impl RouteQuery {
    pub fn new(site_id: impl Into<String>, hospital_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            hospital_id: hospital_id.into(),
        }
    }
}

impl fmt::Display for RouteQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "site={} hospital={}", self.site_id, self.hospital_id)
    }
}

// 查詢服務回傳的紀錄只用於顯示，欄位型別不符或為 null 時一律視為缺值，不讓整個畫面失敗。

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// 接受數字或數字字串 (例如 DRF DecimalField 的 "18.520430")
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hospital_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hospital_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hospital_latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hospital_longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub street_address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
}

impl Hospital {
    pub fn address_line(&self) -> String {
        address_line(
            &self.street_address,
            &self.city,
            &self.state,
            &self.country,
            &self.postal_code,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingSite {
    #[serde(default, deserialize_with = "lenient_string")]
    pub site_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub street_address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub production_capacity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub production_schedule: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub expire_in: Option<String>,
}

impl ManufacturingSite {
    pub fn address_line(&self) -> String {
        address_line(
            &self.street_address,
            &self.city,
            &self.state,
            &self.country,
            &self.postal_code,
        )
    }
}

fn address_line(street: &str, city: &str, state: &str, country: &str, postal: &str) -> String {
    format!("{} {} {} {} - {}", street, city, state, country, postal)
}

/// 路線服務產生的地圖文件，原樣傳遞，不解析內容
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteVisualization(String);

impl RouteVisualization {
    pub fn new(document: impl Into<String>) -> Self {
        Self(document.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 一次查詢的畫面狀態，同一時間只有一種
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error(String),
    Ready {
        route: RouteVisualization,
        hospital: Option<Hospital>,
        site: Option<ManufacturingSite>,
    },
}

impl ViewState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ViewState::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// 訂閱者看到的狀態快照
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub generation: u64,
    pub query: Option<RouteQuery>,
    pub state: ViewState,
    pub updated_at: DateTime<Utc>,
}

impl ViewSnapshot {
    pub fn initial() -> Self {
        Self {
            generation: 0,
            query: None,
            state: ViewState::Loading,
            updated_at: Utc::now(),
        }
    }
}
