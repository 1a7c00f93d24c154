use crate::utils::error::AppError;

pub trait Validate {
    fn validate(&self) -> crate::utils::error::Result<()>;
}

/// 組出設定值錯誤，欄位名稱使用 TOML 路徑 (例如 `endpoints.hospitals`)
pub fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> AppError {
    AppError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}
