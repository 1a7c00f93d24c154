// Domain 層：畫面模型與服務介面，不含傳輸細節

pub mod model;
pub mod ports;
