use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 終端機閱讀用的精簡格式
    Compact,
    /// 每行一筆 JSON，給收集器使用
    Json,
}

/// 未設定 `RUST_LOG` 時的預設過濾條件
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "route_view=debug,info"
    } else {
        "route_view=info"
    }
}

/// 初始化全域 tracing subscriber。日誌一律寫到 stderr，stdout 只輸出畫面內容。
pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // 兩個 layer 只會啟用其中一個
    let compact = (format == LogFormat::Compact).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
    });
    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .json()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(json)
        .init();
}
