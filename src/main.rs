use anyhow::Context;
use clap::Parser;
use route_view::config::cli::{parse_query_line, OutputSink};
use route_view::config::OutputFormat;
use route_view::core::render::{render_html_page, render_text};
use route_view::utils::logger::{self, LogFormat};
use route_view::{
    AppConfig, AppError, CliConfig, FetchOrchestrator, HttpRouteServices, ViewController,
    ViewState,
};
use tokio::io::{AsyncBufReadExt, BufReader};

fn render(format: OutputFormat, state: &ViewState) -> String {
    match format {
        OutputFormat::Text => render_text(state),
        OutputFormat::Html => render_html_page(state),
    }
}

fn exit_with(e: &AppError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let log_format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(log_format, cli.verbose);
    tracing::info!("Starting route-view");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Resolved config: {:?}", config);

    let services = match HttpRouteServices::new(&config) {
        Ok(services) => services,
        Err(e) => exit_with(&e),
    };
    let controller = ViewController::new(FetchOrchestrator::new(services));
    let sink = OutputSink::new(config.output.path.clone());

    if cli.interactive {
        run_interactive(&controller, &config, &sink).await
    } else {
        let query = match cli.query() {
            Ok(query) => query,
            Err(e) => exit_with(&e),
        };

        let state = controller.submit_and_wait(query).await;
        if let Err(e) = sink.write(&render(config.output_format(), &state)) {
            exit_with(&e);
        }

        if let ViewState::Error(message) = &state {
            tracing::error!("❌ Route view failed: {}", message);
            std::process::exit(2);
        }
        tracing::info!("✅ Route view rendered");
        Ok(())
    }
}

async fn run_interactive(
    controller: &ViewController<HttpRouteServices>,
    config: &AppConfig,
    sink: &OutputSink,
) -> anyhow::Result<()> {
    let format = config.output_format();
    let mut changes = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    let mut rendered = 0;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line.context("failed to read stdin")? {
                    Some(line) => match parse_query_line(&line) {
                        Some(query) => {
                            controller.submit(query);
                        }
                        None if line.trim().is_empty() || line.trim_start().starts_with('#') => {}
                        None => {
                            tracing::warn!("Ignoring malformed line (expected `SITE HOSPITAL`): {}", line);
                        }
                    },
                    None => input_open = false,
                }
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = changes.borrow_and_update().clone();
                // 被取代的查詢不會寫入狀態槽，所以只會畫出最新一筆
                if snapshot.state.is_terminal() && snapshot.generation > rendered {
                    rendered = snapshot.generation;
                    if let Err(e) = sink.write(&render(format, &snapshot.state)) {
                        tracing::error!("❌ {}", e.user_friendly_message());
                    }
                }
            }
        }

        if !input_open && rendered == controller.current_generation() {
            break;
        }
    }

    Ok(())
}
