mod app;
mod catalog;
mod config;
mod controller;
mod data_url;
mod dispatch;
mod notify;
mod preview;
mod service;
mod slider;
mod upload;
mod validate;

use std::sync::Arc;

use app::FilterApp;
use catalog::{Category, DEFAULT_FILTER, FilterId};
use config::AppConfig;
use service::HttpFilterService;

fn resolve_default_filter(config: &AppConfig) -> FilterId {
    match config.default_filter.as_deref() {
        Some(name) => FilterId::find(name.trim()).unwrap_or_else(|| {
            tracing::warn!(name, "unknown default filter, using {}", DEFAULT_FILTER);
            DEFAULT_FILTER
        }),
        None => DEFAULT_FILTER,
    }
}

fn resolve_category(config: &AppConfig) -> Category {
    config
        .last_category
        .as_deref()
        .and_then(Category::parse)
        .unwrap_or_default()
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load();
    let env_url = std::env::var(config::SERVER_URL_ENV).ok();
    let server_url = config::resolve_server_url(&config, env_url.as_deref());
    let timeout = config.request_timeout();

    let service = match HttpFilterService::new(server_url, timeout) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("retrofilter: could not set up HTTP client: {:#}", err);
            std::process::exit(2);
        }
    };
    let server_label = service.endpoint().to_string();
    tracing::info!(server = %server_label, ?timeout, "filter server configured");

    let default_filter = resolve_default_filter(&config);
    let category = resolve_category(&config);

    let width = config.window_width.unwrap_or(960.0);
    let height = config.window_height.unwrap_or(820.0);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Retro Filter")
            .with_app_id("retrofilter")
            .with_drag_and_drop(true)
            .with_inner_size([width, height]),
        ..Default::default()
    };

    eframe::run_native(
        "retrofilter",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(FilterApp::new(
                cc,
                config,
                Arc::new(service),
                server_label,
                default_filter,
                category,
            )))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::{resolve_category, resolve_default_filter};
    use crate::catalog::{Category, DEFAULT_FILTER, FilterId};
    use crate::config::AppConfig;

    #[test]
    fn default_filter_comes_from_config_when_known() {
        let cfg = AppConfig {
            default_filter: Some(" vhs ".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_default_filter(&cfg), FilterId::find("vhs").unwrap());
    }

    #[test]
    fn unknown_or_missing_default_filter_falls_back() {
        let cfg = AppConfig {
            default_filter: Some("sepia-ish".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_default_filter(&cfg), DEFAULT_FILTER);
        assert_eq!(resolve_default_filter(&AppConfig::default()), DEFAULT_FILTER);
    }

    #[test]
    fn category_restores_from_config() {
        let cfg = AppConfig {
            last_category: Some("vintage".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_category(&cfg), Category::Vintage);

        let cfg = AppConfig {
            last_category: Some("bogus".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_category(&cfg), Category::All);
    }
}
