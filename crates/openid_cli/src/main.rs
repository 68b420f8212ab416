//! CLI smoke entry point.
//!
//! # Responsibility
//! - Print the core version.
//! - With a config path, run full extension setup and report the outcome.

use openid_core::{init_logging_from_config, OpenIdConfig, OpenIdExtension};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("openid_core version={}", openid_core::core_version());

    let Some(config_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let config = match OpenIdConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config status=error error={err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(logging) = &config.logging {
        if let Err(err) = init_logging_from_config(logging) {
            eprintln!("logging status=error error={err}");
        }
    }

    match OpenIdExtension::setup(config) {
        Ok(extension) => {
            println!(
                "setup status=ok server_store={} consumer_store={} policy={}",
                extension.server_store().kind().as_str(),
                extension.consumer_store().kind().as_str(),
                extension.config().show_url_on_user_page.as_str()
            );
            for name in extension.special_pages().names() {
                println!("special_page={name}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let page = err.error_page();
            eprintln!(
                "setup status=error error_page={} error_text={} error={err}",
                page.title_key, page.text_key
            );
            ExitCode::FAILURE
        }
    }
}
