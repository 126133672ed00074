// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Terminal - Line-based frontend

mod console;
mod panels;

use exchange_core::{Exchange, SettingsStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize logging; stdout belongs to the menus
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("exchange_term=info".parse().unwrap())
                .add_directive("exchange_core=warn".parse().unwrap()),
        )
        .init();

    tracing::info!("Starting Campus Exchange v{}", env!("CARGO_PKG_VERSION"));

    let exchange = match SettingsStore::new().and_then(|store| Exchange::open(store.get())) {
        Ok(exchange) => exchange,
        Err(e) => {
            tracing::error!("Failed to initialize application state: {}", e);
            return ExitCode::FAILURE;
        }
    };

    panels::Shell::new(exchange, console::Console).run();
    ExitCode::SUCCESS
}
