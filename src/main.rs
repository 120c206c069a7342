//! Task Board Frontend Entry Point

mod app;
mod commands;
mod components;
mod context;
mod logger;
mod realtime;
mod store;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);

    leptos::task::spawn_local(async {
        let config = match commands::load_config().await {
            Ok(config) => config,
            Err(err) => {
                log::error!("cannot start board: {err}");
                return;
            }
        };
        logger::init(config.level_filter());
        log::info!("opening board {}", config.board_id);
        mount_to_body(move || view! { <App config=config.clone() /> });
    });
}
