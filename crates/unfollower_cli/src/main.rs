//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the store configured through `UNFOLLOWER_*` environment variables.
//! - Print deterministic status lines for quick deployment sanity checks.

use std::process::ExitCode;
use unfollower_core::{flush_logging, init_logging, StoreConfig, UnfollowerStore};

fn main() -> ExitCode {
    let code = run();
    flush_logging();
    code
}

fn run() -> ExitCode {
    let config = StoreConfig::from_env();

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("unfollower_core logging=disabled error={err}");
        }
    }

    println!("unfollower_core version={}", unfollower_core::core_version());

    let store = match UnfollowerStore::from_config(&config) {
        Ok(store) => store,
        Err(err) => {
            log::error!("event=cli_status module=cli status=error error={}", err);
            eprintln!("unfollower_core store=unavailable error={err}");
            return ExitCode::FAILURE;
        }
    };
    println!("unfollower_core storage={}", store.location());

    match store.notification_enabled_user_ids() {
        Ok(user_ids) => {
            println!("unfollower_core notified_users={}", user_ids.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("event=cli_status module=cli status=error error={}", err);
            eprintln!("unfollower_core store=unavailable error={err}");
            ExitCode::FAILURE
        }
    }
}
