//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;

use crate::api::{UserApi, UserQuery};
use crate::client::ResilientClient;
use crate::commands::{Commands, DocumentKind};
use crate::common::{paths, Config, Error, Result};
use crate::testing::{
    self, CommandInvoker, ConsoleReporter, MetricsObserver, ObserverRegistry, TracingObserver,
};
use crate::validation::{factory, ValidationStrategy};

/// Dispatch a CLI command; returns whether it succeeded
pub async fn dispatch(command: Commands, verbose: bool) -> Result<bool> {
    match command {
        Commands::Run {
            suite,
            env,
            base_url,
            json,
        } => {
            let mut config = Config::load(env)?;
            if let Some(url) = base_url {
                config.api.base_url = url;
            }
            let api = UserApi::new(ResilientClient::new(config.client_config()?)?);

            let suite = match suite {
                Some(path) => testing::load_suite(&path)?,
                None => testing::builtin_suite()?,
            };

            let observers = Arc::new(ObserverRegistry::new());
            let metrics = Arc::new(MetricsObserver::new());
            observers.subscribe(metrics.clone());
            observers.subscribe(Arc::new(TracingObserver));
            if !json {
                println!(
                    "\n{} {} {}",
                    "Running Suite:".blue().bold(),
                    suite.name.white().bold(),
                    format!("[{}]", env).dimmed()
                );
                if let Some(desc) = &suite.description {
                    println!("  {}", desc.dimmed());
                }
                println!();
                observers.subscribe(Arc::new(ConsoleReporter::new(verbose)));
            }

            let mut invoker = CommandInvoker::new(observers);
            let result = testing::run_suite(&mut invoker, &api, &suite).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let m = metrics.snapshot();
                println!(
                    "  {} {:.1}ms average, fastest {}, slowest {}",
                    "Timing:".dimmed(),
                    m.average_duration_ms,
                    m.fastest.as_deref().unwrap_or("-"),
                    m.slowest.as_deref().unwrap_or("-")
                );
            }
            Ok(result.is_success())
        }

        Commands::Fetch {
            results,
            gender,
            nat,
            inc,
            exc,
            seed,
            page,
            env,
        } => {
            let config = Config::load(env)?;
            let api = UserApi::new(ResilientClient::new(config.client_config()?)?);

            let query = UserQuery {
                results: Some(results),
                gender,
                nat,
                inc,
                exc,
                seed,
                page,
            };
            let response = api.query(&query).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(true)
        }

        Commands::Validate { file, kind } => validate_file(&file, kind),

        Commands::Config { env, write } => {
            let config = Config::load(env)?;
            let rendered = config.to_toml()?;
            print!("{}", rendered);

            if write {
                let path = paths::ensure_config_path()?
                    .ok_or_else(|| Error::config("No configuration directory on this platform"))?;
                std::fs::write(&path, &rendered)?;
                eprintln!("Wrote {}", path.display());
            }
            Ok(true)
        }
    }
}

fn validate_file(path: &Path, kind: DocumentKind) -> Result<bool> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
    let document: serde_json::Value = serde_json::from_str(&content)?;

    let strategy: Box<dyn ValidationStrategy> = match kind {
        DocumentKind::Response => Box::new(factory::full_response()),
        DocumentKind::User => Box::new(factory::full_user()),
        DocumentKind::Structure => Box::new(factory::response_structure()),
    };

    let result = strategy.validate(&document);
    if result.is_valid {
        println!("{} {}", "✓".green(), strategy.name());
    } else {
        println!(
            "{} {} ({} errors)",
            "✗".red(),
            strategy.name(),
            result.errors.len()
        );
        for error in &result.errors {
            println!("  {}", error.red());
        }
    }
    Ok(result.is_valid)
}
