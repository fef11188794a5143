pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{FeeRepository, FeeSession};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Categories,
    Calculate {
        price: String,
        category: Option<String>,
        json: bool,
    },
    Interactive,
}

/// Builds a session against the configured fee service and loads the
/// category-independent fees.
pub async fn build_session(config: &AppConfig) -> Result<FeeSession> {
    let source = providers::HttpFeeSource::new(&config.provider)?;
    let repository = FeeRepository::new(Arc::new(source), config.cache_category_fees);
    let session = FeeSession::new(repository);

    let pb = cli::ui::new_spinner("Loading fee schedules...");
    session.initialize().await;
    pb.finish_and_clear();

    Ok(session)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Fee calculator starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let session = build_session(&config).await?;

    match command {
        AppCommand::Categories => cli::categories::run(&session),
        AppCommand::Calculate {
            price,
            category,
            json,
        } => {
            let category = category.or_else(|| config.default_category.clone());
            cli::calculate::run(
                &session,
                &price,
                category.as_deref(),
                json,
                &config.currency,
            )
            .await
        }
        AppCommand::Interactive => {
            if let Some(query) = &config.default_category {
                cli::calculate::select_by_query(&session, query).await;
            }
            cli::interactive::run(Arc::new(session), &config.currency).await
        }
    }
}
