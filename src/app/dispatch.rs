use super::cli::{CheckCommands, Cli, Commands, ItemCommands};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::security::{Decision, SecurityPolicy};
use crate::store::{ItemStore, SqliteItemStore};

/// Run the parsed subcommand against an already-loaded config.
pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            config.validate().context("invalid gateway settings")?;

            if config.ensure_api_key() {
                println!("No API key configured; generated one for this run:");
                println!("     {}", config.api_key());
                println!("  Send it as the X-API-Key header.");
            }

            let host = &config.gateway.host;
            let port = config.gateway.port;
            if port == 0 {
                info!("Starting sysgate gateway on {host} (random port)");
            } else {
                info!("Starting sysgate gateway on {host}:{port}");
            }
            crate::gateway::run_gateway(Arc::new(config)).await
        }

        Commands::Check { target } => {
            let policy = SecurityPolicy::from_config(&config.security, &config.workspace_dir);
            let (subject, decision) = match target {
                CheckCommands::Command { cmd } => {
                    let decision = policy.evaluate_command(&cmd);
                    (cmd, decision)
                }
                CheckCommands::Path { path } => {
                    let decision = policy.evaluate_path(&path);
                    (path, decision)
                }
            };
            print_decision(&policy, &subject, decision);
            Ok(())
        }

        Commands::Items { action } => {
            let path = config.store_path();
            run_items(action, &path)
                .await
                .with_context(|| format!("item store at {}", path.display()))
        }
    }
}

async fn run_items(action: ItemCommands, path: &Path) -> crate::Result<()> {
    let store = SqliteItemStore::open(path).await?;
    match action {
        ItemCommands::List => {
            let items = store.list().await?;
            if items.is_empty() {
                println!("No items in {}", path.display());
            }
            for item in items {
                println!("{:>6}  {}  {}", item.id, item.name, item.description);
            }
        }
        ItemCommands::Reset => {
            let removed = store.reset().await?;
            info!(removed, store = %path.display(), "item store reset");
            println!("Removed {removed} item(s) from {}", path.display());
        }
    }
    Ok(())
}

fn print_decision(policy: &SecurityPolicy, subject: &str, decision: Decision) {
    match decision {
        Decision::Allow => println!("allow  [{}] {subject}", policy.tier),
        Decision::Deny(reason) => println!("deny   [{}] {subject} ({reason})", policy.tier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SysgateError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn items_reset_on_fresh_store_succeeds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.sqlite3");

        run_items(ItemCommands::Reset, &path).await.unwrap();
        run_items(ItemCommands::List, &path).await.unwrap();
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn unusable_store_path_surfaces_store_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = run_items(ItemCommands::List, &blocker.join("items.sqlite3"))
            .await
            .unwrap_err();
        assert!(matches!(err, SysgateError::Store(_)), "{err}");
    }
}
