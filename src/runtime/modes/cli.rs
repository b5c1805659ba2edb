//! One-shot CLI mode
//!
//! Every command except `config generate` goes through the same
//! startup path as the server, then calls `LinkService` once.

use anyhow::{Result, bail};

use crate::cli::{Commands, ConfigCommands};
use crate::runtime::lifetime;
use crate::services::SaveLinkRequest;

pub async fn run_cli(command: Commands) -> Result<()> {
    // config generate must work without a reachable database
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path },
    } = &command
    {
        return config_generate(output_path.clone());
    }

    let startup = lifetime::startup::prepare_startup().await?;
    let service = startup.link_service;

    match command {
        Commands::Save {
            user_id,
            url,
            description,
        } => {
            let saved = service
                .save_link(SaveLinkRequest {
                    user_id,
                    description,
                    original_url: url,
                })
                .await
                .map_err(|e| anyhow::anyhow!(e.format_simple()))?;
            println!("Saved link {} -> {}", saved.link_id, saved.original_url);
            println!(
                "  assets: {} captured, {} skipped, {} failed",
                saved.report.captured, saved.report.skipped, saved.report.failed
            );
            for failed in &saved.report.failed_urls {
                println!("  failed: {}", failed);
            }
        }
        Commands::List {
            user_id,
            description,
        } => {
            let links = match description.as_deref() {
                Some(filter) => service.get_links(user_id, filter).await,
                None => service.get_all_links(user_id).await,
            }
            .map_err(|e| anyhow::anyhow!(e.format_simple()))?;

            if links.is_empty() {
                println!("No links found");
            }
            for link in links {
                if link.description.is_empty() {
                    println!("{:>6}  {}", link.id, link.original_url);
                } else {
                    println!("{:>6}  {}  ({})", link.id, link.original_url, link.description);
                }
            }
        }
        Commands::Remove { link_id } => {
            let deleted = service
                .delete_link(link_id)
                .await
                .map_err(|e| anyhow::anyhow!(e.format_simple()))?;
            println!(
                "Removed link {} ({}) of user {}",
                link_id, deleted.original_url, deleted.owner
            );
        }
        Commands::Serve | Commands::Config { .. } => {
            bail!("command is not handled in CLI mode")
        }
    }

    Ok(())
}

fn config_generate(output_path: Option<String>) -> Result<()> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());
    println!("Generating configuration file... {}", path);

    crate::config::StaticConfig::default()
        .save_to_file(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;

    println!("  Configuration file generated successfully: {}", path);
    println!("  Copy it to config.toml and adjust before starting the server");
    Ok(())
}
