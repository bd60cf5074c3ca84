use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::{ColoredString, Colorize};
use std::sync::Arc;

use overseer_cli::app;
use overseer_cli::cli::{get_version, Cli, Commands, ConfigCommands};
use overseer_cli::core::{ColorClass, HostRow, Orchestrator, OverseerConfig, SshTransport, StatusSummary};
use overseer_cli::utils::{format_time_of_day, init_logging, render_bar, PLACEHOLDER};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = OverseerConfig::resolve(cli.config.as_deref(), &cli.overrides())?;
    init_logging(config.log_file.as_deref())?;

    match cli.command {
        None => {
            ensure_valid(&config)?;
            let transport = Arc::new(SshTransport::from_config(&config));
            app::run(&config, transport, env!("CARGO_PKG_VERSION")).await?;
            println!("{}", "[!] CONNECTION TERMINATED.".red().bold());
        }
        Some(Commands::Status { json }) => {
            ensure_valid(&config)?;
            handle_status(&config, json).await?;
        }
        Some(Commands::Config { command }) => {
            handle_config(&config, command)?;
        }
    }

    Ok(())
}

fn ensure_valid(config: &OverseerConfig) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }

    eprintln!("{}", "✗ Configuration errors:".red());
    for error in &errors {
        eprintln!("  - {}", error);
    }
    bail!("invalid configuration ({} error(s))", errors.len())
}

async fn handle_status(config: &OverseerConfig, json: bool) -> Result<()> {
    let transport = Arc::new(SshTransport::from_config(config));
    let rows = Orchestrator::new(config, transport).poll_all_once().await;

    if json {
        let out = serde_json::to_string_pretty(&rows).context("Failed to serialize status")?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}\n", format!("OVERSEER v{}", get_version()).cyan().bold());
    println!(
        "{:<20} {:<16} {:<8} {:<16} {:<14} {:<6} {:<6} {:<14} {:<12} {:<8}",
        "NODE", "ADDRESS", "STATUS", "CPU", "RAM", "TMP", "DISK", "GUESTS", "UPTIME", "SEEN"
    );
    println!("{}", "-".repeat(130));

    for row in &rows {
        print_row(row);
    }

    let summary = StatusSummary::from_rows(&rows);
    println!(
        "\n{} online, {} offline, {} error",
        summary.online.to_string().green(),
        summary.offline.to_string().red(),
        summary.error.to_string().yellow()
    );

    Ok(())
}

fn paint(text: &str, class: ColorClass) -> ColoredString {
    match class {
        ColorClass::Green => text.green(),
        ColorClass::Yellow => text.yellow(),
        ColorClass::Red => text.red(),
        ColorClass::Dim => text.dimmed(),
    }
}

fn print_row(row: &HostRow) {
    // Pad before coloring so escape codes do not skew the columns
    let cpu = format!("{} {}", render_bar(row.cpu.fill), row.cpu.text);
    let ram = format!("{} {}", render_bar(row.ram.fill), row.ram.text);
    let status = format!("{} {}", row.status_class.glyph(), row.status);
    let seen = row
        .last_update
        .as_ref()
        .map(format_time_of_day)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    println!(
        "{} {:<16} {} {} {} {} {} {:<14} {:<12} {:<8}",
        format!("{:<20}", row.display_name).cyan().bold(),
        row.address,
        paint(&format!("{:<8}", status), row.status_class.color()),
        paint(&format!("{:<16}", cpu), row.cpu.color),
        paint(&format!("{:<14}", ram), row.ram.color),
        paint(&format!("{:<6}", row.temp.text), row.temp.color),
        paint(&format!("{:<6}", row.disk.text), row.disk.color),
        row.guests,
        row.uptime,
        seen
    );
}

fn handle_config(config: &OverseerConfig, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::View => {
            if let Some(path) = OverseerConfig::default_path() {
                println!("{} {}", "Default config file:".dimmed(), path.display());
            }
            println!("Configuration:\n");
            print!("{}", config.to_toml()?);
        }
        ConfigCommands::Validate => {
            let errors = config.validate();

            if errors.is_empty() {
                println!("{}", "✓ Configuration is valid".green());
            } else {
                println!("{}", "✗ Configuration errors:".red());
                for error in errors {
                    println!("  - {}", error);
                }
            }
        }
    }

    Ok(())
}
