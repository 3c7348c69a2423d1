//! Schedule client CLI
//!
//! Local entry point for browsing directories and schedules and managing
//! subscriptions against the schedule backend.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use schedule_client::{
    ScheduleClient,
    error::Result,
    models::{Config, DirectoryKind, ScheduleDay, Target, TargetType, group_couples},
    services::LoadOutcome,
};

/// College schedule client
#[derive(Parser, Debug)]
#[command(name = "schedule", version, about = "Offline-first college schedule client")]
struct Cli {
    /// Path to config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache directory, overrides `[storage] dir`
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List groups
    Groups,

    /// List teachers
    Teachers,

    /// List cabinets
    Cabinets,

    /// Show the schedule for a group, teacher or cabinet
    Schedule {
        /// group, teacher or cabinet
        kind: TargetType,
        name: String,
    },

    /// List subscriptions of this device
    Subscriptions,

    /// Subscribe this device to changes for a target
    Subscribe { kind: TargetType, name: String },

    /// Remove a subscription
    Unsubscribe { name: String },

    /// Show recent notifications
    Notifications,

    /// Print this device's push token
    Token,

    /// Show or edit favorites
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },

    /// Check the backend for a newer release
    UpdateCheck {
        /// Version to compare against
        #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
        current: String,
    },

    /// Validate configuration
    Validate,
}

#[derive(Subcommand, Debug)]
enum FavoriteAction {
    Add { kind: TargetType, name: String },
    Remove { kind: TargetType, name: String },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(cli: &Cli) -> Config {
    let path = cli.config.clone().unwrap_or_else(|| {
        cli.storage_dir
            .clone()
            .unwrap_or_else(|| Config::default().storage.dir)
            .join("config.toml")
    });
    let mut config = Config::load_or_default(&path);
    if let Some(dir) = &cli.storage_dir {
        config.storage.dir = dir.clone();
    }
    config
}

fn print_list(kind: DirectoryKind, names: &[String]) {
    println!("{} ({}):", kind.label(), names.len());
    for name in names {
        println!("  {name}");
    }
}

fn print_days(days: &[ScheduleDay]) {
    if days.is_empty() {
        println!("No upcoming days.");
        return;
    }
    for day in days {
        println!("{} (corpus {})", day.date, day.corpus);
        for card in group_couples(&day.couples) {
            println!(
                "  {:>3}  {}-{}  {}",
                card.number, card.time_start, card.time_end, card.title
            );
            for v in &card.variants {
                let combined = v.combined.as_deref().unwrap_or("");
                println!("         {} | {} | {} {}", v.teacher, v.cabinet, v.group, combined);
            }
        }
    }
}

async fn device_token(client: &ScheduleClient) -> Result<String> {
    client.device_tokens(None).acquire().await
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli);

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK (backend {})", config.backend.base_url);
        return Ok(());
    }

    let client = ScheduleClient::from_config(config)?;
    log::debug!("Using cache at {}", client.config().storage.dir.display());

    match cli.command {
        Command::Groups => print_list(DirectoryKind::Groups, &client.directory().get_groups().await?),
        Command::Teachers => {
            print_list(DirectoryKind::Teachers, &client.directory().get_teachers().await?)
        }
        Command::Cabinets => {
            print_list(DirectoryKind::Cabinets, &client.directory().get_cabinets().await?)
        }

        Command::Schedule { kind, name } => {
            let target = Target::new(kind, name);
            client.preferences().set_last_target(&target).await;

            let outcome = client
                .schedules()
                .load(&target, |days| {
                    log::debug!("{} cached day(s) available", days.len());
                })
                .await?;

            if let LoadOutcome::Stale { error, .. } = &outcome {
                if error.is_network() {
                    log::warn!("No connection, showing cached schedule");
                } else {
                    log::warn!("Showing cached schedule: {}", error);
                }
            }
            print_days(outcome.days().unwrap_or_default());
        }

        Command::Subscriptions => {
            let token = device_token(&client).await?;
            let names = client.subscriptions(token).load().await?;
            if names.is_empty() {
                println!("No subscriptions.");
            }
            for name in names {
                println!("  {name}");
            }
        }

        Command::Subscribe { kind, name } => {
            let token = device_token(&client).await?;
            if client.subscriptions(token).add(&name, kind).await {
                log::info!("Subscribed to {} {}", kind, name);
            } else {
                log::warn!("Subscription to {} was not confirmed", name);
            }
        }

        Command::Unsubscribe { name } => {
            let token = device_token(&client).await?;
            if client.subscriptions(token).remove(&name).await {
                log::info!("Unsubscribed from {}", name);
            } else {
                log::warn!("Unsubscribe from {} was not confirmed", name);
            }
        }

        Command::Notifications => {
            let token = device_token(&client).await?;
            let notifications = client.notifications().load(&token).await?;
            if notifications.is_empty() {
                println!("No notifications.");
            }
            for n in notifications {
                println!(
                    "{} {}: {} {}",
                    n.created_at.as_deref().unwrap_or("-"),
                    n.name,
                    n.lesson.as_deref().unwrap_or(""),
                    n.cabinet.as_deref().unwrap_or("")
                );
            }
        }

        Command::Token => println!("{}", device_token(&client).await?),

        Command::Favorites { action } => {
            let prefs = client.preferences();
            match action {
                Some(FavoriteAction::Add { kind, name }) => {
                    if !prefs.add_favorite(Target::new(kind, name)).await {
                        log::info!("Already a favorite");
                    }
                }
                Some(FavoriteAction::Remove { kind, name }) => {
                    if !prefs.remove_favorite(&Target::new(kind, name)).await {
                        log::info!("Not a favorite");
                    }
                }
                None => {}
            }
            for target in prefs.favorites().await {
                println!("  {target}");
            }
            if let Some(last) = prefs.last_target().await {
                println!("Last viewed: {last}");
            }
        }

        Command::UpdateCheck { current } => match client.releases().check_for_update(&current).await? {
            Some(latest) => log::info!("Update available: {} (running {})", latest, current),
            None => log::info!("Up to date ({})", current),
        },

        Command::Validate => unreachable!("handled before the client is built"),
    }

    Ok(())
}
