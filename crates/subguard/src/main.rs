use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use moderation::store::update_count;
use moderation::template::unknown_tokens;
use moderation::{FileWarningStore, TemplateContext, TemplateKind, UserId, WarningStore};
use subguard::messages;
use subguard::{ContentKind, SubGuardConfig};

/// Operator CLI for SubGuard's warning store and settings.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Warning store file (overrides SUBGUARD_STORE_PATH)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Community settings TOML (overrides SUBGUARD_SETTINGS_PATH)
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print a user's warning count
    Show { user: String },
    /// List every user with a non-zero count
    List,
    /// Take one warning off a user
    Remove { user: String },
    /// Overwrite a user's count
    Set { user: String, count: u32 },
    /// Print the self-check text a member would see
    Check { user: String },
    /// Preview a reply template with sample values
    Render {
        kind: TemplateArg,
        #[arg(long)]
        author: String,
        #[arg(long, value_enum, default_value_t = LocationArg::Comment)]
        location: LocationArg,
        #[arg(long, default_value_t = 1)]
        warnings: u32,
    },
    /// Load settings and print the effective configuration
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TemplateArg {
    Warn,
    Ban,
    Remind,
}

impl From<TemplateArg> for TemplateKind {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Warn => TemplateKind::Warn,
            TemplateArg::Ban => TemplateKind::Ban,
            TemplateArg::Remind => TemplateKind::Reminder,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LocationArg {
    Post,
    Comment,
}

impl From<LocationArg> for ContentKind {
    fn from(arg: LocationArg) -> Self {
        match arg {
            LocationArg::Post => ContentKind::Post,
            LocationArg::Comment => ContentKind::Comment,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = SubGuardConfig::default();
    if let Some(store) = args.store {
        config.store_path = store;
    }
    if let Some(settings) = args.settings {
        config.settings_path = Some(settings);
    }

    let settings = config.load_settings()?;
    let escalation = settings.escalation;

    match args.command {
        Cmd::Validate => {
            info!(settings = ?config.settings_path, "Settings valid");
            println!("{}", settings.summary());
            for kind in [TemplateKind::Reminder, TemplateKind::Warn, TemplateKind::Ban] {
                let template = settings.templates.get(kind);
                println!("{kind}: {template}");
                for token in unknown_tokens(template) {
                    warn!(template = %kind, token = %token, "Unknown placeholder left verbatim");
                }
            }
        }
        Cmd::Render {
            kind,
            author,
            location,
            warnings,
        } => {
            let kind = TemplateKind::from(kind);
            let template = settings.templates.get(kind);
            let context = TemplateContext {
                location: ContentKind::from(location).as_str().to_string(),
                author,
                warnings,
                threshold: escalation.threshold(),
                length_days: escalation.ban_duration_days(),
            };
            println!("{}", settings.templates.render(kind, &context));
            for token in unknown_tokens(template) {
                warn!(template = %kind, token = %token, "Unknown placeholder left verbatim");
            }
        }
        Cmd::Show { user } => {
            let store = open_store(&config)?;
            let count = store.get(&UserId::new(&user)).await?;
            println!("{}", messages::show_status(&user, count));
        }
        Cmd::List => {
            let store = open_store(&config)?;
            let records: Vec<_> = store
                .records()
                .await?
                .into_iter()
                .filter(|r| !r.is_clear())
                .collect();
            if records.is_empty() {
                println!("No users have warnings.");
            }
            for record in records {
                println!("{}\t{}", record.user, record.count);
            }
        }
        Cmd::Remove { user } => {
            let store = open_store(&config)?;
            let update =
                update_count(&store, &UserId::new(&user), |c| c.saturating_sub(1)).await?;
            if update.changed() {
                info!(user = %user, prior = update.prior, new_count = update.current, "Warning removed");
                println!("{}", messages::removed_status(&user, update.current));
            } else {
                println!("{}", messages::no_warnings_status(&user));
            }
        }
        Cmd::Set { user, count } => {
            let store = open_store(&config)?;
            store
                .set(&UserId::new(&user), count)
                .await
                .with_context(|| format!("setting count for {user}"))?;
            info!(user = %user, count, "Warning count set");
            println!("{}", messages::show_status(&user, count));
        }
        Cmd::Check { user } => {
            let store = open_store(&config)?;
            let count = store.get(&UserId::new(&user)).await?;
            println!(
                "{}",
                messages::self_check_status(
                    count,
                    escalation.threshold(),
                    escalation.ban_duration_days()
                )
            );
        }
    }

    Ok(())
}

fn open_store(config: &SubGuardConfig) -> Result<FileWarningStore> {
    FileWarningStore::open(&config.store_path)
        .with_context(|| format!("opening warning store {}", config.store_path.display()))
}
