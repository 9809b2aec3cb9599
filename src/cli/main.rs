use core::time::Duration;
use std::{path::PathBuf, process::exit};

use clap::{Parser, Subcommand};
use color_eyre::{
    Section,
    config::HookBuilder,
    eyre::{self, eyre},
};
use curator::{
    ArticleId, FallbackStore, Gateway, Latency, Reader,
    config::{CONFIG_FILE, CuratorConfig},
    reader::ListView,
    view::{MemoryHistory, filter_articles, share_link},
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{
    EnvFilter, filter::Directive, layer::SubscriberExt, util::SubscriberInitExt,
};
use url::Url;

use crate::{
    create::{CreateArgs, draft_from_args},
    render::{render_detail, render_list},
};

mod browse;
mod create;
mod render;

#[derive(Parser)]
#[command(about = "Read and publish the archive", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Address of the remote archive, overriding the configuration
    #[arg(long, global = true)]
    api: Option<Url>,

    /// Viewport width in pixels, deciding between wide and narrow layout
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Skip the simulated network latency
    #[arg(long, global = true)]
    no_delay: bool,

    /// Keep the local snapshot in memory instead of on disk
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration file with the current settings.
    Init,

    /// List archived entries.
    List {
        /// Only show entries whose title, description or category contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Read one entry.
    Read { id: String },

    /// Record a new entry. Missing fields are asked for interactively.
    Create(CreateArgs),

    /// Print a link to an entry.
    Share { id: String },

    /// Write a plain-text archival copy of an entry.
    Export {
        id: String,
        /// Destination file, standard output when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Browse the archive interactively.
    Browse,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    HookBuilder::default()
        .display_env_section(true)
        .panic_section("It looks like Curator encountered a bug")
        .install()
        .expect("Failed to install color-eyre hook");

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr);
    let mut filter_layer = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    if let Ok(directive) = "hyper_util=warn".parse::<Directive>() {
        filter_layer = filter_layer.add_directive(directive);
    }

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();

    if let Err(err) = entry(cli).await {
        error!("{:#}", err);
        exit(1);
    }
}

async fn entry(cli: Cli) -> eyre::Result<()> {
    let mut config = CuratorConfig::open_or_default(&cli.config)
        .await
        .note("Can't read configuration")?;
    if let Some(api) = cli.api {
        config.set_api_base(api);
    }
    if let Some(width) = cli.width {
        config.set_viewport_width(width);
    }
    if cli.no_delay {
        config.set_latency(Latency::NONE);
    }
    config.validate().note("Check the --api address")?;

    match cli.command {
        Commands::Init => {
            if tokio::fs::try_exists(&cli.config).await? {
                return Err(eyre!("{} already exists", cli.config.display()));
            }
            config.save_to_file(&cli.config).await?;
            info!("Configuration written to {}", cli.config.display());
            Ok(())
        }
        Commands::List { search } => {
            let gateway = open_gateway(&config, cli.ephemeral)?;
            let articles = long_task(
                "Consulting the archive...",
                gateway.list_articles(),
                "Archive ready",
            )
            .await;
            let matching = filter_articles(&articles, search.as_deref().unwrap_or_default());
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&matching)?);
            } else {
                let view = ListView {
                    articles: matching,
                    is_loading: false,
                    is_error: false,
                };
                print!("{}", render_list(&view, None));
            }
            Ok(())
        }
        Commands::Read { id } => {
            let reader = open_entry(open_gateway(&config, cli.ephemeral)?, &config, &id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reader.detail_view().article)?);
            } else {
                print!(
                    "{}",
                    render_detail(&reader.detail_view(), &reader.related(), false)
                );
            }
            Ok(())
        }
        Commands::Create(args) => {
            let draft = draft_from_args(args).await?;
            let gateway = open_gateway(&config, cli.ephemeral)?;
            let article = long_task(
                "Recording entry...",
                gateway.create_article(draft),
                "Entry recorded",
            )
            .await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&article)?);
            } else {
                println!("Recorded entry {} ({} min read)", article.id, article.minutes_to_read());
            }
            Ok(())
        }
        Commands::Share { id } => {
            let id: ArticleId = id.into();
            let gateway = open_gateway(&config, cli.ephemeral)?;
            let article = long_task("Locating entry...", gateway.get_article(&id), "Entry located")
                .await
                .note("Can't share an entry that is not archived")?;
            println!("{}", share_link(config.share_base(), &article.id));
            Ok(())
        }
        Commands::Export { id, output } => {
            let reader = open_entry(open_gateway(&config, cli.ephemeral)?, &config, &id).await?;
            let text = reader
                .export()
                .ok_or_else(|| eyre!("Entry {id} could not be retrieved"))?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, text).await?;
                    info!("Archival copy written to {}", path.display());
                }
                None => print!("{text}"),
            }
            Ok(())
        }
        Commands::Browse => {
            let reader = Reader::new(
                open_gateway(&config, cli.ephemeral)?,
                config.view_state(),
                MemoryHistory::default(),
                config.share_base().clone(),
            );
            browse::run(reader).await
        }
    }
}

fn open_gateway(config: &CuratorConfig, ephemeral: bool) -> eyre::Result<Gateway> {
    if ephemeral {
        return Ok(config.gateway_with(FallbackStore::in_memory()));
    }
    config
        .open_gateway()
        .note("Can't open the local archive")
}

/// Open a session positioned on `id`, as if the entry was deep-linked.
async fn open_entry(gateway: Gateway, config: &CuratorConfig, id: &str) -> eyre::Result<Reader> {
    let mut reader = Reader::new(
        gateway,
        config.view_state(),
        MemoryHistory::new(Some(id)),
        config.share_base().clone(),
    );
    long_task("Retrieving entry...", reader.refresh(), "Entry retrieved").await;
    if reader.detail_view().is_error {
        return Err(eyre!("Entry {id} is missing from the archives"));
    }
    Ok(reader)
}

pub async fn long_task<T>(
    loading_msg: &'static str,
    f: impl Future<Output = T>,
    complete_msg: &'static str,
) -> T {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(loading_msg);

    let result = f.await;

    pb.finish_with_message(complete_msg);
    result
}
