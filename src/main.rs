//! CLI entry point for pressroom

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pressroom::commands;
use pressroom::server::{self, ServeOptions};
use pressroom::Site;

#[derive(Parser)]
#[command(name = "pressroom")]
#[command(version)]
#[command(about = "A static site builder with brace-expression templates", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post or page
    New {
        /// Title of the new post
        title: String,

        /// Create a page instead of a post
        #[arg(long)]
        page: bool,
    },

    /// Build the site
    #[command(visible_alias = "b", aliases = ["generate", "g"])]
    Build {
        /// Include posts marked `draft: true`
        #[arg(long)]
        drafts: bool,

        /// Rebuild on file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,

        /// Directory to serve (defaults to the output directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Rebuild on changes and reload open pages
        #[arg(short, long)]
        watch: bool,

        /// Serve the existing output without building first
        #[arg(long)]
        no_build: bool,
    },

    /// Remove the output directory
    Clean,

    /// List posts or pages
    List {
        /// Type of content to list (posts, pages)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "pressroom=debug,info"
    } else {
        "pressroom=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New { title, page } => {
            let site = Site::new(&base_dir)?;
            let path = site.new_post(&title, page)?;
            println!("Created: {:?}", path);
        }

        Commands::Build { drafts, watch } => {
            let mut site = Site::new(&base_dir)?;
            site.config.render_drafts |= drafts;

            tracing::info!("Building site...");
            let report = site.build()?;
            println!(
                "Built {} files ({} posts, {} pages) into {:?}",
                report.files, report.posts, report.pages, site.output_dir
            );

            if watch {
                tokio::task::spawn_blocking(move || commands::generate::watch(&site)).await??;
            }
        }

        Commands::Serve {
            port,
            ip,
            root,
            watch,
            no_build,
        } => {
            let site = Site::new(&base_dir)?;

            if !no_build {
                tracing::info!("Building site...");
                site.build()?;
            }

            let options = ServeOptions {
                ip: ip.unwrap_or_else(|| site.config.server.ip.clone()),
                port: port.unwrap_or(site.config.server.port),
                root: root.map(|r| if r.is_absolute() { r } else { base_dir.join(r) }),
                watch,
            };
            tracing::info!("Starting server at http://{}:{}", options.ip, options.port);
            server::start(&site, options).await?;
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = Site::new(&base_dir)?;
            commands::list::run(&site, &r#type)?;
        }

        Commands::Version => {
            println!("pressroom version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
