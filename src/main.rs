//! CLI entry point for quillsite

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quillsite")]
#[command(version)]
#[command(about = "A small static blog generator", long_about = None)]
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
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Mark the post as a draft
        #[arg(long)]
        draft: bool,

        /// URL slug (defaults to the slugified title)
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// Build the site
    #[command(alias = "b")]
    Build {
        /// Rebuild on file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Build and serve the site locally
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Serve without watching or live reload
        #[arg(long)]
        r#static: bool,
    },

    /// Delete the output directory
    Clean,

    /// List site content
    List {
        /// Type of content to list (posts, drafts, pages)
        #[arg(default_value = "posts")]
        r#type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "quillsite=debug,tower_http=debug,info"
    } else {
        "quillsite=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            quillsite::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::New { title, draft, slug } => {
            let blog = quillsite::Blog::new(&base_dir)?;
            let path = blog.new_post(&title, draft, slug.as_deref())?;
            println!("Created: {:?}", path);
        }

        Commands::Build { watch } => {
            let blog = quillsite::Blog::new(&base_dir)?;
            tracing::info!("Building site...");
            blog.build()?;
            println!("Built successfully!");

            if watch {
                tokio::task::spawn_blocking(move || quillsite::commands::build::watch(&blog))
                    .await??;
            }
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let blog = quillsite::Blog::new(&base_dir)?;

            tracing::info!("Building site...");
            blog.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            quillsite::server::start(&blog, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let blog = quillsite::Blog::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = quillsite::Blog::new(&base_dir)?;
            quillsite::commands::list::run(&blog, &r#type)?;
        }
    }

    Ok(())
}
