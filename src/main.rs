//! CLI entry point for joyblog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use joyblog::{commands, server, Blog};

#[derive(Parser)]
#[command(name = "joyblog")]
#[command(version)]
#[command(about = "Static generator for the Code to Joy blog", long_about = None)]
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

        /// File name (without extension); defaults to the slugified title
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local preview server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Serve without watching for changes
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the output directory
    Clean,

    /// List posts or routes
    List {
        /// What to list (posts, routes)
        #[arg(default_value = "posts")]
        r#type: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "joyblog=debug,info"
    } else {
        "joyblog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::New { title, slug } => {
            let blog = Blog::new(&base_dir)?;
            let path = commands::new::create_post(&blog, &title, slug.as_deref())?;
            println!("Created: {:?}", path);
        }

        Commands::Generate { watch } => {
            let blog = Blog::new(&base_dir)?;
            blog.generate()?;
            println!("Generated successfully!");

            if watch {
                tokio::task::spawn_blocking(move || commands::generate::watch(&blog)).await??;
            }
        }

        Commands::Server { port, ip, r#static } => {
            let blog = Blog::new(&base_dir)?;
            blog.generate()?;
            server::start(&blog, &ip, port, !r#static).await?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type, json } => {
            let blog = Blog::new(&base_dir)?;
            commands::list::run(&blog, &r#type, json)?;
        }
    }

    Ok(())
}
