mod sections;

use clap::{Parser, Subcommand};
use coursesched_core::{load_app_config, load_marker_profile, AppConfig, MarkerProfile};
use coursesched_scraper::{CampusClient, ProgramQuery};
use tracing_subscriber::EnvFilter;

use crate::sections::{parse_course_arg, run_sections, CourseArg};

#[derive(Debug, Parser)]
#[command(name = "coursesched")]
#[command(about = "Query terms, programs and course sections from the campus registration and catalog systems")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List registration term codes, the default term first
    Terms,
    /// List degree programs, or show one program's course requirements
    Programs {
        /// Position of the program in the listing (0-based)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Search the sections offered for one or more courses
    Sections {
        /// Registration term code (e.g. 201801)
        #[arg(long)]
        term: String,
        /// Course as SUBJECT:CODE (e.g. CSCI:1060U); repeatable
        #[arg(long = "course", required = true, value_parser = parse_course_arg)]
        courses: Vec<CourseArg>,
        /// Print sections as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let profile = match &config.markers_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading marker profile");
            load_marker_profile(path)?
        }
        None => MarkerProfile::default(),
    };
    let client = CampusClient::from_config(&config, profile)?;

    tokio::select! {
        result = run(cli.command, &client, &config) => result,
        () = interrupted() => {
            tracing::warn!("interrupted; abandoning in-flight requests");
            Ok(())
        }
    }
}

async fn run(command: Commands, client: &CampusClient, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Terms => {
            let terms = client.get_terms().await;
            if terms.is_empty() {
                anyhow::bail!("no terms found; the registration system may be unavailable");
            }
            for term in terms {
                println!("{term}");
            }
        }
        Commands::Programs { index } => {
            let query = index.map_or_else(ProgramQuery::listing, ProgramQuery::detail);
            print!("{}", client.get_programs(query).await);
        }
        Commands::Sections {
            term,
            courses,
            json,
        } => {
            run_sections(client, &term, &courses, json, config.max_concurrent_queries).await?;
        }
    }
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
