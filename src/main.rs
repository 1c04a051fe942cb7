use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use studio_site::builders::{run_targets, BuildContext, BuildTarget};
use studio_site::config::Config;
use studio_site::env_vars;
use studio_site::fitdegree::{FitDegreeService, Resource};
use studio_site::logging;
use studio_site::packs::{discover_packs, resolve_base_dirs};
use studio_site::rest;

#[derive(Parser)]
#[command(name = "studio-site")]
#[command(about = "Static content builder and pack host for the YOUnique Yoga site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Target {
    Instructors,
    Schedule,
    ClassesServices,
    TeacherTraining,
    All,
}

impl Target {
    fn build_targets(self) -> Vec<BuildTarget> {
        match self {
            Target::Instructors => vec![BuildTarget::Instructors],
            Target::Schedule => vec![BuildTarget::Schedule],
            Target::ClassesServices => vec![BuildTarget::ClassesServices],
            Target::TeacherTraining => vec![BuildTarget::TeacherTraining],
            Target::All => BuildTarget::all().to_vec(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Splice FitDegree content into pages in the publish directory
    Build {
        /// Page to build
        #[arg(value_enum)]
        target: Target,
    },

    /// Start the host server with discovered packs
    Serve {
        /// Port to listen on (default: server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve a FitDegree resource and print the annotated payload
    Resolve {
        /// instructors, classes, group-classes, services or schedule
        resource: String,
    },

    /// List pack directories and their manifests
    Packs,

    /// Show effective configuration and deployment variables
    Config {
        /// Write the effective configuration to studio-site.toml
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let _logging_handle = logging::init_logging(&config, cli.debug)?;

    match cli.command {
        Commands::Build { target } => cmd_build(config, target).await?,
        Commands::Serve { port } => cmd_serve(config, port).await?,
        Commands::Resolve { resource } => cmd_resolve(&config, &resource).await?,
        Commands::Packs => cmd_packs(&config)?,
        Commands::Config { write } => cmd_config(&config, write)?,
    }

    Ok(())
}

async fn cmd_build(config: Config, target: Target) -> Result<()> {
    let ctx = BuildContext::from_config(config).context("Failed to prepare build")?;
    let reports = run_targets(&ctx, &target.build_targets()).await?;

    for report in reports {
        println!(
            "{}: {} of {} items -> {}",
            report.target,
            report.rendered,
            report.fetched,
            report.page.display()
        );
        for extra in &report.extra_files {
            println!("  wrote {}", extra.display());
        }
    }
    Ok(())
}

async fn cmd_serve(config: Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);

    println!("Starting studio-site server...");
    println!("  Port: {}", port);
    println!("  Endpoints:");
    println!("    GET  /api/health                 Health check");
    println!("    GET  /api/gizmos/<pack>/...      Mounted packs");
    println!();

    rest::serve(config, port).await
}

async fn cmd_resolve(config: &Config, name: &str) -> Result<()> {
    let resource = Resource::from_name(name).with_context(|| {
        let known: Vec<&str> = Resource::all().iter().map(Resource::as_str).collect();
        format!("Unknown resource '{}' (expected one of: {})", name, known.join(", "))
    })?;

    let service = FitDegreeService::from_config(config).context("Failed to create HTTP client")?;
    let fetched = match resource {
        Resource::Instructors => service.instructors().await,
        Resource::Classes => service.upcoming_classes().await,
        Resource::GroupClasses => {
            service
                .group_classes(studio_site::fitdegree::service::PAGE_SIZE)
                .await
        }
        Resource::Services => service.services().await,
        Resource::Schedule => {
            let days_ahead = config.builders.schedule_days_ahead;
            let start = chrono::Local::now().date_naive().and_time(chrono::NaiveTime::MIN);
            let end = chrono::Duration::try_days(i64::from(days_ahead))
                .and_then(|span| start.checked_add_signed(span))
                .with_context(|| format!("Schedule window of {} days is out of range", days_ahead))?;
            service.schedule(start, end).await
        }
    }
    .with_context(|| format!("Failed to resolve {}", resource))?;

    println!("endpoint: {}", fetched.endpoint);
    println!("{}", serde_json::to_string_pretty(&fetched.payload)?);
    Ok(())
}

fn cmd_packs(config: &Config) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let base_dirs = resolve_base_dirs(&cwd, &config.pack_dirs());

    println!("Pack directories:");
    for dir in &base_dirs {
        let marker = if dir.is_dir() { "" } else { " (missing)" };
        println!("  {}{}", dir.display(), marker);
    }
    println!();

    let packs = discover_packs(&base_dirs);
    if packs.is_empty() {
        println!("No packs found.");
        return Ok(());
    }

    for pack in packs {
        match pack.manifest_path {
            Some(manifest) => println!("  {:<20} {}", pack.id, manifest.display()),
            None => println!("  {:<20} (no pack.toml)", pack.id),
        }
    }
    Ok(())
}

fn cmd_config(config: &Config, write: bool) -> Result<()> {
    if write {
        let path = Config::local_config_path();
        config.save(&path)?;
        println!("Wrote {} (API key omitted)", path.display());
        return Ok(());
    }

    println!(
        "{}",
        toml::to_string_pretty(&config.redacted()).context("Failed to serialize config")?
    );

    println!("# Deployment variables");
    for (category, vars) in env_vars::env_vars_by_category() {
        println!();
        println!("## {}", category.display_name());
        for var in vars {
            let state = if std::env::var(var.name).is_ok() { "set" } else { "unset" };
            println!("  {:<44} {:<6} {}", var.name, state, var.description);
        }
    }
    Ok(())
}
