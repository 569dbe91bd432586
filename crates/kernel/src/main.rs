//! Waypoint
//!
//! Command-line front end for the route builder: validates catalogs and
//! prints the routes and menu a given authority would receive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use waypoint_kernel::menu::MenuNode;
use waypoint_kernel::{Authority, BuildOptions, Config, PermissionService, RouteCatalog};

/// Route catalog tooling.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route catalog (.yaml, .yml, .json or .toml). Defaults to WAYPOINT_CATALOG.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the routes and menu visible to an authority as JSON.
    Build {
        #[command(flatten)]
        build: BuildArgs,

        /// Emit compact JSON.
        #[arg(long)]
        compact: bool,

        /// Print only the menu.
        #[arg(long, conflicts_with = "routes_only")]
        menu_only: bool,

        /// Print only the routes.
        #[arg(long)]
        routes_only: bool,
    },
    /// Validate a catalog and report what each authority sees.
    Check,
    /// Print the menu visible to an authority as an indented tree.
    Menu {
        #[command(flatten)]
        build: BuildArgs,
    },
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Authority of the principal (SYS_ADMIN, TENANT_ADMIN, CUSTOMER_USER).
    /// Without one, only routes open to every principal are shown.
    #[arg(long)]
    authority: Option<Authority>,

    /// Path of the pinned home entry.
    #[arg(long)]
    home: Option<String>,

    /// Deepest route level the router can register.
    #[arg(long)]
    max_depth: Option<usize>,
}

impl BuildArgs {
    fn options(&self, config: &Config) -> BuildOptions {
        let mut options = config.build_options();
        if let Some(home) = &self.home {
            options.home_path = home.clone();
        }
        if let Some(depth) = self.max_depth {
            options.max_depth = depth;
        }
        options
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    let path = cli
        .catalog
        .clone()
        .or_else(|| config.catalog.clone())
        .context("no route catalog given; pass --catalog or set WAYPOINT_CATALOG")?;
    let catalog = RouteCatalog::load(&path)
        .with_context(|| format!("failed to load route catalog {}", path.display()))?;
    info!(catalog = %path.display(), routes = catalog.len(), "Route catalog loaded");

    match cli.command {
        Command::Build {
            build,
            compact,
            menu_only,
            routes_only,
        } => {
            let service = PermissionService::new(catalog, build.options(&config));
            let set = service.login(build.authority.or(config.authority))?;

            let value = if menu_only {
                serde_json::to_value(&set.menu)?
            } else if routes_only {
                serde_json::to_value(&set.routes)?
            } else {
                serde_json::to_value(&*set)?
            };
            let out = if compact {
                serde_json::to_string(&value)?
            } else {
                serde_json::to_string_pretty(&value)?
            };
            println!("{out}");
        }
        Command::Check => {
            let service = PermissionService::new(catalog, config.build_options());
            println!("{:<16} {:>8} {:>8}", "AUTHORITY", "ROUTES", "MENU");
            println!("{}", "-".repeat(34));
            let authorities = std::iter::once(None).chain(Authority::ALL.into_iter().map(Some));
            for authority in authorities {
                let set = service.route_set(authority)?;
                println!(
                    "{:<16} {:>8} {:>8}",
                    authority.map_or("(none)", Authority::as_str),
                    set.route_count(),
                    set.menu_count()
                );
            }
        }
        Command::Menu { build } => {
            let service = PermissionService::new(catalog, build.options(&config));
            let set = service.login(build.authority.or(config.authority))?;
            if set.menu.is_empty() {
                println!("No menu entries visible.");
            }
            print_menu(&set.menu, 0);
        }
    }

    Ok(())
}

fn print_menu(entries: &[MenuNode], depth: usize) {
    for entry in entries {
        let pin = if entry.affix { " *" } else { "" };
        println!(
            "{}{} ({}){pin}",
            "  ".repeat(depth),
            entry.title,
            entry.path
        );
        print_menu(&entry.children, depth + 1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
