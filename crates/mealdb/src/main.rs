use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use mealdb_api::{build_client, Config, SearchArgs, ShowArgs, SuggestArgs};

#[derive(Parser)]
#[command(name = "mealdb")]
#[command(about = "Search TheMealDB recipes", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// Recipe API base URL (overrides MEALDB_API_URL and the config file)
    #[arg(long = "api-url", global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search meals by name
    #[command(alias = "s")]
    Search(SearchArgs),

    /// List suggestions for partial input
    Suggest(SuggestArgs),

    /// Show a recipe by id
    Show(ShowArgs),

    /// Interactive search (default)
    Tui,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug (overridden by RUST_LOG)
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    log::debug!("Using recipe API at {}", config.api_url);

    let api = build_client(&config)?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Search(args) => mealdb_api::execute_search(args, api.as_ref()),
        Commands::Suggest(args) => mealdb_api::execute_suggest(args, api.as_ref(), &config),
        Commands::Show(args) => mealdb_api::execute_show(args, api.as_ref()),
        Commands::Tui => mealdb_api::tui::run(api, &config),
    }
}
