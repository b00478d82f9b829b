mod logging;

use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use sweacopy_core::clipboard::ClipboardWriter;
use sweacopy_core::config::{SweaConfig, load_config};
use sweacopy_core::copy::run_copy;
use sweacopy_core::net::{HistoryClient, HistoryFetcher, PageSource, load_current_page};
use sweacopy_core::runtime::{
    PathOverrides, ResolvedPaths, init_layout, normalize_for_display, resolve_paths,
};
use sweacopy_core::store::{Favorites, JsonFileStore, NickState};
use sweacopy_core::trigger::{KeyPress, nick_from_message, nick_from_shortcut};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "sweacopy",
    version,
    about = "Copy a SWEA submission's memory and runtime as a doc comment"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    state_dir: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    state_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            state_dir: cli.state_dir.clone(),
            config: cli.config.clone(),
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Create the state directory and a config file")]
    Init(InitArgs),
    #[command(about = "Copy the stats of NICK's latest submission (empty = most recent)")]
    Copy(CopyArgs),
    #[command(about = "Handle an inbound {\"type\":\"COPY_SWEA_STATS\",\"nick\":...} message")]
    Message(MessageArgs),
    #[command(about = "Run the keyboard shortcut path (last nick, first favorite, latest)")]
    Shortcut(ShortcutArgs),
    #[command(about = "Manage favorite nicknames")]
    Fav(FavArgs),
}

#[derive(Debug, Args)]
struct InitArgs {
    #[arg(long, help = "Overwrite an existing config file")]
    force: bool,
}

#[derive(Debug, Args)]
struct SourceArgs {
    #[arg(long, value_name = "FILE", conflicts_with = "url", help = "Saved history page")]
    page: Option<PathBuf>,
    #[arg(long, value_name = "URL", help = "History page to load (default: config page_url)")]
    url: Option<String>,
}

#[derive(Debug, Args)]
struct CopyArgs {
    nick: Option<String>,
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Debug, Args)]
struct MessageArgs {
    #[arg(help = "JSON message, or - to read it from stdin")]
    payload: String,
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Debug, Args)]
struct ShortcutArgs {
    #[arg(long, default_value = "ctrl+shift+y")]
    keys: String,
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Debug, Args)]
struct FavArgs {
    #[command(subcommand)]
    command: FavSubcommand,
}

#[derive(Debug, Subcommand)]
enum FavSubcommand {
    List,
    Add { nick: String },
    Remove { nick: String },
    Select { nick: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        Some(Commands::Init(args)) => run_init(&runtime, args),
        Some(Commands::Copy(args)) => run_copy_command(&runtime, args),
        Some(Commands::Message(args)) => run_message(&runtime, args),
        Some(Commands::Shortcut(args)) => run_shortcut(&runtime, args),
        Some(Commands::Fav(FavArgs { command })) => run_fav(&runtime, command),
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn run_init(runtime: &RuntimeOptions, args: InitArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let report = init_layout(&paths, args.force)?;

    println!("Initialized sweacopy state");
    println!("state_dir: {}", normalize_for_display(&paths.state_dir));
    println!("config_path: {}", normalize_for_display(&paths.config_path));
    println!("created_state_dir: {}", report.created_state_dir);
    println!("wrote_config: {}", report.wrote_config);
    print_diagnostics(runtime, &paths);
    Ok(())
}

fn run_copy_command(runtime: &RuntimeOptions, args: CopyArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let store = JsonFileStore::new(&paths.state_path);
    let nick = Favorites::new(&store).remember(args.nick.as_deref().unwrap_or_default())?;
    copy_for_nick(runtime, &paths, &nick, &args.source)
}

fn run_message(runtime: &RuntimeOptions, args: MessageArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let raw = if args.payload == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read message from stdin")?;
        buffer
    } else {
        args.payload
    };

    match nick_from_message(&raw)? {
        Some(nick) => copy_for_nick(runtime, &paths, &nick, &args.source),
        None => {
            println!("message ignored: not a copy request");
            Ok(())
        }
    }
}

fn run_shortcut(runtime: &RuntimeOptions, args: ShortcutArgs) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let press = KeyPress::parse(&args.keys)?;
    let store = JsonFileStore::new(&paths.state_path);
    let state = Favorites::new(&store).state()?;

    match nick_from_shortcut(&press, &state) {
        Some(nick) => copy_for_nick(runtime, &paths, &nick, &args.source),
        None => {
            println!("shortcut ignored: {} is not bound", args.keys);
            Ok(())
        }
    }
}

fn run_fav(runtime: &RuntimeOptions, command: FavSubcommand) -> Result<()> {
    let paths = resolve_runtime_paths(runtime)?;
    let store = JsonFileStore::new(&paths.state_path);
    let favorites = Favorites::new(&store);

    let (action, outcome) = match command {
        FavSubcommand::List => ("list", Some(favorites.state()?)),
        FavSubcommand::Add { nick } => ("add", favorites.add(&nick)?),
        FavSubcommand::Remove { nick } => ("remove", favorites.remove(&nick)?),
        FavSubcommand::Select { nick } => ("select", favorites.select(&nick)?),
    };

    println!("fav {action}");
    match outcome {
        Some(state) => print_state(&state),
        None => println!("unchanged: nickname is empty"),
    }
    print_diagnostics(runtime, &paths);
    Ok(())
}

fn copy_for_nick(
    runtime: &RuntimeOptions,
    paths: &ResolvedPaths,
    nick: &str,
    source: &SourceArgs,
) -> Result<()> {
    let config = load_config(&paths.config_path)?;
    let source = page_source(source, &config)?;
    let client = HistoryClient::from_config(&config)?;
    let current = load_current_page(&client, &source, &config.history_url())?;
    let fetcher = HistoryFetcher::for_page(&client, &current, &config);
    let mut clipboard = ClipboardWriter::system();
    let (primary, fallback) = clipboard.backend_names();
    debug!(primary, fallback, "clipboard backends");

    print_diagnostics(runtime, paths);
    let report = run_copy(nick, &current, &fetcher, &mut clipboard)?;

    println!("Copied from {} ({}):", report.page, report.submitter);
    println!("{}", report.text);
    Ok(())
}

fn page_source(args: &SourceArgs, config: &SweaConfig) -> Result<PageSource> {
    if let Some(path) = &args.page {
        return Ok(PageSource::File(path.clone()));
    }
    if let Some(url) = args.url.clone().or_else(|| config.page_url()) {
        return Ok(PageSource::Url(url));
    }
    bail!("no history page to start from: pass --page FILE or --url URL, or set page_url in the config")
}

fn print_state(state: &NickState) {
    println!("last_nick: {}", display_nick(&state.last_nick));
    println!("favorites.count: {}", state.favorites.len());
    for nick in &state.favorites {
        println!("favorites.nick: {nick}");
    }
}

fn display_nick(nick: &str) -> &str {
    if nick.is_empty() { "<latest>" } else { nick }
}

fn print_diagnostics(runtime: &RuntimeOptions, paths: &ResolvedPaths) {
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
}

fn resolve_runtime_paths(runtime: &RuntimeOptions) -> Result<ResolvedPaths> {
    dotenvy::dotenv().ok();

    let cwd = env::current_dir().context("failed to read current directory")?;
    let overrides = PathOverrides {
        state_dir: runtime.state_dir.clone(),
        config: runtime.config.clone(),
    };

    let initial = resolve_paths(&cwd, &overrides);
    if let Some(project_env) = initial.state_dir.parent().map(|dir| dir.join(".env"))
        && project_env.exists()
    {
        let _ = dotenvy::from_path_override(&project_env);
    }

    Ok(resolve_paths(&cwd, &overrides))
}
