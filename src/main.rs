use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};

use landmine_connect_four::config::{AppConfig, LoggingConfig};
use landmine_connect_four::game::{LocalPlayer, MineLayer, RandomMineLayer};
use landmine_connect_four::session::SessionRegistry;
use landmine_connect_four::ui::{App, HeadlessTable};

/// Play Connect 4 with hidden landmines on one keyboard.
#[derive(Parser)]
#[command(name = "connect4", about = "Connect 4 with hidden landmines")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "connect4.toml")]
    config: PathBuf,

    /// Name of the first player (red, moves first)
    #[arg(long, default_value = "Red")]
    player_a: String,

    /// Name of the second player (blue)
    #[arg(long, default_value = "Blue")]
    player_b: String,

    /// Seed for mine placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Read moves from stdin instead of running the terminal UI
    #[arg(long)]
    headless: bool,

    /// Print a config file with every default value and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    init_logging(&config.logging, cli.headless).context("setting up logging")?;

    let layer: Box<dyn MineLayer + Send> = match cli.seed {
        Some(seed) => {
            info!("Using mine seed {seed}");
            Box::new(RandomMineLayer::seeded(seed, &config.rules))
        }
        None => Box::new(RandomMineLayer::new(&config.rules)),
    };
    let registry = SessionRegistry::new(config.rules, layer);

    let red = LocalPlayer::new(cli.player_a);
    let blue = LocalPlayer::new(cli.player_b);

    if cli.headless {
        let mut table = HeadlessTable::new(
            &registry,
            red,
            blue,
            config.display.glyphs,
            config.session.idle_timeout(),
            io::stdout().lock(),
        );
        table.run(io::stdin().lock()).context("reading moves from stdin")?;
        return Ok(());
    }

    let mut app = App::new(registry, red, blue, config.session.idle_timeout())
        .context("starting the game")?;
    run_tui(&mut app).context("running the terminal UI")
}

/// Log to the configured file, or to stderr. The terminal UI owns stderr's
/// screen, so without a file it only logs when `RUST_LOG` asks for it.
fn init_logging(logging: &LoggingConfig, headless: bool) -> Result<()> {
    let default_level = match (&logging.file, headless) {
        (None, false) => "off",
        _ => logging.level.as_str(),
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if let Some(path) = &logging.file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run_tui(app: &mut App) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal — always runs, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res
}
