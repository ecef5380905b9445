// carddeck: tabbed flashcards with weighted review.
// - no subcommand: full-screen study TUI (ratatui + crossterm)
// - export / import / add / stats: scripting entry points over the same data file

mod config;
mod tui;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use carddeck::prompt::{AssumeYes, Prompter, StdinPrompter};
use carddeck::session::Session;
use carddeck::store::FileStore;
use clap::{Parser, Subcommand};

use crate::tui::{theme_of, ThemeKind};

#[derive(Debug, Clone, Parser)]
#[command(name = "carddeck", about = "Tabbed flashcards with weighted review", version)]
struct Cli {
    /// Data file; defaults to $CARDDECK_DATA or the platform data directory
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// Colour theme for the TUI
    #[arg(long, value_enum, default_value_t = ThemeKind::Dark)]
    theme: ThemeKind,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Write a dated JSON backup (cards_backup_<date>.json)
    Export {
        /// Directory for the backup file
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Print the backup to stdout instead
        #[arg(long)]
        stdout: bool,
    },
    /// Replace all tabs and cards with a backup
    Import {
        path: PathBuf,
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Add a card to the active tab, or to the tab named by --tab
    Add {
        #[arg(long)]
        front: String,
        #[arg(long)]
        back: String,
        /// Target tab by name; the active tab stays as it is
        #[arg(long)]
        tab: Option<String>,
    },
    /// Card counts per tab
    Stats,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn open_session(data_path: &Path) -> Result<Session<FileStore>> {
    let session = Session::open(FileStore::new(data_path))
        .with_context(|| format!("failed to load deck from {}", data_path.display()))?;
    log::info!("opened deck at {}", session.store().path().display());
    Ok(session)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_path = config::resolve_data_path(cli.file.as_deref());

    let Some(command) = cli.command.clone() else {
        let log_path = data_path.with_file_name("carddeck.log");
        init_logging(Some(&log_path))?;
        return run_tui(&cli, &data_path);
    };
    init_logging(None)?;
    let mut session = open_session(&data_path)?;

    match command {
        Command::Export { dir, stdout } => {
            if stdout {
                println!("{}", session.export()?);
            } else {
                let path = session.export_to_dir(&dir)?;
                println!("{}", path.display());
            }
        }
        Command::Import { path, yes } => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read backup: {}", path.display()))?;
            let mut prompter: Box<dyn Prompter> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(StdinPrompter)
            };
            if session
                .import(&text, prompter.as_mut())
                .context("failed to import")?
            {
                println!("Data restored successfully!");
            } else {
                println!("Import cancelled.");
            }
        }
        Command::Add { front, back, tab } => {
            let tab_id = match tab {
                Some(name) => session
                    .state()
                    .tabs
                    .iter()
                    .find(|t| t.name == name)
                    .map(|t| t.id.clone())
                    .with_context(|| format!("no tab named {name:?}"))?,
                None => session.state().active_tab_id.clone(),
            };
            let id = session.create_card_in(&tab_id, &front, &back)?;
            println!("{id}");
        }
        Command::Stats => {
            let active = session.state().active_tab_id.clone();
            for st in session.stats() {
                let marker = if st.id == active { "*" } else { " " };
                println!(
                    "{marker} {:<24} live:{:<5} archived:{:<5} weight:{}",
                    st.name, st.live, st.archived, st.total_weight
                );
            }
        }
    }
    Ok(())
}

fn run_tui(cli: &Cli, data_path: &Path) -> Result<()> {
    let session = open_session(data_path)?;
    let keymap = match config::load_keymap() {
        Ok(Some(km)) => km,
        Ok(None) => config::default_keymap(),
        Err(e) => {
            log::warn!("{e:#}, using default keys");
            config::default_keymap()
        }
    };
    let export_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut app = tui::App::new(session, theme_of(cli.theme), keymap, export_dir);
    tui::run(&mut app)
}
