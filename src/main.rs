//! Terminal front-end for the decorator subsystem.
//!
//! Plays the editor's role: workspaces come from `--workspace`, prompts read
//! stdin, and opening a file launches `$EDITOR`.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use swissknife_lib::{
    BadgeProvider, DecoratorCommand, DecoratorStore, DecoratorTreeView, Decorators, Host,
    WorkspaceFolder, config,
};

#[derive(Parser)]
#[command(name = "swissknife", about = "Tag files with badges, per workspace")]
struct Cli {
    /// Workspace root (repeatable). Defaults to the current directory.
    #[arg(short, long = "workspace", global = true)]
    workspaces: Vec<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Toggle the check glyph on a file or folder
    Check { path: PathBuf },
    /// Toggle the reject glyph on a file or folder
    Reject { path: PathBuf },
    /// Toggle the eyes glyph on a file or folder
    Eyes { path: PathBuf },
    /// Toggle a one-character glyph of your choice
    Custom {
        path: PathBuf,
        /// Skip the prompt and use this glyph
        #[arg(long)]
        glyph: Option<String>,
    },
    /// Print the badge of a file, if any
    Badge { path: PathBuf },
    /// List decorated files across all workspaces
    List,
    /// Open a listed item (`<workspace name>/<relative path>`)
    Open { item: String },
    /// Show the settings file, optionally writing the defaults
    Config {
        #[arg(long)]
        init: bool,
    },
    /// Print the listing every time it changes
    Watch {
        #[arg(long, env = "SWISSKNIFE_POLL_MS", default_value_t = 250)]
        poll_ms: u64,
    },
}

struct TerminalHost {
    folders: Vec<WorkspaceFolder>,
    answer: Option<String>,
}

impl Host for TerminalHost {
    fn workspace_folders(&self) -> Vec<WorkspaceFolder> {
        self.folders.clone()
    }

    fn prompt_input(&self, prompt: &str, placeholder: Option<&str>) -> Option<String> {
        if let Some(answer) = &self.answer {
            return Some(answer.clone());
        }
        match placeholder {
            Some(hint) => eprint!("{prompt} [{hint}]: "),
            None => eprint!("{prompt}: "),
        }
        let _ = io::stderr().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn open_file(&self, path: &Path) -> Result<(), String> {
        let Ok(editor) = std::env::var("EDITOR") else {
            println!("{}", path.display());
            return Ok(());
        };
        Command::new(&editor)
            .arg(path)
            .status()
            .map_err(|e| format!("Failed to launch {editor}: {e}"))
            .map(|_| ())
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

fn absolutize(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn print_listing(view: &DecoratorTreeView<TerminalHost>) {
    if view.children().is_empty() {
        println!("(no decorated files)");
    }
    for item in view.children() {
        println!("{}", item.label());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let roots = if cli.workspaces.is_empty() {
        vec![std::env::current_dir().context("no current directory")?]
    } else {
        cli.workspaces.clone()
    };
    let folders = roots
        .iter()
        .map(|r| WorkspaceFolder::from_root(absolutize(r)))
        .collect();

    let answer = match &cli.command {
        Cmd::Custom { glyph, .. } => glyph.clone(),
        _ => None,
    };
    let host = Arc::new(TerminalHost { folders, answer });
    let store = Arc::new(DecoratorStore::new(config::load_settings()));

    let tag = |command: DecoratorCommand, path: &Path| -> anyhow::Result<()> {
        let decorators = Decorators::new(store.clone(), host.clone());
        match decorators.run(command, &absolutize(path))? {
            Some(change) => {
                for path in &change.affected {
                    println!("{path}");
                }
                if !change.persisted {
                    bail!("decorators changed but could not be saved");
                }
            }
            None => eprintln!("cancelled"),
        }
        Ok(())
    };

    match &cli.command {
        Cmd::Check { path } => tag(DecoratorCommand::Check, path)?,
        Cmd::Reject { path } => tag(DecoratorCommand::Reject, path)?,
        Cmd::Eyes { path } => tag(DecoratorCommand::Eyes, path)?,
        Cmd::Custom { path, .. } => tag(DecoratorCommand::Custom, path)?,
        Cmd::Badge { path } => {
            let badges = BadgeProvider::new(store.clone(), host.clone());
            if let Some(decoration) = badges.provide_file_decoration(&absolutize(path)) {
                println!("{}", decoration.badge);
            }
        }
        Cmd::List => {
            let view = DecoratorTreeView::new(store.clone(), host.clone());
            print_listing(&view);
        }
        Cmd::Open { item } => {
            let view = DecoratorTreeView::new(store.clone(), host.clone());
            view.on_selection(item);
        }
        Cmd::Config { init } => {
            let path = config::config_dir().join(config::SETTINGS_FILE);
            if *init && !path.exists() {
                config::save_settings(store.settings())
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            println!("{}", path.display());
            println!("{}", serde_json::to_string_pretty(store.settings())?);
        }
        Cmd::Watch { poll_ms } => {
            let mut view = DecoratorTreeView::new(store.clone(), host.clone());
            print_listing(&view);
            loop {
                std::thread::sleep(Duration::from_millis(*poll_ms));
                if view.process_events() {
                    println!("--");
                    print_listing(&view);
                }
            }
        }
    }

    Ok(())
}
