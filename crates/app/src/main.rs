use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use deck_core::model::Session;
use services::{DeckEditor, EditorError, NoticeLevel};
use storage::{Storage, StoreConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};

#[derive(Debug)]
enum ArgsError {
    MissingCommand,
    MissingValue { flag: &'static str },
    MissingFilename { command: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    NotConfirmed { filename: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "missing command (try --help)"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFilename { command } => write!(f, "{command} requires a filename"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::NotConfirmed { filename } => {
                write!(f, "refusing to delete {filename} without --yes")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  deckctl [--base-url <url>] list");
    eprintln!("  deckctl [--base-url <url>] show   <file>");
    eprintln!("  deckctl [--base-url <url>] export <file> [--out <dir>]");
    eprintln!("  deckctl [--base-url <url>] create <file>");
    eprintln!("  deckctl [--base-url <url>] remove <file> --yes");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DECK_STORE_BASE_URL (default {})", storage::config::DEFAULT_BASE_URL);
    eprintln!("  RUST_LOG (default info)");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    Show { filename: String },
    Export { filename: String, out_dir: PathBuf },
    Create { filename: String },
    Remove { filename: String },
}

#[derive(Debug)]
struct Args {
    base_url: Option<String>,
    command: Command,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut base_url = None;
        let mut command_name = None;
        let mut filename = None;
        let mut out_dir = None;
        let mut confirmed = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => return Ok(None),
                "--base-url" => base_url = Some(require_value(&mut args, "--base-url")?),
                "--out" => out_dir = Some(PathBuf::from(require_value(&mut args, "--out")?)),
                "--yes" | "-y" => confirmed = true,
                flag if flag.starts_with('-') => return Err(ArgsError::UnknownArg(arg)),
                _ if command_name.is_none() => command_name = Some(arg),
                _ if filename.is_none() => filename = Some(arg),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command_name = command_name.ok_or(ArgsError::MissingCommand)?;
        let need_file = |command: &'static str| {
            filename
                .clone()
                .ok_or(ArgsError::MissingFilename { command })
        };
        let command = match command_name.as_str() {
            "list" => Command::List,
            "show" => Command::Show {
                filename: need_file("show")?,
            },
            "export" => Command::Export {
                filename: need_file("export")?,
                out_dir: out_dir.unwrap_or_else(|| PathBuf::from(".")),
            },
            "create" => Command::Create {
                filename: need_file("create")?,
            },
            "remove" => {
                let filename = need_file("remove")?;
                if !confirmed {
                    return Err(ArgsError::NotConfirmed { filename });
                }
                Command::Remove { filename }
            }
            _ => return Err(ArgsError::UnknownCommand(command_name)),
        };

        Ok(Some(Self { base_url, command }))
    }
}

fn print_deck(session: &Session) {
    let mut view = session.clone();
    for index in 0..session.len() {
        view.move_to(index);
        let card = view.current();
        println!("[{}] Q: {}", view.progress_label(), card.question);
        println!("      A: {}", card.answer);
        if let Some(due) = card.due_at() {
            println!("      due {}", due.to_rfc3339());
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1))? else {
        print_usage();
        return Ok(());
    };

    let config = match args.base_url.as_deref() {
        Some(raw) => StoreConfig::new(raw)?,
        None => StoreConfig::from_env()?,
    };
    info!(base_url = %config.base_url(), "using deck store");
    let storage = Storage::http(config);
    let editor = DeckEditor::new(Arc::clone(&storage.decks));

    match args.command {
        // Straight to the store: the editor would also open the first file.
        Command::List => {
            let filenames = storage.decks.list_files().await.map_err(EditorError::List)?;
            for filename in filenames {
                println!("{filename}");
            }
        }
        Command::Show { filename } => {
            editor.select_file(&filename).await?;
            print_deck(&editor.session());
        }
        Command::Export { filename, out_dir } => {
            editor.select_file(&filename).await?;
            let export = editor.download().await?;
            let path = out_dir.join(&export.file_name);
            tokio::fs::write(&path, export.contents).await?;
            println!("{}", path.display());
        }
        Command::Create { filename } => {
            editor.open_new_file_dialog();
            editor.confirm_create(&filename).await?;
            info!(filename = %filename, "created");
        }
        Command::Remove { filename } => {
            // The file may be unreadable; removal only needs it selected.
            let _ = editor.select_file(&filename).await;
            editor.open_delete_dialog();
            editor.confirm_delete().await?;
            info!(filename = %filename, "removed");
        }
    }

    for notice in editor.take_notices() {
        if notice.level == NoticeLevel::Success {
            info!("{}", notice.message);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    log_fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
