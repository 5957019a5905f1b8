mod app;
mod config;
mod event;
mod logging;
mod markup;
mod preview;
mod render;
mod search;
mod shell;
mod store;
mod ui;

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};

use app::App;
use config::Config;
use event::run_app;
use preview::{history, Preview};
use render::MarkdownRenderer;
use shell::SystemOpener;
use store::fs::FsStore;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("notedeck {}", VERSION);
    println!("Browse, search and tick off markdown notes from the terminal");
    println!();
    println!("USAGE:");
    println!("    notedeck [OPTIONS] [PATH]");
    println!();
    println!("ARGUMENTS:");
    println!("    [PATH]           Open a file or folder directly");
    println!("                     - If PATH is a folder, uses it as the notes directory");
    println!("                     - If PATH is a .md file, opens it within its folder");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
    println!("    -c, --config     Print config file path");
    println!("    -d, --dir        Print notes directory path");
    println!();
    println!("ENVIRONMENT:");
    println!("    {}      Log filter, e.g. debug or notedeck=trace", logging::LOG_ENV);
    println!("    EDITOR           Editor for `e`, unless set in the config");
}

fn resolve_path(path_str: &str) -> Option<PathBuf> {
    let expanded = shellexpand::tilde(path_str).to_string();
    let path = PathBuf::from(&expanded);
    let absolute = if path.is_absolute() {
        path
    } else {
        env::current_dir().ok()?.join(path)
    };

    absolute.canonicalize().ok().or(Some(absolute))
}

/// Notes directory and, when PATH names a note, that note's file.
fn split_initial_path(path: &Path) -> Option<(PathBuf, Option<PathBuf>)> {
    if path.is_dir() {
        return Some((path.to_path_buf(), None));
    }
    let is_markdown = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    if !is_markdown {
        return None;
    }
    let dir = path.parent()?.to_path_buf();
    Some((dir, Some(path.to_path_buf())))
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut initial_path: Option<PathBuf> = None;

    if args.len() > 1 {
        match args[1].as_str() {
            "-v" | "--version" => {
                println!("notedeck {}", VERSION);
                return Ok(());
            }
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-c" | "--config" => {
                println!("{}", Config::config_path().display());
                return Ok(());
            }
            "-d" | "--dir" => {
                let (config, err) = Config::load();
                if let Some(err) = err {
                    eprintln!("Warning: {}", err);
                }
                println!("{}", config.notes_path().display());
                return Ok(());
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Run 'notedeck --help' for usage information");
                return Ok(());
            }
            path_arg => match resolve_path(path_arg) {
                Some(path) if path.exists() => initial_path = Some(path),
                Some(path) => {
                    eprintln!("Path does not exist: {}", path.display());
                    return Ok(());
                }
                None => {
                    eprintln!("Invalid path: {}", path_arg);
                    return Ok(());
                }
            },
        }
    }

    let (config, config_err) = Config::load_or_create();
    if let Some(err) = &config_err {
        eprintln!("Warning: {}", err);
    }
    if let Err(err) = logging::init_logging(&config.log_level) {
        eprintln!("Logging disabled: {}", err);
    }
    if let Some(err) = config_err {
        warn!(error = %err, "config problem");
    }

    let (notes_dir, initial_note) = match initial_path.as_deref() {
        Some(path) => match split_initial_path(path) {
            Some(split) => split,
            None => {
                eprintln!("Not a folder or markdown file: {}", path.display());
                return Ok(());
            }
        },
        None => (config.notes_path(), None),
    };

    let store = match FsStore::open(&notes_dir) {
        Ok(store) => store,
        Err(err) => {
            error!(error = %err, "cannot open notes");
            eprintln!("Error: {}", err);
            eprintln!("Set notes_dir in {}", Config::config_path().display());
            return Ok(());
        }
    };
    info!(dir = %notes_dir.display(), "notes opened");
    let initial_id = initial_note.as_deref().and_then(|p| store.id_for(p));

    let mut preview = Preview::new(
        Box::new(store),
        Box::new(MarkdownRenderer::new()),
        Box::new(SystemOpener),
        history::shared(config.history_limit()),
        config.display,
    );
    match initial_id {
        Some(id) => preview.open_note_id(&id),
        None => preview.open_all(),
    }
    let mut app = App::new(config, preview);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}
