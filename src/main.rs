use anyhow::Result;
use clap::{Parser, Subcommand};
use daybook::domain::{Clock, DateLabel, SystemClock};
use daybook::input::{handle_command, parse_command};
use daybook::persistence::{ensure_data_dir, init_local_data_dir, FileStore};
use daybook::{report, ui, AppState};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "A small daily task tracker that archives finished work at day rollover", long_about = None)]
struct Cli {
    /// Data directory. Defaults to the nearest .daybook, then ~/.daybook
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .daybook directory in the current directory
    Init,
    /// Print the archived days, most recent first
    History,
    /// Write a Markdown report of the history
    Report {
        /// Day to report on, e.g. "January 5, 2025". Defaults to every day.
        #[arg(short, long)]
        date: Option<String>,
        /// Output file path. Defaults to <data dir>/report-YYYY-MM-DD.md
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Init) => {
            let dir = init_local_data_dir()?;
            println!("Initialized daybook directory: {}", dir.display());
            println!("Run 'daybook' here to start tracking tasks.");
            Ok(())
        }
        Some(Commands::History) => {
            let app = open_app(cli.dir)?;
            print!("{}", ui::render_history(app.history()));
            Ok(())
        }
        Some(Commands::Report { date, output }) => {
            let dir = ensure_data_dir(cli.dir.as_deref())?;
            let app = open_app(Some(dir.clone()))?;

            let date = date.map(DateLabel::new);
            let output = match output {
                Some(path) => PathBuf::from(path),
                None => report::default_report_path(&dir, SystemClock.now().date_naive()),
            };

            let path = report::generate_report(app.history(), date.as_ref(), &output)?;
            println!("Report generated: {}", path.display());
            Ok(())
        }
        None => run_shell(cli.dir),
    }
}

/// Open the store and run the startup load, including any day rollover
fn open_app(dir: Option<PathBuf>) -> Result<AppState<FileStore>> {
    let dir = ensure_data_dir(dir.as_deref())?;
    log::info!("Using data directory: {}", dir.display());

    let store = FileStore::open(&dir)?;
    AppState::load(store, Box::new(SystemClock))
}

fn run_shell(dir: Option<PathBuf>) -> Result<()> {
    let mut app = open_app(dir)?;

    let mut stdout = io::stdout();
    if let Some(notice) = ui::render_rollover(&app.last_outcome) {
        writeln!(stdout, "{}", notice)?;
    }
    if !app.load_committed {
        writeln!(
            stdout,
            "Warning: {} startup change(s) not saved yet; 'sync' retries them",
            app.pending_writes()
        )?;
    }
    write!(stdout, "{}", ui::render_tasks(app.active_date(), app.tasks()))?;
    writeln!(stdout, "Type 'help' for commands.")?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let result = loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => break Err(e.into()),
            None => break Ok(()),
        };

        match handle_command(&mut app, parse_command(&line), &mut stdout) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }
    };

    // Last chance for anything still queued
    if !app.flush() {
        eprintln!(
            "Warning: {} change(s) could not be saved; they will be reconciled on next start",
            app.pending_writes()
        );
    }

    result
}
