use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use env_logger::{Env, Target};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use typeswitch::{
    app::{App, Flow},
    app_dirs::AppDirs,
    clipboard::{ClipboardSurface, TerminalClipboard},
    clock::{Clock, MonotonicClock},
    config::{Config, ConfigStore, FileConfigStore},
    exercise::{Exercise, LanguagePair},
    history::{export_csv, ResultsDb},
    replay::{run_replay, ReplayScript},
    runtime::{CrosstermEventSource, FixedTicker, Runner, TermEvent},
};

const TICK_RATE_MS: u64 = 100;
const HISTORY_LIMIT: usize = 20;

/// multilingual typing exercise with keystroke analysis and a typing score
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a mixed-script business text, get a typing score built from speed, accuracy, language-switch errors and frustration signals."
)]
pub struct Cli {
    /// language pair of the exercise text
    #[clap(short = 'l', long, value_enum)]
    language_pair: Option<LanguagePair>,

    /// exercise number within the language pair
    #[clap(short = 'e', long)]
    exercise: Option<usize>,

    /// replay a recorded input script and print the payload and score as JSON
    #[clap(long, value_name = "SCRIPT")]
    replay: Option<PathBuf>,

    /// print recent results
    #[clap(long)]
    history: bool,

    /// write stored results as CSV
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,

    /// configuration file to use instead of the default location
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// results database to use instead of the default location
    #[clap(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

impl Cli {
    fn interactive(&self) -> bool {
        self.replay.is_none() && !self.history && self.export_csv.is_none()
    }

    /// Stored config with command line overrides applied.
    fn resolve_config(&self, store: &dyn ConfigStore) -> Config {
        let mut config = store.load();
        if let Some(pair) = self.language_pair {
            config.language_pair = pair.slug().to_string();
        }
        if let Some(n) = self.exercise {
            config.exercise_number = n;
        }
        config
    }

    fn open_db(&self) -> rusqlite::Result<ResultsDb> {
        match &self.db {
            Some(path) => ResultsDb::open(path),
            None => ResultsDb::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.interactive());

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = cli.resolve_config(&store);

    if let Some(path) = &cli.replay {
        return replay(path, &config);
    }
    if cli.history || cli.export_csv.is_some() {
        return history(&cli);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let pair: LanguagePair = config.language_pair.parse()?;
    let exercise = Exercise::load(pair, config.exercise_number)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        pair,
        config.exercise_number,
        exercise,
        config.analyzer.clone(),
        config.scoring.clone(),
        MonotonicClock::new(),
        TerminalClipboard,
    );
    match cli.open_db() {
        Ok(db) => app = app.with_history(db),
        Err(e) => log::warn!("results will not be saved: {}", e),
    }

    let outcome = start_tui(&mut terminal, &mut app);
    // release clipboard interception before handing the terminal back
    drop(app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn init_logging(to_file: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if to_file {
        // stderr belongs to the terminal UI
        let file = AppDirs::log_path().and_then(|path| {
            std::fs::create_dir_all(path.parent()?).ok()?;
            OpenOptions::new().create(true).append(true).open(path).ok()
        });
        match file {
            Some(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            None => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn start_tui<B: Backend, C: Clock, S: ClipboardSurface + Clone>(
    terminal: &mut Terminal<B>,
    app: &mut App<C, S>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            TermEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
            TermEvent::Paste(text) => app.on_paste(&text),
            TermEvent::Resize | TermEvent::Tick => {}
        }
    }

    Ok(())
}

fn replay(path: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
    let outcome = ReplayScript::load(path).and_then(|script| run_replay(&script, config));
    match outcome {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, e).exit();
        }
    }
}

fn history(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let db = cli.open_db()?;

    if let Some(path) = &cli.export_csv {
        let entries = db.recent(usize::MAX)?;
        export_csv(&entries, std::fs::File::create(path)?)?;
        eprintln!("wrote {} results to {}", entries.len(), path.display());
    }

    if cli.history {
        let entries = db.recent(HISTORY_LIMIT)?;
        let mut out = io::stdout().lock();
        if entries.is_empty() {
            writeln!(out, "no results yet")?;
        }
        for e in entries {
            writeln!(
                out,
                "{}  {:<16} #{}  {:>3}/100  {:>3} wpm  {:>3}% acc{}",
                e.recorded_at.format("%Y-%m-%d %H:%M"),
                e.language_pair,
                e.exercise_number,
                e.final_score,
                e.wpm,
                e.accuracy,
                if e.cheat_flagged { "  flagged" } else { "" }
            )?;
        }
    }

    Ok(())
}
