use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keypace::{
    app::{App, Flow},
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    controller::TerminalController,
    corpus::Corpus,
    runtime::{CrosstermEventSource, EventSource, Runner},
    surface::{CellGrid, InputBuffer, MetricsBoard},
    ticker::{ThreadTicker, TickScheduler},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing::{info, Level};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// minimal typing speed practice with live wpm and accuracy
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// custom prompt to type instead of a corpus sentence
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// JSON file holding an array of sentences to pick from
    #[clap(short = 'c', long)]
    corpus: Option<PathBuf>,

    /// type generated nonsense sentences instead of a fixed corpus
    #[clap(short = 'g', long)]
    generated: bool,

    /// how often live wpm refreshes, in milliseconds
    #[clap(long)]
    tick_ms: Option<u64>,

    /// read settings from this file instead of the default config location
    #[clap(long)]
    config: Option<PathBuf>,

    /// write diagnostic logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// log at debug level (implies a log file)
    #[clap(long)]
    debug: bool,

    /// persist the effective settings to the config file and continue
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command line flags over file settings
    fn apply(&self, mut config: Config) -> Config {
        if let Some(ms) = self.tick_ms {
            config.tick_interval_ms = ms;
        }
        if let Some(path) = &self.corpus {
            config.corpus_path = Some(path.clone());
        }
        if self.generated {
            config.generated = true;
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        } else if self.debug && config.log_file.is_none() {
            config.log_file = Some(AppDirs::log_path());
        }
        config
    }

    fn store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map_or_else(FileConfigStore::new, FileConfigStore::with_path)
    }
}

fn resolve_corpus(cli: &Cli, config: &Config) -> keypace::Result<Corpus> {
    if let Some(prompt) = &cli.prompt {
        return Corpus::single(prompt);
    }
    if let Some(path) = &config.corpus_path {
        return Corpus::from_file(path);
    }
    if config.generated {
        return Ok(Corpus::Generated);
    }
    Corpus::builtin()
}

fn init_logging(config: &Config, debug: bool) -> Result<(), Box<dyn Error>> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_max_level(if debug { Level::DEBUG } else { Level::INFO })
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = cli.store();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
    }

    init_logging(&config, cli.debug)?;
    let corpus = resolve_corpus(&cli, &config)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    info!(config = %store.path().display(), "starting");

    let runner = Runner::new(CrosstermEventSource::new(), POLL_INTERVAL);
    let session = TerminalController::new(
        corpus,
        CellGrid::new(),
        InputBuffer::new(),
        MetricsBoard::default(),
        SystemClock,
        ThreadTicker::new(runner.sender()),
    )
    .with_tick_interval(config.tick_interval());
    let mut app = App::new(session);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B, E, T>(
    terminal: &mut Terminal<B>,
    app: &mut App<SystemClock, T>,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    E: EventSource,
    T: TickScheduler,
{
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    // a dead input reader arrives as `InputClosed`, which quits
    loop {
        let Some(event) = runner.step() else {
            continue;
        };

        if app.handle_event(event) == Flow::Quit {
            break;
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    info!("exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use keypace::{
        app::AppState,
        runtime::{SessionEvent, TestEventSource},
        ticker::ManualTicks,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use tempfile::tempdir;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["keypace"]);

        assert_eq!(cli.prompt, None);
        assert_eq!(cli.corpus, None);
        assert!(!cli.generated);
        assert_eq!(cli.tick_ms, None);
        assert!(!cli.debug);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_custom_prompt() {
        let cli = Cli::parse_from(["keypace", "-p", "hello world"]);
        assert_eq!(cli.prompt, Some("hello world".to_string()));

        let cli = Cli::parse_from(["keypace", "--prompt", "custom text"]);
        assert_eq!(cli.prompt, Some("custom text".to_string()));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "keypace",
            "--tick-ms",
            "250",
            "--corpus",
            "/tmp/s.json",
            "-g",
            "--log-file",
            "/tmp/k.log",
        ]);
        let config = cli.apply(Config::default());

        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.corpus_path, Some(PathBuf::from("/tmp/s.json")));
        assert!(config.generated);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/k.log")));
    }

    #[test]
    fn test_cli_keeps_config_when_flags_absent() {
        let cli = Cli::parse_from(["keypace"]);
        let file = Config {
            tick_interval_ms: 500,
            generated: true,
            ..Config::default()
        };
        assert_eq!(cli.apply(file.clone()), file);
    }

    #[test]
    fn test_debug_implies_log_file() {
        let cli = Cli::parse_from(["keypace", "--debug"]);
        let config = cli.apply(Config::default());
        assert_eq!(config.log_file, Some(AppDirs::log_path()));
    }

    #[test]
    fn test_resolve_corpus_precedence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        fs::write(&path, r#"["from file"]"#).unwrap();

        let cli = Cli::parse_from(["keypace", "-p", "from prompt"]);
        let config = Config {
            corpus_path: Some(path.clone()),
            generated: true,
            ..Config::default()
        };
        let corpus = resolve_corpus(&cli, &config).unwrap();
        assert_eq!(corpus.select_random_text(), "from prompt");

        let cli = Cli::parse_from(["keypace"]);
        let corpus = resolve_corpus(&cli, &config).unwrap();
        assert_eq!(corpus.select_random_text(), "from file");

        let config = Config {
            generated: true,
            ..Config::default()
        };
        assert_eq!(resolve_corpus(&cli, &config).unwrap(), Corpus::Generated);

        let corpus = resolve_corpus(&cli, &Config::default()).unwrap();
        assert_eq!(corpus.len(), Some(5));
    }

    #[test]
    fn test_resolve_corpus_rejects_blank_prompt() {
        let cli = Cli::parse_from(["keypace", "-p", "   "]);
        assert_matches!(
            resolve_corpus(&cli, &Config::default()),
            Err(keypace::Error::EmptyPrompt)
        );
    }

    #[test]
    fn test_store_uses_config_flag() {
        let cli = Cli::parse_from(["keypace", "--config", "/tmp/other.json"]);
        assert_eq!(cli.store().path(), PathBuf::from("/tmp/other.json").as_path());
    }

    #[test]
    fn test_start_tui_runs_until_escape() {
        let session = keypace::controller::SessionController::new(
            Corpus::single("hi").unwrap(),
            CellGrid::new(),
            InputBuffer::new(),
            MetricsBoard::default(),
            SystemClock,
            ManualTicks::new(),
        );
        let mut app = App::new(session);
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let runner = Runner::new(TestEventSource::new(), Duration::from_millis(5));

        let tx = runner.sender();
        for code in [KeyCode::Char('h'), KeyCode::Char('i'), KeyCode::Esc] {
            tx.send(SessionEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
                .unwrap();
        }

        start_tui(&mut terminal, &mut app, &runner).unwrap();
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.session.metrics().accuracy, 100);
    }

    #[test]
    fn test_start_tui_stops_when_input_closes() {
        let session = keypace::controller::SessionController::new(
            Corpus::single("hello").unwrap(),
            CellGrid::new(),
            InputBuffer::new(),
            MetricsBoard::default(),
            SystemClock,
            ManualTicks::new(),
        );
        let mut app = App::new(session);
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let runner = Runner::new(TestEventSource::new(), Duration::from_millis(5));

        let tx = runner.sender();
        tx.send(SessionEvent::Key(KeyEvent::new(
            KeyCode::Char('h'),
            KeyModifiers::NONE,
        )))
        .unwrap();
        tx.send(SessionEvent::InputClosed).unwrap();

        start_tui(&mut terminal, &mut app, &runner).unwrap();
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.state().typed_count, 1);
    }

    #[test]
    fn test_init_logging_without_file_is_noop() {
        assert!(init_logging(&Config::default(), false).is_ok());
    }

    // the only test that installs the global subscriber
    #[test]
    fn test_init_logging_writes_to_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("keypace.log");
        let config = Config {
            log_file: Some(path.clone()),
            ..Config::default()
        };

        init_logging(&config, true).unwrap();
        tracing::info!(marker = "log-file-check", "hello");

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("log-file-check"));
    }
}
