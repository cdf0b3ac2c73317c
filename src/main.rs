use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_i18n::t;
use tracing::info;

use lusodrill::app::{App, OpenLessonError};
use lusodrill::config::Config;
use lusodrill::error::DrillError;
use lusodrill::lesson::Lesson;
use lusodrill::lesson::bundled::BundledLessons;
use lusodrill::session::compiler;
use lusodrill::session::controller::{AdvanceResult, PairSide, PairingOutcome, SessionController};
use lusodrill::session::drill::DrillKind;
use lusodrill::session::result::LessonSummary;
use lusodrill::telemetry;
use lusodrill::ui::command::{self, Command};
use lusodrill::ui::render;

rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(
    name = "lusodrill",
    version,
    about = "European Portuguese drills for Chinese speakers"
)]
struct Cli {
    #[arg(short, long, help = "Interface language (zh-CN, en)")]
    locale: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the learning path with streak and gems
    List,
    /// Play a lesson (defaults to the current one)
    Play {
        id: Option<String>,
        #[arg(long, help = "Seed for option and token order")]
        seed: Option<u64>,
        #[arg(long, help = "Ask for a freshly generated lesson")]
        refresh: bool,
    },
    /// Compile a lesson JSON file and print its drill queue
    Compile {
        path: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the saved progress record
    Progress,
    /// Clear progress and lesson history
    Reset,
}

enum Flow {
    Stay,
    Unknown,
    Quit,
    Finished(LessonSummary),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(locale) = cli.locale {
        config.locale = locale;
        config.validate();
    }
    telemetry::init_tracing(&config.log_filter);
    rust_i18n::set_locale(&config.locale);

    match cli.command.unwrap_or(Commands::List) {
        Commands::Compile { path, seed } => compile_file(&path, seed),
        Commands::List => {
            let app = App::new(config);
            println!("{}\n", t!("app.tagline"));
            print!(
                "{}",
                render::render_curriculum(&app.lesson_statuses(), &app.progress, app.gems())
            );
            Ok(())
        }
        Commands::Progress => {
            let app = App::new(config);
            println!("{}", serde_json::to_string_pretty(&app.progress)?);
            Ok(())
        }
        Commands::Reset => {
            let mut app = App::new(config);
            app.reset()?;
            println!("{}", t!("app.reset_done"));
            Ok(())
        }
        Commands::Play { id, seed, refresh } => {
            let mut app = App::new(config);
            let id = id.unwrap_or_else(|| app.progress.current_lesson_id.clone());
            if !BundledLessons::contains(&id) {
                println!("{}", t!("app.loading"));
            }
            let session = match app.open_lesson(&id, seed, refresh) {
                Ok(session) => session,
                Err(OpenLessonError::Locked(id)) => bail!("{}", t!("app.locked", id = id)),
                Err(OpenLessonError::UnknownLesson(id)) => {
                    bail!("{}", t!("app.unknown_lesson", id = id))
                }
                Err(e) => bail!("{}", t!("app.load_failed", error = e)),
            };
            run_session(&mut app, session)
        }
    }
}

fn compile_file(path: &Path, seed: Option<u64>) -> Result<()> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let lesson = Lesson::from_json(&json)?;
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let queue = compiler::compile(&lesson, &mut rng)?;
    info!(lesson = %lesson.id, kinds = ?queue.kind_counts(), "compiled lesson");
    println!("{}", serde_json::to_string_pretty(&queue)?);
    Ok(())
}

fn run_session(app: &mut App, mut session: SessionController) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    loop {
        writeln!(stdout, "\n{}", render::render_drill(&session))?;
        write!(stdout, "> ")?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        let command = command::parse(&line, &session.current()?.kind);

        match handle_command(app, &mut session, command) {
            Ok(Flow::Stay) => {}
            Ok(Flow::Unknown) => writeln!(stdout, "{}", t!("app.unknown_command"))?,
            Ok(Flow::Quit) => {
                writeln!(stdout, "{}", t!("app.quit"))?;
                return Ok(());
            }
            Ok(Flow::Finished(summary)) => {
                app.complete(summary.clone());
                writeln!(
                    stdout,
                    "\n{}",
                    render::render_summary(&summary, &app.progress, app.gems())
                )?;
                return Ok(());
            }
            Err(e) => writeln!(stdout, "{}", t!("app.rejected", error = e))?,
        }
    }
}

fn handle_command(
    app: &App,
    session: &mut SessionController,
    command: Command,
) -> Result<Flow, DrillError> {
    match command {
        Command::Select(i) => session.submit_selection(i)?,
        Command::Place(i) => session.submit_token(i)?,
        Command::Retract(i) => {
            session.retract_token(i)?;
        }
        Command::PairTarget(i) | Command::PairNative(i) => {
            let (side, key) = pair_key(session, command, i)?;
            if session.submit_pairing_selection(side, &key)? == PairingOutcome::Mismatched {
                println!("❌ {}", t!("feedback.incorrect"));
            }
        }
        Command::Check => {
            session.check()?;
        }
        Command::Continue => {
            let needs_check = session.current()?.kind.requires_check();
            if needs_check && !session.feedback_visible() {
                session.check()?;
            } else if let AdvanceResult::Completed(summary) = session.advance()? {
                return Ok(Flow::Finished(summary));
            }
        }
        Command::Speak => {
            if let Some(text) = session.current()?.speakable() {
                app.voices.speak(text);
            }
        }
        Command::Quit => return Ok(Flow::Quit),
        Command::Unknown => return Ok(Flow::Unknown),
    }
    Ok(Flow::Stay)
}

/// Resolve a typed row number to the term shown in that row.
fn pair_key(
    session: &SessionController,
    command: Command,
    row: usize,
) -> Result<(PairSide, String), DrillError> {
    let drill = session.current()?;
    let DrillKind::Pairing(set) = &drill.kind else {
        return Err(DrillError::KindMismatch {
            action: "pair",
            kind: drill.kind.name(),
        });
    };
    let out_of_range = DrillError::OutOfRange {
        what: "pair row",
        position: row,
    };
    match command {
        Command::PairTarget(_) => set
            .pairs
            .get(row)
            .map(|p| (PairSide::Target, p.target.clone()))
            .ok_or(out_of_range),
        _ => set
            .natives_sorted()
            .get(row)
            .map(|n| (PairSide::Native, n.to_string()))
            .ok_or(out_of_range),
    }
}
