use anyhow::{Context, Result};
use clap::Parser;
use piedrill::catalog::{self, Difficulty, Opening};
use piedrill::terminal::{self, Command, Details};
use piedrill::CozyOracle;
use piedrill::trainer::{FailurePolicy, Trainer, TrainerParams};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Practice chess openings against a scripted opponent", long_about = None)]
struct Args {
    /// Opening id to practice (see --list)
    #[arg(long)]
    opening: Option<String>,

    /// List openings and exit
    #[arg(long)]
    list: bool,

    /// Show an opening's line and final position, then exit
    #[arg(long, value_name = "ID")]
    show: Option<String>,

    /// Filter the listing by name or ECO code
    #[arg(long)]
    search: Option<String>,

    /// Filter the listing by difficulty: beginner, intermediate, advanced
    #[arg(long)]
    difficulty: Option<String>,

    /// Practice a random opening from the (filtered) catalog
    #[arg(long)]
    random: bool,

    /// Load openings from a JSON file instead of the built-in catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Delay before the scripted reply, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Fail the session after this many wrong moves
    #[arg(long)]
    max_mistakes: Option<u32>,

    /// Do not reveal the expected move after a mistake
    #[arg(long)]
    hide_answers: bool,

    /// Print snapshots as JSON lines instead of drawing the board
    #[arg(long)]
    json: bool,
}

enum Event {
    Line(String),
    Eof,
}

fn present<O: piedrill::PositionOracle>(trainer: &Trainer<O>, args: &Args, show_hint: bool) -> Result<()> {
    let snap = trainer.snapshot();
    let hint = if show_hint { trainer.hint() } else { None };
    let mut out = io::stdout().lock();
    if args.json {
        writeln!(out, "{}", terminal::json_frame(&snap, hint)?)?;
    } else {
        writeln!(out, "\n{}", terminal::render_board(&snap, hint))?;
        write!(out, "{}", terminal::status_panel(&snap))?;
        if let Some(h) = hint {
            writeln!(out, "Hint: {} ({}-{})", h.algebraic, h.from, h.to)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn show(args: &Args, openings: &[Opening], id: &str) -> Result<()> {
    let opening = catalog::find(openings, id).with_context(|| format!("unknown opening `{id}` (see --list)"))?;
    let details = Details::new(&CozyOracle, opening).with_context(|| format!("opening `{id}` does not compile"))?;
    if args.json {
        println!("{}", serde_json::to_string(&details)?);
    } else {
        print!("{}", terminal::details_panel(&details));
    }
    Ok(())
}

fn choose<'a>(args: &Args, openings: &'a [Opening]) -> Result<Option<&'a Opening>> {
    let difficulty = args.difficulty.as_deref().map(str::parse::<Difficulty>).transpose()?;
    let listed = catalog::filter(openings, args.search.as_deref().unwrap_or(""), difficulty);
    if args.list || (args.opening.is_none() && !args.random) {
        for o in &listed {
            println!("{}", terminal::opening_line(o));
        }
        if listed.is_empty() {
            println!("No openings found matching your criteria.");
        }
        return Ok(None);
    }
    if let Some(id) = &args.opening {
        return catalog::find(openings, id).map(Some).with_context(|| format!("unknown opening `{id}` (see --list)"));
    }
    if args.random {
        let pool: Vec<Opening> = listed.into_iter().cloned().collect();
        let mut rng = SmallRng::from_entropy();
        return catalog::pick_random(&pool, &mut rng)
            .and_then(|o| catalog::find(openings, &o.id))
            .map(Some)
            .context("no opening matches the filters");
    }
    Ok(None)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let openings = match &args.catalog {
        Some(path) => catalog::load_json(path).with_context(|| format!("loading {}", path.display()))?,
        None => catalog::get_chess_openings(),
    };
    if let Some(id) = &args.show {
        return show(&args, &openings, id);
    }
    let Some(opening) = choose(&args, &openings)?.cloned() else {
        return Ok(());
    };

    let params = TrainerParams {
        reply_delay: Duration::from_millis(args.delay_ms),
        failure_policy: args.max_mistakes.map_or(FailurePolicy::Never, FailurePolicy::MistakeLimit),
        reveal_expected: !args.hide_answers,
    };
    let mut trainer = Trainer::cozy(opening, params);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(l) => if tx.send(Event::Line(l)).is_err() { return; },
                Err(_) => break,
            }
        }
        let _ = tx.send(Event::Eof);
    });

    if !args.json { println!("{}", terminal::HELP); }
    present(&trainer, &args, false)?;
    loop {
        let event = match trainer.reply_due() {
            Some(due) => match rx.recv_timeout(due.saturating_duration_since(Instant::now())) {
                Ok(ev) => Some(ev),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(ev) => Some(ev),
                Err(_) => break,
            },
        };
        let line = match event {
            None => {
                if trainer.tick(Instant::now()).is_some() { present(&trainer, &args, false)?; }
                continue;
            }
            Some(Event::Eof) => break,
            Some(Event::Line(line)) => line,
        };
        match terminal::parse_command(&line) {
            Some(Command::Move(from, to)) => {
                trainer.submit_move(from, to);
                present(&trainer, &args, false)?;
            }
            Some(Command::Hint) => present(&trainer, &args, true)?,
            Some(Command::Restart) => {
                trainer.reset();
                present(&trainer, &args, false)?;
            }
            Some(Command::Moves) if args.json => println!("{}", terminal::json_turns(&trainer.snapshot())?),
            Some(Command::Moves) => println!("{}", terminal::move_list(&trainer.snapshot())),
            Some(Command::Help) if args.json => println!("{}", serde_json::json!({ "help": terminal::HELP })),
            Some(Command::Help) => println!("{}", terminal::HELP),
            Some(Command::Quit) => break,
            None if line.trim().is_empty() => {}
            None if args.json => println!("{}", serde_json::json!({ "error": format!("unrecognised input `{}`", line.trim()) })),
            None => println!("Unrecognised input `{}`. {}", line.trim(), terminal::HELP),
        }
    }
    Ok(())
}
