//! ClickJudge CLI
//!
//! Usage:
//!   clickjudge --record                          # Score a video from the keyboard
//!   clickjudge --replay scores_ID.json           # Replay a recording in sync
//!   clickjudge --summary scores_ID.json          # Print totals and rates
//!   clickjudge --serve                           # HTTP share server
//!   clickjudge --share FILE --remote URL         # Share a recording
//!   clickjudge --fetch HASH --remote URL         # Download a shared recording

use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};

use clickjudge::core::{
    export_remote, fetch_remote, format_rate, load_document, parse_video_id, run_server, run_session,
    save_document, serialize, summarize, DirectoryStore, HttpStore, ImportedSession, Preferences,
    RemoteStore, SessionController, SessionEvent, SimulatedTransport, TokioScheduler, VideoTransport,
};
use clickjudge::error::TransferError;
use clickjudge::types::{DisplayUpdate, Mode, Session, SessionMetadata, Sign, VideoRef};
use clickjudge::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "clickjudge",
    version = VERSION,
    about = "ClickJudge - Score a video with +1/-1 clicks, replay and share the result",
    long_about = "ClickJudge records +1/-1 reactions against a video's playback time.\n\n\
                  Modes:\n  \
                  --record    Score from the keyboard (one key per character, Enter to send)\n  \
                  --replay    Replay a saved recording in sync with the video\n  \
                  --summary   Print totals and rates of a saved recording\n  \
                  --serve     HTTP share server\n  \
                  --share     Upload a recording and print its share hash\n  \
                  --fetch     Download a shared recording by hash\n\n\
                  Record mode commands:\n  \
                  :play       Toggle between scoring and playback\n  \
                  :reset      Clear all clicks\n  \
                  :name NAME  Set the judge name\n  \
                  :quit       Save and exit"
)]
struct Args {
    /// Record mode - read key presses from stdin
    #[arg(short, long)]
    record: bool,

    /// Replay a saved recording
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Print the summary of a saved recording
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Run as HTTP share server
    #[arg(short, long)]
    serve: bool,

    /// Share a saved recording
    #[arg(long, value_name = "FILE")]
    share: Option<PathBuf>,

    /// Fetch a shared recording by hash
    #[arg(long, value_name = "HASH")]
    fetch: Option<String>,

    /// Share server URL for --share/--fetch (default: local --store-dir)
    #[arg(long, value_name = "URL")]
    remote: Option<String>,

    /// Video id or URL to score
    #[arg(long)]
    video: Option<String>,

    /// Preferences file (key bindings, judge name)
    #[arg(long, default_value = "./clickjudge.json")]
    prefs: PathBuf,

    /// Directory for saved recordings
    #[arg(short, long, default_value = "./scores")]
    output: PathBuf,

    /// Simulated video length in seconds
    #[arg(long, default_value_t = 600.0)]
    duration: f64,

    /// Simulated playback speed
    #[arg(long, default_value_t = 1.0)]
    rate: f64,

    /// Directory the share server stores recordings in
    #[arg(long, default_value = "./shared")]
    store_dir: PathBuf,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    let result = if args.serve {
        run_serve(&args).await
    } else if let Some(ref path) = args.replay {
        run_replay(path, &args).await
    } else if let Some(ref path) = args.summary {
        run_summary(path, &args)
    } else if let Some(ref path) = args.share {
        run_share(path, &args).await
    } else if let Some(ref hash) = args.fetch {
        run_fetch(hash, &args).await
    } else {
        // Default to recording if no mode specified
        run_record(&args).await
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Run the share server
async fn run_serve(args: &Args) -> CliResult {
    print_header("Share Server", args.no_color);
    run_server(&args.addr, args.store_dir.clone()).await
}

/// Score a video from the keyboard
async fn run_record(args: &Args) -> CliResult {
    let prefs = Preferences::load(&args.prefs)?;
    let video = match &args.video {
        Some(input) => {
            let id = parse_video_id(input).ok_or_else(|| format!("not a video id or URL: {}", input))?;
            VideoRef::from_id(id)
        }
        None => VideoRef::default(),
    };

    let mut transport = SimulatedTransport::new(args.duration).with_rate(args.rate);
    transport.load(&video)?;
    transport.play()?;

    let session = Session::new(SessionMetadata::new(video, &prefs.judge_name, prefs.bindings()));
    let (tx, rx) = mpsc::unbounded_channel();
    let (updates, _) = broadcast::channel(64);
    let controller = SessionController::new(session, transport, TokioScheduler::new(tx.clone()));

    print_header("Record Mode", args.no_color);
    println!(
        "Press '{}' for +1 and '{}' for -1, then Enter. Type ':quit' to save and exit.",
        prefs.key_positive, prefs.key_negative
    );
    println!();

    let printer = spawn_printer(updates.subscribe(), args.json, args.no_color, None);
    let session_task = tokio::spawn(run_session(controller, rx, updates));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_record_line(&line) {
            RecordInput::Quit => break,
            RecordInput::Events(events) => {
                for event in events {
                    let _ = tx.send(event);
                }
            }
            RecordInput::Unknown(command) => {
                eprintln!("{} unknown command '{}'", "warning:".yellow().bold(), command);
            }
        }
    }

    let _ = tx.send(SessionEvent::Shutdown);
    let controller = session_task.await?;
    printer.abort();

    let mut prefs = prefs;
    prefs.judge_name = controller.session().metadata.judge_name.clone();
    prefs.save(&args.prefs)?;

    let document = controller.document();
    let path = save_document(&document, &args.output)?;
    println!();
    println!("Saved {} entries to {}", document.entries.len(), path.display());
    Ok(())
}

/// Replay a saved recording until its last entry has been passed
async fn run_replay(path: &Path, args: &Args) -> CliResult {
    let imported = load_document(path)?;
    let entry_count = imported.timeline.len();
    if entry_count == 0 {
        println!("Nothing to replay: {} has no entries", path.display());
        return Ok(());
    }
    let last_time = imported.timeline.last_time().unwrap_or(0.0);
    let prefs = Preferences::load(&args.prefs)?;

    let transport = SimulatedTransport::new(args.duration.max(last_time + 1.0)).with_rate(args.rate);
    let session = Session::new(SessionMetadata::new(
        imported.video.clone(),
        &imported.judge_name,
        prefs.bindings(),
    ));
    let (tx, rx) = mpsc::unbounded_channel();
    let (updates, _) = broadcast::channel(64);
    let controller = SessionController::new(session, transport, TokioScheduler::new(tx.clone()));

    print_header("Replay Mode", args.no_color);
    println!("Replaying {} entries of {} (Ctrl-C to stop)", entry_count, imported.video.url);
    println!();

    let printer = spawn_printer(updates.subscribe(), args.json, args.no_color, Some(tx.clone()));
    let session_task = tokio::spawn(run_session(controller, rx, updates));

    let _ = tx.send(SessionEvent::Import(imported));
    let _ = tx.send(SessionEvent::SetMode(Mode::Playback));

    let ctrl_c_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c_tx.send(SessionEvent::Shutdown);
        }
    });

    session_task.await?;
    printer.abort();
    Ok(())
}

/// Print totals of a saved recording
fn run_summary(path: &Path, args: &Args) -> CliResult {
    let imported = load_document(path)?;
    let snapshot = summarize(imported.timeline.as_slice());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let judge = if imported.judge_name.is_empty() { "(anonymous)" } else { imported.judge_name.as_str() };
    println!("Video:    {}", imported.video.url);
    println!("Judge:    {}", judge);
    println!("Entries:  {}", imported.timeline.len());
    println!("Span:     {:.2}s", snapshot.total_span);
    println!(
        "Positive: {} ({})",
        format!("+{}", snapshot.positive_sum).green(),
        format_rate(snapshot.positive_sum, snapshot.total_span)
    );
    println!(
        "Negative: {} ({})",
        snapshot.negative_sum.to_string().red(),
        format_rate(snapshot.negative_sum, snapshot.total_span)
    );
    println!(
        "Total:    {} ({})",
        snapshot.total().to_string().bold(),
        format_rate(snapshot.total(), snapshot.total_span)
    );
    Ok(())
}

/// Upload a saved recording
async fn run_share(path: &Path, args: &Args) -> CliResult {
    let imported = load_document(path)?;
    let mut session = session_from(imported);

    let (hash, link) = match &args.remote {
        Some(url) => {
            let store = HttpStore::new(url.as_str());
            let hash = export_remote(&store, &mut session).await?;
            let link = store.share_url(&hash);
            (hash, link)
        }
        None => {
            let store = DirectoryStore::new(&args.store_dir);
            let hash = export_remote(&store, &mut session).await?;
            let link = store.dir().join(format!("{}.json", hash)).display().to_string();
            (hash, link)
        }
    };

    // Keep the hash with the local copy too
    save_document(&serialize(&session), &args.output)?;
    info!(%hash, "shared");

    if args.json {
        println!("{}", serde_json::json!({ "hash": hash, "url": link }));
    } else {
        println!("Share hash: {}", hash.bold());
        println!("Link:       {}", link);
    }
    Ok(())
}

/// Download a shared recording into the output directory
async fn run_fetch(hash: &str, args: &Args) -> CliResult {
    let imported = match &args.remote {
        Some(url) => fetch_from(&HttpStore::new(url.as_str()), hash).await?,
        None => fetch_from(&DirectoryStore::new(&args.store_dir), hash).await?,
    };
    let path = save_document(&imported.to_document(), &args.output)?;
    println!(
        "Fetched {} entries for {} into {}",
        imported.timeline.len(),
        imported.video.id,
        path.display()
    );
    Ok(())
}

async fn fetch_from<S: RemoteStore>(store: &S, hash: &str) -> Result<ImportedSession, TransferError> {
    fetch_remote(store, hash).await
}

/// Session holding an imported recording
fn session_from(imported: ImportedSession) -> Session {
    let ImportedSession {
        video,
        judge_name,
        share_hash,
        timeline,
    } = imported;
    let mut session = Session::new(SessionMetadata::new(video, &judge_name, Default::default()));
    session.metadata.share_hash = share_hash;
    session.timeline = timeline;
    session
}

/// One line typed in record mode
#[derive(Debug, PartialEq)]
enum RecordInput {
    Quit,
    Events(Vec<SessionEvent>),
    Unknown(String),
}

/// `:` lines are commands, `+`/`-` are the on-screen buttons, anything else
/// is one key press per character
fn parse_record_line(line: &str) -> RecordInput {
    let line = line.trim();
    let event = match line {
        "" => return RecordInput::Events(Vec::new()),
        ":quit" | ":exit" => return RecordInput::Quit,
        ":play" => SessionEvent::ToggleMode,
        ":reset" => SessionEvent::Reset,
        "+" => SessionEvent::Click(Sign::Positive),
        "-" => SessionEvent::Click(Sign::Negative),
        _ => match line.strip_prefix(":name") {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                SessionEvent::SetJudgeName(rest.trim().to_string())
            }
            _ if line.starts_with(':') => return RecordInput::Unknown(line.to_string()),
            _ => {
                return RecordInput::Events(
                    line.chars().map(|key| SessionEvent::Key(key.to_string())).collect(),
                )
            }
        },
    };
    RecordInput::Events(vec![event])
}

/// Tracks a replay run through its display updates
#[derive(Debug, Default)]
struct ReplayWatch {
    started: bool,
}

impl ReplayWatch {
    /// True once the cursor has passed every entry, or once a started run
    /// has gone back to idle (forced stop)
    fn finished(&mut self, update: &DisplayUpdate) -> bool {
        if update.mode != Mode::Playback {
            return false;
        }
        match update.cursor {
            Some(cursor) => {
                self.started = true;
                cursor >= update.entry_count
            }
            None => self.started,
        }
    }
}

/// Print display updates. In replay mode, `done` is told to shut the session
/// down once the run is over.
fn spawn_printer(
    mut rx: broadcast::Receiver<DisplayUpdate>,
    json: bool,
    no_color: bool,
    done: Option<mpsc::UnboundedSender<SessionEvent>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last: Option<(Mode, Option<usize>, i64, i64)> = None;
        let mut watch = ReplayWatch::default();
        loop {
            let update = match rx.recv().await {
                Ok(update) => update,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };

            if let Some(tx) = &done {
                if watch.finished(&update) {
                    let _ = tx.send(SessionEvent::Shutdown);
                }
            }

            // Ticks that did not move the cursor print nothing
            let key = (
                update.mode,
                update.cursor,
                update.summary.positive_sum,
                update.summary.negative_sum,
            );
            if last == Some(key) {
                continue;
            }
            last = Some(key);

            if json {
                println!("{}", serde_json::to_string(&update).unwrap_or_default());
            } else if no_color {
                println!("{}", update.to_parseable_string());
            } else {
                println!("{}", update.to_terminal_string());
            }

        }
    })
}

/// Print header
fn print_header(mode: &str, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  ClickJudge v{} - {}", VERSION, mode);
        println!("========================================");
    } else {
        println!("{}", "========================================".bold());
        println!("{}", format!("  ClickJudge v{} - {}", VERSION, mode).bold());
        println!("{}", "========================================".bold());
    }
    println!();
}

// =============================================================================
// TESTS
// =============================================================================
