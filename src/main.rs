//! CycleTraining - terminal front end
//!
//! Main entry point for the application.

use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crossbeam::channel::Receiver;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cycletraining::sensors::{PowerFeed, PowerSink, SimulatedPowerMeter, UnsupportedTransport};
use cycletraining::storage::config::{
    get_config_path, load_config, load_config_from, save_config_to, AppConfig, RiderSettings,
};
use cycletraining::workouts::format::{bar_colors, format_time, target_text};
use cycletraining::workouts::library::{self, SAMPLE_ZWO};
use cycletraining::workouts::{
    parse_zwo_file, write_plan, HandoffSlot, PlaybackStatus, RideSession, Segment, SessionView,
    TickSource, Workout, WorkoutPlan,
};

const BAND_WIDTH_CHARS: usize = 40;

const RIDE_HELP: &str = "Commands: p pause/resume, s <n> jump to segment n, r reset, q quit";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the segments of a .zwo file
    Show {
        file: PathBuf,

        /// FTP in watts (0 shows percentages only)
        #[arg(long)]
        ftp: Option<u16>,
    },
    /// Play a workout in real time
    Ride {
        /// Workout file; defaults to the pending library workout, then the sample
        file: Option<PathBuf>,

        #[arg(long)]
        ftp: Option<u16>,

        /// Feed a simulated power meter around this wattage
        #[arg(long)]
        simulate_watts: Option<i16>,
    },
    /// Browse the built-in library
    Library {
        #[command(subcommand)]
        action: LibraryCommand,
    },
    /// Print the ZWO XML for a plan file (.toml or .json)
    Build {
        plan: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the current settings
    Show,
    /// Save a new FTP in watts
    SetFtp { watts: u16 },
}

#[derive(Subcommand, Debug)]
enum LibraryCommand {
    /// List library workouts
    List {
        #[arg(long)]
        ftp: Option<u16>,
    },
    /// Show one workout's segments
    Show {
        id: String,

        #[arg(long)]
        ftp: Option<u16>,
    },
    /// Queue a workout for the next `ride`
    Queue { id: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Starting CycleTraining v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = load_config().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    match args.command {
        Commands::Show { file, ftp } => {
            let ftp = resolve_ftp(ftp, &config)?;
            let workout = parse_zwo_file(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            print_workout(&workout, ftp);
        }
        Commands::Ride {
            file,
            ftp,
            simulate_watts,
        } => {
            let ftp = resolve_ftp(ftp, &config)?;
            ride(file.as_deref(), ftp, simulate_watts, &config)?;
        }
        Commands::Library { action } => match action {
            LibraryCommand::List { ftp } => {
                let ftp = resolve_ftp(ftp, &config)?;
                for plan in library::all() {
                    println!("{:<18} {}", plan.id, plan.name);
                    println!("{:<18} {}", "", library::summary_line(&plan, ftp));
                }
            }
            LibraryCommand::Show { id, ftp } => {
                let ftp = resolve_ftp(ftp, &config)?;
                let plan = library::find(&id)
                    .with_context(|| format!("No library workout with id '{}'", id))?;
                print_plan(&plan, ftp);
            }
            LibraryCommand::Queue { id } => {
                let slot = HandoffSlot::default_location();
                let plan = library::queue(&id, &slot)?;
                println!("Queued '{}'. Run `ride` to start it.", plan.name);
            }
        },
        Commands::Build { plan, output } => {
            let plan = WorkoutPlan::from_file(&plan)
                .with_context(|| format!("Failed to read plan {}", plan.display()))?;
            let xml = write_plan(&plan)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, xml)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => println!("{}", xml),
            }
        }
        Commands::Config { action } => match action {
            ConfigCommand::Show => {
                println!("# {}", get_config_path().display());
                print!(
                    "{}",
                    toml::to_string_pretty(&config).context("Failed to format config")?
                );
            }
            ConfigCommand::SetFtp { watts } => {
                let path = get_config_path();
                update_ftp(&path, watts)?;
                println!("FTP set to {} W ({})", watts, path.display());
            }
        },
    }

    Ok(())
}

/// FTP from the command line, falling back to the config. 0 leaves FTP unset.
fn resolve_ftp(flag: Option<u16>, config: &AppConfig) -> anyhow::Result<u16> {
    match flag {
        None => Ok(config.rider.ftp),
        Some(0) => Ok(0),
        Some(ftp) if RiderSettings::validate_ftp(ftp) => Ok(ftp),
        Some(ftp) => bail!("FTP must be between 50 and 600 watts (got {})", ftp),
    }
}

/// Validate and persist a new FTP in the config file at `path`.
fn update_ftp(path: &Path, watts: u16) -> anyhow::Result<AppConfig> {
    let mut config = load_config_from(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    config.rider.set_ftp(watts).map_err(anyhow::Error::msg)?;
    save_config_to(path, &config)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(config)
}

fn print_workout(workout: &Workout, ftp: u16) {
    println!("{} by {}", workout.name(), workout.author());
    if !workout.description().is_empty() {
        println!("{}", workout.description());
    }
    println!("Total: {}", format_time(workout.total_duration_sec()));

    let color = std::io::stdout().is_terminal();
    for (i, segment) in workout.segments().iter().enumerate() {
        println!(
            "{:>3}. {}{:<24} {:>6}  {}",
            i + 1,
            zone_swatch(segment, color),
            segment.label,
            format_time(segment.duration_sec),
            target_text(segment, ftp)
        );
    }
}

fn print_plan(plan: &WorkoutPlan, ftp: u16) {
    println!("{} ({})", plan.name, plan.focus);
    println!("{}", plan.description);
    println!("{}", library::summary_line(plan, ftp));
    for interval in &plan.intervals {
        println!("  - {}", interval.describe());
    }
    println!();
    print_workout(&plan.to_workout(), ftp);
}

fn ride(
    file: Option<&Path>,
    ftp: u16,
    simulate_watts: Option<i16>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let sink = PowerSink::new();
    let mut session = RideSession::new(sink.clone(), ftp);

    match file {
        Some(path) => {
            let workout = parse_zwo_file(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            session.load_workout(workout);
        }
        None => {
            let slot = HandoffSlot::default_location();
            if session.load_pending(&slot)?.is_none() {
                session.load_xml(SAMPLE_ZWO)?;
            }
        }
    }

    let mut feed = PowerFeed::new(sink);
    // The meter thread stops when this is dropped
    let mut meter = simulate_watts.map(SimulatedPowerMeter::new);
    let status = match meter.as_mut() {
        Some(meter) => feed.connect(meter).to_string(),
        None => feed.connect(&mut UnsupportedTransport).to_string(),
    };
    println!("{}", status);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")?;

    println!("{}", RIDE_HELP);
    let commands = spawn_input_reader();

    let result = runtime.block_on(ride_loop(&mut session, &mut feed, &commands, config));
    if let Some(meter) = meter.as_mut() {
        meter.stop();
    }
    result
}

async fn ride_loop(
    session: &mut RideSession,
    feed: &mut PowerFeed,
    commands: &Receiver<RideCommand>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(config.playback.tick_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    session.clock_mut().start()?;
    let mut last_second = -1i64;

    loop {
        interval.tick().await;
        feed.pump();

        let mut controlled = false;
        while let Ok(command) = commands.try_recv() {
            if !apply_command(session, command)? {
                println!("Ride stopped.");
                return Ok(());
            }
            controlled = true;
        }

        let outcome = session.clock_mut().poll();

        let second = session.clock().state().total_elapsed.floor() as i64;
        if controlled || outcome.segments_advanced > 0 || second != last_second || outcome.finished
        {
            last_second = second;
            print_status(&session.view(), config.display.show_band);
        }

        if session.clock().is_finished() {
            break;
        }
    }

    println!("Workout complete.");
    Ok(())
}

/// Keyboard control during a ride, one command per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RideCommand {
    TogglePause,
    /// Zero-based segment index
    Seek(usize),
    Reset,
    Quit,
}

impl RideCommand {
    /// Parse `p`, `r`, `q` or `s <n>`, where `n` counts segments from 1.
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = match (parts.next()?, parts.next()) {
            ("p", None) => RideCommand::TogglePause,
            ("r", None) => RideCommand::Reset,
            ("q", None) => RideCommand::Quit,
            ("s", Some(n)) => RideCommand::Seek(n.parse::<usize>().ok()?.checked_sub(1)?),
            _ => return None,
        };

        if parts.next().is_some() {
            return None;
        }
        Some(command)
    }
}

/// Read commands from stdin on a dedicated thread.
fn spawn_input_reader() -> Receiver<RideCommand> {
    let (tx, rx) = crossbeam::channel::unbounded();

    let spawned = std::thread::Builder::new()
        .name("ride-input".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match RideCommand::parse(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command '{}'. {}", line.trim(), RIDE_HELP),
                }
            }
        });

    if let Err(e) = spawned {
        tracing::warn!("Keyboard controls unavailable: {}", e);
    }
    rx
}

/// Apply one command to the session. Returns false when the ride should stop.
fn apply_command<T: TickSource>(
    session: &mut RideSession<T>,
    command: RideCommand,
) -> anyhow::Result<bool> {
    let clock = session.clock_mut();
    match command {
        RideCommand::TogglePause => {
            if clock.status() == PlaybackStatus::Running {
                clock.pause();
            } else {
                clock.start()?;
            }
        }
        RideCommand::Seek(index) => {
            if !clock.seek(index) {
                println!("No segment {}", index + 1);
            }
        }
        RideCommand::Reset => clock.reset(),
        RideCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn print_status(view: &SessionView, show_band: bool) {
    println!(
        "[{}] {:<24} target {:<26} actual {:<8} {} ({}%)",
        view.status,
        view.segment_label,
        view.power_label,
        view.actual_label,
        view.time_label,
        view.progress_pct
    );

    if show_band && view.band.actual_active {
        println!("    {}  {}", band_line(view), view.range_label);
    }
}

/// Text rendition of the target band: `=` for the band, `|` for live power.
fn band_line(view: &SessionView) -> String {
    let to_col = |pct: f64| ((pct / 100.0) * (BAND_WIDTH_CHARS - 1) as f64).round() as usize;
    let start = to_col(view.band.left_pct);
    let end = to_col((view.band.left_pct + view.band.width_pct).min(100.0));
    let marker = to_col(view.band.actual_pct);

    (0..BAND_WIDTH_CHARS)
        .map(|col| {
            if col == marker {
                '|'
            } else if (start..=end).contains(&col) {
                '='
            } else {
                '.'
            }
        })
        .collect()
}

/// Start and end zone colors of a segment as two terminal cells.
fn zone_swatch(segment: &Segment, color: bool) -> String {
    if !color {
        return String::new();
    }
    let (start, end) = bar_colors(segment);
    format!("{}{} ", ansi_block(start), ansi_block(end))
}

fn ansi_block(hex: &str) -> String {
    match hex_rgb(hex) {
        Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m█\x1b[0m", r, g, b),
        None => " ".to_string(),
    }
}

/// `#rrggbb` to its channels.
fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
