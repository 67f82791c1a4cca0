use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use loopsift::filter::{FilterState, NumericRange};
use loopsift::ingest::SetId;
use loopsift::sort::{SortDirection, SortKey};
use loopsift::synth::{session_events, NodeCount, SynthCfg};
use loopsift::{Diagnostics, Explorer, ViewSummary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

mod session;

#[derive(Parser)]
#[command(name = "loopsift")]
#[command(about = "Replay route-candidate sessions through the filter core")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Replay a JSON-lines event log and print the resulting view as JSON
    Replay {
        #[arg(long)]
        events: PathBuf,
        /// Saved filter preferences (JSON `FilterState`); flags below override it
        #[arg(long)]
        prefs: Option<PathBuf>,
        #[arg(long)]
        distance_min: Option<f64>,
        #[arg(long)]
        distance_max: Option<f64>,
        #[arg(long)]
        difficulty_min: Option<f64>,
        #[arg(long)]
        difficulty_max: Option<f64>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        #[arg(long)]
        descending: bool,
        /// Select this set instead of the last one created
        #[arg(long)]
        set: Option<String>,
        #[arg(long)]
        cursor: Option<usize>,
    },
    /// Write a seeded synthetic session as JSON lines
    Synth {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 30)]
        count: usize,
        #[arg(long, default_value_t = 20_000)]
        node_space: u64,
        #[arg(long, default_value = "synth")]
        set_id: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the library version
    Report,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Arrival,
    Distance,
    LoopDistance,
    LoopRatio,
    Turns,
    Climb,
    Difficulty,
    NodeCount,
    SpatialFlow,
}

impl From<SortArg> for SortKey {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Arrival => SortKey::Arrival,
            SortArg::Distance => SortKey::Distance,
            SortArg::LoopDistance => SortKey::LoopDistance,
            SortArg::LoopRatio => SortKey::LoopRatio,
            SortArg::Turns => SortKey::Turns,
            SortArg::Climb => SortKey::Climb,
            SortArg::Difficulty => SortKey::Difficulty,
            SortArg::NodeCount => SortKey::NodeCount,
            SortArg::SpatialFlow => SortKey::SpatialFlow,
        }
    }
}

/// Flag overrides layered over the prefs file.
#[derive(Default)]
struct Overrides {
    distance_min: Option<f64>,
    distance_max: Option<f64>,
    difficulty_min: Option<f64>,
    difficulty_max: Option<f64>,
    sort: Option<SortKey>,
    descending: bool,
}

impl Overrides {
    fn apply(&self, mut state: FilterState) -> FilterState {
        let bound = |r: NumericRange, lo: Option<f64>, hi: Option<f64>| {
            NumericRange::new(lo.unwrap_or(r.min), hi.unwrap_or(r.max))
        };
        state.distance = bound(state.distance, self.distance_min, self.distance_max);
        state.difficulty = bound(state.difficulty, self.difficulty_min, self.difficulty_max);
        if let Some(key) = self.sort {
            state.sort_key = key;
        }
        if self.descending {
            state.direction = SortDirection::Descending;
        }
        state
    }
}

#[derive(Serialize)]
struct ReplayReport {
    view: ViewSummary,
    filter: FilterState,
    diagnostics: Diagnostics,
    skipped_lines: Vec<usize>,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Replay {
            events,
            prefs,
            distance_min,
            distance_max,
            difficulty_min,
            difficulty_max,
            sort,
            descending,
            set,
            cursor,
        } => {
            let overrides = Overrides {
                distance_min,
                distance_max,
                difficulty_min,
                difficulty_max,
                sort: sort.map(SortKey::from),
                descending,
            };
            let report = replay(&events, prefs.as_deref(), &overrides, set, cursor)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Action::Synth {
            seed,
            count,
            node_space,
            set_id,
            out,
        } => synth(seed, count, node_space, set_id, &out),
        Action::Report => {
            let obj = serde_json::json!({ "loopsift": loopsift::VERSION });
            println!("{}", serde_json::to_string_pretty(&obj)?);
            Ok(())
        }
    }
}

/// `RUST_LOG` directives when set and valid; otherwise `info`.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn replay(
    events: &Path,
    prefs: Option<&Path>,
    overrides: &Overrides,
    set: Option<String>,
    cursor: Option<usize>,
) -> Result<ReplayReport> {
    let base = match prefs {
        Some(p) => session::read_prefs(p)?,
        None => FilterState::default(),
    };
    let state = overrides.apply(base);
    let log = session::read_events(events)?;
    tracing::info!(
        events = log.events.len(),
        skipped = log.skipped.len(),
        "replay"
    );

    let mut ex = Explorer::new(state);
    for ev in log.events {
        ex.apply(ev);
    }
    if let Some(id) = set {
        if ex.select_set(Some(SetId::new(id))).is_none() {
            tracing::warn!("requested set not found; view is empty");
        }
    }
    if let Some(i) = cursor {
        ex.jump(i);
    }
    Ok(ReplayReport {
        view: ex.view().summary(),
        filter: ex.filter_state(),
        diagnostics: *ex.diagnostics(),
        skipped_lines: log.skipped,
    })
}

fn synth(
    seed: u64,
    count: usize,
    node_space: u64,
    set_id: String,
    out: &Path,
) -> Result<()> {
    let cfg = SynthCfg {
        route_count: count,
        node_space,
        nodes_per_route: NodeCount::Uniform { min: 40, max: 160 },
        ..SynthCfg::default()
    };
    let events = session_events(&cfg, &SetId::new(set_id), seed);
    session::write_events(out, &events)?;
    tracing::info!(seed, count, out = %out.display(), "synth");
    Ok(())
}
