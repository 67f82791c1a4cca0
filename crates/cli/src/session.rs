use anyhow::{Context, Result};
use loopsift::event::Event;
use loopsift::filter::FilterState;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Decoded JSON-lines event log.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<Event>,
    /// Lines that failed to decode (1-based line numbers).
    pub skipped: Vec<usize>,
}

/// Read a JSON-lines event log. Undecodable lines are logged and skipped; only I/O
/// errors are fatal.
pub fn read_events<P: AsRef<Path>>(path: P) -> Result<EventLog> {
    let path = path.as_ref();
    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_events(BufReader::new(file)).with_context(|| format!("reading {}", path.display()))
}

pub fn parse_events<R: BufRead>(reader: R) -> Result<EventLog> {
    let mut log = EventLog::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Event>(trimmed) {
            Ok(ev) => log.events.push(ev),
            Err(err) => {
                tracing::warn!(line = i + 1, %err, "failed to decode event");
                log.skipped.push(i + 1);
            }
        }
    }
    Ok(log)
}

/// Saved filter preferences (a serialized `FilterState`; missing fields default).
pub fn read_prefs<P: AsRef<Path>>(path: P) -> Result<FilterState> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading prefs {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing prefs {}", path.display()))
}

/// Write events as JSON lines, creating parent directories as needed.
pub fn write_events<P: AsRef<Path>>(path: P, events: &[Event]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for ev in events {
        serde_json::to_writer(&mut out, ev)?;
        out.write_all(b"\n")?;
    }
    out.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
