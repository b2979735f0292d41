//! Replay command - feed a recorded trace through a tracking session.
//!
//! The trace is a CSV file, one event per line:
//!
//! ```text
//! # timestamp_ms,longitude,latitude,accuracy_m
//! 0,-76.9424,38.9126,4.5
//! 5000,-76.9420,38.9129,3.8
//! 9000,unavailable,gps timeout
//! ```
//!
//! Blank lines, `#` comments and a `timestamp_ms,...` header are skipped.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tourfence::geofence::GeofenceEvent;
use tourfence::session::{
    spawn_session, LocationEvent, SessionError, SessionHandle, SessionSnapshot, SessionUpdate,
};
use tourfence::{PoiCatalog, PositionSample};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the replay command.
pub struct ReplayArgs {
    pub points: PathBuf,
    pub samples: PathBuf,
    pub radius: Option<u32>,
    pub json: bool,
    pub verbose: bool,
}

/// One parsed trace line.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub timestamp_ms: u64,
    pub event: LocationEvent,
}

/// Run the replay command.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("replay");

    let catalog = Arc::new(PoiCatalog::load(&args.points)?);
    let content = std::fs::read_to_string(&args.samples).map_err(|source| {
        CliError::SamplesRead {
            path: args.samples.clone(),
            source,
        }
    })?;
    let trace = parse_trace(&args.samples, &content)?;
    tracing::info!(
        points = catalog.len(),
        events = trace.len(),
        "Replaying trace"
    );

    let config = runner.config();
    let radius = config.to_radius();
    if let Some(meters) = args.radius {
        radius.set(meters);
    }
    let session_config = config.to_session_config();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let (handle, updates) = {
        let _enter = runtime.enter();
        spawn_session(catalog, session_config, radius)
    };
    let snapshot = runtime.block_on(replay_trace(handle, updates, trace, args.json))?;

    if !args.json {
        print!("{}", render_summary(&snapshot));
    }

    Ok(())
}

/// Push the trace from a separate task while printing updates as they
/// arrive, so neither bounded channel can stall the other.
async fn replay_trace(
    handle: SessionHandle,
    mut updates: mpsc::Receiver<SessionUpdate>,
    trace: Vec<TraceEntry>,
    json: bool,
) -> Result<SessionSnapshot, CliError> {
    let mut timestamps: VecDeque<u64> = trace.iter().map(|e| e.timestamp_ms).collect();
    let feeder = tokio::spawn(feed_trace(handle, trace));

    while let Some(update) = updates.recv().await {
        let timestamp_ms = timestamps.pop_front().unwrap_or_default();
        let lines = if json {
            json_lines(&update)?
        } else {
            describe_update(timestamp_ms, &update)
        };
        for line in lines {
            println!("{}", line);
        }
    }

    let snapshot = feeder
        .await
        .map_err(|e| SessionError::TaskFailed(e.to_string()))??;
    Ok(snapshot)
}

async fn feed_trace(
    handle: SessionHandle,
    trace: Vec<TraceEntry>,
) -> Result<SessionSnapshot, SessionError> {
    for entry in trace {
        handle.push(entry.event).await?;
    }
    handle.finish().await
}

/// Parse a CSV trace.
pub fn parse_trace(path: &Path, content: &str) -> Result<Vec<TraceEntry>, CliError> {
    let mut entries = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("timestamp_ms") {
            continue;
        }

        let parse_err = |message: String| CliError::SamplesParse {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        };

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let timestamp_ms: u64 = fields[0]
            .parse()
            .map_err(|_| parse_err(format!("invalid timestamp '{}'", fields[0])))?;

        let event = match fields.get(1).copied() {
            Some("unavailable") => {
                let reason = if fields.len() > 2 {
                    fields[2..].join(",")
                } else {
                    "location unavailable".to_string()
                };
                LocationEvent::Unavailable(reason)
            }
            Some(_) if fields.len() == 4 => {
                let number = |i: usize, name: &str| -> Result<f64, CliError> {
                    fields[i]
                        .parse()
                        .map_err(|_| parse_err(format!("invalid {} '{}'", name, fields[i])))
                };
                LocationEvent::Sample(PositionSample::new(
                    number(1, "longitude")?,
                    number(2, "latitude")?,
                    number(3, "accuracy")?,
                    timestamp_ms,
                ))
            }
            _ => {
                return Err(parse_err(format!(
                    "expected 4 fields or 'unavailable', found {}",
                    fields.len()
                )))
            }
        };

        entries.push(TraceEntry {
            timestamp_ms,
            event,
        });
    }

    Ok(entries)
}

fn describe_event(event: &GeofenceEvent) -> String {
    match event {
        GeofenceEvent::Entered(result) => {
            let mut line = format!("ENTER {} ({:.1}m)", result.point_id, result.distance_m);
            if let (Some(direction), Some(face)) = (result.entry_direction, result.entry_face) {
                line.push_str(&format!(" heading {} through {} face", direction, face));
            }
            if let Some(message) = &result.entry_message {
                line.push_str(&format!(": {}", message));
            }
            line
        }
        GeofenceEvent::Exited(result) => {
            format!("EXIT  {} ({:.1}m)", result.point_id, result.distance_m)
        }
    }
}

fn describe_update(timestamp_ms: u64, update: &SessionUpdate) -> Vec<String> {
    let prefix = format!("[{:>8}]", timestamp_ms);
    match update {
        SessionUpdate::Positioned {
            events, recovered, ..
        } => {
            let mut lines = Vec::with_capacity(events.len() + 1);
            if *recovered {
                lines.push(format!("{} tracking recovered", prefix));
            }
            lines.extend(
                events
                    .iter()
                    .map(|event| format!("{} {}", prefix, describe_event(event))),
            );
            lines
        }
        SessionUpdate::Rejected(reason) => vec![format!("{} rejected: {}", prefix, reason)],
        SessionUpdate::Degraded { reason } => {
            vec![format!("{} tracking degraded: {}", prefix, reason)]
        }
    }
}

fn json_lines(update: &SessionUpdate) -> Result<Vec<String>, CliError> {
    match update {
        SessionUpdate::Positioned { events, .. } => events
            .iter()
            .map(|event| serde_json::to_string(event).map_err(CliError::from))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

fn render_summary(snapshot: &SessionSnapshot) -> String {
    let mut out = String::from("\nReplay summary\n==============\n");
    out.push_str(&format!(
        "  samples:  {} accepted, {} rejected\n",
        snapshot.stats.accepted, snapshot.stats.rejected
    ));
    out.push_str(&format!("  tracking: {}\n", snapshot.status));
    if let Some(position) = &snapshot.position {
        out.push_str(&format!(
            "  position: {} ({}, {})\n",
            position.coordinates,
            position.quality,
            if position.is_stable { "stable" } else { "moving" }
        ));
    }
    let active = if snapshot.active_ids.is_empty() {
        "(none)".to_string()
    } else {
        snapshot.active_ids.join(", ")
    };
    out.push_str(&format!("  inside:   {}\n", active));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourfence::geofence::{CompassDirection, GeofenceResult, HexFace};
    use tourfence::GeofenceShape;

    fn parse(content: &str) -> Result<Vec<TraceEntry>, CliError> {
        parse_trace(Path::new("trace.csv"), content)
    }

    #[test]
    fn test_parse_samples_and_unavailable() {
        let trace = parse(
            "timestamp_ms,longitude,latitude,accuracy_m\n\
             # walking in\n\
             0,-76.9424,38.9126,4.5\n\
             \n\
             5000, -76.9420 , 38.9129, 3.8\n\
             9000,unavailable,gps timeout, retrying\n\
             9500,unavailable\n",
        )
        .unwrap();

        assert_eq!(trace.len(), 4);
        assert_eq!(
            trace[1].event,
            LocationEvent::Sample(PositionSample::new(-76.9420, 38.9129, 3.8, 5000))
        );
        assert_eq!(
            trace[2].event,
            LocationEvent::Unavailable("gps timeout,retrying".to_string())
        );
        assert_eq!(
            trace[3].event,
            LocationEvent::Unavailable("location unavailable".to_string())
        );
        assert_eq!(trace[3].timestamp_ms, 9500);
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let err = parse("0,-76.9,38.9,4\n1000,-76.9,north,4\n").unwrap_err();
        match err {
            CliError::SamplesParse { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("latitude"));
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert!(parse("abc,-76.9,38.9,4\n").is_err());
        assert!(parse("0,-76.9,38.9\n").is_err());
    }

    #[test]
    fn test_describe_enter_with_direction() {
        let result = GeofenceResult {
            point_id: "fountain".to_string(),
            distance_m: 12.34,
            is_inside: true,
            shape: GeofenceShape::Hexagon,
            radius_m: 40.0,
            entry_direction: Some(CompassDirection::NorthEast),
            entry_face: Some(HexFace::SouthWest),
            entry_message: Some("Welcome".to_string()),
        };
        let line = describe_event(&GeofenceEvent::Entered(result));
        assert_eq!(
            line,
            "ENTER fountain (12.3m) heading NE through south-west face: Welcome"
        );
    }

    #[test]
    fn test_summary_lists_active_points() {
        let snapshot = SessionSnapshot {
            active_ids: vec!["fountain".to_string(), "chapel".to_string()],
            ..SessionSnapshot::default()
        };
        let summary = render_summary(&snapshot);
        assert!(summary.contains("inside:   fountain, chapel"));
        assert!(summary.contains("tracking: healthy"));
    }
}
