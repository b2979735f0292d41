//! Check command - evaluate every point for one position.

use std::path::PathBuf;

use tourfence::geofence::{GeofenceEvaluator, GeofenceResult};
use tourfence::{Coordinates, PoiCatalog};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the check command.
pub struct CheckArgs {
    pub points: PathBuf,
    pub lon: f64,
    pub lat: f64,
    pub radius: Option<u32>,
    pub json: bool,
    pub verbose: bool,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("check");

    let position = Coordinates::try_new(args.lon, args.lat)?;
    let catalog = PoiCatalog::load(&args.points)?;

    let radius = runner.config().to_radius();
    if let Some(meters) = args.radius {
        radius.set(meters);
    }

    let evaluator = GeofenceEvaluator::new(radius);
    let results: Vec<GeofenceResult> = catalog
        .points()
        .iter()
        .map(|point| evaluator.evaluate(point, &position, None))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", render_table(&position, &results));
    }

    Ok(())
}

fn render_table(position: &Coordinates, results: &[GeofenceResult]) -> String {
    let mut out = format!("Position {}\n\n", position);
    out.push_str(&format!(
        "{:<20} {:<8} {:>10} {:>12}  {}\n",
        "POINT", "SHAPE", "RADIUS", "DISTANCE", "INSIDE"
    ));

    for result in results {
        out.push_str(&format!(
            "{:<20} {:<8} {:>9.1}m {:>11.1}m  {}\n",
            result.point_id,
            result.shape.to_string(),
            result.radius_m,
            result.distance_m,
            if result.is_inside { "yes" } else { "no" },
        ));
    }

    let inside = results.iter().filter(|r| r.is_inside).count();
    out.push_str(&format!("\n{} of {} points inside\n", inside, results.len()));
    out
}
