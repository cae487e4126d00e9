#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod replay;
mod speed;

use anyhow::Result;
use geojson::GeoJson;
use structopt::StructOpt;

use model::{RouteView, TimeSeries, Timestamp};
use route::RouteResult;

use self::replay::LogRenderer;
use self::speed::SpeedSetting;

#[derive(StructOpt)]
struct Args {
    /// The path to a route result JSON file from the routing service, maybe including a
    /// simulation
    #[structopt(long)]
    route: Option<String>,
    /// The path to a JSON file with recorded measurements. Replaces the route's simulation for
    /// playback.
    #[structopt(long)]
    measurements: Option<String>,
    /// Where to write the GeoJSON overlay
    #[structopt(long, default_value = "overlay.geojson")]
    output: String,
    /// Also write speed over time as CSV here
    #[structopt(long)]
    driving_cycle: Option<String>,
    /// Describe the vehicle state nearest to this many milliseconds. Can be repeated.
    #[structopt(long)]
    probe: Vec<i64>,
    /// Play back the trajectory
    #[structopt(long)]
    replay: bool,
    /// realtime, fast, faster, or fastest
    #[structopt(long, default_value = "realtime")]
    speed: SpeedSetting,
    /// Milliseconds of sim time between playback ticks
    #[structopt(long, default_value = "250")]
    tick_ms: i64,
    /// Wait between ticks, instead of replaying as fast as possible
    #[structopt(long)]
    realtime: bool,
}

impl Args {
    fn load(&self) -> Result<RouteView<LogRenderer>> {
        if self.route.is_none() && self.measurements.is_none() {
            bail!("Specify --route, --measurements, or both");
        }

        let mut view = RouteView::new(LogRenderer::default());
        if let Some(ref path) = self.route {
            view.show_route(RouteResult::load(path)?);
        }
        if let Some(ref path) = self.measurements {
            view.show_measurements(TimeSeries::load_measurements(path)?);
        }
        Ok(view)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::from_args();
    let mut view = args.load()?;

    let gj = GeoJson::from(view.annotations());
    fs_err::write(&args.output, serde_json::to_string_pretty(&gj)?)?;
    info!("Wrote {}", args.output);

    if let Some(ref path) = args.driving_cycle {
        match view.driving_cycle() {
            Some(cycle) => {
                cycle.write_csv(fs_err::File::create(path)?)?;
                info!(
                    "Wrote {} points over {:.1}s to {path}, top speed {:.1} km/h",
                    cycle.points().len(),
                    cycle.duration_seconds(),
                    cycle.max_speed() * 3.6
                );
            }
            None => warn!("No trajectory, so no driving cycle to write"),
        }
    }

    if let Some(series) = view.series() {
        for probe in &args.probe {
            match series.nearest(Timestamp(*probe)) {
                Some(sample) => info!(
                    "Nearest to {}: {} at {}, {:.1} km/h, heading {:.1}°",
                    Timestamp(*probe),
                    sample.timestamp,
                    sample.position,
                    sample.speed * 3.6,
                    route::to_normalized_degrees(sample.direction)
                ),
                None => warn!("No samples to probe at {}", Timestamp(*probe)),
            }
        }
    } else if !args.probe.is_empty() {
        warn!("No trajectory to probe");
    }

    if args.replay {
        replay::run(&mut view.playback, args.tick_ms, args.speed, args.realtime)?;
    }

    Ok(())
}
