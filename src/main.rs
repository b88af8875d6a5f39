use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use swarmlight::{Simulation, TemplateSource};

/// Glowing bodies pulled toward the center and pushed around by the pointer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of bodies to spawn
    body_count: Option<usize>,

    /// Image whose mean color tints every body
    color_map: Option<PathBuf>,
}

impl Args {
    fn into_simulation(self) -> Simulation {
        let mut sim = Simulation::new();
        if let Some(count) = self.body_count {
            sim = sim.with_body_count(count);
        }
        if let Some(path) = self.color_map {
            sim = sim.with_template(TemplateSource::ColorMap(path));
        }
        sim
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::debug!("{:?}", args);

    match args.into_simulation().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
