use flowround::{compute_round_with, FlowBenchmarkHarness};
use log::info;
use std::error::Error;
use std::process;

const USAGE: &str = "usage: flow_round [SEED] [--parallel]";

fn run(seed: Option<u64>, parallel: bool) -> Result<String, Box<dyn Error>> {
    info!("computing round (seed {:?}, parallel {})", seed, parallel);
    let harness = FlowBenchmarkHarness::new().parallel(parallel);
    let round = compute_round_with(seed, &harness)?;
    Ok(serde_json::to_string_pretty(&round)?)
}

fn main() {
    env_logger::init();

    let mut seed = None;
    let mut parallel = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--parallel" => parallel = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return;
            }
            other => match other.parse::<u64>() {
                Ok(value) if seed.is_none() => seed = Some(value),
                _ => {
                    eprintln!("{}", USAGE);
                    process::exit(2);
                }
            },
        }
    }

    match run(seed, parallel) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("flow_round: {}", err);
            process::exit(1);
        }
    }
}
