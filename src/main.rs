// src/main.rs

use std::env;
use std::process;

use env_logger::Env;
use log::debug;

use chudnovsky::config::pi_config::PiConfig;
use chudnovsky::core::pi::{terms_for_digits, PiComputation};

fn usage(prog: &str) -> ! {
    eprintln!();
    eprintln!("Syntax: {} <digits> <option> <workers>", prog);
    eprintln!("      <digits> decimal digits of pi to compute");
    eprintln!("      <option> 0 - just run (default)");
    eprintln!("               1 - output digits");
    eprintln!("      <workers> worker threads (default: configured threads, else all cores)");
    process::exit(1);
}

fn main() {
    let config = match PiConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            process::exit(1);
        }
    };

    // Initialize the logger
    let env = Env::default()
        .filter_or("PI_LOG_LEVEL", config.log_level.clone())
        .write_style_or("PI_LOG_STYLE", "auto");
    env_logger::Builder::from_env(env).init();

    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("chudnovsky");
    if args.len() < 2 {
        usage(prog);
    }
    let digits: u64 = match args[1].parse() {
        Ok(digits) => digits,
        Err(_) => usage(prog),
    };
    let output: u32 = match args.get(2) {
        Some(arg) => match arg.parse() {
            Ok(output) => output,
            Err(_) => usage(prog),
        },
        None => 0,
    };
    let workers: usize = match args.get(3) {
        Some(arg) => match arg.parse() {
            Ok(workers) => workers,
            Err(_) => usage(prog),
        },
        None => config.threads.unwrap_or_else(num_cpus::get),
    };
    let workers = workers.max(1);

    debug!("configuration: {:?}", config);

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
    {
        debug!("thread pool already initialized: {}", e);
    }

    let computation =
        PiComputation::with_tuning(digits, workers, config.factorization, config.tuning);
    let pi = computation.run();

    if output & 1 == 1 {
        println!("pi(0,{}) =", terms_for_digits(digits));
        println!("{}", pi);
    }
}
