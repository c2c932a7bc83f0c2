mod commands;
mod config;
mod output;

use commands::{parse_args, run, USAGE};
use config::Config;
use output::{OutputFormat, Printer};
use tabletop_dice_roll::{dice_roll::Roller, rng::RngProvider};

fn main() {
    pretty_env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(1);
        }
    };

    let config = Config::load();
    log::debug!("running {:?} with {:?}", invocation.command, config);
    let format = if invocation.json {
        OutputFormat::Json
    } else {
        config.output
    };
    let mut provider = match config.seed {
        Some(seed) => RngProvider::from_seed(seed),
        None => RngProvider::from_entropy(),
    };
    let mut roller = Roller::new(provider.next_rng()).with_max_dice(config.max_dice);

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut printer = Printer::new(format, stdout.lock(), stderr.lock());
    let code = match run(&invocation.command, &mut roller, &mut printer) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            if let Err(io) = printer.error(&e) {
                log::error!("unable to report {}: {}", e, io);
            }
            1
        }
    };
    drop(printer);
    std::process::exit(code);
}
