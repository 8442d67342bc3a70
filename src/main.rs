use clap::Parser;
use fxstrength::cli::{Cli, run};
use fxstrength::logging::init_logging;

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}
