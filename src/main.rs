use clap::Parser;
use setupscan::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
