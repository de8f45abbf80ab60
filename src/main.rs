//! dns-lookuper - Resolve lists of domain names and render the addresses

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = dns_lookuper::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
