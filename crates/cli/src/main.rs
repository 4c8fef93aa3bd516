use std::process::ExitCode;

fn main() -> ExitCode {
    cirqle_cli::run()
}
