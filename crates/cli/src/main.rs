use std::process::ExitCode;

fn main() -> ExitCode {
    ella_cli::run()
}
