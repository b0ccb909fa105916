use std::process::ExitCode;

fn main() -> ExitCode {
    reqtrack_cli::run()
}
