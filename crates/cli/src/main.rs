use std::process::ExitCode;

fn main() -> ExitCode {
    rigforge_cli::run()
}
