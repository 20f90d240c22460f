use std::process::ExitCode;

fn main() -> ExitCode {
    match rules_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            rules_cli::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
