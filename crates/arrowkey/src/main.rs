#![forbid(unsafe_code)]

#[cfg(unix)]
fn main() {
    let code = match arrowkey::cli::run_from_env() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error}");
            error.exit_code()
        }
    };
    // The controller was dropped inside run_from_env, so the terminal is
    // already back to its original attributes.
    std::process::exit(code);
}

#[cfg(not(unix))]
fn main() {
    eprintln!("{}", arrowkey::SetupError::NoTerminalAvailable);
    std::process::exit(arrowkey::error::EXIT_SETUP_FAILURE);
}
