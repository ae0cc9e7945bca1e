//! zig-bsdiff CLI binary.

// The CLI writes results to stdout and diagnostics to stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use zig_bsdiff::cli;
use zig_bsdiff::commands;
use zig_bsdiff::tracing::{TracingConfig, init_tracing};
use zig_bsdiff::{EXIT_FAILURE, exit_code_for, render_error};

fn main() {
    // NOTE: tracing may be unusable during a panic, so print directly.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        filter: None,
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("{e:?}");
        std::process::exit(EXIT_FAILURE);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    let exit_code = match runtime.block_on(commands::run(cli)) {
        Ok(code) => code,
        Err(err) => {
            let code = exit_code_for(&err);
            render_error(err);
            code
        }
    };
    std::process::exit(exit_code);
}
