// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `jacy` - front end driver for the Jacy language.

mod config;
mod help;
mod output;
mod pipeline;

use std::env;
use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

use config::{Command, Config, OutputFormat};
use pipeline::DriverError;

fn main() {
    output::init();

    let command = match config::parse_args(env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}: {}", output::error_label(), e);
            eprintln!("Run `jacy --help` for usage.");
            process::exit(2);
        }
    };

    match command {
        Command::Help => help::print_usage(),
        Command::Version => println!("jacy {}", env!("CARGO_PKG_VERSION")),
        Command::Compile(config) => {
            init_logging(&config);
            process::exit(compile(&config));
        }
    }
}

/// `JACY_LOG` wins; otherwise `warn`, or `debug` in dev mode.
fn init_logging(config: &Config) {
    let default = if config.dev { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("JACY_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(config.dev)
        .init();
}

fn compile(config: &Config) -> i32 {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let result = pipeline::run(config, &mut stdout.lock(), &mut stderr.lock());

    match result {
        Ok(()) => 0,
        Err(DriverError::Halt { stage, errors }) => {
            if config.format == OutputFormat::Human {
                eprintln!("{}", output::banner_fail(stage.name(), errors));
            }
            1
        }
        Err(e) => {
            eprintln!("{}: {}", output::error_label(), e);
            1
        }
    }
}
