//! # dotconfig demo application
//!
//! A small git-config-like CLI over [dotconfig](https://docs.rs/dotconfig).
//! This is **not** a real app: it exists to demonstrate and manually verify
//! the library's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example dotconfig_demo -- list
//! cargo run --example dotconfig_demo -- set core.editor vim
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                 | How to exercise it                                                       |
//! |-------------------------|--------------------------------------------------------------------------|
//! | Hierarchical read       | `cargo run --example dotconfig_demo -- get core.editor`                  |
//! | Start elsewhere         | `cargo run --example dotconfig_demo -- --path /tmp/work list`            |
//! | Scoped read             | `cargo run --example dotconfig_demo -- --global list`                    |
//! | Local write             | `cargo run --example dotconfig_demo -- set core.editor vim`              |
//! | Boolean shorthand       | `cargo run --example dotconfig_demo -- set core.bare`                    |
//! | Multi-valued keys       | `... -- add remote.origin.fetch a` then `... -- get-all remote.origin.fetch` |
//! | Value matchers          | `cargo run --example dotconfig_demo -- unset-all remote.origin.fetch '!^a$'` |
//! | Section operations      | `cargo run --example dotconfig_demo -- rename-section remote.origin remote.up` |
//! | JSON output             | `cargo run --example dotconfig_demo -- --json list`                      |
//! | Logging                 | `RUST_LOG=dotconfig=debug cargo run --example dotconfig_demo -- list`    |
//! | Sandboxed scopes        | `DOTCONFIG_GLOBAL=/tmp/g DOTCONFIG_SYSTEM=/tmp/s cargo run ...`          |

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dotconfig::{Config, ConfigArgs, ConfigError, ConfigResult};

/// dotconfig demo: read and edit layered `.dotconfig` files.
#[derive(Parser, Debug)]
#[command(name = "dotconfig-demo")]
struct Cli {
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Platform defaults, overridable through the environment so the demo can
/// run without touching real home or system files.
fn load(cli: &Cli) -> Result<Config, ConfigError> {
    let mut builder = Config::builder();
    if let Some(global) = std::env::var_os("DOTCONFIG_GLOBAL") {
        builder = builder.global_location(global);
    }
    if let Some(system) = std::env::var_os("DOTCONFIG_SYSTEM") {
        builder = builder.system_location(system);
    }
    builder.build(cli.config.path.as_deref())
}

fn print(result: &ConfigResult, json: bool) {
    if json {
        match result.to_json() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Failed to render JSON: {e}");
                std::process::exit(1);
            }
        }
    } else {
        let text = result.to_string();
        if !text.is_empty() {
            println!("{text}");
        }
    }
}

fn report(error: ConfigError) -> ! {
    #[cfg(feature = "rich-errors")]
    if let Some(diagnostic) = dotconfig::ParseDiagnostic::from_error(&error) {
        eprintln!("{:?}", miette::Report::new(diagnostic));
        std::process::exit(1);
    }
    eprintln!("Config error:\n{error}");
    std::process::exit(1);
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let mut config = load(&cli).unwrap_or_else(|e| report(e));
    let json = cli.json;
    let action = cli.config.into_action();

    match config.handle(&action) {
        Ok(result) => {
            let missing = matches!(result, ConfigResult::Value { entry: None, .. });
            print(&result, json);
            if missing {
                std::process::exit(1);
            }
        }
        Err(e) => report(e),
    }
}
