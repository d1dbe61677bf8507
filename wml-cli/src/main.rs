//! Command-line interface for WML
//! This binary preprocesses WML trees, dumps tokens and macro tables, exports records
//! as CSV, and normalizes comments.
//!
//! Usage:
//!   wml preprocess `<path>`... [-o `<file>`]                   - Print the preprocessed output
//!   wml tokens `<path>` [--format simple|json]                 - Dump the lexed token stream
//!   wml defines `<path>`...                                    - List macro signatures and sites
//!   wml export `<path>`... [--tag `<tag>`] [--columns a,b,c]     - Export records as CSV
//!   wml sanitize `<path>`                                      - Put a space after comment `#`
//!
//! Global options pick the configuration file, data directories and include paths.

mod commands;

use clap::{Arg, ArgAction, ArgMatches, Command};
use commands::{ExportArgs, Workspace};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wml_config::{Loader, WmlConfig};

fn cli() -> Command {
    let paths = || {
        Arg::new("paths")
            .help("Files or directories to process, in order")
            .value_parser(clap::value_parser!(PathBuf))
            .num_args(1..)
            .required(true)
    };
    let output = || {
        Arg::new("output")
            .long("output")
            .short('o')
            .help("Write to this file instead of stdout")
            .value_parser(clap::value_parser!(PathBuf))
    };

    Command::new("wml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for preprocessing and inspecting WML trees")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Game data directory")
                .global(true),
        )
        .arg(
            Arg::new("user-data-dir")
                .long("user-data-dir")
                .help("User data directory (target of `~` paths)")
                .global(true),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .short('I')
                .help("Path to preprocess before the inputs (repeatable)")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (-v debug, -vv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .global(true),
        )
        .subcommand(
            Command::new("preprocess")
                .about("Preprocess files and print the flat output")
                .arg(paths())
                .arg(output()),
        )
        .subcommand(
            Command::new("tokens")
                .about("Dump the token stream of a file")
                .arg(
                    Arg::new("path")
                        .help("File to lex")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["simple", "json"])
                        .default_value("simple"),
                ),
        )
        .subcommand(
            Command::new("defines")
                .about("List the macros defined by the given files")
                .arg(paths()),
        )
        .subcommand(
            Command::new("export")
                .about("Export records of one tag as CSV")
                .arg(paths())
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .short('t')
                        .help("Record tag to export (default from configuration)"),
                )
                .arg(
                    Arg::new("columns")
                        .long("columns")
                        .help("Comma separated attribute names (default from configuration)")
                        .value_delimiter(','),
                )
                .arg(output()),
        )
        .subcommand(
            Command::new("sanitize")
                .about("Insert a space after `#` on comment lines, in place")
                .arg(
                    Arg::new("path")
                        .help("File or directory to sanitize")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();
    if let Err(err) = run(&matches) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let mut config = load_config(matches)?;
    if let Some(includes) = matches.get_many::<PathBuf>("include") {
        config.paths.include.extend(includes.cloned());
    }
    init_logging(matches, &config);

    let workspace = Workspace::new(config)?;
    match matches.subcommand() {
        Some(("preprocess", sub)) => {
            workspace.preprocess(&paths(sub), sub.get_one::<PathBuf>("output"))
        }
        Some(("tokens", sub)) => {
            let path = sub
                .get_one::<PathBuf>("path")
                .ok_or_else(|| anyhow::anyhow!("missing path"))?;
            let format = sub
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or("simple");
            commands::tokens(path, format)
        }
        Some(("defines", sub)) => workspace.defines(&paths(sub)),
        Some(("export", sub)) => workspace.export(ExportArgs {
            paths: paths(sub),
            tag: sub.get_one::<String>("tag").cloned(),
            columns: sub
                .get_many::<String>("columns")
                .map(|columns| columns.cloned().collect()),
            output: sub.get_one::<PathBuf>("output").cloned(),
        }),
        Some(("sanitize", sub)) => {
            let path = sub
                .get_one::<PathBuf>("path")
                .ok_or_else(|| anyhow::anyhow!("missing path"))?;
            workspace.sanitize(path)
        }
        _ => Ok(()),
    }
}

fn paths(matches: &ArgMatches) -> Vec<PathBuf> {
    matches
        .get_many::<PathBuf>("paths")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default()
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<WmlConfig> {
    let mut loader = match matches.get_one::<PathBuf>("config") {
        Some(file) => Loader::new().with_file(file),
        None => Loader::new().with_optional_file("wml.toml"),
    };
    if let Some(dir) = matches.get_one::<String>("data-dir") {
        loader = loader.set_override("paths.data_dir", dir.as_str())?;
    }
    if let Some(dir) = matches.get_one::<String>("user-data-dir") {
        loader = loader.set_override("paths.user_data_dir", dir.as_str())?;
    }
    Ok(loader.build()?)
}

/// `RUST_LOG` wins; otherwise `-v`/`-q`, then the configured level.
fn init_logging(matches: &ArgMatches, config: &WmlConfig) {
    let level = match (matches.get_count("verbose"), matches.get_flag("quiet")) {
        (_, true) => "error",
        (0, false) => config.logging.level.as_str(),
        (1, false) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
