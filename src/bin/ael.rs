//! Command-line interface for the AEL front end
//!
//! Usage:
//!   ael parse `<path>` [--format treeviz|json|yaml] [--config `<file>`] [--no-warn-functions] [-v]
//!   ael check `<path>` [--config `<file>`] [-v]
//!
//! Both commands exit with status 1 when the file has errors.

use ael::ael::config::{AelConfig, Loader, OutputFormat};
use ael::ael::formats::render;
use ael::ael::{parse_file, ParseOptions};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::Path;
use std::process;

fn common_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("path")
            .help("Path to the .ael file")
            .required(true)
            .index(1),
    )
    .arg(
        Arg::new("config")
            .long("config")
            .short('c')
            .help("Configuration file layered over the built-in defaults"),
    )
    .arg(
        Arg::new("no-warn-functions")
            .long("no-warn-functions")
            .help("Don't warn about assignments to unknown dialplan functions")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("verbose")
            .long("verbose")
            .short('v')
            .help("Log parser activity")
            .action(ArgAction::SetTrue),
    )
}

fn main() {
    let matches = Command::new("ael")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse Asterisk Extension Language files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            common_args(Command::new("parse").about("Parse a file and print its tree")).arg(
                Arg::new("format")
                    .long("format")
                    .short('f')
                    .help("Output format: treeviz, json or yaml"),
            ),
        )
        .subcommand(common_args(
            Command::new("check").about("Parse a file and report diagnostics only"),
        ))
        .get_matches();

    let (command, sub) = match matches.subcommand() {
        Some((name, sub)) => (name, sub),
        None => unreachable!("clap enforces a subcommand"),
    };

    init_logging(sub.get_flag("verbose"));
    let config = load_config(sub).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(2);
    });

    let errors = match command {
        "parse" => handle_parse_command(sub, config),
        "check" => handle_check_command(sub, config),
        _ => unreachable!(),
    };
    if errors > 0 {
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_config(sub: &ArgMatches) -> Result<AelConfig, ael::ael::error::AelError> {
    let mut loader = Loader::new();
    if let Some(path) = sub.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if sub.get_flag("no-warn-functions") {
        loader = loader.set_override("parser.warn_unknown_functions", false)?;
    }
    Ok(loader.build()?)
}

fn path_arg(sub: &ArgMatches) -> &Path {
    // required, so clap has already rejected a missing one
    sub.get_one::<String>("path").map(Path::new).unwrap_or(Path::new(""))
}

/// Parse the file, printing its diagnostics to stderr. `None` when the file
/// could not be read.
fn parse_and_report(sub: &ArgMatches, config: AelConfig) -> Option<(ael::ael::ast::Ast, usize)> {
    let options = ParseOptions {
        log_diagnostics: false,
        ..ParseOptions::new(config)
    };
    match parse_file(path_arg(sub), &options) {
        Ok(ast) => {
            for diagnostic in ast.diagnostics() {
                eprintln!("{}", diagnostic);
            }
            let errors = ast.errors();
            Some((ast, errors))
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

fn handle_parse_command(sub: &ArgMatches, config: AelConfig) -> usize {
    let format = match sub.get_one::<String>("format") {
        Some(name) => name.parse::<OutputFormat>().unwrap_or_else(|bad| {
            eprintln!("Error: {}", ael::ael::error::AelError::UnknownFormat(bad));
            process::exit(2);
        }),
        None => config.output.format,
    };
    let Some((ast, errors)) = parse_and_report(sub, config) else {
        return 1;
    };
    match render(&ast, format) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            return errors.max(1);
        }
    }
    errors
}

fn handle_check_command(sub: &ArgMatches, config: AelConfig) -> usize {
    let Some((_, errors)) = parse_and_report(sub, config) else {
        return 1;
    };
    let path = path_arg(sub).display();
    if errors == 0 {
        println!("{}: ok", path);
    } else {
        println!("{}: {} error(s)", path, errors);
    }
    errors
}
