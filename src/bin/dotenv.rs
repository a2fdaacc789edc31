use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{self, Command};

use envdoc::{EnvDocument, EnvLoader, Error, TargetEnv, load_into, marshal};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

const DEFAULT_FILE: &str = ".env";

const HELP: &str = "\
dotenv - run commands with variables loaded from dotenv files

Usage:
  dotenv run [OPTIONS] -- COMMAND [ARGS...]
  dotenv run [OPTIONS] COMMAND [ARGS...]
  dotenv fmt [OPTIONS]
  dotenv --help
  dotenv --version

Commands:
  run       Load dotenv files and execute a command
  fmt       Print dotenv files merged in canonical form
";

const RUN_HELP: &str = "\
dotenv run - load dotenv files and execute a command

Usage:
  dotenv run [OPTIONS] -- COMMAND [ARGS...]
  dotenv run [OPTIONS] COMMAND [ARGS...]

Options:
  -f, --file <PATHS>      Dotenv file path(s). Repeat or pass comma-separated paths.
                          Defaults to .env.
  -i, --ignore            Ignore missing dotenv files.
      --ignore-missing    Alias for --ignore.
  -o, --override          Override existing environment variables.
      --overload          Alias for --override.
  -v, --verbose           Print loader diagnostics to stderr.
  -q, --quiet             Suppress loader diagnostics.
  -h, --help              Show this help text.
";

const FMT_HELP: &str = "\
dotenv fmt - print dotenv files merged in canonical form

Keys are sorted and values quoted the way `marshal` writes them. When a key
appears in several files, the last file wins.

Usage:
  dotenv fmt [OPTIONS]

Options:
  -f, --file <PATHS>      Dotenv file path(s). Repeat or pass comma-separated paths.
                          Defaults to .env.
  -i, --ignore            Ignore missing dotenv files.
  -v, --verbose           Print loader diagnostics to stderr.
  -q, --quiet             Suppress loader diagnostics.
  -h, --help              Show this help text.
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subcommand {
    Run,
    Fmt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CliCommand {
    Help(Subcommand),
    Execute(Options),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    files: Vec<PathBuf>,
    required: bool,
    override_existing: bool,
    verbose: bool,
    quiet: bool,
    command: OsString,
    args: Vec<OsString>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            required: true,
            override_existing: false,
            verbose: false,
            quiet: false,
            command: OsString::new(),
            args: Vec::new(),
        }
    }
}

impl Options {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Off
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }
}

fn main() {
    process::exit(run(env::args_os()));
}

fn run(args: impl IntoIterator<Item = OsString>) -> i32 {
    let mut args = args.into_iter();
    let _bin = args.next();

    let Some(subcommand) = args.next() else {
        print_help();
        return 0;
    };

    let subcommand = subcommand.to_string_lossy();
    let subcommand = match subcommand.as_ref() {
        "-h" | "--help" | "help" => {
            print_help();
            return 0;
        }
        "-V" | "--version" | "version" => {
            print_version();
            return 0;
        }
        "run" => Subcommand::Run,
        "fmt" => Subcommand::Fmt,
        unknown => {
            eprintln!("dotenv: unknown subcommand `{unknown}`");
            eprintln!("Try `dotenv --help`.");
            return 1;
        }
    };

    match parse_options(subcommand, args.collect()) {
        Ok(CliCommand::Help(Subcommand::Run)) => {
            println!("{RUN_HELP}");
            0
        }
        Ok(CliCommand::Help(Subcommand::Fmt)) => {
            println!("{FMT_HELP}");
            0
        }
        Ok(CliCommand::Execute(options)) => {
            init_logging(options.log_level());
            let result = match subcommand {
                Subcommand::Run => execute_run(options),
                Subcommand::Fmt => execute_fmt(&options),
            };
            match result {
                Ok(code) => code,
                Err(err) => {
                    eprintln!("dotenv: {err}");
                    1
                }
            }
        }
        Err(err) => {
            eprintln!("dotenv: {err}");
            eprintln!("Try `dotenv {} --help`.", subcommand_name(subcommand));
            1
        }
    }
}

fn parse_options(subcommand: Subcommand, args: Vec<OsString>) -> Result<CliCommand, String> {
    let mut options = Options::default();
    let mut index = 0usize;
    while index < args.len() {
        let token = args[index].to_string_lossy();
        match token.as_ref() {
            "--" => {
                index += 1;
                break;
            }
            "-h" | "--help" => return Ok(CliCommand::Help(subcommand)),
            "-f" | "--file" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    return Err("missing value for `-f/--file`".to_owned());
                };
                parse_file_text(&value.to_string_lossy(), &mut options.files)?;
                index += 1;
            }
            value if value.starts_with("--file=") => {
                parse_file_text(&value["--file=".len()..], &mut options.files)?;
                index += 1;
            }
            "-i" | "--ignore" | "--ignore-missing" => {
                options.required = false;
                index += 1;
            }
            "-o" | "--override" | "--overload" if subcommand == Subcommand::Run => {
                options.override_existing = true;
                index += 1;
            }
            "-v" | "--verbose" => {
                options.verbose = true;
                index += 1;
            }
            "-q" | "--quiet" => {
                options.quiet = true;
                index += 1;
            }
            unknown if unknown.starts_with('-') => {
                return Err(format!("unknown option `{unknown}`"));
            }
            _ => break,
        }
    }

    if options.files.is_empty() {
        options.files.push(PathBuf::from(DEFAULT_FILE));
    }

    let remaining = &args[index..];
    match subcommand {
        Subcommand::Run => {
            let Some((command, command_args)) = remaining.split_first() else {
                return Err("missing command after `run`".to_owned());
            };
            options.command = command.clone();
            options.args = command_args.to_vec();
        }
        Subcommand::Fmt => {
            if let Some(extra) = remaining.first() {
                return Err(format!(
                    "unexpected argument `{}`",
                    extra.to_string_lossy()
                ));
            }
        }
    }

    Ok(CliCommand::Execute(options))
}

fn parse_file_text(raw: &str, files: &mut Vec<PathBuf>) -> Result<(), String> {
    let mut added = 0usize;
    for segment in raw.split(',') {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        files.push(PathBuf::from(trimmed));
        added += 1;
    }
    if added == 0 {
        return Err("`-f/--file` requires at least one path".to_owned());
    }
    Ok(())
}

fn execute_run(options: Options) -> Result<i32, String> {
    let (documents, target) = load_documents(&options).map_err(|err| err.to_string())?;
    let mut command = Command::new(&options.command);
    command.args(&options.args);

    let loaded = target.into_memory().unwrap_or_default();
    for document in &documents {
        for (key, _) in document {
            if let Some(value) = loaded.get(key) {
                command.env(key, value);
            }
        }
    }

    execute_command(command, &options.command)
}

fn execute_fmt(options: &Options) -> Result<i32, String> {
    let (documents, _) = load_documents(options).map_err(|err| err.to_string())?;
    let merged: BTreeMap<String, String> = documents.into_iter().flatten().collect();
    print!("{}", marshal(&merged));
    Ok(0)
}

/// Load the selected files into a snapshot of the current environment.
fn load_documents(options: &Options) -> Result<(Vec<EnvDocument>, TargetEnv), Error> {
    let loader = EnvLoader::new()
        .paths(&options.files)
        .required(options.required)
        .target(TargetEnv::from_memory(snapshot_process_env()));
    let documents = loader.parse_only()?;
    let mut target = loader.into_target();
    let report = load_into(&documents, options.override_existing, &mut target)?;
    log::debug!(
        "loaded {} variables from {} files ({} already set)",
        report.loaded,
        report.files_read,
        report.skipped_existing
    );
    Ok((documents, target))
}

fn snapshot_process_env() -> BTreeMap<String, String> {
    env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

#[cfg(unix)]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let err = command.exec();
    Err(format!(
        "failed to execute `{}`: {err}",
        program.to_string_lossy()
    ))
}

#[cfg(not(unix))]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let status = command
        .status()
        .map_err(|err| format!("failed to execute `{}`: {err}", program.to_string_lossy()))?;
    Ok(status.code().unwrap_or(1))
}

fn init_logging(level: LevelFilter) {
    if let Err(err) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("dotenv: failed to initialize logging: {err}");
    }
}

fn subcommand_name(subcommand: Subcommand) -> &'static str {
    match subcommand {
        Subcommand::Run => "run",
        Subcommand::Fmt => "fmt",
    }
}

fn print_help() {
    println!("{HELP}");
}

fn print_version() {
    println!("dotenv {}", env!("CARGO_PKG_VERSION"));
}
