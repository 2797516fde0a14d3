use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use compiler_core::{CompileError, CompilerConfig, CompilerSession};
use cpp_backend::CppBackend;
use frontend::token::dump_tokens;
use log::{info, LevelFilter};

#[derive(Parser)]
#[command(name = "java2cpp")]
#[command(about = "Translates a restricted Java subset into C++")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Stop semantic analysis at the first error
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Spaces per indentation level in generated code
    #[arg(long, value_name = "N", default_value_t = 4, global = true)]
    indent: usize,

    /// Do not emit forward declarations for methods
    #[arg(long, global = true)]
    no_prototypes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream in the staging format
    Lex {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write the dump here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Parse a source file and print the syntax tree
    Parse {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Read a token dump written by `lex` instead of source text
        #[arg(long)]
        from_dump: bool,
    },

    /// Run semantic analysis without generating code
    Check {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Translate a source file to C++
    Compile {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write the C++ here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<CompileError>() {
                Some(compile_error) => {
                    for diagnostic in compile_error.diagnostics() {
                        eprintln!("{}", diagnostic);
                    }
                }
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

/// `warn` by default; `RUST_LOG` still overrides the flag-derived level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = CompilerConfig::new()
        .fail_fast(cli.fail_fast)
        .indent_width(cli.indent)
        .emit_prototypes(!cli.no_prototypes);
    let mut session = CompilerSession::with_config(config);

    match &cli.command {
        Commands::Lex { input, output } => {
            let source = read_source(input)?;
            let tokens = session.tokenize(&source);
            emit(output.as_deref(), &dump_tokens(&tokens))
        }
        Commands::Parse { input, from_dump } => {
            let parsed = if *from_dump {
                let file = fs::File::open(input)
                    .with_context(|| format!("failed to open {}", input.display()))?;
                session.parse_dump(BufReader::new(file))
            } else {
                session.parse_program(&read_source(input)?)
            };
            let program = parsed.map_err(CompileError::from)?;
            print!("{}", program.print_tree());
            Ok(())
        }
        Commands::Check { input } => {
            let program = session
                .parse_program(&read_source(input)?)
                .map_err(CompileError::from)?;
            session.check_program(&program).map_err(CompileError::from)?;
            println!("{}: no errors found", input.display());
            Ok(())
        }
        Commands::Compile { input, output } => {
            let source = read_source(input)?;
            let cpp = session.translate(&source, &CppBackend)?;
            emit(output.as_deref(), &cpp)
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {} byte(s) to {}", text.len(), path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
