use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::driver::{self, DriverError, OutputFormat};
use cli::report::render;
use frontend::diagnostics::DiagnosticCollector;
use std::io::{IsTerminal, Read};

#[derive(Parser, Debug)]
#[command(name = "fmc", version, about = "Type-check and compile FormCore programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log each definition as it is checked and erased
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Type-check every definition of a file
    Check {
        /// Source file (`-` or omitted reads standard input)
        file: Option<String>,
    },
    /// Check a file, then erase it into the runtime IR
    Compile {
        /// Source file (`-` or omitted reads standard input)
        file: Option<String>,
        /// Erase only this definition and its dependencies
        #[arg(short, long)]
        main: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

fn read_source(file: Option<&str>) -> Result<(String, String)> {
    match file {
        None | Some("-") => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read standard input")?;
            Ok(("<stdin>".to_string(), source))
        }
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path))?;
            Ok((path.to_string(), source))
        }
    }
}

/// Runs the command; `Ok(false)` means diagnostics were reported.
fn run(cli: &Cli) -> Result<bool> {
    let color = std::io::stderr().is_terminal();
    let mut diagnostics = DiagnosticCollector::new();
    let (filename, source, result) = match &cli.command {
        Commands::Check { file } => {
            let (filename, source) = read_source(file.as_deref())?;
            let result = driver::check_source(&source, &mut diagnostics)
                .map(|_| driver::ALL_CHECK.to_string());
            (filename, source, result)
        }
        Commands::Compile { file, main, format } => {
            let (filename, source) = read_source(file.as_deref())?;
            let result =
                driver::compile_source(&source, main.as_deref(), *format, &mut diagnostics);
            (filename, source, result)
        }
    };

    for diagnostic in &diagnostics.diagnostics {
        eprintln!("{}\n", render(diagnostic, &filename, &source, color));
    }
    match result {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            Ok(true)
        }
        Err(DriverError::Parse) | Err(DriverError::Check(_)) => Ok(false),
        Err(err) => Err(err).with_context(|| format!("while compiling '{}'", filename)),
    }
}

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(1);
        }
    }
}
