//! Check and compile pipelines shared by the `fmc` binary and the tests.
//!
//! Failures of individual definitions are reported to a [`DiagnosticHandler`]
//! as they are found; the returned [`DriverError`] only summarises the run.

use clap::ValueEnum;
use frontend::diagnostics::{Diagnostic, DiagnosticHandler};
use frontend::parser::parse_program;
use frontend::surface::Program;
use kernel::checker::{check_definition, Env};
use mir::pretty::pretty_program;
use mir::EraseError;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Printed when every definition of a file checks.
pub const ALL_CHECK: &str = "All terms check.";

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("could not parse the source")]
    Parse,
    #[error("{0} definition(s) failed to check")]
    Check(usize),
    #[error("compilation failed: {0}")]
    Erase(#[from] EraseError),
    #[error("could not serialize the program: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `name/arity = term` line per definition
    Pretty,
    /// The erased program as JSON, for external renderers
    Json,
}

/// Parse a source file. Redeclared names are reported as warnings.
pub fn parse(
    source: &str,
    diagnostics: &mut dyn DiagnosticHandler,
) -> Result<Program, DriverError> {
    let program = parse_program(source).map_err(|err| {
        diagnostics.handle(Diagnostic::from_parse_error(&err));
        DriverError::Parse
    })?;
    for decl in program.redeclarations() {
        warn!(definition = %decl.name, line = decl.span.line, "redeclared");
        diagnostics.handle(Diagnostic::from_redeclaration(decl));
    }
    Ok(program)
}

/// Check every definition of `program`, continuing past failures.
pub fn check_program(
    program: &Program,
    env: &Env,
    diagnostics: &mut dyn DiagnosticHandler,
) -> Result<(), DriverError> {
    let mut failed = 0;
    for (name, _) in env.iter() {
        match check_definition(env, name) {
            Ok(()) => debug!(definition = name, "ok"),
            Err(err) => {
                failed += 1;
                diagnostics.handle(Diagnostic::from_type_error(name, &err, program.span_of(name)));
            }
        }
    }
    info!(definitions = env.len(), failed, "checked");
    if failed == 0 {
        Ok(())
    } else {
        Err(DriverError::Check(failed))
    }
}

/// Parse and check a source file, returning its definition table.
pub fn check_source(
    source: &str,
    diagnostics: &mut dyn DiagnosticHandler,
) -> Result<Env, DriverError> {
    let program = parse(source, diagnostics)?;
    let env = program.to_env();
    check_program(&program, &env, diagnostics)?;
    Ok(env)
}

/// Check a source file, then erase `main` and its dependencies (or the whole
/// table when no `main` is given) and render the result.
pub fn compile_source(
    source: &str,
    main: Option<&str>,
    format: OutputFormat,
    diagnostics: &mut dyn DiagnosticHandler,
) -> Result<String, DriverError> {
    let env = check_source(source, diagnostics)?;
    let program = match main {
        Some(main) => mir::compile(&env, main)?,
        None => mir::compile_all(&env)?,
    };
    info!(definitions = program.defs.len(), "compiled");
    match format {
        OutputFormat::Pretty => Ok(pretty_program(&program)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&program)?),
    }
}
