use crate::parser::ParseError;
use crate::surface::{Decl, Span};
use kernel::checker::TypeError;
use std::fmt;

fn is_unknown_span(span: Span) -> bool {
    span.start == 0 && span.end == 0 && span.line == 0 && span.col == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "Error"),
            Level::Warning => write!(f, "Warning"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub code: Option<&'static str>,
    /// Definition the diagnostic was raised for, if any.
    pub definition: Option<String>,
    pub message: String,
    pub span: Option<Span>,
    pub labels: Vec<(Span, String)>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(level: Level, message: String) -> Self {
        Self {
            level,
            code: None,
            definition: None,
            message,
            span: None,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn error(message: String) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn warning(message: String) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_definition(mut self, name: impl Into<String>) -> Self {
        self.definition = Some(name.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        if !is_unknown_span(span) {
            self.span = Some(span);
        }
        self
    }

    pub fn with_label(mut self, span: Span, message: String) -> Self {
        if !is_unknown_span(span) {
            self.labels.push((span, message));
        }
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn message_with_code(&self) -> String {
        match self.code {
            Some(code) => format!("[{}] {}", code, self.message),
            None => self.message.clone(),
        }
    }

    pub fn from_parse_error(err: &ParseError) -> Self {
        let span = err.span();
        Diagnostic::error(err.to_string())
            .with_code("P0001")
            .with_span(span)
            .with_label(span, "here".to_string())
    }

    /// A later declaration of an already declared name. The table keeps the
    /// first position but the later body.
    pub fn from_redeclaration(decl: &Decl) -> Self {
        let message = format!("Redeclaration of '{}' replaces the earlier definition.", decl.name);
        Diagnostic::warning(message)
            .with_code("W0001")
            .with_span(decl.span)
            .with_label(decl.span, "redeclared here".to_string())
    }

    /// Report a failed definition. The notes carry the offending expression and
    /// the typing context, oldest hypothesis first. Unnamed hypotheses (the self
    /// variable of an anonymous `@`) are left out.
    pub fn from_type_error(name: &str, err: &TypeError, span: Option<Span>) -> Self {
        let mut diagnostic = Diagnostic::error(err.to_string())
            .with_code("T0001")
            .with_definition(name)
            .with_note(format!("Expression: {}", err.term))
            .with_note("Context:".to_string());
        for (hyp, ty) in err.context.entries() {
            if !hyp.is_empty() {
                diagnostic = diagnostic.with_note(format!("- {}: {}", hyp, ty));
            }
        }
        if let Some(span) = span {
            diagnostic = diagnostic
                .with_span(span)
                .with_label(span, format!("while checking '{}'", name));
        }
        diagnostic
    }
}

/// Plain-text rendering used when no source is available for a rich report.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.definition {
            Some(name) => writeln!(f, "{} on '{}':", self.level, name)?,
            None => writeln!(f, "{}:", self.level)?,
        }
        write!(f, "{}", self.message)?;
        for note in &self.notes {
            write!(f, "\n{}", note)?;
        }
        Ok(())
    }
}

pub trait DiagnosticHandler {
    fn handle(&mut self, diagnostic: Diagnostic);
}

// Simple vector collector
pub struct DiagnosticCollector {
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for DiagnosticCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }
}

impl DiagnosticHandler for DiagnosticCollector {
    fn handle(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
