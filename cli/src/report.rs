use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use frontend::diagnostics::{Diagnostic, Level};

/// Character offset of `byte` in `source`.
fn char_offset(source: &str, byte: usize) -> usize {
    source.get(..byte).map_or(byte, |prefix| prefix.chars().count())
}

/// Render a diagnostic for the terminal.
///
/// Failed definitions are shown in the plain `Error on 'name':` layout. Other
/// diagnostics with a span get a source excerpt.
pub fn render(diagnostic: &Diagnostic, filename: &str, source: &str, color: bool) -> String {
    let span = match (&diagnostic.definition, diagnostic.span) {
        (None, Some(span)) => span,
        _ => return diagnostic.to_string(),
    };
    let kind = match diagnostic.level {
        Level::Error => ReportKind::Error,
        Level::Warning => ReportKind::Warning,
    };
    let start = char_offset(source, span.start);
    let end = char_offset(source, span.end).max(start);

    let mut report = Report::build(kind, filename, start)
        .with_config(Config::default().with_color(color))
        .with_message(&diagnostic.message);
    if let Some(code) = diagnostic.code {
        report = report.with_code(code);
    }
    for (label_span, message) in &diagnostic.labels {
        let label_start = char_offset(source, label_span.start);
        let label_end = char_offset(source, label_span.end).max(label_start);
        report = report.with_label(
            Label::new((filename, label_start..label_end))
                .with_message(message)
                .with_color(Color::Red),
        );
    }
    if diagnostic.labels.is_empty() {
        report = report.with_label(Label::new((filename, start..end)).with_color(Color::Red));
    }
    for note in &diagnostic.notes {
        report = report.with_note(note);
    }

    let mut out = Vec::new();
    match report.finish().write((filename, Source::from(source)), &mut out) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => diagnostic.to_string(),
    }
}
