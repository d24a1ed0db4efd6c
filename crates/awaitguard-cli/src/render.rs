//! Human-readable output

use std::io::{self, Write};
use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use awaitguard_checker::{Diagnostic, Severity};
use awaitguard_ir::{OperationId, OperationKind, Span, SymbolId};
use awaitguard_symbols::{Compilation, Symbol, SymbolTable};

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
        Severity::Hint => ReportKind::Custom("hint", Color::Cyan),
    }
}

/// Char range of a byte-offset span, clamped to the source
///
/// ariadne positions labels by char, spans count bytes.
fn char_range(span: Span, source: &str) -> Range<usize> {
    let end = char_index(source, span.end);
    char_index(source, span.start).min(end)..end
}

fn char_index(source: &str, byte: usize) -> usize {
    let byte = byte.min(source.len());
    source.char_indices().take_while(|&(i, _)| i < byte).count()
}

/// Render one diagnostic against its source text with ariadne
pub fn write_report(
    diagnostic: &Diagnostic,
    path: &str,
    source: &str,
    color: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    let primary = char_range(diagnostic.span, source);
    let label_color = match diagnostic.severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        _ => Color::Cyan,
    };

    let kind = report_kind(diagnostic.severity);
    let mut report = Report::build(kind, path.to_string(), primary.start)
        .with_config(Config::default().with_color(color))
        .with_code(&diagnostic.rule_id)
        .with_message(&diagnostic.message)
        .with_label(
            Label::new((path.to_string(), primary))
                .with_message(&diagnostic.message)
                .with_color(label_color),
        );

    for related in &diagnostic.related {
        report = report.with_label(
            Label::new((path.to_string(), char_range(related.span, source)))
                .with_message(&related.label)
                .with_color(Color::Blue),
        );
    }

    if let Some(first) = diagnostic.suggestions.first() {
        report = report.with_help(first.description());
    }

    report
        .finish()
        .write((path.to_string(), Source::from(source)), out)
}

/// Render every diagnostic; falls back to plain text without source
pub fn write_diagnostics(
    compilation: &Compilation,
    diagnostics: &[Diagnostic],
    color: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    match &compilation.syntax.source {
        Some(source) => {
            for diagnostic in diagnostics {
                write_report(diagnostic, &compilation.syntax.path, source, color, out)?;
            }
        }
        None => {
            for diagnostic in diagnostics {
                writeln!(out, "{}", diagnostic.format_simple())?;
            }
        }
    }
    Ok(())
}

/// Qualified display name of a symbol, e.g. `App.Program.Load`
pub fn symbol_name(table: &SymbolTable, id: SymbolId) -> String {
    match table.get(id) {
        Some(Symbol::Type(_)) => table.display_type(id),
        Some(Symbol::Method(method)) => {
            let name = if method.name.is_empty() {
                "<lambda>"
            } else {
                method.name.as_str()
            };
            match method.containing_type {
                Some(container) => format!("{}.{}", table.display_type(container), name),
                None => name.to_string(),
            }
        }
        None => format!("<unknown {}>", id),
    }
}

/// Indented dump of every operation block
pub fn write_dump(compilation: &Compilation, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "compilation {}: {} symbols, {} syntax nodes, {} blocks",
        compilation.name,
        compilation.symbols.len(),
        compilation.syntax.len(),
        compilation.blocks.len()
    )?;

    let table = &compilation.symbols;
    for (index, block) in compilation.blocks.iter().enumerate() {
        writeln!(
            out,
            "block {} owned by {} ({})",
            index,
            symbol_name(table, block.owner),
            block.owner
        )?;

        let graph = &block.graph;
        let mut children: Vec<Vec<OperationId>> = vec![Vec::new(); graph.len()];
        let mut roots = Vec::new();
        for op in graph.iter() {
            match op.parent {
                Some(parent) => children[parent.0 as usize].push(op.id),
                None => roots.push(op.id),
            }
        }

        let mut stack: Vec<(OperationId, usize)> =
            roots.into_iter().rev().map(|id| (id, 1)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(op) = graph.get(id) else { continue };
            let span = compilation.span_of(op.syntax);
            let detail = match &op.kind {
                OperationKind::Invocation { target, .. } => {
                    format!(" -> {}", symbol_name(table, *target))
                }
                OperationKind::LocalFunction { symbol }
                | OperationKind::AnonymousFunction { symbol } => {
                    format!(" {}", symbol_name(table, *symbol))
                }
                OperationKind::Other { label } => format!(" ({})", label),
                _ => String::new(),
            };
            writeln!(
                out,
                "{:indent$}{} {}{} [{}..{}]",
                "",
                op.id,
                op.kind.name(),
                detail,
                span.start,
                span.end,
                indent = depth * 2
            )?;
            for child in children[id.0 as usize].iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
    }
    Ok(())
}
