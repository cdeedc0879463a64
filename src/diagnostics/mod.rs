//! Human-readable rendering of engine errors against the component source.

use std::collections::BTreeSet;
use std::path::Path;

use crate::execution_engine::EngineError;
use crate::lexer::{tokenize, TokenType};
use crate::std_lib;

pub mod color;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub width: usize,
}

fn get_line(source: &str, line: usize) -> Option<&str> {
    source.lines().nth(line.saturating_sub(1))
}

/// The quoted name in messages like `name 'x' is not defined`.
fn quoted_name<'a>(message: &'a str, before: &str, after: &str) -> Option<&'a str> {
    let start = message.find(before)? + before.len();
    let rest = &message[start..];
    let end = rest.find(after)?;
    let name = &rest[..end];
    let valid = name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then_some(name)
}

/// A one-line hint for a syntax error message, if one applies.
fn suggest(message: &str) -> Option<String> {
    let m = message.to_lowercase();
    if m.contains("expected ')'") {
        Some("try adding a closing parenthesis: ')'".to_string())
    } else if m.contains("expected ']'") {
        Some("try adding a closing bracket: ']'".to_string())
    } else if m.contains("expected '}'") || m.contains("expecting '}'") {
        Some("try adding a closing brace: '}'".to_string())
    } else if m == "expected ':'" || m.contains("expected ':' after") {
        Some("blocks and dict entries need a ':'".to_string())
    } else if m.contains("indented block") {
        Some("indent the body of the block, or write 'pass' for an empty one".to_string())
    } else if m.contains("unindent") || m.contains("unexpected indent") {
        Some("indent with the same number of spaces as an enclosing block".to_string())
    } else if m.contains("unterminated string") {
        Some("close the string with the quote it started with".to_string())
    } else if m.contains("after decorator") {
        Some("a decorator must be followed by a 'def' or 'class' statement".to_string())
    } else if m.contains("'!'") {
        Some("use 'not' for negation; '!' only appears in '!='".to_string())
    } else {
        None
    }
}

/// Every identifier in the source. Source that does not lex contributes
/// nothing.
fn collect_identifiers(source: &str) -> BTreeSet<String> {
    match tokenize(source) {
        Ok(tokens) => tokens
            .into_iter()
            .filter_map(|token| match token.token_type {
                TokenType::Identifier(name) => Some(name),
                _ => None,
            })
            .collect(),
        Err(_) => BTreeSet::new(),
    }
}

/// Names introduced by `def`, for "did you mean" on a missing entrypoint.
fn collect_function_names(source: &str) -> Vec<(String, Span)> {
    let Ok(tokens) = tokenize(source) else {
        return Vec::new();
    };
    tokens
        .windows(2)
        .filter_map(|pair| match (&pair[0].token_type, &pair[1].token_type) {
            (TokenType::Def, TokenType::Identifier(name)) => Some((
                name.clone(),
                Span {
                    line: pair[1].line,
                    column: pair[1].column,
                    width: name.chars().count(),
                },
            )),
            _ => None,
        })
        .collect()
}

/// The first place `name` is used as a whole identifier.
fn find_name_span(source: &str, name: &str) -> Option<Span> {
    let tokens = tokenize(source).ok()?;
    tokens.iter().find_map(|token| match &token.token_type {
        TokenType::Identifier(ident) if ident == name => Some(Span {
            line: token.line,
            column: token.column,
            width: name.chars().count(),
        }),
        _ => None,
    })
}

fn closest<'a>(bad: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let threshold = if bad.chars().count() <= 3 { 1 } else { 2 };
    candidates
        .into_iter()
        .filter(|candidate| *candidate != bad)
        .map(|candidate| (edit_distance(bad, candidate), candidate))
        .filter(|(distance, _)| *distance <= threshold)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// Levenshtein distance where swapping two adjacent characters costs one edit.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut dp = vec![vec![0; b.len() + 1]; a.len() + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        dp[0][j] = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1).min(dp[i][j - 1] + 1).min(dp[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                dp[i][j] = dp[i][j].min(dp[i - 2][j - 2] + 1);
            }
        }
    }
    dp[a.len()][b.len()]
}

/// Title, location and hints in the compiler-style layout.
pub fn emit_basic(title: &str, file_path: &Path, source: &str, span: Option<Span>, helps: &[String]) -> String {
    let mut out = format!("{} {}\n", color::error_tag(), color::bold(title));
    if let Some(span) = span {
        let column = span.column.max(1);
        out.push_str(&color::location(&file_path.display().to_string(), span.line, column));
        out.push('\n');
        if let Some(line_text) = get_line(source, span.line) {
            out.push_str(&color::caret_line(span.line, line_text, column, span.width));
            out.push('\n');
        }
    } else {
        out.push_str(&format!("  {} {}\n", color::blue("-->"), file_path.display()));
    }
    for help in helps {
        out.push_str(&format!("   = {} {}\n", color::help_tag(), help));
    }
    out
}

fn undefined_name_hints(source: &str, message: &str) -> (Option<Span>, Vec<String>) {
    let Some(name) = quoted_name(message, "name '", "' is not defined") else {
        return (None, Vec::new());
    };
    let mut candidates = collect_identifiers(source);
    candidates.extend(std_lib::builtins().into_keys());
    let mut helps = Vec::new();
    if let Some(suggestion) = closest(name, candidates.iter().map(String::as_str)) {
        helps.push(format!("a name with a similar spelling exists: '{}'", suggestion));
    } else {
        helps.push(format!("define '{}' or import it before it is used", name));
    }
    (find_name_span(source, name), helps)
}

fn missing_attribute_span(source: &str, message: &str) -> Option<Span> {
    let name = quoted_name(message, "has no attribute '", "'")?;
    find_name_span(source, name)
}

/// Renders `err` for a terminal, pointing into `source` where it can.
pub fn from_engine_error(file_path: &Path, source: &str, err: &EngineError) -> String {
    match err {
        EngineError::Syntax(syntax) => {
            let span = Span {
                line: syntax.line,
                column: syntax.column,
                width: 1,
            };
            let helps: Vec<String> = suggest(&syntax.message).into_iter().collect();
            emit_basic(&format!("invalid code: {}", syntax.message), file_path, source, Some(span), &helps)
        }
        EngineError::EmptySource => emit_basic(
            &err.to_string(),
            file_path,
            source,
            None,
            &["define a component class with a 'build' method, or a top-level 'def build(...)'".to_string()],
        ),
        EngineError::EntrypointMissing { name } => {
            let functions = collect_function_names(source);
            let near = closest(name, functions.iter().map(|(function, _)| function.as_str()));
            let mut helps = Vec::new();
            let mut span = None;
            if let Some(near) = near {
                helps.push(format!("found '{}'; the entrypoint must be spelled '{}'", near, name));
                span = functions.iter().find(|(function, _)| function == near).map(|(_, span)| *span);
            }
            helps.push(format!(
                "define '{}' as a method of the main class or as a top-level function",
                name
            ));
            emit_basic(&err.to_string(), file_path, source, span, &helps)
        }
        EngineError::Invocation { message } => {
            let (mut span, helps) = undefined_name_hints(source, message);
            if span.is_none() {
                span = missing_attribute_span(source, message);
            }
            emit_basic(&format!("component raised an error: {}", message), file_path, source, span, &helps)
        }
        EngineError::Config(_) => emit_basic(
            &err.to_string(),
            file_path,
            source,
            None,
            &["known keys: entrypoint_name, main_class_policy, component_base, include_code_field".to_string()],
        ),
    }
}
