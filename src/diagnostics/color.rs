pub fn red(s: &str) -> String { format!("\x1b[31m{}\x1b[0m", s) }
pub fn yellow(s: &str) -> String { format!("\x1b[33m{}\x1b[0m", s) }
pub fn blue(s: &str) -> String { format!("\x1b[34m{}\x1b[0m", s) }
pub fn bold(s: &str) -> String { format!("\x1b[1m{}\x1b[0m", s) }

pub fn error_tag() -> String { bold(&red("error:")) }
pub fn help_tag() -> String { bold(&yellow("help:")) }

pub fn location(path: &str, line: usize, column: usize) -> String {
    format!("  {} {}:{}:{}", blue("-->"), path, line, column)
}

/// The offending line with `width` carets under it, starting at `column`.
pub fn caret_line(line_number: usize, line_text: &str, column: usize, width: usize) -> String {
    let gutter = line_number.to_string();
    let pad = " ".repeat(gutter.len());
    let mut buf = String::new();
    buf.push_str(&format!("{} {}\n", pad, blue("|")));
    buf.push_str(&format!("{} {} {}\n", blue(&gutter), blue("|"), line_text));
    let indent: String = line_text
        .chars()
        .take(column.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    buf.push_str(&format!("{} {} {}{}", pad, blue("|"), indent, red(&"^".repeat(width.max(1)))));
    buf
}

/// Strips the escape sequences the helpers above add.
pub fn plain(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
