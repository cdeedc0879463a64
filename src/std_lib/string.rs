//! `str` methods and the three string formatting mini-languages:
//! format specs (`f"{x:>8.2f}"`), `str.format` and `%` interpolation.

use super::functions::int_arg;
use crate::ast::{format_float, quote_string};
use crate::interpreter::{BuiltinFn, CallArgs, ErrorKind, Interpreter, InterpreterError, Value};

pub fn method(name: &str) -> Option<BuiltinFn> {
    let method: BuiltinFn = match name {
        "upper" => str_upper,
        "lower" => str_lower,
        "strip" => str_strip,
        "lstrip" => str_lstrip,
        "rstrip" => str_rstrip,
        "split" => str_split,
        "splitlines" => str_splitlines,
        "join" => str_join,
        "replace" => str_replace,
        "startswith" => str_startswith,
        "endswith" => str_endswith,
        "find" => str_find,
        "count" => str_count,
        "format" => str_format,
        "title" => str_title,
        "capitalize" => str_capitalize,
        "isdigit" => str_isdigit,
        "isalpha" => str_isalpha,
        _ => return None,
    };
    Some(method)
}

fn receiver<'a>(args: &'a CallArgs, name: &str) -> Result<&'a str, InterpreterError> {
    match args.receiver(name)? {
        Value::Str(text) => Ok(text),
        other => Err(InterpreterError::type_error(format!(
            "descriptor '{}' requires a 'str' object but received a '{}'",
            name,
            other.type_name()
        ))),
    }
}

fn string_arg<'a>(value: &'a Value, method: &str) -> Result<&'a str, InterpreterError> {
    match value {
        Value::Str(text) => Ok(text),
        other => Err(InterpreterError::type_error(format!(
            "{}() argument must be str, not {}",
            method,
            other.type_name()
        ))),
    }
}

fn str_upper(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("upper", 0, 0, &[])?;
    Ok(Value::str(receiver(&args, "upper")?.to_uppercase()))
}

fn str_lower(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("lower", 0, 0, &[])?;
    Ok(Value::str(receiver(&args, "lower")?.to_lowercase()))
}

#[derive(Clone, Copy)]
enum Side {
    Both,
    Start,
    End,
}

fn strip(args: &CallArgs, name: &str, side: Side) -> Result<Value, InterpreterError> {
    args.expect(name, 0, 1, &[])?;
    let text = receiver(args, name)?;
    let chars: Option<Vec<char>> = match args.arg(0) {
        None | Some(Value::None) => None,
        Some(value) => Some(string_arg(value, name)?.chars().collect()),
    };
    let strip_char = |c: char| match &chars {
        Some(set) => set.contains(&c),
        None => c.is_whitespace(),
    };
    let stripped = match side {
        Side::Both => text.trim_matches(strip_char),
        Side::Start => text.trim_start_matches(strip_char),
        Side::End => text.trim_end_matches(strip_char),
    };
    Ok(Value::str(stripped))
}

fn str_strip(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    strip(&args, "strip", Side::Both)
}

fn str_lstrip(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    strip(&args, "lstrip", Side::Start)
}

fn str_rstrip(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    strip(&args, "rstrip", Side::End)
}

fn str_split(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("split", 0, 2, &["sep", "maxsplit"])?;
    let text = receiver(&args, "split")?;
    let max_split = match args.arg_or_keyword(1, "maxsplit") {
        Some(value) => int_arg(value)?,
        None => -1,
    };

    let parts: Vec<String> = match args.arg_or_keyword(0, "sep") {
        None | Some(Value::None) => split_whitespace(text, max_split),
        Some(separator) => {
            let separator = string_arg(separator, "split")?;
            if separator.is_empty() {
                return Err(InterpreterError::value_error("empty separator"));
            }
            if max_split < 0 {
                text.split(separator).map(str::to_string).collect()
            } else {
                text.splitn(max_split as usize + 1, separator).map(str::to_string).collect()
            }
        }
    };
    Ok(Value::list(parts.into_iter().map(Value::Str).collect()))
}

fn split_whitespace(text: &str, max_split: i64) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if max_split >= 0 && parts.len() as i64 == max_split {
            parts.push(rest.to_string());
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(rest[..end].to_string());
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(rest.to_string());
                break;
            }
        }
    }
    parts
}

fn str_splitlines(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("splitlines", 0, 0, &[])?;
    let text = receiver(&args, "splitlines")?;
    Ok(Value::list(text.lines().map(Value::str).collect()))
}

fn str_join(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("join", 1, 1, &[])?;
    let separator = receiver(&args, "join")?;
    let items = interpreter.iterate(&args.positional[0])?;
    let mut parts = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Str(text) => parts.push(text.as_str()),
            other => {
                return Err(InterpreterError::type_error(format!(
                    "sequence item {}: expected str instance, {} found",
                    index,
                    other.type_name()
                )))
            }
        }
    }
    Ok(Value::str(parts.join(separator)))
}

fn str_replace(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("replace", 2, 3, &["count"])?;
    let text = receiver(&args, "replace")?;
    let old = string_arg(&args.positional[0], "replace")?;
    let new = string_arg(&args.positional[1], "replace")?;
    let count = match args.arg_or_keyword(2, "count") {
        Some(value) => int_arg(value)?,
        None => -1,
    };
    let replaced = if count < 0 {
        text.replace(old, new)
    } else {
        text.replacen(old, new, count as usize)
    };
    Ok(Value::str(replaced))
}

fn affix_matches(args: &CallArgs, name: &str, test: fn(&str, &str) -> bool) -> Result<Value, InterpreterError> {
    args.expect(name, 1, 1, &[])?;
    let text = receiver(args, name)?;
    let matched = match &args.positional[0] {
        Value::Tuple(options) => {
            let mut any = false;
            for option in options.iter() {
                any |= test(text, string_arg(option, name)?);
            }
            any
        }
        value => test(text, string_arg(value, name)?),
    };
    Ok(Value::Bool(matched))
}

fn str_startswith(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    affix_matches(&args, "startswith", |text, prefix| text.starts_with(prefix))
}

fn str_endswith(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    affix_matches(&args, "endswith", |text, suffix| text.ends_with(suffix))
}

fn str_find(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("find", 1, 1, &[])?;
    let text = receiver(&args, "find")?;
    let needle = string_arg(&args.positional[0], "find")?;
    let position = text
        .find(needle)
        .map(|byte| text[..byte].chars().count() as i64)
        .unwrap_or(-1);
    Ok(Value::Int(position))
}

fn str_count(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("count", 1, 1, &[])?;
    let text = receiver(&args, "count")?;
    let needle = string_arg(&args.positional[0], "count")?;
    let count = if needle.is_empty() {
        text.chars().count() + 1
    } else {
        text.matches(needle).count()
    };
    Ok(Value::Int(count as i64))
}

fn str_format(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    let template = receiver(&args, "format")?;
    let text = format_template(interpreter, template, &args.positional, &args.keywords)?;
    Ok(Value::Str(text))
}

fn str_title(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("title", 0, 0, &[])?;
    let text = receiver(&args, "title")?;
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    Ok(Value::Str(out))
}

fn str_capitalize(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("capitalize", 0, 0, &[])?;
    let text = receiver(&args, "capitalize")?;
    let mut chars = text.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    };
    Ok(Value::Str(capitalized))
}

fn str_isdigit(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("isdigit", 0, 0, &[])?;
    let text = receiver(&args, "isdigit")?;
    Ok(Value::Bool(!text.is_empty() && text.chars().all(|c| c.is_ascii_digit())))
}

fn str_isalpha(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("isalpha", 0, 0, &[])?;
    let text = receiver(&args, "isalpha")?;
    Ok(Value::Bool(!text.is_empty() && text.chars().all(char::is_alphabetic)))
}

/// `str.format`: `{}`, `{0}`, `{name}`, attribute and index access,
/// `!r`/`!s` conversions and a format spec after `:`.
pub fn format_template(
    interpreter: &mut Interpreter,
    template: &str,
    positional: &[Value],
    keywords: &[(String, Value)],
) -> Result<String, InterpreterError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_index = 0;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                let mut depth = 1;
                loop {
                    match chars.next() {
                        Some('{') => {
                            depth += 1;
                            field.push('{');
                        }
                        Some('}') => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                            field.push('}');
                        }
                        Some(other) => field.push(other),
                        None => return Err(InterpreterError::value_error("expected '}' before end of string")),
                    }
                }
                let rendered = render_field(interpreter, &field, positional, keywords, &mut next_index)?;
                out.push_str(&rendered);
            }
            '}' => return Err(InterpreterError::value_error("Single '}' encountered in format string")),
            other => out.push(other),
        }
    }
    Ok(out)
}

fn render_field(
    interpreter: &mut Interpreter,
    field: &str,
    positional: &[Value],
    keywords: &[(String, Value)],
    next_index: &mut usize,
) -> Result<String, InterpreterError> {
    let (head, spec) = match field.find(':') {
        Some(colon) => (&field[..colon], &field[colon + 1..]),
        None => (field, ""),
    };
    let (name, conversion) = match head.find('!') {
        Some(bang) => (&head[..bang], head[bang + 1..].chars().next()),
        None => (head, None),
    };

    let split = name.find(['.', '[']).unwrap_or(name.len());
    let (first, mut accessors) = name.split_at(split);
    let mut value = if first.is_empty() {
        let index = *next_index;
        *next_index += 1;
        positional_field(positional, index)?
    } else if let Ok(index) = first.parse::<usize>() {
        positional_field(positional, index)?
    } else {
        match keywords.iter().find(|(key, _)| key == first) {
            Some((_, value)) => value.clone(),
            None => return Err(InterpreterError::runtime(ErrorKind::KeyError, quote_string(first))),
        }
    };

    while !accessors.is_empty() {
        if let Some(after) = accessors.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            value = interpreter.get_attribute(&value, &after[..end])?;
            accessors = &after[end..];
        } else if let Some(after) = accessors.strip_prefix('[') {
            let end = after
                .find(']')
                .ok_or_else(|| InterpreterError::value_error("Missing ']' in format string"))?;
            let key = &after[..end];
            let key = key.parse::<i64>().map(Value::Int).unwrap_or_else(|_| Value::str(key));
            value = interpreter.get_item(&value, &key)?;
            accessors = &after[end + 1..];
        } else {
            return Err(InterpreterError::value_error(
                "Only '.' or '[' may follow ']' in format field specifier",
            ));
        }
    }

    let value = match conversion {
        Some('r') | Some('a') => Value::Str(interpreter.repr(&value)?),
        Some('s') => Value::Str(interpreter.stringify(&value)?),
        Some(other) => {
            return Err(InterpreterError::value_error(format!(
                "Unknown conversion specifier {}",
                other
            )))
        }
        None => value,
    };
    format_value(interpreter, &value, spec)
}

fn positional_field(positional: &[Value], index: usize) -> Result<Value, InterpreterError> {
    positional.get(index).cloned().ok_or_else(|| {
        InterpreterError::index_error(format!(
            "Replacement index {} out of range for positional args tuple",
            index
        ))
    })
}

/// Parsed `[[fill]align][sign][#][0][width][,|_][.precision][type]`.
#[derive(Debug, Clone, PartialEq)]
struct FormatSpec {
    fill: char,
    align: Option<char>,
    sign: char,
    alternate: bool,
    width: usize,
    grouping: Option<char>,
    precision: Option<usize>,
    kind: Option<char>,
}

impl FormatSpec {
    fn parse(spec: &str) -> Result<Self, InterpreterError> {
        let invalid = || InterpreterError::value_error(format!("Invalid format specifier '{}'", spec));
        let chars: Vec<char> = spec.chars().collect();
        let is_align = |c: char| matches!(c, '<' | '>' | '^' | '=');
        let mut parsed = FormatSpec {
            fill: ' ',
            align: None,
            sign: '-',
            alternate: false,
            width: 0,
            grouping: None,
            precision: None,
            kind: None,
        };
        let mut i = 0;

        if chars.len() >= 2 && is_align(chars[1]) {
            parsed.fill = chars[0];
            parsed.align = Some(chars[1]);
            i = 2;
        } else if chars.first().copied().is_some_and(is_align) {
            parsed.align = Some(chars[0]);
            i = 1;
        }
        if let Some(&sign @ ('+' | '-' | ' ')) = chars.get(i) {
            parsed.sign = sign;
            i += 1;
        }
        if chars.get(i) == Some(&'#') {
            parsed.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            if parsed.align.is_none() {
                parsed.fill = '0';
                parsed.align = Some('=');
            }
            i += 1;
        }
        let width_start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        if i > width_start {
            let digits: String = chars[width_start..i].iter().collect();
            parsed.width = digits.parse().map_err(|_| invalid())?;
        }
        if let Some(&grouping @ (',' | '_')) = chars.get(i) {
            parsed.grouping = Some(grouping);
            i += 1;
        }
        if chars.get(i) == Some(&'.') {
            i += 1;
            let precision_start = i;
            while chars.get(i).is_some_and(char::is_ascii_digit) {
                i += 1;
            }
            if i == precision_start {
                return Err(InterpreterError::value_error("Format specifier missing precision"));
            }
            let digits: String = chars[precision_start..i].iter().collect();
            parsed.precision = Some(digits.parse().map_err(|_| invalid())?);
        }
        if let Some(&kind) = chars.get(i) {
            if !"bcdeEfFgGnosxX%".contains(kind) {
                return Err(invalid());
            }
            parsed.kind = Some(kind);
            i += 1;
        }
        if i != chars.len() {
            return Err(invalid());
        }
        Ok(parsed)
    }
}

/// `format(value, spec)`, as used by f-strings and `str.format`.
pub fn format_value(interpreter: &mut Interpreter, value: &Value, spec: &str) -> Result<String, InterpreterError> {
    if spec.is_empty() {
        return interpreter.stringify(value);
    }
    let spec = FormatSpec::parse(spec)?;
    let unknown = |kind: char| {
        InterpreterError::value_error(format!(
            "Unknown format code '{}' for object of type '{}'",
            kind,
            value.type_name()
        ))
    };

    let (body, negative, numeric) = match (spec.kind, value) {
        (Some(kind @ ('d' | 'n' | 'b' | 'o' | 'x' | 'X' | 'c')), value) => {
            let number = match value {
                Value::Float(_) => return Err(unknown(kind)),
                other => other.as_int().ok_or_else(|| unknown(kind))?,
            };
            let magnitude = number.unsigned_abs();
            let digits = match kind {
                'b' => format!("{}{:b}", if spec.alternate { "0b" } else { "" }, magnitude),
                'o' => format!("{}{:o}", if spec.alternate { "0o" } else { "" }, magnitude),
                'x' => format!("{}{:x}", if spec.alternate { "0x" } else { "" }, magnitude),
                'X' => format!("{}{:X}", if spec.alternate { "0X" } else { "" }, magnitude),
                'c' => char::from_u32(magnitude as u32).map(String::from).unwrap_or_default(),
                _ => group_digits(&magnitude.to_string(), spec.grouping),
            };
            (digits, number < 0, true)
        }
        (Some(kind @ ('e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%')), value) => {
            let number = value.as_number().ok_or_else(|| unknown(kind))?;
            (format_float_kind(number.abs(), kind, &spec), number.is_sign_negative() && number != 0.0, true)
        }
        (None, Value::Int(number)) => (group_digits(&number.unsigned_abs().to_string(), spec.grouping), *number < 0, true),
        (None, Value::Float(number)) => {
            let body = match spec.precision {
                Some(_) => format_float_kind(number.abs(), 'g', &spec),
                None => format_float(number.abs()),
            };
            (body, number.is_sign_negative() && *number != 0.0, true)
        }
        (Some('s') | None, value) => {
            let mut text = interpreter.stringify(value)?;
            if let Some(precision) = spec.precision {
                text = text.chars().take(precision).collect();
            }
            (text, false, false)
        }
        (Some(kind), _) => return Err(unknown(kind)),
    };

    let sign = match (negative, spec.sign) {
        (true, _) => "-",
        (false, '+') if numeric => "+",
        (false, ' ') if numeric => " ",
        _ => "",
    };
    Ok(pad(sign, &body, &spec, numeric))
}

fn format_float_kind(number: f64, kind: char, spec: &FormatSpec) -> String {
    if !number.is_finite() {
        let text = if number.is_nan() { "nan" } else { "inf" };
        return if kind.is_ascii_uppercase() { text.to_uppercase() } else { text.to_string() };
    }
    let precision = spec.precision.unwrap_or(6);
    match kind {
        'f' | 'F' => group_fraction(&format!("{:.*}", precision, number), spec.grouping),
        '%' => format!("{}%", group_fraction(&format!("{:.*}", precision, number * 100.0), spec.grouping)),
        'e' | 'E' => {
            let text = scientific(number, precision);
            if kind == 'E' {
                text.to_uppercase()
            } else {
                text
            }
        }
        _ => {
            let text = general(number, precision.max(1), spec.alternate);
            if kind == 'G' {
                text.to_uppercase()
            } else {
                text
            }
        }
    }
}

/// Scientific notation with a signed, at least two digit exponent.
fn scientific(number: f64, precision: usize) -> String {
    let text = format!("{:.*e}", precision, number);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            format!("{}e{}{:02}", mantissa, if exponent < 0 { '-' } else { '+' }, exponent.abs())
        }
        None => text,
    }
}

/// The `g` presentation: fixed or scientific by magnitude, trailing zeros
/// removed unless `#` was given.
fn general(number: f64, precision: usize, alternate: bool) -> String {
    if number == 0.0 {
        return if alternate { format!("{:.*}", precision - 1, 0.0) } else { "0".to_string() };
    }
    let exponent = number.abs().log10().floor() as i64;
    let text = if exponent < -4 || exponent >= precision as i64 {
        scientific(number, precision - 1)
    } else {
        format!("{:.*}", (precision as i64 - 1 - exponent).max(0) as usize, number)
    };
    if alternate {
        return text;
    }
    match text.split_once('e') {
        Some((mantissa, exponent)) => format!("{}e{}", trim_fraction(mantissa), exponent),
        None => trim_fraction(&text).to_string(),
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn group_digits(digits: &str, separator: Option<char>) -> String {
    let Some(separator) = separator else {
        return digits.to_string();
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

fn group_fraction(text: &str, separator: Option<char>) -> String {
    match text.split_once('.') {
        Some((whole, fraction)) => format!("{}.{}", group_digits(whole, separator), fraction),
        None => group_digits(text, separator),
    }
}

fn pad(sign: &str, body: &str, spec: &FormatSpec, numeric: bool) -> String {
    let length = sign.chars().count() + body.chars().count();
    if spec.width <= length {
        return format!("{}{}", sign, body);
    }
    let padding = spec.width - length;
    let fill = |count: usize| spec.fill.to_string().repeat(count);
    let align = spec.align.unwrap_or(if numeric { '>' } else { '<' });
    match align {
        '<' => format!("{}{}{}", sign, body, fill(padding)),
        '^' => format!("{}{}{}{}", fill(padding / 2), sign, body, fill(padding - padding / 2)),
        '=' => format!("{}{}{}", sign, fill(padding), body),
        _ => format!("{}{}{}", fill(padding), sign, body),
    }
}

/// `template % arguments`.
pub fn percent_format(interpreter: &mut Interpreter, template: &str, arguments: &Value) -> Result<Value, InterpreterError> {
    let (values, mapping) = match arguments {
        Value::Tuple(items) => (items.as_ref().clone(), None),
        Value::Dict(_) => (vec![arguments.clone()], Some(arguments.clone())),
        other => (vec![other.clone()], None),
    };
    let mut next = 0;
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut key = None;
        if chars.peek() == Some(&'(') {
            chars.next();
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some(')') => break,
                    Some(other) => name.push(other),
                    None => return Err(InterpreterError::value_error("incomplete format key")),
                }
            }
            key = Some(name);
        }

        let mut flags = String::new();
        while let Some(&flag @ ('-' | '+' | ' ' | '0' | '#')) = chars.peek() {
            flags.push(flag);
            chars.next();
        }
        let mut width = String::new();
        while let Some(&digit) = chars.peek().filter(|c| c.is_ascii_digit()) {
            width.push(digit);
            chars.next();
        }
        let mut precision = String::new();
        if chars.peek() == Some(&'.') {
            chars.next();
            precision.push('.');
            while let Some(&digit) = chars.peek().filter(|c| c.is_ascii_digit()) {
                precision.push(digit);
                chars.next();
            }
            if precision == "." {
                precision.push('0');
            }
        }

        let conversion = chars
            .next()
            .ok_or_else(|| InterpreterError::value_error("incomplete format"))?;
        if conversion == '%' {
            out.push('%');
            continue;
        }

        let value = match &key {
            Some(name) => {
                let mapping = mapping
                    .as_ref()
                    .ok_or_else(|| InterpreterError::type_error("format requires a mapping"))?;
                interpreter.get_item(mapping, &Value::str(name.clone()))?
            }
            None => {
                let value = values
                    .get(next)
                    .cloned()
                    .ok_or_else(|| InterpreterError::type_error("not enough arguments for format string"))?;
                next += 1;
                value
            }
        };

        let (value, kind) = match conversion {
            's' => (Value::Str(interpreter.stringify(&value)?), 's'),
            'r' | 'a' => (Value::Str(interpreter.repr(&value)?), 's'),
            'd' | 'i' | 'u' => match &value {
                Value::Float(number) => (Value::Int(number.trunc() as i64), 'd'),
                other if other.as_int().is_some() => (other.clone(), 'd'),
                other => {
                    return Err(InterpreterError::type_error(format!(
                        "%{} format: a real number is required, not {}",
                        conversion,
                        other.type_name()
                    )))
                }
            },
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'x' | 'X' | 'o' => (value, conversion),
            other => {
                return Err(InterpreterError::value_error(format!(
                    "unsupported format character '{}' (0x{:x})",
                    other, other as u32
                )))
            }
        };

        let align = if flags.contains('-') { "<" } else { "" };
        let sign = if flags.contains('+') {
            "+"
        } else if flags.contains(' ') {
            " "
        } else {
            ""
        };
        let zero = if flags.contains('0') && align.is_empty() { "0" } else { "" };
        let alternate = if flags.contains('#') { "#" } else { "" };
        let spec = format!("{}{}{}{}{}{}{}", align, sign, alternate, zero, width, precision, kind);
        out.push_str(&format_value(interpreter, &value, &spec)?);
    }

    if mapping.is_none() && next < values.len() {
        return Err(InterpreterError::type_error(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(Value::Str(out))
}
