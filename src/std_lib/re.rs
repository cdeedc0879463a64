//! The `re` module, backed by the `regex` crate.
//!
//! Offsets reported to submitted code are character offsets, not bytes.
//! `match` and `fullmatch` are implemented by anchoring the pattern with
//! `\A` and `\z`, so `MULTILINE` never changes where they may start.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use regex::{Captures, Regex, RegexBuilder};

use super::functions::int_arg;
use crate::interpreter::{BuiltinFn, CallArgs, Class, Dict, Instance, Interpreter, InterpreterError, Module, Value};

pub const IGNORECASE: i64 = 2;
pub const MULTILINE: i64 = 8;
pub const DOTALL: i64 = 16;

#[derive(Clone, Copy, PartialEq)]
enum Anchor {
    None,
    Start,
    Full,
}

pub fn module() -> Value {
    let match_methods: &[(&str, BuiltinFn)] = &[
        ("group", match_group),
        ("groups", match_groups),
        ("groupdict", match_groupdict),
        ("start", match_start),
        ("end", match_end),
        ("span", match_span),
        ("__getitem__", match_group),
    ];
    let pattern_methods: &[(&str, BuiltinFn)] = &[
        ("findall", pattern_findall),
        ("sub", pattern_sub),
        ("match", pattern_match),
        ("search", pattern_search),
        ("fullmatch", pattern_fullmatch),
        ("split", pattern_split),
    ];
    let match_class = native_class("Match", match_methods);
    let pattern_class = native_class("Pattern", pattern_methods);

    let mut attributes = IndexMap::new();
    let functions: &[(&str, BuiltinFn)] = &[
        ("compile", re_compile),
        ("findall", re_findall),
        ("sub", re_sub),
        ("match", re_match),
        ("search", re_search),
        ("fullmatch", re_fullmatch),
        ("split", re_split),
        ("escape", re_escape),
    ];
    for (name, function) in functions {
        attributes.insert(name.to_string(), Value::builtin(name, *function));
    }
    for (name, flag) in [
        ("IGNORECASE", IGNORECASE),
        ("I", IGNORECASE),
        ("MULTILINE", MULTILINE),
        ("M", MULTILINE),
        ("DOTALL", DOTALL),
        ("S", DOTALL),
    ] {
        attributes.insert(name.to_string(), Value::Int(flag));
    }
    attributes.insert("Match".to_string(), Value::Class(match_class));
    attributes.insert("Pattern".to_string(), Value::Class(pattern_class));

    Value::Module(Rc::new(Module {
        name: "re".to_string(),
        attributes: RefCell::new(attributes),
    }))
}

fn native_class(name: &str, methods: &[(&str, BuiltinFn)]) -> Rc<Class> {
    let attributes = methods
        .iter()
        .map(|(method, function)| (method.to_string(), Value::builtin(method, *function)))
        .collect();
    Rc::new(Class {
        name: name.to_string(),
        bases: Vec::new(),
        ancestors: Vec::new(),
        attributes: RefCell::new(attributes),
    })
}

fn compile(pattern: &str, flags: i64, anchor: Anchor) -> Result<Regex, InterpreterError> {
    let source = match anchor {
        Anchor::None => pattern.to_string(),
        Anchor::Start => format!(r"\A(?:{})", pattern),
        Anchor::Full => format!(r"\A(?:{})\z", pattern),
    };
    RegexBuilder::new(&source)
        .case_insensitive(flags & IGNORECASE != 0)
        .multi_line(flags & MULTILINE != 0)
        .dot_matches_new_line(flags & DOTALL != 0)
        .build()
        .map_err(|err| InterpreterError::value_error(format!("invalid regular expression: {}", err)))
}

fn text_arg<'a>(value: &'a Value, function: &str) -> Result<&'a str, InterpreterError> {
    match value {
        Value::Str(text) => Ok(text),
        other => Err(InterpreterError::type_error(format!(
            "{}() expected string, got '{}'",
            function,
            other.type_name()
        ))),
    }
}

fn flags_arg(args: &CallArgs, index: usize) -> Result<i64, InterpreterError> {
    match args.arg_or_keyword(index, "flags") {
        Some(flags) => int_arg(flags),
        None => Ok(0),
    }
}

/// Pattern text and flags of a compiled `Pattern` receiver.
fn receiver_pattern(args: &CallArgs, name: &str) -> Result<(String, i64), InterpreterError> {
    let Value::Instance(instance) = args.receiver(name)? else {
        return Err(InterpreterError::type_error(format!("{}() requires a Pattern", name)));
    };
    let attributes = instance.attributes.borrow();
    let pattern = match attributes.get("pattern") {
        Some(Value::Str(pattern)) => pattern.clone(),
        _ => return Err(InterpreterError::type_error(format!("{}() requires a Pattern", name))),
    };
    let flags = attributes.get("flags").and_then(Value::as_int).unwrap_or(0);
    Ok((pattern, flags))
}

fn re_compile(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("compile", 1, 2, &["flags"])?;
    let pattern = text_arg(&args.positional[0], "compile")?;
    let flags = flags_arg(&args, 1)?;
    compile(pattern, flags, Anchor::None)?;

    let class = module_class(interpreter, "Pattern")?;
    let instance = Instance {
        class,
        attributes: RefCell::new(IndexMap::new()),
    };
    {
        let mut attributes = instance.attributes.borrow_mut();
        attributes.insert("pattern".to_string(), Value::str(pattern));
        attributes.insert("flags".to_string(), Value::Int(flags));
    }
    Ok(Value::Instance(Rc::new(instance)))
}

fn module_class(interpreter: &mut Interpreter, name: &str) -> Result<Rc<Class>, InterpreterError> {
    let module = interpreter.import_module("re")?;
    match interpreter.get_attribute(&module, name)? {
        Value::Class(class) => Ok(class),
        _ => Err(InterpreterError::type_error(format!("re.{} is not a class", name))),
    }
}

fn re_findall(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("findall", 2, 3, &["flags"])?;
    let regex = compile(text_arg(&args.positional[0], "findall")?, flags_arg(&args, 2)?, Anchor::None)?;
    findall(&regex, text_arg(&args.positional[1], "findall")?)
}

fn pattern_findall(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("findall", 1, 1, &[])?;
    let (pattern, flags) = receiver_pattern(&args, "findall")?;
    findall(&compile(&pattern, flags, Anchor::None)?, text_arg(&args.positional[0], "findall")?)
}

/// Whole matches without groups, the single group with one, tuples with more.
fn findall(regex: &Regex, text: &str) -> Result<Value, InterpreterError> {
    let group_count = regex.captures_len() - 1;
    let group_text = |captures: &Captures, index: usize| {
        Value::str(captures.get(index).map(|m| m.as_str()).unwrap_or(""))
    };
    let found = regex
        .captures_iter(text)
        .map(|captures| match group_count {
            0 => group_text(&captures, 0),
            1 => group_text(&captures, 1),
            _ => Value::tuple((1..=group_count).map(|index| group_text(&captures, index)).collect()),
        })
        .collect();
    Ok(Value::list(found))
}

fn re_sub(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("sub", 3, 5, &["count", "flags"])?;
    let regex = compile(text_arg(&args.positional[0], "sub")?, flags_arg(&args, 4)?, Anchor::None)?;
    let count = match args.arg_or_keyword(3, "count") {
        Some(count) => int_arg(count)?,
        None => 0,
    };
    substitute(interpreter, &regex, &args.positional[1], text_arg(&args.positional[2], "sub")?, count)
}

fn pattern_sub(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("sub", 2, 3, &["count"])?;
    let (pattern, flags) = receiver_pattern(&args, "sub")?;
    let count = match args.arg_or_keyword(2, "count") {
        Some(count) => int_arg(count)?,
        None => 0,
    };
    let regex = compile(&pattern, flags, Anchor::None)?;
    substitute(interpreter, &regex, &args.positional[0], text_arg(&args.positional[1], "sub")?, count)
}

/// `count == 0` replaces every match. A callable replacement receives a
/// `Match` object and must return a string.
fn substitute(interpreter: &mut Interpreter, regex: &Regex, replacement: &Value, text: &str, count: i64) -> Result<Value, InterpreterError> {
    let template = match replacement {
        Value::Str(template) => Some(expand_template(template)),
        _ => None,
    };
    let limit = if count <= 0 { usize::MAX } else { count as usize };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for captures in regex.captures_iter(text).take(limit) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        match &template {
            Some(template) => captures.expand(template, &mut out),
            None => {
                let found = match_object(interpreter, regex, text, &captures)?;
                let replaced = interpreter.call(replacement, vec![found], Vec::new())?;
                match replaced {
                    Value::Str(piece) => out.push_str(&piece),
                    other => {
                        return Err(InterpreterError::type_error(format!(
                            "expected str instance, {} found",
                            other.type_name()
                        )))
                    }
                }
            }
        }
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(Value::Str(out))
}

/// Rewrites a replacement string (`\1`, `\g<1>`, `\g<name>`) into the
/// `regex` crate's `${1}` syntax, escaping literal dollars.
fn expand_template(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.next() {
                Some(digit) if digit.is_ascii_digit() => {
                    let mut group = String::from(digit);
                    while let Some(&next) = chars.peek().filter(|c| c.is_ascii_digit()) {
                        group.push(next);
                        chars.next();
                    }
                    out.push_str(&format!("${{{}}}", group));
                }
                Some('g') if chars.peek() == Some(&'<') => {
                    chars.next();
                    let name: String = chars.by_ref().take_while(|c| *c != '>').collect();
                    out.push_str(&format!("${{{}}}", name));
                }
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}

fn re_match(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    module_search(interpreter, &args, "match", Anchor::Start)
}

fn re_search(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    module_search(interpreter, &args, "search", Anchor::None)
}

fn re_fullmatch(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    module_search(interpreter, &args, "fullmatch", Anchor::Full)
}

fn module_search(interpreter: &mut Interpreter, args: &CallArgs, name: &str, anchor: Anchor) -> Result<Value, InterpreterError> {
    args.expect(name, 2, 3, &["flags"])?;
    let regex = compile(text_arg(&args.positional[0], name)?, flags_arg(args, 2)?, anchor)?;
    search(interpreter, &regex, text_arg(&args.positional[1], name)?)
}

fn pattern_match(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    pattern_search_with(interpreter, &args, "match", Anchor::Start)
}

fn pattern_search(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    pattern_search_with(interpreter, &args, "search", Anchor::None)
}

fn pattern_fullmatch(interpreter: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    pattern_search_with(interpreter, &args, "fullmatch", Anchor::Full)
}

fn pattern_search_with(interpreter: &mut Interpreter, args: &CallArgs, name: &str, anchor: Anchor) -> Result<Value, InterpreterError> {
    args.expect(name, 1, 1, &[])?;
    let (pattern, flags) = receiver_pattern(args, name)?;
    let regex = compile(&pattern, flags, anchor)?;
    search(interpreter, &regex, text_arg(&args.positional[0], name)?)
}

fn search(interpreter: &mut Interpreter, regex: &Regex, text: &str) -> Result<Value, InterpreterError> {
    match regex.captures(text) {
        Some(captures) => match_object(interpreter, regex, text, &captures),
        None => Ok(Value::None),
    }
}

fn re_split(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("split", 2, 4, &["maxsplit", "flags"])?;
    let regex = compile(text_arg(&args.positional[0], "split")?, flags_arg(&args, 3)?, Anchor::None)?;
    let max_split = match args.arg_or_keyword(2, "maxsplit") {
        Some(value) => int_arg(value)?,
        None => 0,
    };
    split(&regex, text_arg(&args.positional[1], "split")?, max_split)
}

fn pattern_split(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("split", 1, 2, &["maxsplit"])?;
    let (pattern, flags) = receiver_pattern(&args, "split")?;
    let max_split = match args.arg_or_keyword(1, "maxsplit") {
        Some(value) => int_arg(value)?,
        None => 0,
    };
    split(&compile(&pattern, flags, Anchor::None)?, text_arg(&args.positional[0], "split")?, max_split)
}

fn split(regex: &Regex, text: &str, max_split: i64) -> Result<Value, InterpreterError> {
    let parts: Vec<Value> = if max_split <= 0 {
        regex.split(text).map(Value::str).collect()
    } else {
        regex.splitn(text, max_split as usize + 1).map(Value::str).collect()
    };
    Ok(Value::list(parts))
}

fn re_escape(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("escape", 1, 1, &[])?;
    Ok(Value::str(regex::escape(text_arg(&args.positional[0], "escape")?)))
}

fn char_offset(text: &str, byte: usize) -> i64 {
    text[..byte].chars().count() as i64
}

fn match_object(interpreter: &mut Interpreter, regex: &Regex, text: &str, captures: &Captures) -> Result<Value, InterpreterError> {
    let class = module_class(interpreter, "Match")?;
    let mut groups = Vec::with_capacity(captures.len());
    let mut spans = Vec::with_capacity(captures.len());
    for index in 0..captures.len() {
        match captures.get(index) {
            Some(found) => {
                groups.push(Value::str(found.as_str()));
                spans.push(Value::tuple(vec![
                    Value::Int(char_offset(text, found.start())),
                    Value::Int(char_offset(text, found.end())),
                ]));
            }
            None => {
                groups.push(Value::None);
                spans.push(Value::tuple(vec![Value::Int(-1), Value::Int(-1)]));
            }
        }
    }
    let mut names = Dict::new();
    for (index, name) in regex.capture_names().enumerate() {
        if let Some(name) = name {
            names.insert(Value::str(name), Value::Int(index as i64));
        }
    }

    let mut attributes = IndexMap::new();
    attributes.insert("string".to_string(), Value::str(text));
    attributes.insert("_groups".to_string(), Value::list(groups));
    attributes.insert("_spans".to_string(), Value::list(spans));
    attributes.insert("_names".to_string(), Value::dict(names));
    Ok(Value::Instance(Rc::new(Instance {
        class,
        attributes: RefCell::new(attributes),
    })))
}

/// Stored field of a `Match` receiver.
fn match_field(args: &CallArgs, method: &str, field: &str) -> Result<Value, InterpreterError> {
    match args.receiver(method)? {
        Value::Instance(instance) => instance
            .attributes
            .borrow()
            .get(field)
            .cloned()
            .ok_or_else(|| InterpreterError::type_error(format!("{}() requires a Match", method))),
        _ => Err(InterpreterError::type_error(format!("{}() requires a Match", method))),
    }
}

fn group_index(args: &CallArgs, method: &str, selector: Option<&Value>) -> Result<usize, InterpreterError> {
    let count = match match_field(args, method, "_groups")? {
        Value::List(groups) => groups.borrow().len(),
        _ => 0,
    };
    let index = match selector {
        None => 0,
        Some(Value::Str(name)) => match match_field(args, method, "_names")? {
            Value::Dict(names) => names
                .borrow()
                .get(&Value::str(name.clone()))
                .and_then(Value::as_int)
                .ok_or_else(|| InterpreterError::index_error("no such group"))?,
            _ => return Err(InterpreterError::index_error("no such group")),
        },
        Some(other) => int_arg(other)?,
    };
    usize::try_from(index)
        .ok()
        .filter(|index| *index < count)
        .ok_or_else(|| InterpreterError::index_error("no such group"))
}

fn stored_item(args: &CallArgs, method: &str, field: &str, index: usize) -> Result<Value, InterpreterError> {
    match match_field(args, method, field)? {
        Value::List(items) => Ok(items.borrow().get(index).cloned().unwrap_or(Value::None)),
        _ => Ok(Value::None),
    }
}

fn match_group(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    if args.positional.len() <= 1 {
        let index = group_index(&args, "group", args.arg(0))?;
        return stored_item(&args, "group", "_groups", index);
    }
    let mut selected = Vec::with_capacity(args.positional.len());
    for selector in &args.positional {
        let index = group_index(&args, "group", Some(selector))?;
        selected.push(stored_item(&args, "group", "_groups", index)?);
    }
    Ok(Value::tuple(selected))
}

fn match_groups(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("groups", 0, 1, &["default"])?;
    let default = args.arg_or_keyword(0, "default").cloned().unwrap_or(Value::None);
    let groups = match match_field(&args, "groups", "_groups")? {
        Value::List(groups) => groups.borrow().iter().skip(1).cloned().collect::<Vec<_>>(),
        _ => Vec::new(),
    };
    Ok(Value::tuple(
        groups
            .into_iter()
            .map(|group| if group.is_none() { default.clone() } else { group })
            .collect(),
    ))
}

fn match_groupdict(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    args.expect("groupdict", 0, 0, &[])?;
    let mut result = Dict::new();
    if let Value::Dict(names) = match_field(&args, "groupdict", "_names")? {
        for (name, index) in names.borrow().entries() {
            let index = index.as_int().and_then(|index| usize::try_from(index).ok()).unwrap_or(0);
            result.insert(name.clone(), stored_item(&args, "groupdict", "_groups", index)?);
        }
    }
    Ok(Value::dict(result))
}

fn span_of(args: &CallArgs, method: &str) -> Result<(Value, Value), InterpreterError> {
    args.expect(method, 0, 1, &[])?;
    let index = group_index(args, method, args.arg(0))?;
    match stored_item(args, method, "_spans", index)? {
        Value::Tuple(span) if span.len() == 2 => Ok((span[0].clone(), span[1].clone())),
        _ => Ok((Value::Int(-1), Value::Int(-1))),
    }
}

fn match_start(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    Ok(span_of(&args, "start")?.0)
}

fn match_end(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    Ok(span_of(&args, "end")?.1)
}

fn match_span(_: &mut Interpreter, args: CallArgs) -> Result<Value, InterpreterError> {
    let (start, end) = span_of(&args, "span")?;
    Ok(Value::tuple(vec![start, end]))
}
