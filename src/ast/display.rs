//! Canonical source rendering for expressions.
//!
//! The program model stores annotations, defaults and literal assignments as
//! text; this is where that text comes from. Output uses single quotes for
//! strings, single spaces around binary operators and only the parentheses
//! that precedence requires.

use std::fmt::{self, Write};

use super::{
    Argument, BinaryOperator, CompareOperator, Comprehension, Expr, FStringPart, Literal,
    LogicalOperator, UnaryOperator,
};

const PREC_CONDITIONAL: u8 = 1;
const PREC_OR: u8 = 2;
const PREC_AND: u8 = 3;
const PREC_NOT: u8 = 4;
const PREC_COMPARE: u8 = 5;
const PREC_BIT_OR: u8 = 6;
const PREC_BIT_XOR: u8 = 7;
const PREC_BIT_AND: u8 = 8;
const PREC_ARITH: u8 = 10;
const PREC_TERM: u8 = 11;
const PREC_UNARY: u8 = 12;
const PREC_POWER: u8 = 13;
const PREC_ATOM: u8 = 14;

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::FloorDivide => "//",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "**",
            BinaryOperator::MatMul => "@",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitXor => "^",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => PREC_ARITH,
            BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::FloorDivide
            | BinaryOperator::Modulo
            | BinaryOperator::MatMul => PREC_TERM,
            BinaryOperator::Power => PREC_POWER,
            BinaryOperator::BitOr => PREC_BIT_OR,
            BinaryOperator::BitAnd => PREC_BIT_AND,
            BinaryOperator::BitXor => PREC_BIT_XOR,
        }
    }
}

impl CompareOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOperator::Equal => "==",
            CompareOperator::NotEqual => "!=",
            CompareOperator::Less => "<",
            CompareOperator::LessEqual => "<=",
            CompareOperator::Greater => ">",
            CompareOperator::GreaterEqual => ">=",
            CompareOperator::In => "in",
            CompareOperator::NotIn => "not in",
            CompareOperator::Is => "is",
            CompareOperator::IsNot => "is not",
        }
    }
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Conditional { .. } => PREC_CONDITIONAL,
            Expr::Logical { operator: LogicalOperator::Or, .. } => PREC_OR,
            Expr::Logical { operator: LogicalOperator::And, .. } => PREC_AND,
            Expr::Unary { operator: UnaryOperator::Not, .. } => PREC_NOT,
            Expr::Unary { .. } => PREC_UNARY,
            Expr::Compare { .. } => PREC_COMPARE,
            Expr::Binary { operator, .. } => operator.precedence(),
            _ => PREC_ATOM,
        }
    }
}

/// Quotes a string the way the canonical form expects: single quotes unless
/// the text has a single quote and no double quote.
pub fn quote_string(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{}", format_float(*v)),
            Literal::String(s) => write!(f, "{}", quote_string(s)),
            Literal::Boolean(true) => write!(f, "True"),
            Literal::Boolean(false) => write!(f, "False"),
            Literal::None => write!(f, "None"),
            Literal::Ellipsis => write!(f, "..."),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min_precedence: u8) -> fmt::Result {
    if expr.precedence() < min_precedence {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

fn write_sequence(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_operand(f, item, PREC_CONDITIONAL)?;
    }
    Ok(())
}

fn write_generators(f: &mut fmt::Formatter<'_>, generators: &[Comprehension]) -> fmt::Result {
    for generator in generators {
        write!(f, " for ")?;
        match &generator.target {
            Expr::Tuple(items) if !items.is_empty() => write_sequence(f, items)?,
            target => write!(f, "{}", target)?,
        }
        write!(f, " in ")?;
        write_operand(f, &generator.iterable, PREC_OR)?;
        for condition in &generator.conditions {
            write!(f, " if ")?;
            write_operand(f, condition, PREC_OR)?;
        }
    }
    Ok(())
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Positional(value) => write_operand(f, value, PREC_CONDITIONAL),
            Argument::Keyword { name, value } => {
                write!(f, "{}=", name)?;
                write_operand(f, value, PREC_CONDITIONAL)
            }
            Argument::Unpack(value) => {
                write!(f, "*")?;
                write_operand(f, value, PREC_ATOM)
            }
            Argument::UnpackDict(value) => {
                write!(f, "**")?;
                write_operand(f, value, PREC_ATOM)
            }
        }
    }
}

fn render_fstring(parts: &[FStringPart]) -> String {
    let mut body = String::new();
    for part in parts {
        match part {
            FStringPart::Literal(text) => {
                for c in text.chars() {
                    match c {
                        '{' => body.push_str("{{"),
                        '}' => body.push_str("}}"),
                        '\n' => body.push_str("\\n"),
                        '\\' => body.push_str("\\\\"),
                        c => body.push(c),
                    }
                }
            }
            FStringPart::Expr { expr, conversion, format_spec } => {
                let _ = write!(body, "{{{}", expr);
                if let Some(conversion) = conversion {
                    let _ = write!(body, "!{}", conversion);
                }
                if let Some(spec) = format_spec {
                    let _ = write!(body, ":{}", spec);
                }
                body.push('}');
            }
        }
    }
    let quote = if body.contains('\'') { '"' } else { '\'' };
    format!("f{}{}{}", quote, body, quote)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => write!(f, "{}", literal),
            Expr::Name(name) => write!(f, "{}", name),
            Expr::FString(parts) => write!(f, "{}", render_fstring(parts)),
            Expr::Attribute { object, name } => {
                write_operand(f, object, PREC_ATOM)?;
                write!(f, ".{}", name)
            }
            Expr::Subscript { object, index } => {
                write_operand(f, object, PREC_ATOM)?;
                write!(f, "[")?;
                match index.as_ref() {
                    Expr::Tuple(items) if !items.is_empty() => write_sequence(f, items)?,
                    index => write!(f, "{}", index)?,
                }
                write!(f, "]")
            }
            Expr::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    write!(f, "{}", lower)?;
                }
                write!(f, ":")?;
                if let Some(upper) = upper {
                    write!(f, "{}", upper)?;
                }
                if let Some(step) = step {
                    write!(f, ":{}", step)?;
                }
                Ok(())
            }
            Expr::Call { callee, arguments } => {
                write_operand(f, callee, PREC_ATOM)?;
                write!(f, "(")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")
            }
            Expr::Binary { left, operator, right } => {
                let precedence = operator.precedence();
                if *operator == BinaryOperator::Power {
                    write_operand(f, left, precedence + 1)?;
                    write!(f, " ** ")?;
                    write_operand(f, right, precedence)
                } else {
                    write_operand(f, left, precedence)?;
                    write!(f, " {} ", operator.symbol())?;
                    write_operand(f, right, precedence + 1)
                }
            }
            Expr::Unary { operator, operand } => match operator {
                UnaryOperator::Not => {
                    write!(f, "not ")?;
                    write_operand(f, operand, PREC_NOT)
                }
                UnaryOperator::Negate => {
                    write!(f, "-")?;
                    write_operand(f, operand, PREC_UNARY)
                }
                UnaryOperator::Plus => {
                    write!(f, "+")?;
                    write_operand(f, operand, PREC_UNARY)
                }
                UnaryOperator::Invert => {
                    write!(f, "~")?;
                    write_operand(f, operand, PREC_UNARY)
                }
            },
            Expr::Logical { left, operator, right } => {
                let (precedence, keyword) = match operator {
                    LogicalOperator::And => (PREC_AND, "and"),
                    LogicalOperator::Or => (PREC_OR, "or"),
                };
                write_operand(f, left, precedence)?;
                write!(f, " {} ", keyword)?;
                write_operand(f, right, precedence + 1)
            }
            Expr::Compare { left, comparisons } => {
                write_operand(f, left, PREC_COMPARE + 1)?;
                for (operator, right) in comparisons {
                    write!(f, " {} ", operator.symbol())?;
                    write_operand(f, right, PREC_COMPARE + 1)?;
                }
                Ok(())
            }
            Expr::Conditional { condition, then_value, else_value } => {
                write_operand(f, then_value, PREC_OR)?;
                write!(f, " if ")?;
                write_operand(f, condition, PREC_OR)?;
                write!(f, " else ")?;
                write_operand(f, else_value, PREC_CONDITIONAL)
            }
            Expr::List(items) => {
                write!(f, "[")?;
                write_sequence(f, items)?;
                write!(f, "]")
            }
            Expr::Tuple(items) => {
                write!(f, "(")?;
                write_sequence(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Expr::Set(items) => {
                write!(f, "{{")?;
                write_sequence(f, items)?;
                write!(f, "}}")
            }
            Expr::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_operand(f, key, PREC_CONDITIONAL)?;
                    write!(f, ": ")?;
                    write_operand(f, value, PREC_CONDITIONAL)?;
                }
                write!(f, "}}")
            }
            Expr::ListComp { element, generators } => {
                write!(f, "[")?;
                write_operand(f, element, PREC_CONDITIONAL)?;
                write_generators(f, generators)?;
                write!(f, "]")
            }
        }
    }
}
