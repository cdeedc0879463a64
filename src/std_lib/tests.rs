#[cfg(test)]
mod std_lib_tests {
    use crate::analysis::parse_program;
    use crate::interpreter::{Interpreter, Value};
    use crate::std_lib::{self, prelude, string};

    fn eval_output(source: &str) -> Vec<String> {
        let program = parse_program(source).unwrap();
        let mut interpreter = Interpreter::new();
        interpreter.run(&program).unwrap();
        interpreter.take_output()
    }

    #[test]
    fn test_builtin_table_has_core_functions() {
        let builtins = std_lib::builtins();
        for name in ["print", "len", "str", "range", "sorted", "isinstance", "getattr", "repr", "super"] {
            assert!(builtins.contains_key(name), "missing builtin {}", name);
        }
    }

    #[test]
    fn test_method_lookup_by_receiver_type() {
        assert!(std_lib::method_for(&Value::str("x"), "upper").is_some());
        assert!(std_lib::method_for(&Value::list(Vec::new()), "append").is_some());
        assert!(std_lib::method_for(&Value::Int(1), "append").is_none());
        assert!(std_lib::method_for(&Value::str("x"), "append").is_none());
    }

    #[test]
    fn test_format_value_specs() {
        let mut interpreter = Interpreter::new();
        let cases = [
            (Value::Float(3.14159), ".2f", "3.14"),
            (Value::Int(42), ">5", "   42"),
            (Value::Int(42), "<5", "42   "),
            (Value::Int(42), "^6", "  42  "),
            (Value::Int(1234567), ",", "1,234,567"),
            (Value::Int(255), "x", "ff"),
            (Value::Int(5), "03d", "005"),
            (Value::Float(0.25), ".0%", "25%"),
            (Value::str("ab"), "*>4", "**ab"),
            (Value::Int(7), "+d", "+7"),
        ];
        for (value, spec, expected) in cases {
            assert_eq!(string::format_value(&mut interpreter, &value, spec).unwrap(), expected, "spec {}", spec);
        }
    }

    #[test]
    fn test_format_value_rejects_mismatched_type() {
        let mut interpreter = Interpreter::new();
        assert!(string::format_value(&mut interpreter, &Value::str("x"), "d").is_err());
    }

    #[test]
    fn test_format_template_fields() {
        let mut interpreter = Interpreter::new();
        let keywords = vec![("name".to_string(), Value::str("Ada"))];
        let text = string::format_template(
            &mut interpreter,
            "{0}-{1}-{0} {name!r} {{literal}}",
            &[Value::Int(1), Value::Int(2)],
            &keywords,
        )
        .unwrap();
        assert_eq!(text, "1-2-1 'Ada' {literal}");
    }

    #[test]
    fn test_percent_format_errors() {
        let mut interpreter = Interpreter::new();
        let err = string::percent_format(&mut interpreter, "%s %s", &Value::tuple(vec![Value::Int(1)])).unwrap_err();
        assert_eq!(err.to_string(), "not enough arguments for format string");
        let err = string::percent_format(&mut interpreter, "%s", &Value::tuple(vec![Value::Int(1), Value::Int(2)]))
            .unwrap_err();
        assert_eq!(err.to_string(), "not all arguments converted during string formatting");
    }

    #[test]
    fn test_percent_format_mapping() {
        let output = eval_output("print('%(name)s is %(age)d' % {'name': 'Bo', 'age': 3})");
        assert_eq!(output, vec!["Bo is 3"]);
    }

    #[test]
    fn test_numeric_builtins() {
        let output = eval_output("print(min(3, 1, 2), max([4, 9]), sum([1, 2, 3]), abs(-2.5), round(2.675, 2), int('ff', 16))");
        assert_eq!(output, vec!["1 9 6 2.5 2.67 255"]);
    }

    #[test]
    fn test_sequence_builtins() {
        let source = r#"
print(list(zip([1, 2], "ab")))
print(list(reversed(range(3))), list(range(0, 10, 4)))
print(any([0, "", 3]), all([]), len({"a": 1}))
print(list(map(str, [1, 2])), list(filter(None, [0, 1, 2])))
"#;
        assert_eq!(
            eval_output(source),
            vec![
                "[(1, 'a'), (2, 'b')]",
                "[2, 1, 0] [0, 4, 8]",
                "True True 1",
                "['1', '2'] [1, 2]",
            ]
        );
    }

    #[test]
    fn test_conversions() {
        let source = r#"
print(str(1.0), float("2.5"), bool([]), tuple([1]), repr("it's"))
print(isinstance(1, int), isinstance("x", (int, str)), isinstance(True, int))
"#;
        assert_eq!(eval_output(source), vec!["1.0 2.5 False (1,) \"it's\"", "True True True"]);
    }

    #[test]
    fn test_getattr_family() {
        let source = r#"
class Box:
    pass

b = Box()
setattr(b, "size", 3)
print(getattr(b, "size"), getattr(b, "color", "red"), hasattr(b, "size"), hasattr(b, "color"))
"#;
        assert_eq!(eval_output(source), vec!["3 red True False"]);
    }

    #[test]
    fn test_list_methods() {
        let source = r#"
items = [3, 1, 2]
items.insert(0, 9)
items.extend([1])
print(items.index(1), items.count(1), items.pop(), items.pop(0), items)
items.sort()
print(items)
"#;
        assert_eq!(eval_output(source), vec!["2 2 1 9 [3, 1, 2]", "[1, 2, 3]"]);
    }

    #[test]
    fn test_string_methods() {
        let source = r#"
s = "Hello, World"
print(s.lower(), s.upper(), s.find("o"), s.find("z"), s.replace("l", "L", 1))
print(s.startswith(("x", "He")), s.endswith("ld"), "a b  c".split(), "1,2".split(",", 1))
"#;
        assert_eq!(
            eval_output(source),
            vec![
                "hello, world HELLO, WORLD 4 -1 HeLlo, World",
                "True True ['a', 'b', 'c'] ['1', '2']",
            ]
        );
    }

    #[test]
    fn test_dict_update_and_items() {
        let source = r#"
d = {"a": 1}
d.update({"b": 2}, c=3)
for key, value in d.items():
    print(key, value)
print(dict(x=1), d.copy() == d)
"#;
        assert_eq!(eval_output(source), vec!["a 1", "b 2", "c 3", "{'x': 1} True"]);
    }

    #[test]
    fn test_re_groups_and_split() {
        let source = r#"
import re
m = re.search(r"(?P<key>\w+)=(?P<value>\d+)", "set a=10 now")
print(m.group("key"), m.group(0), m.groupdict(), m.span())
print(re.split(r",\s*", "a, b,c"), re.findall(r"(\w)(\d)", "a1 b2"))
print(re.sub(r"(\w+)@", r"\1 at ", "joe@host"), re.fullmatch(r"\d+", "12a"))
"#;
        assert_eq!(
            eval_output(source),
            vec![
                "a a=10 {'key': 'a', 'value': '10'} (4, 8)",
                "['a', 'b', 'c'] [('a', '1'), ('b', '2')]",
                "joe at host None",
            ]
        );
    }

    #[test]
    fn test_re_invalid_pattern() {
        let program = parse_program("import re\nre.compile('(')").unwrap();
        let mut interpreter = Interpreter::new();
        let err = interpreter.run(&program).unwrap_err();
        assert_eq!(err.exception_name(), "ValueError");
    }

    #[test]
    fn test_prelude_parses() {
        let program = prelude::program().unwrap();
        assert!(!program.statements.is_empty());
    }

    #[test]
    fn test_typing_module_helpers() {
        let source = r#"
from typing import cast, TypeVar, TYPE_CHECKING
T = TypeVar("T")
print(cast(int, "x"), TYPE_CHECKING, T)
"#;
        assert_eq!(eval_output(source), vec!["x False typing.T"]);
    }
}
