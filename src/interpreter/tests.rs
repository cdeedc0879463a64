#[cfg(test)]
mod interpreter_tests {
    use crate::analysis::parse_program;
    use crate::interpreter::{Interpreter, InterpreterError, Value};

    fn run(source: &str) -> Vec<String> {
        let program = parse_program(source).unwrap();
        let mut interpreter = Interpreter::new();
        interpreter.run(&program).unwrap();
        interpreter.take_output()
    }

    fn run_err(source: &str) -> InterpreterError {
        let program = parse_program(source).unwrap();
        let mut interpreter = Interpreter::new();
        interpreter.run(&program).unwrap_err()
    }

    #[test]
    fn test_arithmetic_follows_floor_semantics() {
        let output = run("print(1 + 2 * 3, 7 // 2, -7 // 2, 7 % -3, 2 ** 10, 1 / 2)");
        assert_eq!(output, vec!["7 3 -4 -2 1024 0.5"]);
    }

    #[test]
    fn test_division_by_zero_is_catchable() {
        let source = r#"
try:
    1 / 0
except ZeroDivisionError as e:
    print("caught", e)
"#;
        assert_eq!(run(source), vec!["caught division by zero"]);
    }

    #[test]
    fn test_inheritance_and_super() {
        let source = r#"
class Base:
    def __init__(self, name):
        self.name = name

    def greet(self):
        return "hi " + self.name


class Child(Base):
    def __init__(self, name):
        super().__init__(name.upper())

    def greet(self):
        return super().greet() + "!"


print(Child("ann").greet())
"#;
        assert_eq!(run(source), vec!["hi ANN!"]);
    }

    #[test]
    fn test_diamond_inheritance_uses_c3_order() {
        let source = r#"
class A:
    def who(self):
        return "A"


class B(A):
    def who(self):
        return "B" + super().who()


class C(A):
    def who(self):
        return "C" + super().who()


class D(B, C):
    pass


print(D().who())
"#;
        assert_eq!(run(source), vec!["BCA"]);
    }

    #[test]
    fn test_exception_hierarchy_and_finally() {
        let source = r#"
class MyError(ValueError):
    pass

def lookup(key):
    try:
        return {"a": 1}[key]
    except LookupError:
        return -1
    finally:
        print("looked up", key)

try:
    raise MyError("bad input")
except ValueError as e:
    print(type(e).__name__, e)

print(lookup("a"), lookup("z"))
"#;
        assert_eq!(
            run(source),
            vec!["MyError bad input", "looked up a", "looked up z", "1 -1"]
        );
    }

    #[test]
    fn test_uncaught_raise_keeps_class_and_message() {
        let err = run_err("raise ValueError('bad value')");
        assert_eq!(err.exception_name(), "ValueError");
        assert_eq!(err.to_string(), "bad value");
        assert_eq!(err.describe(), "ValueError: bad value");
    }

    #[test]
    fn test_bare_raise_rethrows_active_exception() {
        let source = r#"
try:
    int("x")
except ValueError:
    raise
"#;
        assert_eq!(run_err(source).exception_name(), "ValueError");
    }

    #[test]
    fn test_closures_share_captured_state() {
        let source = r#"
def counter():
    items = []

    def add(x):
        items.append(x)
        return len(items)

    return add

add = counter()
add(1)
print(add(2))
"#;
        assert_eq!(run(source), vec!["2"]);
    }

    #[test]
    fn test_list_comprehension_with_condition() {
        let output = run("print([x * x for x in range(5) if x % 2 == 0])");
        assert_eq!(output, vec!["[0, 4, 16]"]);
    }

    #[test]
    fn test_fstring_conversions_and_specs() {
        let source = r#"
name = "World"
value = 3.14159
print(f"Hello {name}! {value:.2f} {name!r}")
"#;
        assert_eq!(run(source), vec!["Hello World! 3.14 'World'"]);
    }

    #[test]
    fn test_string_formatting() {
        let source = r#"
print("{} and {name}".format(1, name="x"))
print("%s has %d items" % ("cart", 3))
print("%5.1f|" % 3.14159)
"#;
        assert_eq!(run(source), vec!["1 and x", "cart has 3 items", "  3.1|"]);
    }

    #[test]
    fn test_dict_methods_keep_insertion_order() {
        let source = r#"
d = {"a": 1}
d.setdefault("b", 2)
d["c"] = 3
del_me = d.pop("c")
print(d.get("missing", 0), list(d.keys()), d, del_me)
"#;
        assert_eq!(run(source), vec!["0 ['a', 'b'] {'a': 1, 'b': 2} 3"]);
    }

    #[test]
    fn test_augmented_list_assignment_mutates_in_place() {
        let source = r#"
a = [1]
b = a
a += [2]
print(b)
"#;
        assert_eq!(run(source), vec!["[1, 2]"]);
    }

    #[test]
    fn test_tuple_unpacking() {
        let source = r#"
first, second = "xy"
for index, item in enumerate(["a", "b"]):
    print(index, item)
print(first, second)
"#;
        assert_eq!(run(source), vec!["0 a", "1 b", "x y"]);
        let err = run_err("a, b = [1, 2, 3]");
        assert_eq!(err.to_string(), "too many values to unpack (expected 2)");
    }

    #[test]
    fn test_string_methods_and_slicing() {
        let source = r#"
print(" a,b ".strip().split(","))
print("-".join(["a", "b"]), "hello world".title(), "abcdef"[::-1], [1, 2, 3, 4][1:3])
"#;
        assert_eq!(run(source), vec!["['a', 'b']", "a-b Hello World fedcba [2, 3]"]);
    }

    #[test]
    fn test_slices_with_huge_steps() {
        let source = r#"
x = [1, 2, 3]
print(x[2::9223372036854775807], x[0::9223372036854775807], x[0::-9223372036854775807])
print("abc"[1::9223372036854775807], (1, 2, 3)[-1::-9223372036854775807])
"#;
        assert_eq!(run(source), vec!["[3] [1] [1]", "b (3,)"]);
    }

    #[test]
    fn test_sorted_with_key_and_reverse() {
        let output = run("print(sorted(['bb', 'a', 'ccc'], key=len, reverse=True))");
        assert_eq!(output, vec!["['ccc', 'bb', 'a']"]);
    }

    #[test]
    fn test_while_with_break_and_continue() {
        let source = r#"
n = 0
seen = []
while True:
    n += 1
    if n % 2 == 0:
        continue
    if n > 7:
        break
    seen.append(n)
print(seen)
"#;
        assert_eq!(run(source), vec!["[1, 3, 5, 7]"]);
    }

    #[test]
    fn test_decorated_methods() {
        let source = r#"
class Shape:
    sides = 4

    def __init__(self, size):
        self._size = size

    @property
    def area(self):
        return self._size * self._size

    @staticmethod
    def unit():
        return "cm"

    @classmethod
    def describe(cls):
        return cls.sides


s = Shape(3)
print(s.area, Shape.unit(), s.describe())
"#;
        assert_eq!(run(source), vec!["9 cm 4"]);
    }

    #[test]
    fn test_dunder_protocols() {
        let source = r#"
class Bag:
    def __init__(self, items):
        self.items = items

    def __len__(self):
        return len(self.items)

    def __contains__(self, item):
        return item in self.items

    def __getitem__(self, index):
        return self.items[index]


empty = Bag([])
full = Bag([1, 2])
print(bool(empty), bool(full), 2 in full, full[0], len(full))
"#;
        assert_eq!(run(source), vec!["False True True 1 2"]);
    }

    #[test]
    fn test_re_module() {
        let source = r#"
import re
print(re.findall(r"\d+", "a1b22c333"))
m = re.match(r"(\w+)@(\w+)", "joe@host")
print(m.group(1), m.group(2))
print(re.sub(r"\s+", "-", "a  b   c"))
print(re.search("x", "abc"))
"#;
        assert_eq!(run(source), vec!["['1', '22', '333']", "joe host", "a-b-c", "None"]);
    }

    #[test]
    fn test_json_module() {
        let source = r#"
import json
print(json.dumps({"a": [1, 2], "b": None}))
print(json.loads('{"x": 1}')["x"])
"#;
        assert_eq!(run(source), vec![r#"{"a": [1, 2], "b": null}"#, "1"]);
    }

    #[test]
    fn test_unknown_imports_are_external_values() {
        let source = r#"
import requests
from openai import OpenAI
print(requests.get, OpenAI)
"#;
        assert_eq!(run(source), vec!["requests.get openai.OpenAI"]);

        let err = run_err("import requests\nrequests.get('http://x')");
        assert_eq!(err.exception_name(), "RuntimeError");
        assert!(err.to_string().contains("'requests.get' is not available"));
    }

    #[test]
    fn test_external_base_classes_are_skipped() {
        let source = r#"
from pydantic import BaseModel

class Settings(BaseModel):
    name = "default"

print(Settings().name)
"#;
        assert_eq!(run(source), vec!["default"]);
    }

    #[test]
    fn test_prelude_custom_component() {
        let source = r#"
from langflow import CustomComponent
from langflow.field_typing import Data

class Greeter(CustomComponent):
    display_name = "Greeter"
    field_config = {"name": {"display_name": "Name"}}

g = Greeter()
print(g.display_name, g.build_config())
print(Data(data={"a": 1}).data)
"#;
        assert_eq!(run(source), vec!["Greeter {'name': {'display_name': 'Name'}}", "{'a': 1}"]);

        let source = r#"
from langflow import CustomComponent
CustomComponent().build()
"#;
        assert_eq!(run_err(source).exception_name(), "NotImplementedError");
    }

    #[test]
    fn test_typing_markers_are_inert() {
        let source = r#"
from typing import Optional, List

def f(x: Optional[List[str]] = None) -> List[str]:
    return x or []

print(f(), f(["a"]))
"#;
        assert_eq!(run(source), vec!["[] ['a']"]);
    }

    #[test]
    fn test_recursion_limit() {
        let source = r#"
def down(n):
    return down(n + 1)

down(0)
"#;
        let err = run_err(source);
        assert_eq!(err.exception_name(), "RecursionError");
    }

    #[test]
    fn test_argument_binding_errors() {
        let base = "def f(a, b=2):\n    return a + b\n";
        let cases = [
            ("f()", "missing 1 required"),
            ("f(1, 2, 3)", "takes"),
            ("f(1, c=3)", "unexpected keyword argument 'c'"),
            ("f(1, a=1)", "multiple values for argument 'a'"),
        ];
        for (call, expected) in cases {
            let err = run_err(&format!("{}{}", base, call));
            assert_eq!(err.exception_name(), "TypeError", "{}", call);
            assert!(err.to_string().contains(expected), "{}: {}", call, err);
        }
    }

    #[test]
    fn test_varargs_and_kwargs() {
        let source = r#"
def f(*args, sep="-", **kwargs):
    return sep.join(args) + str(sorted(kwargs.keys()))

print(f("a", "b", sep="+", z=1, y=2))
"#;
        assert_eq!(run(source), vec!["a+b['y', 'z']"]);
    }

    #[test]
    fn test_name_error_for_unknown_names() {
        let err = run_err("print(undefined_name)");
        assert_eq!(err.exception_name(), "NameError");
        assert_eq!(err.to_string(), "name 'undefined_name' is not defined");
    }

    #[test]
    fn test_interpreters_do_not_share_globals() {
        let program = parse_program("counter = 1").unwrap();
        let mut first = Interpreter::new();
        first.run(&program).unwrap();
        first.globals().define("counter", Value::Int(5));

        let second = Interpreter::new();
        assert!(second.lookup("counter").is_none());
        assert!(matches!(first.lookup("counter"), Some(Value::Int(5))));
    }

    #[test]
    fn test_top_level_return_is_rejected() {
        let err = run_err("return 1");
        assert_eq!(err.exception_name(), "RuntimeError");
    }
}
