use super::{evaluate, Context, Host};
use diagnostics::{Buffer, ErrorCode, Reporter};
use hir::{GlobalScope, Program, Value, BINARY_OPERATORS, UNARY_OPERATORS};
use span::{FileName::Anonymous, SourceMap};
use std::{collections::VecDeque, io, sync::Arc};
use symbol::Type;

#[derive(Default)]
struct TestHost {
    output: Vec<String>,
    input: VecDeque<String>,
}

impl Host for TestHost {
    fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.push(text.to_owned());
        Ok(())
    }

    fn input(&mut self) -> io::Result<String> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"))
    }
}

/// A sequence of chained submissions.
struct Session {
    global_scope: Option<Arc<GlobalScope>>,
    program: Option<Arc<Program>>,
    context: Context<TestHost>,
}

impl Session {
    fn new() -> Self {
        Self::with_seed(0)
    }

    fn with_seed(seed: u64) -> Self {
        Self {
            global_scope: None,
            program: None,
            context: Context::new(TestHost::default(), Some(seed)),
        }
    }

    /// Evaluate a submission and return its value or the codes of the runtime errors.
    #[track_caller]
    fn submit(&mut self, source: &str) -> Result<Option<Value>, Vec<ErrorCode>> {
        let mut map = SourceMap::default();
        let file = map.add_str(Anonymous, source);
        let buffer = Buffer::default();
        let reporter = Reporter::buffer(buffer.clone());

        let unit = parser::parse_file(&map[file], &reporter).bare;
        let global_scope = Arc::new(
            binder::bind_global_scope(self.global_scope.clone(), &[unit], &reporter).bare,
        );
        let program = Arc::new(
            binder::bind_program(self.program.clone(), global_scope.clone(), &reporter).bare,
        );

        let diagnostics = std::mem::take(&mut *buffer.lock().unwrap());
        assert!(
            diagnostics.is_empty(),
            "unexpected diagnostics: {diagnostics:#?}"
        );

        self.global_scope = Some(global_scope);
        self.program = Some(program.clone());

        evaluate(&program, &mut self.context, &reporter).map_err(|_| {
            buffer
                .lock()
                .unwrap()
                .iter()
                .filter_map(|diagnostic| diagnostic.code)
                .collect()
        })
    }
}

#[track_caller]
fn run(source: &str) -> Option<Value> {
    match Session::new().submit(source) {
        Ok(value) => value,
        Err(codes) => panic!("unexpected runtime errors: {codes:?}"),
    }
}

#[track_caller]
fn run_to_error(source: &str) -> Vec<ErrorCode> {
    match Session::new().submit(source) {
        Ok(value) => panic!("expected a runtime error, got {value:?}"),
        Err(codes) => codes,
    }
}

#[test]
fn arithmetic() {
    assert_eq!(run("1 + 2 * 3"), Some(Value::Int(7)));
    assert_eq!(run("(1 + 2) * 3"), Some(Value::Int(9)));
    assert_eq!(run("-7 / 2"), Some(Value::Int(-3)));
    assert_eq!(run("~0 ^ 5 & 3"), Some(Value::Int(-2)));
}

#[test]
fn arithmetic_wraps_on_overflow() {
    assert_eq!(run("2147483647 + 1"), Some(Value::Int(i32::MIN)));
    assert_eq!(run("-2147483647 - 2"), Some(Value::Int(i32::MAX)));
}

#[test]
fn division_by_zero() {
    assert_eq!(run_to_error("var x = 0\n10 / x"), [ErrorCode::E050]);
}

#[test]
fn text() {
    assert_eq!(run("\"a\" + \"b\" == \"ab\""), Some(Value::Bool(true)));
    assert_eq!(run("\"say \"\"hi\"\"\""), Some(Value::from("say \"hi\"")));
}

#[test]
fn both_operands_of_logical_operators_are_evaluated() {
    assert_eq!(
        run("var calls = 0\nfunction f(): bool { calls = calls + 1 return false }\nf() && f()\ncalls"),
        Some(Value::Int(2))
    );
}

#[test]
fn result_is_the_last_value() {
    assert_eq!(run("let x = 10"), Some(Value::Int(10)));
    assert_eq!(run("let x = 10\nx * 2"), Some(Value::Int(20)));
    assert_eq!(run("1\nprint(\"\")"), None);
    assert_eq!(run(""), None);
}

#[test]
fn statements_of_called_functions_do_not_form_the_result() {
    assert_eq!(
        run("function f(): int { var y = 99 return 1 }\nvar a = 5\nif f() == 1 { }"),
        Some(Value::Int(5))
    );
    assert_eq!(
        run("function g(): bool { 42 return true }\nlet b = 7\nif g() { }"),
        Some(Value::Int(7))
    );
}

#[test]
fn if_statements() {
    assert_eq!(
        run("var x = 0\nif 1 < 2 x = 1 else x = 2\nx"),
        Some(Value::Int(1))
    );
    assert_eq!(run("var x = 0\nif false x = 1\nx"), Some(Value::Int(0)));
}

#[test]
fn for_loop() {
    assert_eq!(
        run("var sum = 0\nfor i = 1 to 10 sum = sum + i\nsum"),
        Some(Value::Int(55))
    );
    assert_eq!(
        run("var sum = 0\nfor i = 1 to 0 sum = sum + i\nsum"),
        Some(Value::Int(0))
    );
}

#[test]
fn upper_bound_of_for_loop_is_evaluated_once() {
    assert_eq!(
        run("var n = 3\nvar count = 0\nfor i = 1 to n { n = n + 1 count = count + 1 }\ncount"),
        Some(Value::Int(3))
    );
}

#[test]
fn while_loop_with_break_and_continue() {
    assert_eq!(
        run(
            "\
var i = 0
var sum = 0
while true {
    i = i + 1
    if i > 10 break
    if i / 2 * 2 == i continue
    sum = sum + i
}
sum"
        ),
        Some(Value::Int(25))
    );
}

#[test]
fn continue_in_for_loop_increments() {
    assert_eq!(
        run("var sum = 0\nfor i = 1 to 5 { if i == 3 continue\nsum = sum + i }\nsum"),
        Some(Value::Int(12))
    );
}

#[test]
fn do_while_runs_at_least_once() {
    assert_eq!(
        run("var i = 10\ndo i = i + 1 while i < 5\ni"),
        Some(Value::Int(11))
    );
}

#[test]
fn recursion() {
    assert_eq!(
        run(
            "\
function fib(n: int): int {
    if n < 2 return n
    return fib(n - 1) + fib(n - 2)
}
fib(15)"
        ),
        Some(Value::Int(610))
    );
}

#[test]
fn locals_are_per_invocation() {
    assert_eq!(
        run(
            "\
function sum(n: int): int {
    var total = 0
    if n > 0 total = n + sum(n - 1)
    return total
}
sum(4)"
        ),
        Some(Value::Int(10))
    );
}

#[test]
fn global_read_before_its_declaration_yields_default() {
    assert_eq!(
        run("function f(): int { return y }\nlet a = f()\nvar y = 3\na"),
        Some(Value::Int(0))
    );
}

#[test]
fn retyped_variable() {
    assert_eq!(
        run("var x = 1\nx = \"a\"\nx + \"b\""),
        Some(Value::from("ab"))
    );
}

#[test]
fn conversions() {
    assert_eq!(run("int(\"12\") + 1"), Some(Value::Int(13)));
    assert_eq!(run("string(12) + string(true)"), Some(Value::from("12true")));
    assert_eq!(run("bool(\"false\")"), Some(Value::Bool(false)));
    assert_eq!(run("let x: any = 3\nint(x)"), Some(Value::Int(3)));

    assert_eq!(run_to_error("int(\"twelve\")"), [ErrorCode::E051]);
    assert_eq!(run_to_error("let x: any = 3\nbool(x)"), [ErrorCode::E051]);
}

#[test]
fn print_and_input() {
    let mut session = Session::new();
    session.context.host.input.push_back("world".to_owned());

    let value = session.submit("let name = input()\nprint(\"hello \" + name)");

    assert_eq!(value, Ok(None));
    assert_eq!(session.context.host.output, ["hello world"]);
}

#[test]
fn failing_input() {
    assert_eq!(run_to_error("input()"), [ErrorCode::E052]);
}

#[test]
fn seeded_random_numbers_are_reproducible() {
    let source = "string(rand(100)) + \" \" + string(rand(100)) + \" \" + string(rand(100))";

    let first = Session::with_seed(42).submit(source);
    let second = Session::with_seed(42).submit(source);

    assert_eq!(first, second);
}

#[test]
fn random_numbers_are_in_range() {
    let mut session = Session::new();

    for _ in 0..100 {
        let Ok(Some(Value::Int(value))) = session.submit("rand(10)") else {
            panic!("expected an integer");
        };
        assert!((0..10).contains(&value));
    }
}

#[test]
fn non_positive_random_bound() {
    assert_eq!(run_to_error("rand(0)"), [ErrorCode::E053]);
}

#[test]
fn globals_persist_across_submissions() {
    let mut session = Session::new();

    assert_eq!(session.submit("var x = 5"), Ok(Some(Value::Int(5))));
    assert_eq!(
        session.submit("function double(n: int): int { return n * 2 }\nx = double(x)"),
        Ok(Some(Value::Int(10)))
    );
    assert_eq!(session.submit("double(x) + 1"), Ok(Some(Value::Int(21))));
}

fn sample(type_: Type) -> &'static str {
    match type_ {
        Type::Bool => "true",
        Type::Int => "7",
        Type::String => "\"seven\"",
        _ => unreachable!(),
    }
}

#[test]
fn operators_yield_values_of_their_bound_types() {
    for operator in &UNARY_OPERATORS {
        let source = format!("{}{}", operator.kind.symbol(), sample(operator.operand));
        let value = run(&source).map(|value| value.type_());

        assert_eq!(value, Some(operator.result), "{source}");
    }

    for operator in &BINARY_OPERATORS {
        let source = format!(
            "{} {} {}",
            sample(operator.left),
            operator.kind.symbol(),
            sample(operator.right)
        );
        let value = run(&source).map(|value| value.type_());

        assert_eq!(value, Some(operator.result), "{source}");
    }
}
