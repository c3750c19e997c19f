use crate::params::VmParams;
use crate::value::ops::conversions::ValueConversion;
use crate::value::Value;
use crate::{EvalError, Vm};

fn eval(source: &str) -> Result<Value, EvalError> {
    let mut vm = Vm::new(VmParams::default());
    vm.init_standard_objects();
    vm.eval(source, "test", 1)
}

fn eval_number(source: &str) -> f64 {
    match eval(source) {
        Ok(Value::Number(n)) => n,
        other => panic!("expected number from {source:?}, got {other:?}"),
    }
}

fn eval_string_value(source: &str) -> String {
    let mut vm = Vm::new(VmParams::default());
    vm.init_standard_objects();
    match vm.eval(source, "test", 1) {
        Ok(value) => {
            let mut sc = vm.scope();
            let s = value.to_js_string(&mut sc).expect("stringable");
            s.to_rc(&sc).to_string()
        }
        other => panic!("expected value from {source:?}, got {other:?}"),
    }
}

fn eval_bool(source: &str) -> bool {
    match eval(source) {
        Ok(Value::Boolean(b)) => b,
        other => panic!("expected boolean from {source:?}, got {other:?}"),
    }
}

fn expect_error_name(source: &str) -> String {
    match eval(source) {
        Err(EvalError::Exception(value)) => match value.downcast_ref::<crate::value::error::Error>() {
            Some(error) => error.kind.name().to_string(),
            None => panic!("thrown value is not an error object"),
        },
        other => panic!("expected exception from {source:?}, got {other:?}"),
    }
}

#[test]
fn arithmetic_and_precedence() {
    assert_eq!(eval_number("1 + 2 * 3"), 7.0);
    assert_eq!(eval_number("(1 + 2) * 3"), 9.0);
    assert_eq!(eval_number("2 ** 3 ** 2"), 512.0);
    assert_eq!(eval_number("7 % 4"), 3.0);
    assert_eq!(eval_number("1 << 4"), 16.0);
    assert_eq!(eval_number("-8 >>> 28"), 15.0);
}

#[test]
fn string_concat_and_templates() {
    assert_eq!(eval_string_value("'a' + 1"), "a1");
    assert_eq!(eval_string_value("let x = 3; `a${x + 1}b`"), "a4b");
    assert_eq!(eval_string_value("`${1}${2}`"), "12");
}

#[test]
fn equality_rules() {
    assert!(eval_bool("1 == '1'"));
    assert!(!eval_bool("1 === '1'"));
    assert!(eval_bool("null == undefined"));
    assert!(!eval_bool("null === undefined"));
    assert!(!eval_bool("NaN === NaN"));
}

#[test]
fn closures_capture_environment() {
    let source = "
        function counter() {
            let n = 0;
            return function () { n = n + 1; return n; };
        }
        let c = counter();
        c(); c(); c()
    ";
    assert_eq!(eval_number(source), 3.0);
}

#[test]
fn var_hoisting_and_function_hoisting() {
    assert_eq!(eval_number("function f() { return g() + (x === undefined ? 1 : 0); var x = 5; function g() { return 2; } } f()"), 3.0);
}

#[test]
fn tdz_read_raises_reference_error() {
    assert_eq!(expect_error_name("{ let y = x; let x = 1; }"), "ReferenceError");
}

#[test]
fn const_assignment_raises_type_error() {
    assert_eq!(expect_error_name("const a = 1; a = 2;"), "TypeError");
}

#[test]
fn block_scoping_shadows() {
    let source = "
        let a = 1;
        { let a = 2; }
        a
    ";
    assert_eq!(eval_number(source), 1.0);
}

#[test]
fn try_finally_overrides_return() {
    // S6 from the scenario list.
    let source = "function f(){ try { return 1; } finally { return 2; } } f()";
    assert_eq!(eval_number(source), 2.0);
}

#[test]
fn finally_runs_on_throw_and_catch_binds() {
    let source = "
        let log = '';
        try {
            try { throw new Error('boom'); } finally { log = log + 'f'; }
        } catch (e) {
            log = log + 'c' + e.message;
        }
        log
    ";
    assert_eq!(eval_string_value(source), "fcboom");
}

#[test]
fn optional_chaining_short_circuits() {
    // S1 from the scenario list.
    assert_eq!(eval_string_value("let a = { b: { c: 'd' } }; a?.b?.c"), "d");
    assert!(matches!(eval("let e = { f: {} }; e?.f?.g"), Ok(Value::Undefined)));
    assert!(matches!(eval("let h = null; h?.i?.j"), Ok(Value::Undefined)));
    assert_eq!(expect_error_name("let h = null; h.i.j"), "TypeError");
}

#[test]
fn optional_chain_evaluates_head_once() {
    let source = "
        let count = 0;
        function head() { count = count + 1; return null; }
        head()?.x.y.z;
        count
    ";
    assert_eq!(eval_number(source), 1.0);
}

#[test]
fn optional_call_is_skipped() {
    assert!(matches!(eval("let o = {}; o.missing?.()"), Ok(Value::Undefined)));
}

#[test]
fn map_iteration_tolerates_deletion() {
    // S2 from the scenario list.
    let source = "
        let m = new Map(); m.set('a',1); m.set('b',2); m.set('c',3);
        let it = m.keys(); m.delete('b');
        let first = it.next().value;
        let second = it.next().value;
        let done = it.next().done;
        first + ' ' + second + ' ' + done
    ";
    assert_eq!(eval_string_value(source), "a c true");
}

#[test]
fn map_iterators_survive_clear() {
    let source = "
        let m = new Map(); m.set(1, 'x');
        let it = m.entries();
        m.clear();
        m.set(2, 'y');
        it.next().value[1]
    ";
    assert_eq!(eval_string_value(source), "y");
}

#[test]
fn set_same_value_zero() {
    assert_eq!(eval_number("let s = new Set(); s.add(0); s.add(-0); s.add(NaN); s.add(NaN); s.size"), 2.0);
}

#[test]
fn prototype_cycle_raises_type_error() {
    assert_eq!(
        expect_error_name("let a = {}; let b = Object.create(a); Object.setPrototypeOf(a, b);"),
        "TypeError"
    );
    assert_eq!(
        expect_error_name("let a = {}; let b = {}; a.__proto__ = b; b.__proto__ = a;"),
        "TypeError"
    );
}

#[test]
fn for_of_drives_the_iterator_protocol() {
    assert_eq!(eval_number("let s = 0; for (let v of [10, 20, 30]) s += v; s"), 60.0);
    assert_eq!(
        eval_string_value("let out = ''; for (let k of new Map([['a',1],['b',2]]).keys()) out += k; out"),
        "ab"
    );
}

#[test]
fn for_in_visits_own_enumerable_keys_in_insertion_order() {
    let source = "let o = { b: 1, a: 2, c: 3 }; let out = ''; for (let k in o) out += k; out";
    assert_eq!(eval_string_value(source), "bac");
}

#[test]
fn labelled_continue_targets_outer_loop() {
    let source = "
        let hits = 0;
        outer: for (let i = 0; i < 3; i++) {
            for (let j = 0; j < 3; j++) {
                if (j > i) continue outer;
                hits += 1;
            }
        }
        hits
    ";
    assert_eq!(eval_number(source), 6.0);
}

#[test]
fn destructuring_declarations_and_defaults() {
    assert_eq!(eval_number("let [a, , b = 9, ...rest] = [1, 2, undefined, 4, 5]; a + b + rest.length"), 12.0);
    assert_eq!(eval_number("let { x, y: z = 2, ...others } = { x: 1, w: 9 }; x + z + others.w"), 12.0);
    assert_eq!(eval_number("function f({ a, b = 10 }, [c]) { return a + b + c; } f({ a: 1 }, [2])"), 13.0);
}

#[test]
fn destructuring_assignment() {
    assert_eq!(eval_number("let a, b; [a, b] = [3, 4]; a * b"), 12.0);
}

#[test]
fn with_statement_pushes_dynamic_scope() {
    let source = "
        let o = { x: 40 };
        let x = 1;
        let out;
        with (o) { out = x + 2; }
        out
    ";
    assert_eq!(eval_number(source), 42.0);
}

#[test]
fn switch_matches_and_falls_through() {
    let source = "
        function pick(v) {
            let out = '';
            switch (v) {
                case 1: out += 'one';
                case 2: out += 'two'; break;
                default: out += 'other';
            }
            return out;
        }
        pick(1) + '|' + pick(2) + '|' + pick(9)
    ";
    assert_eq!(eval_string_value(source), "onetwo|two|other");
}

#[test]
fn this_binding_rules() {
    assert_eq!(eval_number("let o = { v: 7, m: function () { return this.v; } }; o.m()"), 7.0);
    assert_eq!(
        eval_number("let o = { v: 7, m: function () { let f = () => this.v; return f(); } }; o.m()"),
        7.0
    );
}

#[test]
fn new_links_prototype_and_keeps_instance() {
    let source = "
        function Point(x) { this.x = x; }
        Point.prototype.double = function () { return this.x * 2; };
        new Point(21).double()
    ";
    assert_eq!(eval_number(source), 42.0);
}

#[test]
fn constructor_returning_object_wins() {
    assert_eq!(eval_number("function C() { return { x: 5 }; } new C().x"), 5.0);
}

#[test]
fn getters_and_setters_in_literals() {
    let source = "
        let backing = 1;
        let o = { get v() { return backing; }, set v(n) { backing = n * 2; } };
        o.v = 4;
        o.v
    ";
    assert_eq!(eval_number(source), 8.0);
}

#[test]
fn frozen_objects_reject_writes_silently() {
    assert_eq!(eval_number("let o = { x: 1 }; Object.freeze(o); o.x = 9; o.x"), 1.0);
    assert!(eval_bool("Object.isFrozen(Object.freeze({}))"));
}

#[test]
fn delete_respects_configurability() {
    assert!(eval_bool("let o = { x: 1 }; delete o.x"));
    assert!(!eval_bool(
        "let o = {}; Object.defineProperty(o, 'x', { value: 1 }); delete o.x"
    ));
}

#[test]
fn interrupt_terminates_uncatchably() {
    use std::cell::Cell;
    use std::rc::Rc;

    let fuel = Rc::new(Cell::new(100u32));
    let hook_fuel = fuel.clone();
    let params = VmParams::default().set_interrupt_callback(Box::new(move || {
        let left = hook_fuel.get();
        if left == 0 {
            return true;
        }
        hook_fuel.set(left - 1);
        false
    }));

    let mut vm = Vm::new(params);
    vm.init_standard_objects();
    // The catch must not observe the termination.
    let result = vm.eval("try { while (true) {} } catch (e) { 'caught' }", "test", 1);
    assert!(matches!(result, Err(EvalError::Terminated)));
}

#[test]
fn stack_traces_render_script_frames() {
    let mut vm = Vm::new(VmParams::default());
    vm.init_standard_objects();
    let result = vm.eval(
        "function inner() { throw new TypeError('broken'); }\nfunction outer() { inner(); }\nouter();",
        "trace.js",
        1,
    );
    let Err(EvalError::Exception(value)) = result else {
        panic!("expected exception");
    };
    let error = value.downcast_ref::<crate::value::error::Error>().unwrap();
    let stack = error.render_stack();
    assert!(stack.starts_with("TypeError: broken"), "stack was {stack}");
    assert!(stack.contains("\tat inner (trace.js:1)"), "stack was {stack}");
    assert!(stack.contains("\tat outer (trace.js:2)"), "stack was {stack}");
    assert_eq!(error.message_with_position(), "broken (trace.js#1)");
}

#[test]
fn spread_in_calls_and_literals() {
    assert_eq!(eval_number("function add3(a, b, c) { return a + b + c; } add3(...[1, 2, 3])"), 6.0);
    assert_eq!(eval_number("[0, ...[1, 2], 3].length"), 4.0);
}

#[test]
fn instanceof_and_in_operators() {
    assert!(eval_bool("new Error('x') instanceof Error"));
    assert!(eval_bool("'a' in { a: 1 }"));
    assert!(!eval_bool("'b' in { a: 1 }"));
}

#[test]
fn compile_once_run_twice() {
    let mut vm = Vm::new(VmParams::default());
    vm.init_standard_objects();
    let script = vm.compile("1 + 2", "snippet", 1).unwrap();
    for _ in 0..2 {
        let value = vm.execute_script(&script).unwrap();
        assert!(matches!(value, Value::Number(n) if n == 3.0));
    }
}
