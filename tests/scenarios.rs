use std::cell::RefCell;
use std::rc::Rc;

use cinder::{ConsoleLevel, Context, ScriptErrorKind, VmParams};

/// Builds a context whose console output is captured for assertions.
fn context_with_console() -> (Context, Rc<RefCell<Vec<String>>>) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = lines.clone();
    let params = VmParams::default().set_console_callback(Box::new(move |_: ConsoleLevel, message: &str| {
        sink.borrow_mut().push(message.to_string());
    }));
    (Context::enter_with_params(params), lines)
}

#[test]
fn s1_optional_chaining() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let error = context
        .evaluate_string(
            &scope,
            "let a = { b: { c: 'd' } }; let e = { f: {} }; let h = null;\n\
             console.info(a?.b?.c);\n\
             console.info(e?.f?.g);\n\
             console.info(h?.i?.j);\n\
             console.info(h.i.j);",
            "src",
            1,
        )
        .unwrap_err();

    assert_eq!(&*lines.borrow(), &["d", "undefined", "undefined"]);
    assert_eq!(error.kind(), ScriptErrorKind::Type);
    assert_eq!(error.to_string(), "TypeError: Cannot read property \"i\" from null (src#5)");
}

#[test]
fn s2_insertion_ordered_map_with_concurrent_iteration() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    context
        .evaluate_string(
            &scope,
            "let m = new Map(); m.set('a',1); m.set('b',2); m.set('c',3);\n\
             let it = m.keys(); m.delete('b');\n\
             console.info(it.next().value, it.next().value, it.next().done);",
            "src",
            1,
        )
        .unwrap();

    assert_eq!(&*lines.borrow(), &["a c true"]);
}

#[test]
fn s6_try_finally_completion_override() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    context
        .evaluate_string(
            &scope,
            "function f(){ try { return 1; } finally { return 2; } }\nconsole.info(f());",
            "src",
            1,
        )
        .unwrap();

    assert_eq!(&*lines.borrow(), &["2"]);
}

#[test]
fn parse_errors_surface_as_syntax_errors_with_position() {
    let mut context = Context::enter();
    let scope = context.init_standard_objects();

    let error = context
        .evaluate_string(&scope, "let a = 1;\nlet = ;", "bad.js", 1)
        .unwrap_err();

    assert_eq!(error.kind(), ScriptErrorKind::Syntax);
    assert_eq!(error.line_number(), Some(2));
    assert_eq!(error.source_name(), Some("bad.js"));
    assert_eq!(error.line_source(), Some("let = ;"));
}

#[test]
fn start_line_offsets_reported_positions() {
    let mut context = Context::enter();
    let scope = context.init_standard_objects();

    let error = context
        .evaluate_string(&scope, "null.x;", "embedded", 10)
        .unwrap_err();
    assert_eq!(error.line_number(), Some(10));
}

#[test]
fn scripts_compile_once_and_rerun() {
    let mut context = Context::enter();
    let scope = context.init_standard_objects();

    let script = context.compile_string("globalThis.n = (globalThis.n || 0) + 1; n", "inc", 1).unwrap();
    script.exec(&mut context, &scope).unwrap();
    let second = script.exec(&mut context, &scope).unwrap();
    assert!(matches!(second, cinder::Value::Number(n) if n == 2.0));
}

#[test]
fn add_to_scope_installs_host_values() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let greeting = context.new_string("hello");
    context.add_to_scope(&scope, "greeting", greeting);

    context
        .evaluate_string(&scope, "console.info(greeting + ' world')", "src", 1)
        .unwrap();
    assert_eq!(&*lines.borrow(), &["hello world"]);
}

#[test]
fn interrupt_hook_terminates_scripts() {
    let remaining = Rc::new(RefCell::new(1_000u32));
    let hook_remaining = remaining.clone();
    let params = VmParams::default().set_interrupt_callback(Box::new(move || {
        let mut left = hook_remaining.borrow_mut();
        if *left == 0 {
            true
        } else {
            *left -= 1;
            false
        }
    }));

    let mut context = Context::enter_with_params(params);
    let scope = context.init_standard_objects();

    // Neither the catch nor the finally may swallow the termination.
    let error = context
        .evaluate_string(
            &scope,
            "try { for (;;) {} } catch (e) { 'caught' } finally { 'cleanup' }",
            "spin",
            1,
        )
        .unwrap_err();
    assert_eq!(error.kind(), ScriptErrorKind::Terminated);
}

#[test]
fn stack_traces_show_script_frames_not_host_frames() {
    let mut context = Context::enter();
    let scope = context.init_standard_objects();

    let error = context
        .evaluate_string(
            &scope,
            "function boom() { null.x; }\nfunction mid() { boom(); }\nmid();",
            "trace.js",
            1,
        )
        .unwrap_err();

    let trace = error.stack_trace();
    assert!(trace.contains("\tat boom (trace.js:1)"), "trace: {trace}");
    assert!(trace.contains("\tat mid (trace.js:2)"), "trace: {trace}");
}

#[test]
fn json_round_trip() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    context
        .evaluate_string(
            &scope,
            "let o = JSON.parse('{\"a\": [1, 2, {\"b\": true}], \"s\": \"x\"}');\n\
             console.info(o.a[2].b, o.s);\n\
             console.info(JSON.stringify({ n: 1.5, list: [null, 'q'] }));",
            "src",
            1,
        )
        .unwrap();

    assert_eq!(
        &*lines.borrow(),
        &["true x", "{\"n\":1.5,\"list\":[null,\"q\"]}"]
    );
}
