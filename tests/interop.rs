use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use cinder::{
    ConsoleLevel, Context, HostClassBuilder, HostField, HostInstance, HostMethod, HostType,
    HostValue, ScriptErrorKind, VmParams,
};

fn context_with_console() -> (Context, Rc<RefCell<Vec<String>>>) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = lines.clone();
    let params = VmParams::default().set_console_callback(Box::new(move |_: ConsoleLevel, message: &str| {
        sink.borrow_mut().push(message.to_string());
    }));
    (Context::enter_with_params(params), lines)
}

fn method(name: &str, params: Vec<HostType>, result: &'static str) -> HostMethod {
    HostMethod {
        name: name.to_string(),
        is_static: false,
        params,
        specificity: 0,
        invoke: Arc::new(move |_, _, _| Ok(HostValue::String(Rc::from(result)))),
    }
}

#[test]
fn s3_overload_resolution() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let class = context.register_host_class(
        HostClassBuilder::new("Overloaded")
            .method(method("f", vec![HostType::Int], "int"))
            .method(method("f", vec![HostType::String], "string")),
    );
    let host = context
        .wrap_host_instance(HostInstance::new(class, Rc::new(())))
        .unwrap();
    context.add_to_scope(&scope, "host", host);

    context
        .evaluate_string(&scope, "console.info(host.f(1.0)); console.info(host.f('1'));", "s3", 1)
        .unwrap();
    assert_eq!(&*lines.borrow(), &["int", "string"]);

    // A boolean fits neither overload.
    let error = context
        .evaluate_string(&scope, "host.f(true)", "s3", 1)
        .unwrap_err();
    assert_eq!(error.kind(), ScriptErrorKind::Type);
}

#[test]
fn overload_ties_raise_ambiguous_call() {
    let mut context = Context::enter();
    let scope = context.init_standard_objects();

    // Two identical signatures can never be told apart.
    let class = context.register_host_class(
        HostClassBuilder::new("Ambiguous")
            .method(method("f", vec![HostType::Int], "a"))
            .method(method("f", vec![HostType::Int], "b")),
    );
    let host = context
        .wrap_host_instance(HostInstance::new(class, Rc::new(())))
        .unwrap();
    context.add_to_scope(&scope, "host", host);

    let error = context.evaluate_string(&scope, "host.f(1)", "tie", 1).unwrap_err();
    assert_eq!(error.kind(), ScriptErrorKind::Type);
    assert!(error.message().contains("ambiguous"), "message: {}", error.message());
}

/// A host object with JavaBean-style accessors over an interior string.
fn bean_class(context: &mut Context) -> cinder::HostClassId {
    context.register_host_class(
        HostClassBuilder::new("Named")
            .method(HostMethod {
                name: "getName".to_string(),
                is_static: false,
                params: vec![],
                specificity: 0,
                invoke: Arc::new(|_, this, _| {
                    let cell = this.unwrap().downcast_ref::<RefCell<String>>().unwrap();
                    Ok(HostValue::String(Rc::from(cell.borrow().as_str())))
                }),
            })
            .method(HostMethod {
                name: "setName".to_string(),
                is_static: false,
                params: vec![HostType::String],
                specificity: 0,
                invoke: Arc::new(|_, this, args| {
                    let cell = this.unwrap().downcast_ref::<RefCell<String>>().unwrap();
                    if let Some(HostValue::String(value)) = args.into_iter().next() {
                        *cell.borrow_mut() = value.to_string();
                    }
                    Ok(HostValue::Null)
                }),
            }),
    )
}

#[test]
fn s4_bean_property_synthesis() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let class = bean_class(&mut context);
    let backing = Rc::new(RefCell::new(String::from("original")));
    let host = context
        .wrap_host_instance(HostInstance::new(class, backing.clone()))
        .unwrap();
    context.add_to_scope(&scope, "host", host);

    context
        .evaluate_string(
            &scope,
            "console.info(host.name);\n\
             host.name = 'x';\n\
             console.info(host.name);\n\
             console.info('name' in host);\n\
             console.info(delete host.name);",
            "s4",
            1,
        )
        .unwrap();

    assert_eq!(&*lines.borrow(), &["original", "x", "true", "false"]);
    assert_eq!(&*backing.borrow(), "x");
}

#[test]
fn s5_for_of_over_host_list() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let list = Rc::new(RefCell::new(vec![
        HostValue::Int(10),
        HostValue::Int(20),
        HostValue::Int(30),
    ]));
    let xs = context.wrap_host_value(HostValue::List(list)).unwrap();
    context.add_to_scope(&scope, "xs", xs);

    context
        .evaluate_string(&scope, "let s=0; for (let v of xs) s+=v; console.info(s);", "s5", 1)
        .unwrap();
    assert_eq!(&*lines.borrow(), &["60"]);
}

#[test]
fn host_list_exposes_the_array_suite() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let list = Rc::new(RefCell::new(vec![
        HostValue::Int(3),
        HostValue::Int(1),
        HostValue::Int(2),
    ]));
    let xs = context.wrap_host_value(HostValue::List(list.clone())).unwrap();
    context.add_to_scope(&scope, "xs", xs);

    context
        .evaluate_string(
            &scope,
            "console.info(xs.length);\n\
             xs.push(4);\n\
             console.info(xs.length, xs[3]);\n\
             console.info(xs.map(function (v) { return v * 10; }).join('-'));\n\
             console.info(xs.slice(1, 3).join(','));\n\
             let removed = xs.splice(1, 2, 9);\n\
             console.info(removed.join(','), xs.join(','));",
            "list",
            1,
        )
        .unwrap();

    assert_eq!(
        &*lines.borrow(),
        &["3", "4 4", "30-10-20-40", "1,2", "1,2 3,9,4"]
    );
    // The script mutations reached the underlying host list.
    assert_eq!(list.borrow().len(), 3);
}

#[test]
fn host_wrappers_preserve_identity() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let class = bean_class(&mut context);
    let backing: Rc<RefCell<String>> = Rc::new(RefCell::new(String::new()));
    let first = context
        .wrap_host_instance(HostInstance::new(class, backing.clone()))
        .unwrap();
    let second = context
        .wrap_host_instance(HostInstance::new(class, backing))
        .unwrap();

    context.add_to_scope(&scope, "a", first);
    context.add_to_scope(&scope, "b", second);
    context
        .evaluate_string(&scope, "console.info(a === b)", "identity", 1)
        .unwrap();
    assert_eq!(&*lines.borrow(), &["true"]);
}

#[test]
fn host_fields_read_and_write() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let class = context.register_host_class(
        HostClassBuilder::new("Counter").field(HostField {
            name: "count".to_string(),
            is_static: false,
            ty: HostType::Int,
            get: Arc::new(|this| {
                let cell = this.unwrap().downcast_ref::<RefCell<i32>>().unwrap();
                HostValue::Int(*cell.borrow())
            }),
            set: Some(Arc::new(|this, value| {
                let cell = this.unwrap().downcast_ref::<RefCell<i32>>().unwrap();
                if let HostValue::Int(n) = value {
                    *cell.borrow_mut() = n;
                }
            })),
        }),
    );

    let backing = Rc::new(RefCell::new(7i32));
    let host = context
        .wrap_host_instance(HostInstance::new(class, backing.clone()))
        .unwrap();
    context.add_to_scope(&scope, "counter", host);

    context
        .evaluate_string(
            &scope,
            "console.info(counter.count); counter.count = 41.9; console.info(counter.count);",
            "fields",
            1,
        )
        .unwrap();
    assert_eq!(&*lines.borrow(), &["7", "41"]);
    assert_eq!(*backing.borrow(), 41);
}

#[test]
fn host_errors_wrap_with_cause() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let class = context.register_host_class(HostClassBuilder::new("Failing").method(HostMethod {
        name: "explode".to_string(),
        is_static: false,
        params: vec![],
        specificity: 0,
        invoke: Arc::new(|_, _, _| Err("disk on fire".to_string())),
    }));
    let host = context
        .wrap_host_instance(HostInstance::new(class, Rc::new(())))
        .unwrap();
    context.add_to_scope(&scope, "host", host);

    // Uncaught, the failure reaches the embedder as a wrapped error.
    let error = context
        .evaluate_string(&scope, "host.explode()", "wrapped", 1)
        .unwrap_err();
    assert_eq!(error.kind(), ScriptErrorKind::Wrapped);
    assert!(error.message().contains("disk on fire"));

    // Caught, the message and cause are script-visible.
    context
        .evaluate_string(
            &scope,
            "try { host.explode(); } catch (e) { console.info(e.name + '/' + e.message + '/' + e.cause); }",
            "wrapped",
            1,
        )
        .unwrap();
    assert_eq!(&*lines.borrow(), &["WrappedError/disk on fire/disk on fire"]);
}

#[test]
fn prefix_remapping_feeds_bean_collapsing() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    // `kjs$getLabel` → strip `kjs$` → `getLabel` → bean property `label`.
    let class = context.register_host_class(
        HostClassBuilder::new("Prefixed")
            .strip_prefix("kjs$")
            .method(HostMethod {
                name: "kjs$getLabel".to_string(),
                is_static: false,
                params: vec![],
                specificity: 0,
                invoke: Arc::new(|_, _, _| Ok(HostValue::String(Rc::from("tagged")))),
            }),
    );
    let host = context
        .wrap_host_instance(HostInstance::new(class, Rc::new(())))
        .unwrap();
    context.add_to_scope(&scope, "host", host);

    context
        .evaluate_string(&scope, "console.info(host.label)", "remap", 1)
        .unwrap();
    assert_eq!(&*lines.borrow(), &["tagged"]);
}

#[test]
fn type_wrappers_short_circuit_conversion() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    // Register a wrapper that turns any script number into a host string
    // for String parameters, proving the registry wins over the default
    // ranking.
    context.type_wrappers().register(
        HostType::String,
        Rc::new(|value| matches!(value, cinder::Value::Number(_))),
        Rc::new(|_, value| {
            let cinder::Value::Number(n) = value else { unreachable!() };
            Ok(HostValue::String(Rc::from(format!("wrapped:{n}"))))
        }),
    );

    let class = context.register_host_class(HostClassBuilder::new("Sink").method(HostMethod {
        name: "take".to_string(),
        is_static: false,
        params: vec![HostType::String],
        specificity: 0,
        invoke: Arc::new(|_, _, args| match args.into_iter().next() {
            Some(HostValue::String(s)) => Ok(HostValue::String(s)),
            _ => Err("expected string".into()),
        }),
    }));
    let host = context
        .wrap_host_instance(HostInstance::new(class, Rc::new(())))
        .unwrap();
    context.add_to_scope(&scope, "host", host);

    context
        .evaluate_string(&scope, "console.info(host.take(5))", "wrap", 1)
        .unwrap();
    assert_eq!(&*lines.borrow(), &["wrapped:5"]);
}

#[test]
fn script_functions_adapt_to_interface_parameters() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    // The host method takes an interface-shaped parameter and dispatches
    // back into the script through the delegate.
    let class = context.register_host_class(HostClassBuilder::new("Runner").method(HostMethod {
        name: "run".to_string(),
        is_static: false,
        params: vec![HostType::Interface],
        specificity: 0,
        invoke: Arc::new(|sc, _, args| {
            let Some(HostValue::Delegate(callback)) = args.into_iter().next() else {
                return Err("expected delegate".into());
            };
            let result = callback
                .apply(sc, cinder_interp::value::Value::Undefined, vec![cinder_interp::value::Value::Number(21.0)])
                .map_err(|_| "callback failed".to_string())?;
            match result {
                cinder_interp::value::Value::Number(n) => Ok(HostValue::Double(n * 2.0)),
                _ => Err("expected number".into()),
            }
        }),
    }));
    let host = context
        .wrap_host_instance(HostInstance::new(class, Rc::new(())))
        .unwrap();
    context.add_to_scope(&scope, "host", host);

    context
        .evaluate_string(&scope, "console.info(host.run(function (n) { return n; }))", "iface", 1)
        .unwrap();
    assert_eq!(&*lines.borrow(), &["42"]);
}

#[test]
fn delete_hook_observes_and_decides() {
    use std::sync::Mutex;

    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let hook_log = log.clone();

    let class = context.register_host_class(
        HostClassBuilder::new("Erasable")
            .method(HostMethod {
                name: "getName".to_string(),
                is_static: false,
                params: vec![],
                specificity: 0,
                invoke: Arc::new(|_, _, _| Ok(HostValue::String(Rc::from("n")))),
            })
            .method(HostMethod {
                name: "ping".to_string(),
                is_static: false,
                params: vec![],
                specificity: 0,
                invoke: Arc::new(|_, _, _| Ok(HostValue::Null)),
            })
            .on_delete(Arc::new(move |_, name| {
                hook_log.lock().unwrap().push(name.to_string());
                // Only the bean property may be deleted.
                name == "name"
            })),
    );
    let host = context
        .wrap_host_instance(HostInstance::new(class, Rc::new(())))
        .unwrap();
    context.add_to_scope(&scope, "host", host);

    context
        .evaluate_string(
            &scope,
            "console.info(delete host.name, delete host.ping);",
            "hook",
            1,
        )
        .unwrap();

    assert_eq!(&*lines.borrow(), &["true false"]);
    assert_eq!(&*log.lock().unwrap(), &["name".to_string(), "ping".to_string()]);
}

#[test]
fn host_list_delete_hook_nulls_honored_elements() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let list = Rc::new(RefCell::new(vec![HostValue::Int(1), HostValue::Int(2)]));
    let hook: cinder::HostDeleteHook = Arc::new(|_, name| name == "0");

    let wrapper = {
        let vm = context.vm();
        let mut sc = vm.scope();
        let list = cinder_interp::hostbridge::HostList::with_delete_hook(&sc, list.clone(), hook);
        cinder::Value::Object(sc.register(list))
    };
    context.add_to_scope(&scope, "xs", wrapper);

    context
        .evaluate_string(
            &scope,
            "console.info(delete xs[0], delete xs[1], xs[0], xs[1]);",
            "hook",
            1,
        )
        .unwrap();
    assert_eq!(&*lines.borrow(), &["true false null 2"]);
}

#[test]
fn get_accessor_wins_over_is_accessor() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    // `isEnabled` is declared first; the `get` accessor must still supply
    // the property, independent of declaration or hash order.
    let class = context.register_host_class(
        HostClassBuilder::new("Toggles")
            .method(method("isEnabled", vec![], "from-is"))
            .method(method("getEnabled", vec![], "from-get")),
    );
    let host = context
        .wrap_host_instance(HostInstance::new(class, Rc::new(())))
        .unwrap();
    context.add_to_scope(&scope, "host", host);

    context
        .evaluate_string(&scope, "console.info(host.enabled)", "beans", 1)
        .unwrap();
    assert_eq!(&*lines.borrow(), &["from-get"]);
}

#[test]
fn host_iterables_participate_in_for_of() {
    let (mut context, lines) = context_with_console();
    let scope = context.init_standard_objects();

    let class = context.register_host_class(
        HostClassBuilder::new("Range").iterable(Arc::new(|data| {
            let end = *data.downcast_ref::<i32>().unwrap();
            (0..end).map(HostValue::Int).collect()
        })),
    );
    let host = context
        .wrap_host_instance(HostInstance::new(class, Rc::new(4i32)))
        .unwrap();
    context.add_to_scope(&scope, "range", host);

    context
        .evaluate_string(&scope, "let out = ''; for (let v of range) out += v; console.info(out);", "iter", 1)
        .unwrap();
    assert_eq!(&*lines.borrow(), &["0123"]);
}
