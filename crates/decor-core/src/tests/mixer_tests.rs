use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::intercept::{intercept_call, CallArgs, CallValue, InterceptError};
use crate::mixer::Mixer;
use crate::registry::register_type;

struct Widget {
    label: &'static str,
}

type Trace = Rc<RefCell<Vec<String>>>;

fn trace() -> Trace {
    Rc::new(RefCell::new(Vec::new()))
}

fn log_before(trace: &Trace, tag: &'static str) -> Rc<dyn Fn(&Widget, CallArgs) -> Option<CallArgs>> {
    let trace = trace.clone();
    Rc::new(move |widget: &Widget, args: CallArgs| {
        trace.borrow_mut().push(format!("{tag}:{}", widget.label));
        Some(args)
    })
}

fn log_after(trace: &Trace, tag: &'static str) -> Rc<dyn Fn(&Widget, CallValue) -> Option<CallValue>> {
    let trace = trace.clone();
    Rc::new(move |widget: &Widget, value: CallValue| {
        trace.borrow_mut().push(format!("{tag}:{}", widget.label));
        Some(value)
    })
}

fn poke(
    mixer: &Mixer<Widget>,
    widget: &Widget,
    key: usize,
    trace: &Trace,
) -> Result<CallValue, InterceptError> {
    let data = mixer.resolved(key).expect("mix record");
    let trace = trace.clone();
    intercept_call(
        widget,
        "poke",
        &data.before_chain("poke"),
        &data.after_chain("poke"),
        vec![Rc::new(7usize) as Rc<dyn Any>],
        move |_, args| {
            trace.borrow_mut().push("m".into());
            Ok(args.into_iter().next().expect("one argument"))
        },
    )
}

#[test]
fn hooks_wrap_the_body_once_each_in_registration_order() {
    let mixer: Mixer<Widget> = Mixer::new("widgets");
    let base = register_type("Base", None);
    let derived = register_type("Derived", Some(base));
    let trace = trace();

    mixer.data(base).add_before_hook("poke", log_before(&trace, "b1"));
    mixer.data(derived).add_before_hook("poke", log_before(&trace, "b2"));
    mixer.data(base).add_after_hook("poke", log_after(&trace, "a1"));
    mixer.data(derived).add_after_hook("poke", log_after(&trace, "a2"));

    let widget = Widget { label: "w" };
    let value = poke(&mixer, &widget, derived, &trace).unwrap();

    assert_eq!(*trace.borrow(), ["b1:w", "b2:w", "m", "a1:w", "a2:w"]);
    assert_eq!(*value.downcast::<usize>().unwrap(), 7);
}

#[test]
fn before_hooks_can_replace_the_argument_tuple() {
    let mixer: Mixer<Widget> = Mixer::new("widgets");
    let key = register_type("Lone", None);

    mixer.data(key).add_before_hook(
        "poke",
        Rc::new(|_: &Widget, _| Some(vec![Rc::new(40usize) as Rc<dyn Any>])),
    );
    let data = mixer.resolved(key).unwrap();
    let widget = Widget { label: "w" };
    let value = intercept_call(
        &widget,
        "poke",
        &data.before_chain("poke"),
        &data.after_chain("poke"),
        vec![Rc::new(1usize) as Rc<dyn Any>],
        |_, args| {
            let seen = *args[0].clone().downcast::<usize>().unwrap();
            Ok::<_, InterceptError>(Rc::new(seen + 2) as CallValue)
        },
    )
    .unwrap();

    assert_eq!(*value.downcast::<usize>().unwrap(), 42);
}

#[test]
fn after_hooks_can_replace_the_value() {
    let mixer: Mixer<Widget> = Mixer::new("widgets");
    let key = register_type("Lone", None);

    mixer.data(key).add_after_hook(
        "poke",
        Rc::new(|_: &Widget, value: CallValue| {
            let seen = *value.downcast::<usize>().unwrap();
            Some(Rc::new(seen * 2) as CallValue)
        }),
    );
    let trace = trace();
    let widget = Widget { label: "w" };
    let value = poke(&mixer, &widget, key, &trace).unwrap();

    assert_eq!(*value.downcast::<usize>().unwrap(), 14);
}

#[test]
fn mixing_is_idempotent() {
    let mixer: Mixer<Widget> = Mixer::new("widgets");
    let key = register_type("Lone", None);

    assert_eq!(mixer.mix(key), key);
    mixer.data(key).add_constructor_hook(Rc::new(|_: &Widget, _| {}));
    assert_eq!(mixer.mix(key), key);
    assert_eq!(mixer.data(key).constructor_chain().len(), 1);
}

#[test]
fn constructor_hooks_run_ancestors_first() {
    let mixer: Mixer<Widget> = Mixer::new("widgets");
    let base = register_type("Base", None);
    let derived = register_type("Derived", Some(base));
    let trace = trace();

    let log = |tag: &'static str| {
        let trace = trace.clone();
        Rc::new(move |widget: &Widget, args: &CallArgs| {
            trace
                .borrow_mut()
                .push(format!("{tag}:{}:{}", widget.label, args.len()));
        }) as Rc<dyn Fn(&Widget, &CallArgs)>
    };

    mixer.data(base).add_constructor_hook(log("base"));
    mixer.data(derived).add_constructor_hook(log("derived"));

    let widget = Widget { label: "w" };
    let args: CallArgs = vec![Rc::new("payload") as Rc<dyn Any>];
    mixer.data(derived).run_constructor_hooks(&widget, &args);

    assert_eq!(*trace.borrow(), ["base:w:1", "derived:w:1"]);
}

#[test]
fn ancestor_hooks_registered_later_are_still_collected() {
    let mixer: Mixer<Widget> = Mixer::new("widgets");
    let base = register_type("Base", None);
    let derived = register_type("Derived", Some(base));
    let trace = trace();

    mixer.mix(base);
    mixer.data(derived).add_before_hook("poke", log_before(&trace, "b2"));
    mixer.data(base).add_before_hook("poke", log_before(&trace, "b1"));

    let widget = Widget { label: "w" };
    poke(&mixer, &widget, derived, &trace).unwrap();

    assert_eq!(*trace.borrow(), ["b1:w", "b2:w", "m"]);
}

#[test]
fn hook_probes_look_through_the_whole_chain() {
    let mixer: Mixer<Widget> = Mixer::new("widgets");
    let base = register_type("Base", None);
    let derived = register_type("Derived", Some(base));
    let trace = trace();

    mixer.mix(base);
    let derived_data = mixer.data(derived);
    assert!(!derived_data.has_hooks("poke"));

    mixer.data(base).add_before_hook("poke", log_before(&trace, "b"));
    assert!(derived_data.has_hooks("poke"));
    assert!(!derived_data.has_hooks("prod"));
}

#[test]
fn intercepted_calls_may_nest() {
    let mixer: Mixer<Widget> = Mixer::new("widgets");
    let key = register_type("Lone", None);
    let trace = trace();

    mixer.data(key).add_before_hook("poke", log_before(&trace, "b"));

    let widget = Widget { label: "w" };
    let data = mixer.resolved(key).unwrap();
    let inner_mixer = &mixer;
    let inner_trace = trace.clone();
    intercept_call(
        &widget,
        "poke",
        &data.before_chain("poke"),
        &data.after_chain("poke"),
        Vec::new(),
        |widget, _| {
            poke(inner_mixer, widget, key, &inner_trace)?;
            Ok::<_, InterceptError>(Rc::new(()) as CallValue)
        },
    )
    .unwrap();

    assert_eq!(*trace.borrow(), ["b:w", "b:w", "m"]);
}
