use super::*;
use rill_eval::StreamRegistry;
use rill_ir::{AstBuilder, BinaryOp, SharedInterner};

#[test]
fn later_statements_are_not_visible() {
    let interner = SharedInterner::new();
    let natives = NativeRegistry::standard(&interner);
    let mut b = AstBuilder::new(&interner);
    let early = b.reference("a");
    let one = b.number("1");
    let a = b.bind("a", one);
    let late = b.reference("a");
    let ast = b.program(&[early, a, late]);

    let ctx = Context::new(&ast, &natives, &[], None);
    let name = interner.intern("a");
    assert_eq!(ctx.resolve(early, name), None);
    assert_eq!(ctx.resolve(late, name), Some(Definition::Bind(a)));
}

#[test]
fn binds_shadow_streams_and_streams_shadow_natives() {
    let interner = SharedInterner::new();
    let natives = NativeRegistry::standard(&interner);
    let mut streams = StreamRegistry::standard(&interner);
    streams.define("length", Type::number(), rill_eval::Value::None);
    let signatures = streams.signatures();

    let mut b = AstBuilder::new(&interner);
    let text = b.text("bound");
    let key = b.bind("key", text);
    let key_ref = b.reference("key");
    let length_ref = b.reference("length");
    let map_ref = b.reference("map");
    let list = b.sequence(&[key_ref, length_ref, map_ref]);
    let ast = b.program(&[key, list]);

    let ctx = Context::new(&ast, &natives, &signatures, None);
    assert_eq!(
        ctx.resolve(key_ref, interner.intern("key")),
        Some(Definition::Bind(key))
    );
    assert_eq!(
        ctx.resolve(length_ref, interner.intern("length")),
        Some(Definition::Stream(signatures.len() - 1))
    );
    assert!(matches!(
        ctx.resolve(map_ref, interner.intern("map")),
        Some(Definition::Native(_))
    ));
}

#[test]
fn bound_functions_see_their_own_name() {
    let interner = SharedInterner::new();
    let natives = NativeRegistry::standard(&interner);
    let mut b = AstBuilder::new(&interner);
    let n = b.input("n");
    let inner = b.reference("loop");
    let n_ref = b.reference("n");
    let call = b.evaluate(inner, &[n_ref]);
    let function = b.function("", &[n], call);
    let bind = b.bind("loop", function);
    let one = b.number("1");
    let plain = b.bind("plain", one);
    let two = b.number("2");
    let own = b.reference("plain");
    let sum = b.binary(BinaryOp::Add, own, two);
    let again = b.bind("again", sum);
    let result = b.reference("again");
    let ast = b.program(&[bind, plain, again, result]);

    let ctx = Context::new(&ast, &natives, &[], None);
    let loop_def = ctx.resolve(inner, interner.intern("loop"));
    assert_eq!(loop_def, Some(Definition::Bind(bind)));
    assert_eq!(loop_def.and_then(|d| ctx.callable(d)), Some(function));
    assert_eq!(
        ctx.resolve(n_ref, interner.intern("n")),
        Some(Definition::Input {
            input: n,
            definition: function,
        })
    );
    // A non-function bind cannot see itself.
    let itself = ctx.resolve(own, interner.intern("again"));
    assert_eq!(itself, None);
}

#[test]
fn types_are_memoized_and_cycles_become_any() {
    let interner = SharedInterner::new();
    let natives = NativeRegistry::standard(&interner);
    let mut b = AstBuilder::new(&interner);
    let inner = b.call("f", &[]);
    let function = b.function("f", &[], inner);
    let outer = b.call("f", &[]);
    let ast = b.program(&[function, outer]);

    let ctx = Context::new(&ast, &natives, &[], None);
    assert_eq!(ctx.type_of(function), Type::function(vec![], Type::Any));
    assert_eq!(ctx.type_of(outer), Type::Any);
    assert_eq!(ctx.type_of(function), Type::function(vec![], Type::Any));
}
