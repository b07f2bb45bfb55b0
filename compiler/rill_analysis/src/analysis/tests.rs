use super::*;
use crate::conflict::{ConflictKind, Severity};
use crate::context::SourceType;
use pretty_assertions::assert_eq;
use rill_eval::StreamRegistry;
use rill_ir::{AstBuilder, BinaryOp, SharedInterner, Unit};

fn analyze(ast: &Ast, interner: &SharedInterner) -> Analysis {
    let natives = NativeRegistry::standard(interner);
    let streams = StreamRegistry::standard(interner).signatures();
    Analyzer::new(ast, &natives, &streams).analyze()
}

fn kinds(analysis: &Analysis) -> Vec<ConflictKind> {
    analysis.conflicts().iter().map(|c| c.kind.clone()).collect()
}

struct Sources(Vec<(Name, SourceType)>);

impl SourceLookup for Sources {
    fn source_type(&self, source: Name) -> SourceType {
        self.0
            .iter()
            .find(|(name, _)| *name == source)
            .map_or(SourceType::Missing, |(_, ty)| ty.clone())
    }
}

#[test]
fn well_formed_sum_has_no_conflicts() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let two = b.number("2");
    let sum = b.binary(BinaryOp::Add, one, two);
    let ast = b.program(&[sum]);

    let analysis = analyze(&ast, &interner);
    assert!(analysis.conflicts().is_empty());
    assert!(!analysis.is_blocked());
    assert_eq!(analysis.type_of(sum), Type::number());
    assert_eq!(analysis.type_of(ast.root()), Type::number());
}

#[test]
fn undeclared_name_is_one_conflict_at_the_reference() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let x = b.reference("x");
    let one = b.number("1");
    let sum = b.binary(BinaryOp::Add, x, one);
    let ast = b.program(&[sum]);

    let analysis = analyze(&ast, &interner);
    let name = interner.intern("x");
    assert_eq!(kinds(&analysis), vec![ConflictKind::UnknownName(name)]);
    assert_eq!(analysis.primary(x).count(), 1);
    assert_eq!(analysis.touching(sum).count(), 0);
    assert!(analysis.is_blocked());
    assert_eq!(analysis.resolution(x), None);
}

#[test]
fn duplicate_names_point_back_at_the_first() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let first = b.bind("a", one);
    let two = b.number("2");
    let second = b.bind("a", two);
    let a = b.reference("a");
    let ast = b.program(&[first, second, a]);

    let analysis = analyze(&ast, &interner);
    let conflict = &analysis.conflicts()[0];
    assert_eq!(analysis.conflicts().len(), 1);
    assert_eq!(conflict.kind, ConflictKind::DuplicateName(interner.intern("a")));
    assert_eq!(conflict.primary, second);
    assert_eq!(conflict.secondary, Some(first));
    assert_eq!(analysis.secondary(first).count(), 1);
    // The later declaration shadows.
    assert_eq!(analysis.resolution(a), Some(Definition::Bind(second)));
}

#[test]
fn input_lists_are_checked() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let zero = b.number("0");
    let optional = b.optional_input("a", zero);
    let required = b.input("b");
    let rest = b.variadic_input("rest");
    let again = b.input("b");
    let body = b.number("1");
    let function = b.function("f", &[optional, required, rest, again], body);
    let call = b.call("f", &[]);
    let ast = b.program(&[function, call]);

    let analysis = analyze(&ast, &interner);
    let found = kinds(&analysis);
    let b_name = interner.intern("b");
    assert!(found.contains(&ConflictKind::RequiredAfterOptional));
    assert!(found.contains(&ConflictKind::VariadicNotLast));
    assert!(found.contains(&ConflictKind::DuplicateInput(b_name)));
    let after_optional = analysis
        .primary(required)
        .find(|c| c.kind == ConflictKind::RequiredAfterOptional);
    assert_eq!(after_optional.and_then(|c| c.secondary), Some(optional));
}

#[test]
fn annotation_mismatch_blames_the_value() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let text = b.text("yes");
    let flag = b.bind_typed("flag", text, Type::Boolean);
    let reference = b.reference("flag");
    let ast = b.program(&[flag, reference]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        analysis.conflicts(),
        &[Conflict::new(
            ConflictKind::IncompatibleType {
                expected: Type::Boolean,
                found: Type::Text,
            },
            text,
        )
        .with_secondary(flag)]
    );
    assert_eq!(analysis.type_of(reference), Type::Boolean);
}

#[test]
fn mixing_units_conflicts_but_multiplying_does_not() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let meters = b.number_with_unit("1", Unit::dimension("m"));
    let seconds = b.number_with_unit("2", Unit::dimension("s"));
    let sum = b.binary(BinaryOp::Add, meters, seconds);
    let meters2 = b.number_with_unit("3", Unit::dimension("m"));
    let seconds2 = b.number_with_unit("4", Unit::dimension("s"));
    let speed = b.binary(BinaryOp::Divide, meters2, seconds2);
    let list = b.sequence(&[sum, speed]);
    let ast = b.program(&[list]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        analysis.conflicts(),
        &[Conflict::new(ConflictKind::IncompatibleUnits, sum).with_secondary(seconds)]
    );
    assert_eq!(
        analysis.type_of(speed),
        Type::Number(Unit::dimension("m").quotient(&Unit::dimension("s")))
    );
}

#[test]
fn wrong_operand_blames_the_operand() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let text = b.text("a");
    let sum = b.binary(BinaryOp::Add, one, text);
    let yes = b.boolean(true);
    let two = b.number("2");
    let both = b.binary(BinaryOp::And, yes, two);
    let list = b.sequence(&[sum, both]);
    let ast = b.program(&[list]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        analysis.conflicts(),
        &[
            Conflict::new(ConflictKind::IncompatibleOperand(BinaryOp::Add), text)
                .with_secondary(sum),
            Conflict::new(
                ConflictKind::IncompatibleType {
                    expected: Type::Boolean,
                    found: Type::number(),
                },
                two,
            )
            .with_secondary(both),
        ]
    );
}

#[test]
fn unused_binds_inside_functions_are_advisory() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let unused = b.bind("unused", one);
    let two = b.number("2");
    let body = b.block(&[unused, two]);
    let function = b.function("f", &[], body);
    let call = b.call("f", &[]);
    let ast = b.program(&[function, call]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        kinds(&analysis),
        vec![ConflictKind::UnusedBind(interner.intern("unused"))]
    );
    assert_eq!(analysis.conflicts()[0].severity(), Severity::Advisory);
    assert!(!analysis.is_blocked());
}

#[test]
fn blocks_must_end_with_an_expression() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let last = b.bind("a", one);
    let ast = b.program(&[last]);

    let analysis = analyze(&ast, &interner);
    let body = ast.body().unwrap();
    assert_eq!(
        analysis.conflicts(),
        &[Conflict::new(ConflictKind::ExpectedEndingExpression, body).with_secondary(last)]
    );
}

#[test]
fn call_arity_and_argument_types() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let n = b.typed_input("n", Type::number());
    let m = b.input("m");
    let body = b.reference("n");
    let function = b.function("f", &[n, m], body);
    let text = b.text("a");
    let short = b.call("f", &[text]);
    let one = b.number("1");
    let two = b.number("2");
    let three = b.number("3");
    let long = b.call("f", &[one, two, three]);
    let list = b.sequence(&[short, long]);
    let ast = b.program(&[function, list]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        analysis.conflicts(),
        &[
            Conflict::new(ConflictKind::MissingInput(interner.intern("m")), short)
                .with_secondary(m),
            Conflict::new(
                ConflictKind::IncompatibleType {
                    expected: Type::number(),
                    found: Type::Text,
                },
                text,
            )
            .with_secondary(short),
            Conflict::new(ConflictKind::UnexpectedInput, three).with_secondary(long),
        ]
    );
}

#[test]
fn native_arity_is_checked() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let call = b.call("length", &[]);
    let ast = b.program(&[call]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        kinds(&analysis),
        vec![ConflictKind::MissingInput(interner.intern("collection"))]
    );
}

#[test]
fn calling_a_number_is_not_a_function() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let call = b.evaluate(one, &[]);
    let ast = b.program(&[call]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        analysis.conflicts(),
        &[Conflict::new(ConflictKind::NotAFunction, one).with_secondary(call)]
    );
}

#[test]
fn higher_order_arguments_get_indirect_call_sites() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let x = b.input("x");
    let xr = b.reference("x");
    let two = b.number("2");
    let doubled = b.binary(BinaryOp::Multiply, xr, two);
    let function = b.function("", &[x], doubled);
    let double = b.bind("double", function);
    let one = b.number("1");
    let three = b.number("3");
    let numbers = b.sequence(&[one, three]);
    let double_ref = b.reference("double");
    let map = b.call("map", &[numbers, double_ref]);
    let ast = b.program(&[double, map]);

    let analysis = analyze(&ast, &interner);
    assert!(analysis.conflicts().is_empty());
    assert_eq!(
        analysis.call_sites(CallTarget::Definition(function)),
        &[CallSite {
            node: map,
            indirect: true,
        }]
    );
    let map_id = NativeRegistry::standard(&interner)
        .lookup(interner.intern("map"))
        .unwrap();
    assert_eq!(analysis.call_sites(CallTarget::Native(map_id)).len(), 1);
    // The callback's input may receive anything passed to the native.
    assert!(analysis.dependencies(xr).contains(&numbers));
    assert!(analysis.dependencies(map).contains(&doubled));
}

#[test]
fn stream_changes_affect_only_dependents() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let key = b.reference("key");
    let bang = b.text("!");
    let shout = b.binary(BinaryOp::Add, key, bang);
    let greeting = b.bind("greeting", shout);
    let one = b.number("1");
    let two = b.number("2");
    let sum = b.binary(BinaryOp::Add, one, two);
    let other = b.bind("other", sum);
    let result = b.reference("greeting");
    let ast = b.program(&[greeting, other, result]);

    let analysis = analyze(&ast, &interner);
    assert!(analysis.conflicts().is_empty());

    let name = interner.intern("key");
    assert_eq!(analysis.stream_references(name), &[key]);
    let affected = analysis.affected_by_stream(name);
    for node in [key, shout, greeting, result, ast.body().unwrap(), ast.root()] {
        assert!(affected.contains(&node), "{node} should be affected");
    }
    for node in [bang, one, two, sum, other] {
        assert!(!affected.contains(&node), "{node} should not be affected");
    }
    assert!(analysis
        .affected_by_stream(interner.intern("time"))
        .is_empty());
}

#[test]
fn closures_carry_stream_dependencies_through_inputs() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    // apply: ƒ(g) g()
    let g = b.input("g");
    let g_ref = b.reference("g");
    let call_g = b.evaluate(g_ref, &[]);
    let apply = b.function("apply", &[g], call_g);
    // apply(ƒ() key)
    let key = b.reference("key");
    let callback = b.function("", &[], key);
    let call = b.call("apply", &[callback]);
    let ast = b.program(&[apply, call]);

    let analysis = analyze(&ast, &interner);
    assert!(analysis.conflicts().is_empty());
    assert!(analysis.dependencies(callback).contains(&key));
    let affected = analysis.affected_by_stream(interner.intern("key"));
    for node in [callback, g_ref, call_g, call, ast.root()] {
        assert!(affected.contains(&node), "{node} should be affected");
    }
}

#[test]
fn changed_checks_depend_on_every_stream() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let time = b.reference("time");
    let changed = b.changed(time);
    let ast = b.program(&[changed]);

    let analysis = analyze(&ast, &interner);
    assert!(analysis.conflicts().is_empty());
    assert!(analysis
        .affected_by_stream(interner.intern("key"))
        .contains(&ast.root()));
}

#[test]
fn changed_requires_a_stream() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let changed = b.changed(one);
    let ast = b.program(&[changed]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        analysis.conflicts(),
        &[Conflict::new(ConflictKind::ExpectedStream, changed).with_secondary(one)]
    );
}

#[test]
fn broken_nodes_do_not_stop_analysis() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let hole = b.placeholder();
    let junk = b.unparsable("%%");
    let missing = b.reference("missing");
    let bad = b.number("1.2.3");
    let list = b.sequence(&[hole, junk, missing, bad]);
    let ast = b.program(&[list]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        kinds(&analysis),
        vec![
            ConflictKind::Placeholder,
            ConflictKind::Unparsable,
            ConflictKind::UnknownName(interner.intern("missing")),
            ConflictKind::NotANumber,
        ]
    );
}

#[test]
fn missing_children_are_reported_once() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.number("1");
    let sum = b.binary(BinaryOp::Add, one, NodeId::INVALID);
    let ast = b.program(&[sum]);

    let analysis = analyze(&ast, &interner);
    assert_eq!(
        analysis.conflicts(),
        &[Conflict::new(ConflictKind::MissingValue, sum)]
    );
}

#[test]
fn borrows_resolve_through_the_lookup() {
    let interner = SharedInterner::new();
    let natives = NativeRegistry::standard(&interner);
    let mut b = AstBuilder::new(&interner);
    let ready = b.borrow("ready");
    let busy = b.borrow("busy");
    let gone = b.borrow("gone");
    let r = b.reference("ready");
    let ast = b.program(&[ready, busy, gone, r]);

    let sources = Sources(vec![
        (interner.intern("ready"), SourceType::Resolved(Type::Text)),
        (interner.intern("busy"), SourceType::Analyzing),
    ]);
    let analysis = Analyzer::new(&ast, &natives, &[])
        .with_lookup(&sources)
        .analyze();
    assert_eq!(
        analysis.conflicts(),
        &[
            Conflict::new(ConflictKind::BorrowCycle(interner.intern("busy")), busy),
            Conflict::new(ConflictKind::UnknownSource(interner.intern("gone")), gone),
        ]
    );
    assert_eq!(analysis.type_of(r), Type::Text);
    assert_eq!(analysis.resolution(r), Some(Definition::Borrow(ready)));
}

#[test]
fn recursion_terminates() {
    let interner = SharedInterner::new();
    let mut b = AstBuilder::new(&interner);
    let n = b.input("n");
    let n1 = b.reference("n");
    let zero = b.number("0");
    let done = b.binary(BinaryOp::Less, n1, zero);
    let one = b.number("1");
    let n2 = b.reference("n");
    let step = b.number("1");
    let smaller = b.binary(BinaryOp::Subtract, n2, step);
    let recurse = b.call("count", &[smaller]);
    let body = b.conditional(done, one, recurse);
    let function = b.function("count", &[n], body);
    let three = b.number("3");
    let call = b.call("count", &[three]);
    let ast = b.program(&[function, call]);

    let analysis = analyze(&ast, &interner);
    assert!(analysis.conflicts().is_empty());
    assert_eq!(analysis.call_sites(CallTarget::Definition(function)).len(), 2);
    assert!(analysis.dependencies(n1).contains(&three));
    assert!(analysis.dependencies(n1).contains(&smaller));
}

#[test]
fn empty_analysis_knows_nothing() {
    let analysis = Analysis::empty();
    assert!(analysis.conflicts().is_empty());
    assert!(!analysis.is_blocked());
    assert_eq!(analysis.type_of(NodeId::new(0)), Type::Any);
    assert!(analysis.dependents(NodeId::new(0)).is_empty());
}
