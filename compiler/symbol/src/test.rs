use crate::{Builtin, Conversion, LabelGenerator, LabelKind, Type, VariableKind, VariableSymbol};
use utility::Atom;

#[test]
fn conversion_classification() {
    use Type::*;

    assert_eq!(Conversion::classify(Int, Int), Conversion::Identity);
    assert_eq!(Conversion::classify(Int, String), Conversion::Explicit);
    assert_eq!(Conversion::classify(Bool, String), Conversion::Explicit);
    assert_eq!(Conversion::classify(String, Int), Conversion::Explicit);
    assert_eq!(Conversion::classify(String, Bool), Conversion::Explicit);
    assert_eq!(Conversion::classify(Int, Bool), Conversion::None);
    assert_eq!(Conversion::classify(Bool, Int), Conversion::None);
    assert_eq!(Conversion::classify(Int, Any), Conversion::Implicit);
    assert_eq!(Conversion::classify(Any, String), Conversion::Explicit);
    assert_eq!(Conversion::classify(Void, Any), Conversion::None);

    assert!(Conversion::classify(Int, Any).is_implicit());
    assert!(!Conversion::classify(Int, String).is_implicit());
}

#[test]
fn variables_are_compared_by_identity() {
    let first = VariableSymbol::new(Atom::from("x"), Type::Int, false, VariableKind::Global);
    let second = VariableSymbol::new(Atom::from("x"), Type::Int, false, VariableKind::Global);

    assert_eq!(first, first.clone());
    assert_ne!(first, second);
}

#[test]
fn builtins_are_singletons() {
    let print = Builtin::Print.symbol();

    assert_eq!(print, Builtin::Print.symbol());
    assert_eq!(print.builtin, Some(Builtin::Print));
    assert_eq!(print.type_, Type::Void);
    assert_eq!(print.parameters.len(), 1);
    assert_eq!(Builtin::Rand.symbol().parameters[0].type_, Type::Int);
    assert_eq!(Builtin::all().count(), 3);
}

#[test]
fn fresh_labels_are_distinct() {
    let mut labels = LabelGenerator::default();
    let end = labels.fresh(LabelKind::End);
    let else_ = labels.fresh(LabelKind::Else);

    assert_eq!(end.to_string(), "end-0");
    assert_eq!(else_.to_string(), "else-1");
    assert_ne!(end, labels.fresh(LabelKind::End));
}

#[test]
fn type_lookup() {
    assert_eq!(Type::lookup(Atom::INT), Some(Type::Int));
    assert_eq!(Type::lookup(Atom::from("string")), Some(Type::String));
    assert_eq!(Type::lookup(Atom::VOID), None);
    assert_eq!(Type::lookup(Atom::from("float")), None);
}
