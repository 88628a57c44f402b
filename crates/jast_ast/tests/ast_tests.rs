//! AST integration tests: construction, equality, traversal and persistence
//! over a hand-built compilation unit.

use jast_ast::persist::{restore, save};
use jast_ast::*;

fn int_type() -> Type {
    BasicType { name: "int".into(), dimensions: 0, position: None }.into()
}

fn literal(value: &str) -> Expression {
    Literal {
        prefix_operators: vec![],
        postfix_operators: vec![],
        qualifier: None,
        selectors: vec![],
        value: value.into(),
        position: None,
    }
    .into()
}

/// `class A { int x = 1; int get() { return 1; } }`
fn sample() -> CompilationUnit {
    let field = FieldDeclaration {
        documentation: None,
        modifiers: Modifiers::empty(),
        annotations: vec![],
        r#type: int_type(),
        declarators: vec![VariableDeclarator {
            name: "x".into(),
            dimensions: 0,
            initializer: Some(VariableInitializer::Expression(literal("1"))),
            position: None,
        }],
        position: None,
    };
    let method = MethodDeclaration {
        documentation: Some("/** Getter. */".into()),
        modifiers: Modifiers::PUBLIC,
        annotations: vec![],
        type_parameters: vec![],
        return_type: Some(int_type()),
        name: "get".into(),
        parameters: vec![],
        throws: vec![],
        body: Some(vec![ReturnStatement { label: None, expression: Some(literal("1")), position: None }.into()]),
        position: None,
    };
    let class = ClassDeclaration {
        modifiers: Modifiers::empty(),
        annotations: vec![],
        documentation: None,
        name: "A".into(),
        body: vec![field.into(), method.into()],
        type_parameters: vec![],
        extends: None,
        implements: vec![],
        position: None,
    };
    CompilationUnit { package: None, imports: vec![], types: vec![class.into()], position: None }
}

#[test]
fn test_filter_methods() {
    let unit = sample();
    let methods: Vec<_> = unit.filter_type::<MethodDeclaration>().collect();
    assert_eq!(methods.len(), 1);
    let (path, method) = &methods[0];
    assert_eq!(method.name, "get");
    assert_eq!(path.len(), 2);
    assert_eq!(path[0].kind(), NodeKind::CompilationUnit);
    assert_eq!(path[1].kind(), NodeKind::ClassDeclaration);
}

#[test]
fn test_filter_equal_literals() {
    let unit = sample();
    let needle = literal("1");
    assert_eq!(unit.filter(Pattern::Equals(needle.as_node_ref())).count(), 2);
    assert_eq!(unit.filter(Pattern::Kind(NodeKind::Literal)).count(), 2);
    assert_eq!(unit.filter(Pattern::Category(Category::Declaration)).count(), 3);
}

#[test]
fn test_walk_order_follows_attributes() {
    let unit = sample();
    let kinds: Vec<NodeKind> = unit.walk().map(|(_, n)| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::CompilationUnit,
            NodeKind::ClassDeclaration,
            NodeKind::FieldDeclaration,
            NodeKind::BasicType,
            NodeKind::VariableDeclarator,
            NodeKind::Literal,
            NodeKind::MethodDeclaration,
            NodeKind::BasicType,
            NodeKind::ReturnStatement,
            NodeKind::Literal,
        ]
    );
}

#[test]
fn test_structural_equality_is_deep() {
    let a = sample();
    let mut b = sample();
    assert_eq!(a, b);
    if let TypeDeclaration::ClassDeclaration(class) = &mut b.types[0] {
        class.name = "B".into();
    }
    assert_ne!(a, b);
}

#[test]
fn test_save_and_restore() {
    let unit = sample();
    let data = save(&unit).unwrap();
    let back: CompilationUnit = restore(&data).unwrap();
    assert_eq!(back, unit);
}

#[test]
fn test_save_and_restore_deep_chain() {
    // 0 + 1 + ... + 299, nested to the left.
    let mut sum = literal("0");
    for i in 1..300 {
        sum = BinaryOperation {
            operator: "+".into(),
            operandl: sum,
            operandr: Operand::Expression(literal(&i.to_string())),
            position: None,
        }
        .into();
    }
    let Expression::BinaryOperation(root) = sum else {
        panic!("expected a binary operation");
    };
    let data = save(root.as_ref()).unwrap();
    let back: BinaryOperation = restore(&data).unwrap();
    assert_eq!(back, *root);
}
