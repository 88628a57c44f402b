//! Parser integration tests.
//!
//! Verifies that the parser builds the expected trees from Java source and
//! reports failures with the expected messages.

use jast_ast::*;
use jast_diagnostics::ParseError;
use jast_parser::{
    parse, parse_constructor_signature, parse_expression, parse_member_signature, parse_type, parse_type_signature,
    ParseOptions,
};
use std::io;
use std::sync::{Arc, Mutex};

/// Helper: parse a compilation unit with default options.
fn parse_unit(source: &str) -> CompilationUnit {
    match parse(source, &ParseOptions::default()) {
        Ok(output) => output.tree,
        Err(err) => panic!("failed to parse {source:?}: {err}"),
    }
}

/// Helper: parse an expression with default options.
fn expr(source: &str) -> Expression {
    match parse_expression(source, &ParseOptions::default()) {
        Ok(output) => output.tree,
        Err(err) => panic!("failed to parse {source:?}: {err}"),
    }
}

/// Helper: the statements of the first method of the first type.
fn method_body(source: &str) -> Vec<Statement> {
    let unit = parse_unit(&format!("class T {{ void m() {{ {source} }} }}"));
    let (_, method) = unit.filter_type::<MethodDeclaration>().next().expect("a method");
    method.body.clone().expect("a body")
}

fn syntax_error(result: Result<impl std::fmt::Debug, ParseError>) -> jast_diagnostics::SyntaxError {
    match result {
        Err(ParseError::Syntax(err)) => err,
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

// ============================================================================
// Compilation units
// ============================================================================

#[test]
fn test_parse_package_and_imports() {
    let unit = parse_unit("package a.b; import java.util.*; import static java.lang.Math.max; class A {}");
    assert_eq!(unit.package.as_ref().map(|p| p.name.as_str()), Some("a.b"));
    assert_eq!(unit.imports.len(), 2);
    assert_eq!(unit.imports[0].path, "java.util");
    assert!(unit.imports[0].wildcard);
    assert!(unit.imports[1].r#static);
    assert_eq!(unit.imports[1].path, "java.lang.Math.max");
    assert_eq!(unit.types[0].name(), "A");
}

#[test]
fn test_annotations_without_package_belong_to_type() {
    let unit = parse_unit("@Deprecated class A {}");
    assert!(unit.package.is_none());
    let TypeDeclaration::ClassDeclaration(class) = &unit.types[0] else { panic!("expected class") };
    assert_eq!(class.annotations[0].name, "Deprecated");

    let unit = parse_unit("@Generated package p; class A {}");
    assert_eq!(unit.package.map(|p| p.annotations.len()), Some(1));
}

#[test]
fn test_filter_finds_one_method() {
    let unit = parse_unit("class A { int f; A() {} void m() {} class B {} }");
    let methods: Vec<_> = unit.filter_type::<MethodDeclaration>().collect();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].1.name, "m");
    assert_eq!(unit.filter(Pattern::Kind(NodeKind::ConstructorDeclaration)).count(), 1);
    assert_eq!(unit.filter(Pattern::Kind(NodeKind::ClassDeclaration)).count(), 2);
}

#[test]
fn test_class_header() {
    let unit = parse_unit("public abstract class A<T extends Number> extends B<T> implements C, D {}");
    let TypeDeclaration::ClassDeclaration(class) = &unit.types[0] else { panic!("expected class") };
    assert!(class.modifiers.contains(Modifiers::PUBLIC | Modifiers::ABSTRACT));
    assert_eq!(class.type_parameters[0].name, "T");
    assert_eq!(class.extends.as_ref().map(|t| t.name.as_str()), Some("B"));
    assert_eq!(class.implements.len(), 2);
}

#[test]
fn test_documentation_is_attached() {
    let unit = parse_unit("/** Type. */ class A { /** Field. */ int x; /* plain */ void m() {} }");
    let TypeDeclaration::ClassDeclaration(class) = &unit.types[0] else { panic!("expected class") };
    assert_eq!(class.documentation.as_deref(), Some("/** Type. */"));
    let BodyDeclaration::FieldDeclaration(field) = &class.body[0] else { panic!("expected field") };
    assert_eq!(field.documentation.as_deref(), Some("/** Field. */"));
    let BodyDeclaration::MethodDeclaration(method) = &class.body[1] else { panic!("expected method") };
    assert_eq!(method.documentation, None);
}

#[test]
fn test_method_dimensions_merge_into_return_type() {
    let unit = parse_unit("class A { int m()[] { return null; } }");
    let (_, method) = unit.filter_type::<MethodDeclaration>().next().unwrap();
    assert_eq!(method.return_type.as_ref().map(Type::dimensions), Some(1));
}

#[test]
fn test_enum_declaration() {
    let unit = parse_unit("enum E implements I { A(1) { void f() {} }, B, ; int x; E() {} E(int v) {} }");
    let TypeDeclaration::EnumDeclaration(e) = &unit.types[0] else { panic!("expected enum") };
    assert_eq!(e.body.constants.len(), 2);
    assert_eq!(e.body.constants[0].arguments.as_ref().map(Vec::len), Some(1));
    assert!(e.body.constants[0].body.is_some());
    assert!(e.body.constants[1].arguments.is_none());
    assert_eq!(e.body.declarations.len(), 3);
}

#[test]
fn test_interface_and_annotation_type() {
    let unit = parse_unit(
        "interface I extends J, K { int X = 1; <T> T get(); default void run() {} }
         @interface Tag { String value() default \"\"; int[] ids() default {1, 2}; int MAX = 3; }",
    );
    let TypeDeclaration::InterfaceDeclaration(i) = &unit.types[0] else { panic!("expected interface") };
    assert_eq!(i.extends.len(), 2);
    assert_eq!(i.body[0].kind(), NodeKind::ConstantDeclaration);
    assert_eq!(i.body[1].kind(), NodeKind::MethodDeclaration);
    let BodyDeclaration::MethodDeclaration(run) = &i.body[2] else { panic!("expected method") };
    assert!(run.modifiers.contains(Modifiers::DEFAULT));

    let TypeDeclaration::AnnotationDeclaration(tag) = &unit.types[1] else { panic!("expected annotation type") };
    assert_eq!(tag.body.len(), 3);
    let BodyDeclaration::AnnotationMethod(ids) = &tag.body[1] else { panic!("expected annotation method") };
    assert!(matches!(ids.r#default, Some(ElementValue::Array(_))));
    assert_eq!(tag.body[2].kind(), NodeKind::ConstantDeclaration);
}

#[test]
fn test_annotation_elements() {
    let unit = parse_unit("@A(x = 1, y = {\"a\", \"b\"}) @B(@C) @D class T {}");
    let TypeDeclaration::ClassDeclaration(class) = &unit.types[0] else { panic!("expected class") };
    let [a, b, d] = &class.annotations[..] else { panic!("expected three annotations") };
    assert!(matches!(&a.element, Some(AnnotationElement::Pairs(pairs)) if pairs.len() == 2));
    assert!(matches!(&b.element, Some(AnnotationElement::Value(ElementValue::Annotation(_)))));
    assert!(d.element.is_none());
}

#[test]
fn test_generic_closers_in_fields() {
    let unit = parse_unit("class A { Map<String, List<Set<Integer>>> m; }");
    let (_, field) = unit.filter_type::<FieldDeclaration>().next().unwrap();
    assert_eq!(field.r#type.name(), "Map");
    assert_eq!(unit.filter(Pattern::Kind(NodeKind::ReferenceType)).count(), 5);
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_parenthesized_statements() {
    let body = method_body("(Foo) bar; (bar);");
    let Statement::StatementExpression(cast) = &body[0] else { panic!("expected statement") };
    assert_eq!(cast.expression.kind(), NodeKind::Cast);
    let Statement::StatementExpression(paren) = &body[1] else { panic!("expected statement") };
    assert_eq!(paren.expression.kind(), NodeKind::MemberReference);
}

#[test]
fn test_local_declarations() {
    let body = method_body("int a = 1, b[] = {}; List<String> xs; final var v = 2; a.b.c = 3; class L {}");
    assert_eq!(body[0].kind(), NodeKind::LocalVariableDeclaration);
    assert_eq!(body[1].kind(), NodeKind::LocalVariableDeclaration);
    let Statement::LocalVariableDeclaration(v) = &body[2] else { panic!("expected local") };
    assert_eq!(v.r#type.name(), "var");
    assert!(v.modifiers.contains(Modifiers::FINAL));
    assert_eq!(body[3].kind(), NodeKind::StatementExpression);
    assert_eq!(body[4].kind(), NodeKind::ClassDeclaration);
}

#[test]
fn test_control_flow() {
    let body = method_body(
        "if (a) b(); else { c(); }
         while (x < 10) x++;
         do { x--; } while (x > 0);
         for (int i = 0; i < n; i++, j--) {}
         for (String s : names) {}
         for (;;) break;
         outer: for (;;) continue outer;
         switch (k) { case 1: case 2: f(); break; default: g(); }
         synchronized (this) { }
         assert x : \"m\";
         throw new E();
         return;",
    );
    let kinds: Vec<NodeKind> = body.iter().map(Statement::kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::IfStatement,
            NodeKind::WhileStatement,
            NodeKind::DoStatement,
            NodeKind::ForStatement,
            NodeKind::ForStatement,
            NodeKind::ForStatement,
            NodeKind::ForStatement,
            NodeKind::SwitchStatement,
            NodeKind::SynchronizedStatement,
            NodeKind::AssertStatement,
            NodeKind::ThrowStatement,
            NodeKind::ReturnStatement,
        ]
    );

    let Statement::ForStatement(enhanced) = &body[4] else { panic!("expected for") };
    assert_eq!(enhanced.control.kind(), NodeKind::EnhancedForControl);

    let Statement::ForStatement(labelled) = &body[6] else { panic!("expected for") };
    assert_eq!(labelled.label.as_deref(), Some("outer"));

    let Statement::SwitchStatement(switch) = &body[7] else { panic!("expected switch") };
    assert_eq!(switch.cases.len(), 2);
    assert_eq!(switch.cases[0].case.len(), 2);
    assert!(switch.cases[1].r#default);
}

#[test]
fn test_try_statements() {
    let body = method_body(
        "try (InputStream in = open(); final Reader r = wrap(in);) { read(); }
         catch (IOException | RuntimeException e) { }
         finally { close(); }",
    );
    let Statement::TryStatement(t) = &body[0] else { panic!("expected try") };
    assert_eq!(t.resources.as_ref().map(Vec::len), Some(2));
    assert_eq!(t.catches[0].parameter.types, vec!["IOException", "RuntimeException"]);
    assert!(t.finally_block.is_some());
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_precedence() {
    for source in ["1+2*3", "1*2+3"] {
        let Expression::BinaryOperation(op) = expr(source) else { panic!("expected binary") };
        assert_eq!(op.operator, "+", "source: {source}");
    }

    let Expression::BinaryOperation(op) = expr("a || b && c") else { panic!("expected binary") };
    assert_eq!(op.operator, "||");
}

#[test]
fn test_instanceof_takes_type() {
    let Expression::BinaryOperation(op) = expr("o instanceof List<?>[] && ok") else { panic!("expected binary") };
    assert_eq!(op.operator, "&&");
    let Expression::BinaryOperation(test) = &op.operandl else { panic!("expected instanceof") };
    assert_eq!(test.operator, "instanceof");
    assert!(matches!(&test.operandr, Operand::Type(t) if t.dimensions() == 1));
}

#[test]
fn test_shift_operators() {
    let Expression::BinaryOperation(op) = expr("a >> b") else { panic!("expected binary") };
    assert_eq!(op.operator, ">>");
    let Expression::BinaryOperation(op) = expr("a >>> b") else { panic!("expected binary") };
    assert_eq!(op.operator, ">>>");
    let Expression::Assignment(assign) = expr("a >>>= b") else { panic!("expected assignment") };
    assert_eq!(assign.r#type, ">>>=");
}

#[test]
fn test_assignment_and_ternary() {
    let Expression::Assignment(assign) = expr("a = b = c ? d : e") else { panic!("expected assignment") };
    let Expression::Assignment(inner) = &assign.value else { panic!("expected nested assignment") };
    assert_eq!(inner.value.kind(), NodeKind::TernaryExpression);
}

#[test]
fn test_lambdas() {
    let Expression::LambdaExpression(lambda) = expr("() -> 1;") else { panic!("expected lambda") };
    assert!(lambda.parameters.is_empty());

    for source in ["x -> x", "(x) -> x"] {
        let Expression::LambdaExpression(lambda) = expr(source) else { panic!("expected lambda: {source}") };
        assert!(matches!(&lambda.parameters[..], [LambdaParameter::InferredFormalParameter(p)] if p.name == "x"));
    }

    let Expression::LambdaExpression(lambda) = expr("(a, b) -> { return a + b; }") else { panic!("expected lambda") };
    assert_eq!(lambda.parameters.len(), 2);
    assert!(matches!(lambda.body, LambdaBody::Block(_)));

    let Expression::LambdaExpression(lambda) = expr("(int a, String... b) -> a") else { panic!("expected lambda") };
    assert!(matches!(&lambda.parameters[1], LambdaParameter::FormalParameter(p) if p.varargs));

    assert_eq!(expr("(x);").kind(), NodeKind::MemberReference);
}

#[test]
fn test_illegal_lambda_parameter() {
    let err = syntax_error(parse_expression("a.b -> 1", &ParseOptions::default()));
    assert_eq!(err.description, "Illegal lambda parameter");
}

#[test]
fn test_qualifiers() {
    let Expression::MemberReference(m) = expr("a.b.c") else { panic!("expected member") };
    assert_eq!(m.member, "c");
    assert_eq!(m.qualifier.as_deref(), Some("a.b"));

    let Expression::MemberReference(m) = expr("c") else { panic!("expected member") };
    assert_eq!(m.qualifier, None);

    let Expression::MethodInvocation(call) = expr("a.b(1).c()") else { panic!("expected call") };
    assert_eq!(call.member, "b");
    assert_eq!(call.qualifier.as_deref(), Some("a"));
    assert_eq!(call.selectors.len(), 1);
}

#[test]
fn test_this_with_selectors() {
    let Expression::This(this) = expr("this.list.get(0).name") else { panic!("expected this") };
    let kinds: Vec<NodeKind> = this.selectors.iter().map(Expression::kind).collect();
    assert_eq!(kinds, vec![NodeKind::MemberReference, NodeKind::MethodInvocation, NodeKind::MemberReference]);
}

#[test]
fn test_class_literals() {
    let Expression::ClassReference(class) = expr("int[].class") else { panic!("expected class reference") };
    assert_eq!(class.r#type.name(), "int");
    assert_eq!(class.r#type.dimensions(), 1);
    assert_eq!(expr("void.class").kind(), NodeKind::VoidClassReference);
    assert_eq!(expr("String.class").kind(), NodeKind::ClassReference);
}

#[test]
fn test_creators() {
    let Expression::ClassCreator(creator) = expr("new HashMap<>()") else { panic!("expected creator") };
    assert_eq!(creator.r#type.arguments, Some(vec![]));

    let Expression::ClassCreator(creator) = expr("new java.util.ArrayList<String>(10)") else {
        panic!("expected creator")
    };
    assert_eq!(creator.r#type.name, "java");
    assert_eq!(creator.arguments.len(), 1);

    let Expression::ArrayCreator(array) = expr("new int[][] {{1}, {2, 3}}") else { panic!("expected array") };
    assert_eq!(array.dimensions, vec![None, None]);
    assert_eq!(array.initializer.as_ref().map(|i| i.initializers.len()), Some(2));
}

#[test]
fn test_array_creator_errors() {
    let err = syntax_error(parse_expression("new <T>Foo[1]", &ParseOptions::default()));
    assert_eq!(err.description, "Array creator not allowed with generic constructor type arguments");

    let err = syntax_error(parse_expression("new int", &ParseOptions::default()));
    assert_eq!(err.description, "Unexpected end of input");
}

#[test]
fn test_method_references_and_super() {
    assert_eq!(expr("System.out::println").kind(), NodeKind::MethodReference);
    assert_eq!(expr("super.toString()").kind(), NodeKind::SuperMethodInvocation);
    assert_eq!(expr("super.field").kind(), NodeKind::SuperMemberReference);
    assert_eq!(expr("Outer.super.m()").kind(), NodeKind::SuperMethodInvocation);
}

#[test]
fn test_prefix_operators_on_cast() {
    let Expression::ParenthesizedExpression(p) = expr("-(int) x") else { panic!("expected parenthesized") };
    assert_eq!(p.prefix_operators, vec!["-"]);
    assert_eq!(p.expression.kind(), NodeKind::Cast);
}

// ============================================================================
// Narrow entry points
// ============================================================================

#[test]
fn test_signatures() {
    let options = ParseOptions::default();

    let member = parse_member_signature("public int size()", &options).unwrap().tree;
    let BodyDeclaration::MethodDeclaration(method) = member else { panic!("expected method") };
    assert!(method.body.is_none());

    let member = parse_constructor_signature("public Foo(int x);", &options).unwrap().tree;
    let BodyDeclaration::ConstructorDeclaration(constructor) = member else { panic!("expected constructor") };
    assert_eq!(constructor.parameters.len(), 1);
    assert!(constructor.body.is_empty());

    let declaration = parse_type_signature("public class Foo<T> extends Bar", &options).unwrap().tree;
    assert_eq!(declaration.name(), "Foo");

    let parsed = parse_type("java.util.Map.Entry<K, V>[]", &options).unwrap().tree;
    assert_eq!(parsed.dimensions(), 1);
}

// ============================================================================
// Errors and options
// ============================================================================

#[test]
fn test_error_messages() {
    let options = ParseOptions::default();

    let err = syntax_error(parse("class A { void m() { int x = ; } }", &options));
    assert_eq!(err.description, "Expected expression");
    assert_eq!(err.token, ";");

    let err = syntax_error(parse("class A {", &options));
    assert_eq!(err.description, "Expected '}'");

    let err = syntax_error(parse("class A { void m() { try { } } }", &options));
    assert_eq!(err.description, "Expected catch/finally block");

    let err = syntax_error(parse("int x;", &options));
    assert_eq!(err.description, "Expected type declaration");
}

#[test]
fn test_ignore_errors_collects_lexical_errors() {
    let lenient = ParseOptions::new().with_ignore_errors(true);
    let output = parse_expression("a # + b", &lenient).unwrap();
    assert_eq!(output.lex_errors.len(), 1);
    assert_eq!(output.tree.kind(), NodeKind::BinaryOperation);

    let err = parse_expression("a # + b", &ParseOptions::default()).unwrap_err();
    let ParseError::Lex(err) = err else { panic!("expected lexical error") };
    assert_eq!(err.message, "Could not process token");
}

#[test]
fn test_nesting_limit() {
    // Debug builds use large frames; give the parser room to hit its own limit.
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let source = format!("{}1{}", "(".repeat(500), ")".repeat(500));
            parse_expression(&source, &ParseOptions::default())
        })
        .unwrap();
    let err = syntax_error(handle.join().unwrap());
    assert_eq!(err.description, "Maximum nesting depth exceeded");
}

#[test]
fn test_nested_parentheses_below_limit() {
    let source = format!("{}x{}", "(".repeat(45), ")".repeat(45));
    assert!(matches!(expr(&source), Expression::MemberReference(_)));
}

#[test]
fn test_long_else_if_chain() {
    let branches: Vec<String> = (0..300).map(|i| format!("if (x == {i}) {{ }}")).collect();
    let source = format!("{} else {{ return; }}", branches.join(" else "));
    let statements = method_body(&source);
    assert_eq!(statements.len(), 1);

    let mut count = 0;
    let mut current = statements.first();
    while let Some(Statement::IfStatement(branch)) = current {
        count += 1;
        current = branch.else_statement.as_ref();
    }
    assert_eq!(count, 300);
    assert!(matches!(current, Some(Statement::BlockStatement(_))));
}

#[test]
fn test_save_and_restore_long_sum() {
    let terms: Vec<String> = (0..200).map(|i| i.to_string()).collect();
    let Expression::BinaryOperation(sum) = expr(&terms.join(" + ")) else {
        panic!("expected a binary operation");
    };
    let data = jast_ast::persist::save(sum.as_ref()).unwrap();
    let back: BinaryOperation = jast_ast::persist::restore(&data).unwrap();
    assert_eq!(back, *sum);
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_debug_trace() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();

    let options = ParseOptions::new().with_debug(true);
    tracing::subscriber::with_default(subscriber, || {
        parse("class A {}", &options).unwrap();
    });

    let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("01 -> compilation_unit("), "{output}");
    assert!(output.contains("01 <- compilation_unit("), "{output}");
    assert!(output.contains("02 --> class_or_interface_declaration("), "{output}");
}
