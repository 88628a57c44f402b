//! AST node definitions for Java source.
//!
//! Every concrete node is a plain struct whose public fields are its
//! attributes, listed in inherited-first order (see [`crate::schema`]). Each
//! struct also carries an out-of-band `position` that is ignored by equality.
//! Children are owned directly; absent optional attributes are `None`.
//!
//! Category enums (`Expression`, `Statement`, ...) group the concrete nodes
//! that may appear in a given slot.

use crate::schema::NodeKind;
use crate::types::Modifiers;
use crate::walk::NodeRef;
use jast_core::Position;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ============================================================================
// Node traits
// ============================================================================

/// Anything that may contain AST nodes.
pub trait VisitNodes {
    /// Call `f` for every node directly held by `self`. Containers are
    /// looked through, not reported.
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>));
}

/// A concrete AST node type.
pub trait AstNode: Clone + PartialEq + Serialize + DeserializeOwned {
    const KIND: NodeKind;
    /// Field identifiers in attribute order, as written in Rust.
    const FIELDS: &'static [&'static str];

    fn position(&self) -> Option<Position>;

    /// Call `f` for each child node, in attribute order.
    fn visit_children<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>));

    fn as_node_ref(&self) -> NodeRef<'_>;

    /// Borrow the concrete node behind `node`, if it is a `Self`.
    fn cast<'a>(node: NodeRef<'a>) -> Option<&'a Self>;
}

/// Strip the raw-identifier prefix from a field identifier.
pub fn attribute_name(field: &'static str) -> &'static str {
    field.strip_prefix("r#").unwrap_or(field)
}

macro_rules! leaf {
    ($($ty:ty),*) => {
        $(
            impl VisitNodes for $ty {
                #[inline]
                fn visit_nodes<'a>(&'a self, _f: &mut dyn FnMut(NodeRef<'a>)) {}
            }
        )*
    };
}

leaf!(String, bool, usize, Modifiers);

impl<T: VisitNodes> VisitNodes for Option<T> {
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
        if let Some(value) = self {
            value.visit_nodes(f);
        }
    }
}

impl<T: VisitNodes> VisitNodes for Vec<T> {
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
        for value in self {
            value.visit_nodes(f);
        }
    }
}

impl<T: VisitNodes> VisitNodes for Box<T> {
    #[inline]
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
        (**self).visit_nodes(f);
    }
}

/// Define a concrete node struct with structural equality over its
/// attribute fields.
macro_rules! node {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
            #[serde(default)]
            pub position: Option<Position>,
        }

        impl PartialEq for $name {
            #[allow(unused_variables)]
            fn eq(&self, other: &Self) -> bool {
                true $( && self.$field == other.$field )*
            }
        }

        impl AstNode for $name {
            const KIND: NodeKind = NodeKind::$name;
            const FIELDS: &'static [&'static str] = &[$( stringify!($field) ),*];

            #[inline]
            fn position(&self) -> Option<Position> {
                self.position
            }

            #[allow(unused_variables)]
            fn visit_children<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
                $( VisitNodes::visit_nodes(&self.$field, f); )*
            }

            #[inline]
            fn as_node_ref(&self) -> NodeRef<'_> {
                NodeRef::$name(self)
            }

            fn cast<'a>(node: NodeRef<'a>) -> Option<&'a Self> {
                match node {
                    NodeRef::$name(n) => Some(n),
                    _ => None,
                }
            }
        }

        impl VisitNodes for $name {
            #[inline]
            fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
                f(NodeRef::$name(self));
            }
        }
    };
}

/// Define a sum type over boxed concrete nodes.
macro_rules! category {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub enum $name {
            $( $variant(Box<$variant>), )*
        }

        impl $name {
            pub fn as_node_ref(&self) -> NodeRef<'_> {
                match self {
                    $( $name::$variant(n) => NodeRef::$variant(n), )*
                }
            }

            pub fn kind(&self) -> NodeKind {
                match self {
                    $( $name::$variant(_) => NodeKind::$variant, )*
                }
            }

            pub fn position(&self) -> Option<Position> {
                match self {
                    $( $name::$variant(n) => n.position, )*
                }
            }
        }

        impl VisitNodes for $name {
            fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
                f(self.as_node_ref());
            }
        }

        $(
            impl From<$variant> for $name {
                fn from(node: $variant) -> Self {
                    $name::$variant(Box::new(node))
                }
            }
        )*
    };
}

// ============================================================================
// Compilation unit
// ============================================================================

node! {
    /// The root of a parsed source file.
    CompilationUnit {
        package: Option<PackageDeclaration>,
        imports: Vec<Import>,
        types: Vec<TypeDeclaration>,
    }
}

node! {
    Import {
        path: String,
        r#static: bool,
        /// `import a.b.*;`
        wildcard: bool,
    }
}

node! {
    PackageDeclaration {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        documentation: Option<String>,
        name: String,
    }
}

// ============================================================================
// Type declarations
// ============================================================================

node! {
    ClassDeclaration {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        documentation: Option<String>,
        name: String,
        body: Vec<BodyDeclaration>,
        type_parameters: Vec<TypeParameter>,
        extends: Option<ReferenceType>,
        implements: Vec<ReferenceType>,
    }
}

node! {
    EnumDeclaration {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        documentation: Option<String>,
        name: String,
        body: EnumBody,
        implements: Vec<ReferenceType>,
    }
}

node! {
    InterfaceDeclaration {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        documentation: Option<String>,
        name: String,
        body: Vec<BodyDeclaration>,
        type_parameters: Vec<TypeParameter>,
        extends: Vec<ReferenceType>,
    }
}

node! {
    /// `@interface Name { ... }`
    AnnotationDeclaration {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        documentation: Option<String>,
        name: String,
        body: Vec<BodyDeclaration>,
    }
}

category! {
    TypeDeclaration {
        ClassDeclaration,
        EnumDeclaration,
        InterfaceDeclaration,
        AnnotationDeclaration,
    }
}

impl TypeDeclaration {
    pub fn name(&self) -> &str {
        match self {
            TypeDeclaration::ClassDeclaration(n) => &n.name,
            TypeDeclaration::EnumDeclaration(n) => &n.name,
            TypeDeclaration::InterfaceDeclaration(n) => &n.name,
            TypeDeclaration::AnnotationDeclaration(n) => &n.name,
        }
    }
}

// ============================================================================
// Types
// ============================================================================

node! {
    /// A primitive type such as `int` or `boolean`.
    BasicType {
        name: String,
        dimensions: usize,
    }
}

node! {
    /// A class or interface type, possibly parameterized and nested
    /// (`Map.Entry<K, V>` is `Map` with sub type `Entry`).
    ReferenceType {
        name: String,
        dimensions: usize,
        /// `None` for a raw type; `Some(vec![])` for the diamond `<>`.
        arguments: Option<Vec<TypeArgument>>,
        sub_type: Option<Box<ReferenceType>>,
    }
}

node! {
    TypeArgument {
        r#type: Option<Type>,
        /// `?`, `extends` or `super` for wildcards.
        pattern_type: Option<String>,
    }
}

node! {
    TypeParameter {
        name: String,
        extends: Vec<ReferenceType>,
    }
}

category! {
    Type {
        BasicType,
        ReferenceType,
    }
}

impl Type {
    pub fn name(&self) -> &str {
        match self {
            Type::BasicType(t) => &t.name,
            Type::ReferenceType(t) => &t.name,
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            Type::BasicType(t) => t.dimensions,
            Type::ReferenceType(t) => t.dimensions,
        }
    }

    /// Add array dimensions found after the type, e.g. on a declarator.
    pub fn add_dimensions(&mut self, extra: usize) {
        match self {
            Type::BasicType(t) => t.dimensions += extra,
            Type::ReferenceType(t) => t.dimensions += extra,
        }
    }
}

// ============================================================================
// Annotations
// ============================================================================

node! {
    Annotation {
        name: String,
        element: Option<AnnotationElement>,
    }
}

node! {
    ElementValuePair {
        name: String,
        value: ElementValue,
    }
}

node! {
    ElementArrayValue {
        values: Vec<ElementValue>,
    }
}

/// The argument list of an annotation application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationElement {
    Pairs(Vec<ElementValuePair>),
    Value(ElementValue),
}

impl VisitNodes for AnnotationElement {
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
        match self {
            AnnotationElement::Pairs(pairs) => pairs.visit_nodes(f),
            AnnotationElement::Value(value) => value.visit_nodes(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementValue {
    Annotation(Box<Annotation>),
    Array(Box<ElementArrayValue>),
    Expression(Expression),
}

impl VisitNodes for ElementValue {
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
        match self {
            ElementValue::Annotation(n) => n.visit_nodes(f),
            ElementValue::Array(n) => n.visit_nodes(f),
            ElementValue::Expression(n) => n.visit_nodes(f),
        }
    }
}

// ============================================================================
// Members and variables
// ============================================================================

node! {
    MethodDeclaration {
        documentation: Option<String>,
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        type_parameters: Vec<TypeParameter>,
        /// `None` for `void`.
        return_type: Option<Type>,
        name: String,
        parameters: Vec<FormalParameter>,
        throws: Vec<String>,
        /// `None` for abstract and native methods.
        body: Option<Vec<Statement>>,
    }
}

node! {
    FieldDeclaration {
        documentation: Option<String>,
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        r#type: Type,
        declarators: Vec<VariableDeclarator>,
    }
}

node! {
    ConstructorDeclaration {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        documentation: Option<String>,
        type_parameters: Vec<TypeParameter>,
        name: String,
        parameters: Vec<FormalParameter>,
        throws: Vec<String>,
        body: Vec<Statement>,
    }
}

node! {
    /// A field declared in an interface or annotation type.
    ConstantDeclaration {
        documentation: Option<String>,
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        r#type: Type,
        declarators: Vec<VariableDeclarator>,
    }
}

node! {
    /// `{ ... }` or `static { ... }` in a class body.
    InitializerBlock {
        r#static: bool,
        body: Vec<Statement>,
    }
}

node! {
    ArrayInitializer {
        initializers: Vec<VariableInitializer>,
    }
}

node! {
    VariableDeclaration {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        r#type: Type,
        declarators: Vec<VariableDeclarator>,
    }
}

node! {
    LocalVariableDeclaration {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        r#type: Type,
        declarators: Vec<VariableDeclarator>,
    }
}

node! {
    VariableDeclarator {
        name: String,
        /// Array dimensions written after the name, as in `int x[]`.
        dimensions: usize,
        initializer: Option<VariableInitializer>,
    }
}

node! {
    FormalParameter {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        r#type: Type,
        name: String,
        varargs: bool,
    }
}

node! {
    /// An untyped lambda parameter.
    InferredFormalParameter {
        name: String,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableInitializer {
    Expression(Expression),
    Array(Box<ArrayInitializer>),
}

impl VisitNodes for VariableInitializer {
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
        match self {
            VariableInitializer::Expression(n) => n.visit_nodes(f),
            VariableInitializer::Array(n) => n.visit_nodes(f),
        }
    }
}

// ============================================================================
// Enums and annotation members
// ============================================================================

node! {
    EnumBody {
        constants: Vec<EnumConstantDeclaration>,
        declarations: Vec<BodyDeclaration>,
    }
}

node! {
    EnumConstantDeclaration {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        documentation: Option<String>,
        name: String,
        arguments: Option<Vec<Expression>>,
        body: Option<Vec<BodyDeclaration>>,
    }
}

node! {
    AnnotationMethod {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        name: String,
        return_type: Type,
        dimensions: usize,
        r#default: Option<ElementValue>,
    }
}

category! {
    /// A member of a class, interface, enum or annotation body.
    BodyDeclaration {
        MethodDeclaration,
        FieldDeclaration,
        ConstructorDeclaration,
        ConstantDeclaration,
        InitializerBlock,
        AnnotationMethod,
        ClassDeclaration,
        EnumDeclaration,
        InterfaceDeclaration,
        AnnotationDeclaration,
    }
}

impl From<TypeDeclaration> for BodyDeclaration {
    fn from(declaration: TypeDeclaration) -> Self {
        match declaration {
            TypeDeclaration::ClassDeclaration(n) => BodyDeclaration::ClassDeclaration(n),
            TypeDeclaration::EnumDeclaration(n) => BodyDeclaration::EnumDeclaration(n),
            TypeDeclaration::InterfaceDeclaration(n) => BodyDeclaration::InterfaceDeclaration(n),
            TypeDeclaration::AnnotationDeclaration(n) => BodyDeclaration::AnnotationDeclaration(n),
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

node! {
    IfStatement {
        label: Option<String>,
        condition: Expression,
        then_statement: Statement,
        else_statement: Option<Statement>,
    }
}

node! {
    WhileStatement {
        label: Option<String>,
        condition: Expression,
        body: Statement,
    }
}

node! {
    DoStatement {
        label: Option<String>,
        condition: Expression,
        body: Statement,
    }
}

node! {
    ForStatement {
        label: Option<String>,
        control: ForLoopControl,
        body: Statement,
    }
}

node! {
    AssertStatement {
        label: Option<String>,
        condition: Expression,
        value: Option<Expression>,
    }
}

node! {
    BreakStatement {
        label: Option<String>,
        goto: Option<String>,
    }
}

node! {
    ContinueStatement {
        label: Option<String>,
        goto: Option<String>,
    }
}

node! {
    ReturnStatement {
        label: Option<String>,
        expression: Option<Expression>,
    }
}

node! {
    SynchronizedStatement {
        label: Option<String>,
        lock: Expression,
        block: Vec<Statement>,
    }
}

node! {
    ThrowStatement {
        label: Option<String>,
        expression: Expression,
    }
}

node! {
    TryStatement {
        label: Option<String>,
        /// `None` for a plain `try`; `Some` for try-with-resources.
        resources: Option<Vec<TryResource>>,
        block: Vec<Statement>,
        catches: Vec<CatchClause>,
        finally_block: Option<Vec<Statement>>,
    }
}

node! {
    SwitchStatement {
        label: Option<String>,
        expression: Expression,
        cases: Vec<SwitchStatementCase>,
    }
}

node! {
    BlockStatement {
        label: Option<String>,
        statements: Vec<Statement>,
    }
}

node! {
    StatementExpression {
        label: Option<String>,
        expression: Expression,
    }
}

node! {
    /// A lone `;`.
    EmptyStatement {
        label: Option<String>,
    }
}

node! {
    TryResource {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        r#type: Type,
        name: String,
        value: Expression,
    }
}

node! {
    CatchClause {
        label: Option<String>,
        parameter: CatchClauseParameter,
        block: Vec<Statement>,
    }
}

node! {
    CatchClauseParameter {
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        /// Alternatives of a multi-catch, as qualified names.
        types: Vec<String>,
        name: String,
    }
}

node! {
    /// One group of `case`/`default` labels and the statements after them.
    SwitchStatementCase {
        case: Vec<Expression>,
        r#default: bool,
        statements: Vec<Statement>,
    }
}

node! {
    ForControl {
        init: Option<ForInit>,
        condition: Option<Expression>,
        update: Vec<Expression>,
    }
}

node! {
    EnhancedForControl {
        var: VariableDeclaration,
        iterable: Expression,
    }
}

category! {
    /// A block statement: a statement proper, a local variable declaration,
    /// or a local type declaration.
    Statement {
        IfStatement,
        WhileStatement,
        DoStatement,
        ForStatement,
        AssertStatement,
        BreakStatement,
        ContinueStatement,
        ReturnStatement,
        SynchronizedStatement,
        ThrowStatement,
        TryStatement,
        SwitchStatement,
        BlockStatement,
        StatementExpression,
        EmptyStatement,
        LocalVariableDeclaration,
        ClassDeclaration,
        EnumDeclaration,
        InterfaceDeclaration,
        AnnotationDeclaration,
    }
}

impl Statement {
    /// The label slot, for statements that can carry one.
    pub fn label_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            Statement::IfStatement(n) => Some(&mut n.label),
            Statement::WhileStatement(n) => Some(&mut n.label),
            Statement::DoStatement(n) => Some(&mut n.label),
            Statement::ForStatement(n) => Some(&mut n.label),
            Statement::AssertStatement(n) => Some(&mut n.label),
            Statement::BreakStatement(n) => Some(&mut n.label),
            Statement::ContinueStatement(n) => Some(&mut n.label),
            Statement::ReturnStatement(n) => Some(&mut n.label),
            Statement::SynchronizedStatement(n) => Some(&mut n.label),
            Statement::ThrowStatement(n) => Some(&mut n.label),
            Statement::TryStatement(n) => Some(&mut n.label),
            Statement::SwitchStatement(n) => Some(&mut n.label),
            Statement::BlockStatement(n) => Some(&mut n.label),
            Statement::StatementExpression(n) => Some(&mut n.label),
            Statement::EmptyStatement(n) => Some(&mut n.label),
            _ => None,
        }
    }
}

impl From<TypeDeclaration> for Statement {
    fn from(declaration: TypeDeclaration) -> Self {
        match declaration {
            TypeDeclaration::ClassDeclaration(n) => Statement::ClassDeclaration(n),
            TypeDeclaration::EnumDeclaration(n) => Statement::EnumDeclaration(n),
            TypeDeclaration::InterfaceDeclaration(n) => Statement::InterfaceDeclaration(n),
            TypeDeclaration::AnnotationDeclaration(n) => Statement::AnnotationDeclaration(n),
        }
    }
}

category! {
    ForLoopControl {
        ForControl,
        EnhancedForControl,
    }
}

/// The first clause of a classic `for`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForInit {
    Declaration(Box<VariableDeclaration>),
    Expressions(Vec<Expression>),
}

impl VisitNodes for ForInit {
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
        match self {
            ForInit::Declaration(n) => n.visit_nodes(f),
            ForInit::Expressions(n) => n.visit_nodes(f),
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

node! {
    Assignment {
        expressionl: Expression,
        value: Expression,
        /// The assignment operator, e.g. `=` or `+=`.
        r#type: String,
    }
}

node! {
    TernaryExpression {
        condition: Expression,
        if_true: Expression,
        if_false: Expression,
    }
}

node! {
    BinaryOperation {
        operator: String,
        operandl: Expression,
        /// A type for `instanceof`, an expression otherwise.
        operandr: Operand,
    }
}

node! {
    Cast {
        r#type: Type,
        expression: Expression,
    }
}

node! {
    /// `expr::method`, `Type::new`.
    MethodReference {
        expression: Expression,
        method: MemberReference,
        type_arguments: Vec<TypeArgument>,
    }
}

node! {
    LambdaExpression {
        parameters: Vec<LambdaParameter>,
        body: LambdaBody,
    }
}

node! {
    /// `[index]` applied to a primary.
    ArraySelector {
        index: Expression,
    }
}

node! {
    Literal {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        /// Raw literal text, quotes included.
        value: String,
    }
}

node! {
    This {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
    }
}

node! {
    MemberReference {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        member: String,
    }
}

node! {
    /// `this(...)` or `Outer.this.<T>m(...)` style explicit invocation.
    ExplicitConstructorInvocation {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        type_arguments: Vec<TypeArgument>,
        arguments: Vec<Expression>,
    }
}

node! {
    SuperConstructorInvocation {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        type_arguments: Vec<TypeArgument>,
        arguments: Vec<Expression>,
    }
}

node! {
    MethodInvocation {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        type_arguments: Vec<TypeArgument>,
        arguments: Vec<Expression>,
        member: String,
    }
}

node! {
    SuperMethodInvocation {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        type_arguments: Vec<TypeArgument>,
        arguments: Vec<Expression>,
        member: String,
    }
}

node! {
    SuperMemberReference {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        member: String,
    }
}

node! {
    /// `Type.class`
    ClassReference {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        r#type: Type,
    }
}

node! {
    /// `void.class`
    VoidClassReference {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
    }
}

node! {
    ArrayCreator {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        r#type: Type,
        /// One entry per `[]`; `None` where no size was given.
        dimensions: Vec<Option<Expression>>,
        initializer: Option<ArrayInitializer>,
    }
}

node! {
    ClassCreator {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        r#type: ReferenceType,
        constructor_type_arguments: Vec<TypeArgument>,
        arguments: Vec<Expression>,
        /// Anonymous class body.
        body: Option<Vec<BodyDeclaration>>,
    }
}

node! {
    /// `outer.new Inner(...)`
    InnerClassCreator {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        r#type: ReferenceType,
        constructor_type_arguments: Vec<TypeArgument>,
        arguments: Vec<Expression>,
        body: Option<Vec<BodyDeclaration>>,
    }
}

node! {
    /// A parenthesized non-primary expression, such as `(a + b)`.
    ParenthesizedExpression {
        prefix_operators: Vec<String>,
        postfix_operators: Vec<String>,
        qualifier: Option<String>,
        selectors: Vec<Expression>,
        expression: Expression,
    }
}

category! {
    Expression {
        Assignment,
        TernaryExpression,
        BinaryOperation,
        Cast,
        MethodReference,
        LambdaExpression,
        ArraySelector,
        Literal,
        This,
        MemberReference,
        ExplicitConstructorInvocation,
        SuperConstructorInvocation,
        MethodInvocation,
        SuperMethodInvocation,
        SuperMemberReference,
        ClassReference,
        VoidClassReference,
        ArrayCreator,
        ClassCreator,
        InnerClassCreator,
        ParenthesizedExpression,
    }
}

/// Mutable access to the attributes every primary expression carries.
pub struct PrimaryParts<'a> {
    pub prefix_operators: &'a mut Vec<String>,
    pub postfix_operators: &'a mut Vec<String>,
    pub qualifier: &'a mut Option<String>,
    pub selectors: &'a mut Vec<Expression>,
}

macro_rules! primary_parts {
    ($expr:ident, $($variant:ident),*) => {
        match $expr {
            $(
                Expression::$variant(n) => Some(PrimaryParts {
                    prefix_operators: &mut n.prefix_operators,
                    postfix_operators: &mut n.postfix_operators,
                    qualifier: &mut n.qualifier,
                    selectors: &mut n.selectors,
                }),
            )*
            _ => None,
        }
    };
}

impl Expression {
    /// Access the primary attributes, or `None` for non-primary expressions.
    pub fn primary_parts(&mut self) -> Option<PrimaryParts<'_>> {
        let expr = self;
        primary_parts!(
            expr,
            Literal,
            This,
            MemberReference,
            ExplicitConstructorInvocation,
            SuperConstructorInvocation,
            MethodInvocation,
            SuperMethodInvocation,
            SuperMemberReference,
            ClassReference,
            VoidClassReference,
            ArrayCreator,
            ClassCreator,
            InnerClassCreator,
            ParenthesizedExpression
        )
    }

    pub fn is_primary(&self) -> bool {
        self.kind().is_a(crate::schema::Category::Primary)
    }
}

/// Right-hand side of a binary operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Expression(Expression),
    Type(Type),
}

impl VisitNodes for Operand {
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
        match self {
            Operand::Expression(n) => n.visit_nodes(f),
            Operand::Type(n) => n.visit_nodes(f),
        }
    }
}

category! {
    LambdaParameter {
        FormalParameter,
        InferredFormalParameter,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LambdaBody {
    Expression(Expression),
    Block(Vec<Statement>),
}

impl VisitNodes for LambdaBody {
    fn visit_nodes<'a>(&'a self, f: &mut dyn FnMut(NodeRef<'a>)) {
        match self {
            LambdaBody::Expression(n) => n.visit_nodes(f),
            LambdaBody::Block(n) => n.visit_nodes(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(value: &str) -> Literal {
        Literal {
            prefix_operators: vec![],
            postfix_operators: vec![],
            qualifier: None,
            selectors: vec![],
            value: value.to_string(),
            position: None,
        }
    }

    #[test]
    fn test_equality_ignores_position() {
        let a = literal("1");
        let mut b = literal("1");
        b.position = Some(Position::new(3, 4));
        assert_eq!(a, b);
        assert_ne!(a, literal("2"));
    }

    #[test]
    fn test_cross_kind_is_unequal() {
        let lit: Expression = literal("x").into();
        let member: Expression = MemberReference {
            prefix_operators: vec![],
            postfix_operators: vec![],
            qualifier: None,
            selectors: vec![],
            member: "x".into(),
            position: None,
        }
        .into();
        assert_ne!(lit, member);
    }

    #[test]
    fn test_attribute_name_strips_raw_prefix() {
        assert_eq!(attribute_name("r#type"), "type");
        assert_eq!(attribute_name("name"), "name");
        assert_eq!(Cast::FIELDS, &["r#type", "expression"]);
    }

    #[test]
    fn test_primary_parts() {
        let mut e: Expression = literal("1").into();
        let parts = e.primary_parts().unwrap();
        parts.prefix_operators.push("-".into());
        match &e {
            Expression::Literal(l) => assert_eq!(l.prefix_operators, vec!["-".to_string()]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(e.is_primary());
    }

    #[test]
    fn test_add_dimensions() {
        let mut t: Type = BasicType { name: "int".into(), dimensions: 1, position: None }.into();
        t.add_dimensions(2);
        assert_eq!(t.dimensions(), 3);
        assert_eq!(t.name(), "int");
    }
}
