//! Static node schema: node kinds, abstract categories and attribute lists.
//!
//! Each concrete node kind names its ancestors (abstract categories or, in a
//! few cases, another concrete kind) and its own attributes. The complete
//! attribute list of a kind is the concatenation, in declaration order, of
//! every ancestor's list followed by its own, without duplicates. The lists
//! are flattened once per process and cached.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract node categories. No node is *only* a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Documented,
    Declaration,
    TypeDeclaration,
    Member,
    Type,
    Statement,
    Expression,
    Primary,
    Invocation,
    Creator,
}

/// A parent in the schema: either a category or a concrete kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ancestor {
    Category(Category),
    Kind(NodeKind),
}

impl From<Category> for Ancestor {
    fn from(category: Category) -> Self {
        Ancestor::Category(category)
    }
}

impl From<NodeKind> for Ancestor {
    fn from(kind: NodeKind) -> Self {
        Ancestor::Kind(kind)
    }
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Documented,
        Category::Declaration,
        Category::TypeDeclaration,
        Category::Member,
        Category::Type,
        Category::Statement,
        Category::Expression,
        Category::Primary,
        Category::Invocation,
        Category::Creator,
    ];

    pub fn ancestors(self) -> Vec<Ancestor> {
        use Category::*;
        match self {
            TypeDeclaration => vec![Declaration.into(), Documented.into()],
            Member => vec![Documented.into()],
            Primary => vec![Expression.into()],
            Invocation | Creator => vec![Primary.into()],
            Documented | Declaration | Type | Statement | Expression => vec![],
        }
    }

    pub fn own_attributes(self) -> &'static [&'static str] {
        use Category::*;
        match self {
            Documented => &["documentation"],
            Declaration => &["modifiers", "annotations"],
            TypeDeclaration => &["name", "body"],
            Member | Expression => &[],
            Type => &["name", "dimensions"],
            Statement => &["label"],
            Primary => &["prefix_operators", "postfix_operators", "qualifier", "selectors"],
            Invocation => &["type_arguments", "arguments"],
            Creator => &["type"],
        }
    }

    /// The flattened attribute list.
    pub fn attributes(self) -> Vec<&'static str> {
        flatten(&self.ancestors(), self.own_attributes())
    }

    /// Whether `self` is `other` or inherits from it.
    pub fn is_a(self, other: Category) -> bool {
        self == other || self.ancestors().into_iter().any(|a| a.is_a(other))
    }
}

impl Ancestor {
    fn attributes(self) -> Vec<&'static str> {
        match self {
            Ancestor::Category(c) => c.attributes(),
            Ancestor::Kind(k) => k.attributes().to_vec(),
        }
    }

    fn is_a(self, category: Category) -> bool {
        match self {
            Ancestor::Category(c) => c.is_a(category),
            Ancestor::Kind(k) => k.is_a(category),
        }
    }
}

fn flatten(ancestors: &[Ancestor], own: &[&'static str]) -> Vec<&'static str> {
    let mut attributes: Vec<&'static str> = Vec::new();
    let inherited = ancestors.iter().flat_map(|a| a.attributes());
    for name in inherited.chain(own.iter().copied()) {
        if !attributes.contains(&name) {
            attributes.push(name);
        }
    }
    attributes
}

macro_rules! node_kinds {
    ( $( $name:ident : [ $( $ancestor:expr ),* ] [ $( $attr:literal ),* ] ; )* ) => {
        /// Concrete node kinds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum NodeKind {
            $( $name, )*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[ $( NodeKind::$name, )* ];

            pub fn name(self) -> &'static str {
                match self {
                    $( NodeKind::$name => stringify!($name), )*
                }
            }

            pub fn ancestors(self) -> Vec<Ancestor> {
                #[allow(unused_imports)]
                use Category::*;
                match self {
                    $( NodeKind::$name => vec![ $( Ancestor::from($ancestor) ),* ], )*
                }
            }

            pub fn own_attributes(self) -> &'static [&'static str] {
                match self {
                    $( NodeKind::$name => &[ $( $attr ),* ], )*
                }
            }
        }
    };
}

const VARIABLE_DECLARATION: NodeKind = NodeKind::VariableDeclaration;
const FIELD_DECLARATION: NodeKind = NodeKind::FieldDeclaration;

node_kinds! {
    CompilationUnit: [] ["package", "imports", "types"];
    Import: [] ["path", "static", "wildcard"];
    PackageDeclaration: [Declaration, Documented] ["name"];

    ClassDeclaration: [TypeDeclaration] ["type_parameters", "extends", "implements"];
    EnumDeclaration: [TypeDeclaration] ["implements"];
    InterfaceDeclaration: [TypeDeclaration] ["type_parameters", "extends"];
    AnnotationDeclaration: [TypeDeclaration] [];

    BasicType: [Type] [];
    ReferenceType: [Type] ["arguments", "sub_type"];
    TypeArgument: [] ["type", "pattern_type"];
    TypeParameter: [] ["name", "extends"];

    Annotation: [] ["name", "element"];
    ElementValuePair: [] ["name", "value"];
    ElementArrayValue: [] ["values"];

    MethodDeclaration: [Member, Declaration]
        ["type_parameters", "return_type", "name", "parameters", "throws", "body"];
    FieldDeclaration: [Member, Declaration] ["type", "declarators"];
    ConstructorDeclaration: [Declaration, Documented]
        ["type_parameters", "name", "parameters", "throws", "body"];
    ConstantDeclaration: [FIELD_DECLARATION] [];
    InitializerBlock: [] ["static", "body"];
    ArrayInitializer: [] ["initializers"];
    VariableDeclaration: [Declaration] ["type", "declarators"];
    LocalVariableDeclaration: [VARIABLE_DECLARATION] [];
    VariableDeclarator: [] ["name", "dimensions", "initializer"];
    FormalParameter: [Declaration] ["type", "name", "varargs"];
    InferredFormalParameter: [] ["name"];

    EnumBody: [] ["constants", "declarations"];
    EnumConstantDeclaration: [Declaration, Documented] ["name", "arguments", "body"];
    AnnotationMethod: [Declaration] ["name", "return_type", "dimensions", "default"];

    IfStatement: [Statement] ["condition", "then_statement", "else_statement"];
    WhileStatement: [Statement] ["condition", "body"];
    DoStatement: [Statement] ["condition", "body"];
    ForStatement: [Statement] ["control", "body"];
    AssertStatement: [Statement] ["condition", "value"];
    BreakStatement: [Statement] ["goto"];
    ContinueStatement: [Statement] ["goto"];
    ReturnStatement: [Statement] ["expression"];
    SynchronizedStatement: [Statement] ["lock", "block"];
    ThrowStatement: [Statement] ["expression"];
    TryStatement: [Statement] ["resources", "block", "catches", "finally_block"];
    SwitchStatement: [Statement] ["expression", "cases"];
    BlockStatement: [Statement] ["statements"];
    StatementExpression: [Statement] ["expression"];
    EmptyStatement: [Statement] [];
    TryResource: [Declaration] ["type", "name", "value"];
    CatchClause: [Statement] ["parameter", "block"];
    CatchClauseParameter: [Declaration] ["types", "name"];
    SwitchStatementCase: [] ["case", "default", "statements"];
    ForControl: [] ["init", "condition", "update"];
    EnhancedForControl: [] ["var", "iterable"];

    Assignment: [Expression] ["expressionl", "value", "type"];
    TernaryExpression: [Expression] ["condition", "if_true", "if_false"];
    BinaryOperation: [Expression] ["operator", "operandl", "operandr"];
    Cast: [Expression] ["type", "expression"];
    MethodReference: [Expression] ["expression", "method", "type_arguments"];
    LambdaExpression: [Expression] ["parameters", "body"];
    ArraySelector: [Expression] ["index"];
    Literal: [Primary] ["value"];
    This: [Primary] [];
    MemberReference: [Primary] ["member"];
    ExplicitConstructorInvocation: [Invocation] [];
    SuperConstructorInvocation: [Invocation] [];
    MethodInvocation: [Invocation] ["member"];
    SuperMethodInvocation: [Invocation] ["member"];
    SuperMemberReference: [Primary] ["member"];
    ClassReference: [Primary] ["type"];
    VoidClassReference: [Primary] [];
    ArrayCreator: [Creator] ["dimensions", "initializer"];
    ClassCreator: [Creator] ["constructor_type_arguments", "arguments", "body"];
    InnerClassCreator: [Creator] ["constructor_type_arguments", "arguments", "body"];
    ParenthesizedExpression: [Primary] ["expression"];
}

lazy_static! {
    static ref ATTRIBUTES: FxHashMap<NodeKind, Vec<&'static str>> = {
        let mut map = FxHashMap::default();
        for &kind in NodeKind::ALL {
            map.insert(kind, flatten_kind(kind));
        }
        map
    };
}

/// Flatten without consulting the cache, so concrete ancestors can be
/// resolved while the cache is being built.
fn flatten_kind(kind: NodeKind) -> Vec<&'static str> {
    let mut attributes: Vec<&'static str> = Vec::new();
    for ancestor in kind.ancestors() {
        let inherited = match ancestor {
            Ancestor::Category(c) => c.attributes(),
            Ancestor::Kind(k) => flatten_kind(k),
        };
        for name in inherited {
            if !attributes.contains(&name) {
                attributes.push(name);
            }
        }
    }
    for &name in kind.own_attributes() {
        if !attributes.contains(&name) {
            attributes.push(name);
        }
    }
    attributes
}

impl NodeKind {
    /// The complete, ordered attribute list of this kind.
    pub fn attributes(self) -> &'static [&'static str] {
        ATTRIBUTES.get(&self).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether this kind inherits from `category`.
    pub fn is_a(self, category: Category) -> bool {
        self.ancestors().into_iter().any(|a| a.is_a(category))
    }

    /// Whether this kind is `other` or inherits from it.
    pub fn is_kind_of(self, other: NodeKind) -> bool {
        self == other
            || self.ancestors().into_iter().any(|a| match a {
                Ancestor::Kind(k) => k.is_kind_of(other),
                Ancestor::Category(_) => false,
            })
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_declaration_attributes() {
        assert_eq!(
            NodeKind::ClassDeclaration.attributes(),
            &[
                "modifiers",
                "annotations",
                "documentation",
                "name",
                "body",
                "type_parameters",
                "extends",
                "implements"
            ]
        );
    }

    #[test]
    fn test_method_declaration_attributes() {
        assert_eq!(
            NodeKind::MethodDeclaration.attributes(),
            &[
                "documentation",
                "modifiers",
                "annotations",
                "type_parameters",
                "return_type",
                "name",
                "parameters",
                "throws",
                "body"
            ]
        );
    }

    #[test]
    fn test_concrete_ancestor() {
        assert_eq!(NodeKind::ConstantDeclaration.attributes(), NodeKind::FieldDeclaration.attributes());
        assert!(NodeKind::LocalVariableDeclaration.is_kind_of(NodeKind::VariableDeclaration));
        assert!(NodeKind::LocalVariableDeclaration.is_a(Category::Declaration));
    }

    #[test]
    fn test_invocation_inherits_primary() {
        assert_eq!(
            NodeKind::MethodInvocation.attributes(),
            &[
                "prefix_operators",
                "postfix_operators",
                "qualifier",
                "selectors",
                "type_arguments",
                "arguments",
                "member"
            ]
        );
        assert!(NodeKind::MethodInvocation.is_a(Category::Expression));
        assert!(NodeKind::MethodInvocation.is_a(Category::Primary));
        assert!(!NodeKind::BinaryOperation.is_a(Category::Primary));
    }

    #[test]
    fn test_category_attributes() {
        assert_eq!(Category::Creator.attributes(), vec![
            "prefix_operators",
            "postfix_operators",
            "qualifier",
            "selectors",
            "type"
        ]);
        assert!(Category::Creator.is_a(Category::Expression));
        assert!(!Category::Type.is_a(Category::Expression));
    }

    #[test]
    fn test_attributes_are_cached() {
        let a = NodeKind::IfStatement.attributes();
        let b = NodeKind::IfStatement.attributes();
        assert!(std::ptr::eq(a, b));
    }
}
