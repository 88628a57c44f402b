//! Generic tree traversal and filtering.
//!
//! [`NodeRef`] borrows any concrete node. [`Walk`] yields `(path, node)`
//! pairs depth-first, where `path` lists the ancestors from the root down to
//! the node's parent. Lists and optional slots are looked through.

use crate::node::*;
use crate::schema::{Category, NodeKind};
use jast_core::Position;

macro_rules! node_refs {
    ( $( $name:ident ),* $(,)? ) => {
        /// A borrowed concrete node of any kind.
        ///
        /// Equality is structural: refs of different kinds are never equal.
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum NodeRef<'a> {
            $( $name(&'a $name), )*
        }

        impl<'a> NodeRef<'a> {
            pub fn kind(self) -> NodeKind {
                match self {
                    $( NodeRef::$name(_) => NodeKind::$name, )*
                }
            }

            pub fn position(self) -> Option<Position> {
                match self {
                    $( NodeRef::$name(n) => n.position, )*
                }
            }

            /// Call `f` for each child node, in attribute order.
            pub fn for_each_child(self, f: &mut dyn FnMut(NodeRef<'a>)) {
                match self {
                    $( NodeRef::$name(n) => n.visit_children(f), )*
                }
            }
        }

        impl NodeKind {
            /// Field identifiers of the struct for this kind.
            pub fn fields(self) -> &'static [&'static str] {
                match self {
                    $( NodeKind::$name => <$name as AstNode>::FIELDS, )*
                }
            }
        }
    };
}

node_refs! {
    CompilationUnit,
    Import,
    PackageDeclaration,
    ClassDeclaration,
    EnumDeclaration,
    InterfaceDeclaration,
    AnnotationDeclaration,
    BasicType,
    ReferenceType,
    TypeArgument,
    TypeParameter,
    Annotation,
    ElementValuePair,
    ElementArrayValue,
    MethodDeclaration,
    FieldDeclaration,
    ConstructorDeclaration,
    ConstantDeclaration,
    InitializerBlock,
    ArrayInitializer,
    VariableDeclaration,
    LocalVariableDeclaration,
    VariableDeclarator,
    FormalParameter,
    InferredFormalParameter,
    EnumBody,
    EnumConstantDeclaration,
    AnnotationMethod,
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
    TryResource,
    CatchClause,
    CatchClauseParameter,
    SwitchStatementCase,
    ForControl,
    EnhancedForControl,
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

/// Ancestors of a node, root first.
pub type Path<'a> = Vec<NodeRef<'a>>;

/// What a filter matches.
#[derive(Debug, Clone, Copy)]
pub enum Pattern<'p> {
    /// Nodes of this concrete kind or a kind derived from it.
    Kind(NodeKind),
    /// Nodes in this abstract category.
    Category(Category),
    /// Nodes structurally equal to this one.
    Equals(NodeRef<'p>),
}

impl<'p> Pattern<'p> {
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        match *self {
            Pattern::Kind(kind) => node.kind().is_kind_of(kind),
            Pattern::Category(category) => node.kind().is_a(category),
            Pattern::Equals(other) => node == other,
        }
    }
}

impl<'a> NodeRef<'a> {
    /// Direct children in attribute order.
    pub fn children(self) -> Vec<NodeRef<'a>> {
        let mut children = Vec::new();
        self.for_each_child(&mut |child| children.push(child));
        children
    }

    /// Depth-first, pre-order traversal starting at (and including) `self`.
    pub fn walk(self) -> Walk<'a> {
        Walk {
            stack: vec![(Vec::new(), self)],
        }
    }

    /// Walk, keeping only nodes that match `pattern`.
    pub fn filter<'p>(self, pattern: Pattern<'p>) -> impl Iterator<Item = (Path<'a>, NodeRef<'a>)> + 'p
    where
        'a: 'p,
    {
        self.walk().filter(move |(_, node)| pattern.matches(*node))
    }

    /// Walk, keeping only nodes of concrete type `T`.
    pub fn filter_type<T: AstNode + 'a>(self) -> impl Iterator<Item = (Path<'a>, &'a T)> {
        self.walk().filter_map(|(path, node)| T::cast(node).map(|n| (path, n)))
    }

    pub fn is_a(self, category: Category) -> bool {
        self.kind().is_a(category)
    }

    /// Borrow the concrete node if it is a `T`.
    pub fn downcast<T: AstNode>(self) -> Option<&'a T> {
        T::cast(self)
    }
}

/// Iterator returned by [`NodeRef::walk`].
pub struct Walk<'a> {
    stack: Vec<(Path<'a>, NodeRef<'a>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (Path<'a>, NodeRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        let children = node.children();
        if !children.is_empty() {
            let mut child_path = path.clone();
            child_path.push(node);
            for child in children.into_iter().rev() {
                self.stack.push((child_path.clone(), child));
            }
        }
        Some((path, node))
    }
}

/// Tree operations available on every concrete node.
pub trait Walkable: AstNode {
    fn walk(&self) -> Walk<'_> {
        self.as_node_ref().walk()
    }

    fn filter<'a, 'p>(&'a self, pattern: Pattern<'p>) -> Box<dyn Iterator<Item = (Path<'a>, NodeRef<'a>)> + 'p>
    where
        'a: 'p,
    {
        Box::new(self.as_node_ref().filter(pattern))
    }

    fn filter_type<'a, T: AstNode + 'a>(&'a self) -> Box<dyn Iterator<Item = (Path<'a>, &'a T)> + 'a> {
        Box::new(self.as_node_ref().filter_type::<T>())
    }
}

impl<N: AstNode> Walkable for N {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Modifiers;

    fn member(name: &str) -> Expression {
        MemberReference {
            prefix_operators: vec![],
            postfix_operators: vec![],
            qualifier: None,
            selectors: vec![],
            member: name.to_string(),
            position: None,
        }
        .into()
    }

    fn binary(op: &str, l: Expression, r: Expression) -> Expression {
        BinaryOperation {
            operator: op.to_string(),
            operandl: l,
            operandr: Operand::Expression(r),
            position: None,
        }
        .into()
    }

    fn statement(expression: Expression) -> Statement {
        StatementExpression { label: None, expression, position: None }.into()
    }

    #[test]
    fn test_walk_preorder_with_paths() {
        let root = BlockStatement {
            label: None,
            statements: vec![statement(binary("+", member("a"), member("b")))],
            position: None,
        };
        let visited: Vec<(usize, NodeKind)> = root.walk().map(|(path, node)| (path.len(), node.kind())).collect();
        assert_eq!(
            visited,
            vec![
                (0, NodeKind::BlockStatement),
                (1, NodeKind::StatementExpression),
                (2, NodeKind::BinaryOperation),
                (3, NodeKind::MemberReference),
                (3, NodeKind::MemberReference),
            ]
        );
    }

    #[test]
    fn test_path_is_root_to_parent() {
        let root = BlockStatement {
            label: None,
            statements: vec![statement(member("x"))],
            position: None,
        };
        let (path, node) = root.filter_type::<MemberReference>().next().unwrap();
        assert_eq!(node.member, "x");
        let kinds: Vec<NodeKind> = path.iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::BlockStatement, NodeKind::StatementExpression]);
    }

    #[test]
    fn test_filter_by_equality() {
        let root = BlockStatement {
            label: None,
            statements: vec![
                statement(binary("*", member("a"), member("b"))),
                statement(member("a")),
            ],
            position: None,
        };
        let needle = member("a");
        let hits = root.filter(Pattern::Equals(needle.as_node_ref())).count();
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_filter_by_category() {
        let root = BlockStatement {
            label: None,
            statements: vec![statement(binary("-", member("a"), member("b")))],
            position: None,
        };
        assert_eq!(root.filter(Pattern::Category(Category::Expression)).count(), 3);
        assert_eq!(root.filter(Pattern::Category(Category::Primary)).count(), 2);
        assert_eq!(root.filter(Pattern::Category(Category::Statement)).count(), 2);
    }

    #[test]
    fn test_filter_by_kind_includes_derived() {
        let var = VariableDeclaration {
            modifiers: Modifiers::FINAL,
            annotations: vec![],
            r#type: BasicType { name: "int".into(), dimensions: 0, position: None }.into(),
            declarators: vec![],
            position: None,
        };
        let local = LocalVariableDeclaration {
            modifiers: var.modifiers,
            annotations: vec![],
            r#type: var.r#type.clone(),
            declarators: vec![],
            position: None,
        };
        assert!(Pattern::Kind(NodeKind::VariableDeclaration).matches(local.as_node_ref()));
        assert!(!Pattern::Kind(NodeKind::LocalVariableDeclaration).matches(var.as_node_ref()));
    }

    #[test]
    fn test_fields_match_schema() {
        for &kind in NodeKind::ALL {
            let fields: Vec<&str> = kind.fields().iter().map(|&f| attribute_name(f)).collect();
            assert_eq!(fields, kind.attributes(), "{kind}");
        }
    }

    #[test]
    fn test_noderefs_of_different_kind_are_unequal() {
        let a = member("a");
        let t: Type = BasicType { name: "a".into(), dimensions: 0, position: None }.into();
        assert_ne!(a.as_node_ref(), t.as_node_ref());
    }
}
