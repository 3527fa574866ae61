//! Top-level declarations.

use contractc_core::Span;

use crate::{Block, Expr, Ident, RawNode, Type};

/// A top-level item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    /// Function, with or without a body
    Function(&'ast FunctionDecl<'ast>),
    /// `const NAME = literal;`
    Const(&'ast ConstDecl<'ast>),
    /// `let name = expr;` at file level
    Static(&'ast StaticDecl<'ast>),
    /// Interface (possibly carrying builtin markers)
    Interface(&'ast InterfaceDecl<'ast>),
    /// `declare const Name: Interface;`
    Declare(&'ast DeclareDecl<'ast>),
    /// Any item kind without a dedicated variant
    Other(RawNode<'ast>),
}

impl<'ast> Item<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Function(d) => d.span,
            Self::Const(d) => d.span,
            Self::Static(d) => d.span,
            Self::Interface(d) => d.span,
            Self::Declare(d) => d.span,
            Self::Other(d) => d.span,
        }
    }

    pub fn kind_name(&self) -> &'ast str {
        match self {
            Self::Function(_) => "FunctionDeclaration",
            Self::Const(_) | Self::Static(_) | Self::Declare(_) => "VariableStatement",
            Self::Interface(_) => "InterfaceDeclaration",
            Self::Other(raw) => raw.kind,
        }
    }
}

/// A function declaration.
///
/// Functions without a body are declarations of host-provided builtins and
/// must carry a marker annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    pub return_type: Type<'ast>,
    pub body: Option<Block<'ast>>,
    /// Listed in the contract ABI.
    pub is_export: bool,
    /// Declared as not modifying state.
    pub is_safe: bool,
    pub annotations: &'ast [Annotation<'ast>],
    pub span: Span,
}

/// A function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub name: Ident<'ast>,
    pub ty: Type<'ast>,
    pub span: Span,
}

/// A top-level constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstDecl<'ast> {
    pub name: Ident<'ast>,
    pub ty: Type<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// A top-level mutable variable, stored in a static slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticDecl<'ast> {
    pub name: Ident<'ast>,
    pub ty: Type<'ast>,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// An interface declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfaceDecl<'ast> {
    pub name: Ident<'ast>,
    pub members: &'ast [InterfaceMember<'ast>],
    pub annotations: &'ast [Annotation<'ast>],
    pub span: Span,
}

/// A method or property signature inside an interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfaceMember<'ast> {
    pub name: Ident<'ast>,
    pub kind: MemberKind,
    pub params: &'ast [Param<'ast>],
    /// Return type for methods, property type for properties.
    pub ty: Type<'ast>,
    pub annotations: &'ast [Annotation<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Property,
}

/// `declare const Name: Interface;` binding a global object to an interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclareDecl<'ast> {
    pub name: Ident<'ast>,
    pub interface: Ident<'ast>,
    pub span: Span,
}

/// A doc-comment tag (`@tag payload`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation<'ast> {
    /// Tag name without the leading `@`.
    pub tag: &'ast str,
    /// Remaining text after the tag, trimmed.
    pub payload: &'ast str,
    pub span: Span,
}
