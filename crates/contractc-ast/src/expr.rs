//! Expression nodes.
//!
//! Every expression carries its checked [`Type`]; nodes the front end knows
//! about but this AST does not model arrive as [`Expr::Other`] with their
//! kind name preserved for diagnostics.

use contractc_core::Span;
use num_bigint::BigInt;

use crate::{BinaryOp, Ident, RawNode, Type, UnaryOp};

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Identifier reference
    Ident(IdentExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Assignment (plain or compound)
    Assign(&'ast AssignExpr<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
    /// Property access (`object.member`)
    Member(&'ast MemberExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
    /// Any node kind without a dedicated variant
    Other(RawNode<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Call(e) => e.span,
            Self::Member(e) => e.span,
            Self::Paren(e) => e.span,
            Self::Other(e) => e.span,
        }
    }

    /// The checked type of this expression.
    pub fn ty(&self) -> Type<'ast> {
        match self {
            Self::Literal(e) => e.ty,
            Self::Ident(e) => e.ty,
            Self::Binary(e) => e.ty,
            Self::Unary(e) => e.ty,
            Self::Assign(e) => e.target.ty(),
            Self::Call(e) => e.ty,
            Self::Member(e) => e.ty,
            Self::Paren(e) => e.expr.ty(),
            Self::Other(_) => Type::Any,
        }
    }

    /// Stable node kind name.
    pub fn kind_name(&self) -> &'ast str {
        match self {
            Self::Literal(e) => match e.kind {
                LiteralKind::Int(_) => "NumericLiteral",
                LiteralKind::Bool(true) => "TrueKeyword",
                LiteralKind::Bool(false) => "FalseKeyword",
                LiteralKind::String(_) => "StringLiteral",
                LiteralKind::Bytes(_) => "ByteStringLiteral",
                LiteralKind::Null => "NullKeyword",
            },
            Self::Ident(_) => "Identifier",
            Self::Binary(_) => "BinaryExpression",
            Self::Unary(_) => "PrefixUnaryExpression",
            Self::Assign(_) => "AssignmentExpression",
            Self::Call(_) => "CallExpression",
            Self::Member(_) => "PropertyAccessExpression",
            Self::Paren(_) => "ParenthesizedExpression",
            Self::Other(raw) => raw.kind,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr<'ast> {
        let mut expr = self;
        while let Expr::Paren(paren) = expr {
            expr = paren.expr;
        }
        expr
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Checked type
    pub ty: Type<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer literal (number or bigint)
    Int(BigInt),
    /// Boolean literal
    Bool(bool),
    /// String literal
    String(&'ast str),
    /// Raw byte-string literal
    Bytes(&'ast [u8]),
    /// Null literal
    Null,
}

/// An identifier expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    pub ident: Ident<'ast>,
    pub ty: Type<'ast>,
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: &'ast Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: &'ast Expr<'ast>,
    /// Result type
    pub ty: Type<'ast>,
    /// Source location
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub ty: Type<'ast>,
    pub span: Span,
}

/// An assignment expression.
///
/// `op` is `Some` for compound assignments (`+=`, `-=`, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    /// Left-hand side (target)
    pub target: &'ast Expr<'ast>,
    /// Compound operator, if any
    pub op: Option<BinaryOp>,
    /// Right-hand side (value)
    pub value: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A function call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// The function being called
    pub callee: &'ast Expr<'ast>,
    /// Arguments in source order
    pub args: &'ast [Expr<'ast>],
    /// Return type of the call
    pub ty: Type<'ast>,
    /// Source location
    pub span: Span,
}

/// Property access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub member: Ident<'ast>,
    pub ty: Type<'ast>,
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}
