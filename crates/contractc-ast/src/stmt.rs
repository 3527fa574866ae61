//! Statement nodes.

use contractc_core::Span;

use crate::{Expr, Ident, RawNode, Type};

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'ast> {
    /// Expression statement (expr;)
    Expr(ExprStmt<'ast>),
    /// Variable declaration
    VarDecl(VarDeclStmt<'ast>),
    /// Return statement
    Return(ReturnStmt<'ast>),
    /// Throw statement
    Throw(ThrowStmt<'ast>),
    /// Break statement
    Break(BreakStmt),
    /// Continue statement
    Continue(ContinueStmt),
    /// Block statement
    Block(Block<'ast>),
    /// If statement
    If(&'ast IfStmt<'ast>),
    /// While loop
    While(&'ast WhileStmt<'ast>),
    /// Try/catch/finally
    Try(&'ast TryStmt<'ast>),
    /// Any statement kind without a dedicated variant
    Other(RawNode<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::Return(s) => s.span,
            Self::Throw(s) => s.span,
            Self::Break(s) => s.span,
            Self::Continue(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::Try(s) => s.span,
            Self::Other(s) => s.span,
        }
    }

    /// Stable node kind name.
    pub fn kind_name(&self) -> &'ast str {
        match self {
            Self::Expr(_) => "ExpressionStatement",
            Self::VarDecl(_) => "VariableStatement",
            Self::Return(_) => "ReturnStatement",
            Self::Throw(_) => "ThrowStatement",
            Self::Break(_) => "BreakStatement",
            Self::Continue(_) => "ContinueStatement",
            Self::Block(_) => "Block",
            Self::If(_) => "IfStatement",
            Self::While(_) => "WhileStatement",
            Self::Try(_) => "TryStatement",
            Self::Other(raw) => raw.kind,
        }
    }
}

/// An expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: Expr<'ast>,
    pub span: Span,
}

/// A local variable declaration (`let`/`const` inside a function).
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt<'ast> {
    pub name: Ident<'ast>,
    pub ty: Type<'ast>,
    pub init: Option<&'ast Expr<'ast>>,
    /// Declared with `const`.
    pub is_const: bool,
    pub span: Span,
}

/// A return statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// A throw statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt<'ast> {
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// A break statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakStmt {
    pub span: Span,
}

/// A continue statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinueStmt {
    pub span: Span,
}

/// A block of statements.
///
/// The span covers both braces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// An if statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_branch: &'ast Stmt<'ast>,
    pub else_branch: Option<&'ast Stmt<'ast>>,
    pub span: Span,
}

/// A while loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// A try statement with at least one of catch or finally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TryStmt<'ast> {
    pub body: Block<'ast>,
    pub catch: Option<CatchClause<'ast>>,
    pub finally: Option<Block<'ast>>,
    pub span: Span,
}

/// A catch clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchClause<'ast> {
    /// The bound exception variable, if any.
    pub param: Option<Ident<'ast>>,
    pub body: Block<'ast>,
    pub span: Span,
}
