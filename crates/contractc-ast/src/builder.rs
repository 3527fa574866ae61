//! Convenience constructors for building programs by hand.
//!
//! Each node gets a fresh one-line span in the builder's file so sequence
//! points in the generated code stay distinguishable.

use std::cell::Cell;

use bumpalo::Bump;
use contractc_core::{FileId, Span};
use num_bigint::BigInt;

use crate::*;

/// Builds arena-allocated AST nodes.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    file: FileId,
    path: &'ast str,
    line: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self::with_file(arena, FileId(0), "contract.ts")
    }

    pub fn with_file(arena: &'ast Bump, file: FileId, path: &str) -> Self {
        Self {
            arena,
            file,
            path: arena.alloc_str(path),
            line: Cell::new(0),
        }
    }

    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Allocate the next single-line span.
    pub fn next_span(&self) -> Span {
        let line = self.line.get() + 1;
        self.line.set(line);
        Span::new(self.file, line, 1, line, 10)
    }

    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.next_span())
    }

    fn alloc_exprs(&self, exprs: Vec<Expr<'ast>>) -> &'ast [Expr<'ast>] {
        self.arena.alloc_slice_fill_iter(exprs)
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn array_of(&self, elem: Type<'ast>) -> Type<'ast> {
        Type::Array(self.arena.alloc(elem))
    }

    pub fn map_of(&self, key: Type<'ast>, value: Type<'ast>) -> Type<'ast> {
        Type::Map(self.arena.alloc(key), self.arena.alloc(value))
    }

    pub fn interop(&self, name: &str) -> Type<'ast> {
        Type::Interop(self.arena.alloc_str(name))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn literal(&self, kind: LiteralKind<'ast>, ty: Type<'ast>) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind,
            ty,
            span: self.next_span(),
        })
    }

    pub fn int(&self, value: i64) -> Expr<'ast> {
        self.big(BigInt::from(value))
    }

    pub fn big(&self, value: BigInt) -> Expr<'ast> {
        self.literal(LiteralKind::Int(value), Type::Integer)
    }

    pub fn boolean(&self, value: bool) -> Expr<'ast> {
        self.literal(LiteralKind::Bool(value), Type::Boolean)
    }

    pub fn string(&self, value: &str) -> Expr<'ast> {
        self.literal(LiteralKind::String(self.arena.alloc_str(value)), Type::String)
    }

    pub fn bytes(&self, value: &[u8]) -> Expr<'ast> {
        self.literal(
            LiteralKind::Bytes(self.arena.alloc_slice_copy(value)),
            Type::ByteString,
        )
    }

    pub fn null(&self) -> Expr<'ast> {
        self.literal(LiteralKind::Null, Type::Null)
    }

    pub fn var(&self, name: &str, ty: Type<'ast>) -> Expr<'ast> {
        let ident = self.ident(name);
        Expr::Ident(IdentExpr {
            ident,
            ty,
            span: ident.span,
        })
    }

    pub fn binary(
        &self,
        left: Expr<'ast>,
        op: BinaryOp,
        right: Expr<'ast>,
        ty: Type<'ast>,
    ) -> Expr<'ast> {
        let span = left.span().merge(right.span());
        Expr::Binary(self.arena.alloc(BinaryExpr {
            left: self.arena.alloc(left),
            op,
            right: self.arena.alloc(right),
            ty,
            span,
        }))
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr<'ast>, ty: Type<'ast>) -> Expr<'ast> {
        let span = operand.span();
        Expr::Unary(self.arena.alloc(UnaryExpr {
            op,
            operand: self.arena.alloc(operand),
            ty,
            span,
        }))
    }

    pub fn assign(&self, target: Expr<'ast>, value: Expr<'ast>) -> Expr<'ast> {
        self.assign_op(target, None, value)
    }

    pub fn assign_op(
        &self,
        target: Expr<'ast>,
        op: Option<BinaryOp>,
        value: Expr<'ast>,
    ) -> Expr<'ast> {
        let span = target.span().merge(value.span());
        Expr::Assign(self.arena.alloc(AssignExpr {
            target: self.arena.alloc(target),
            op,
            value: self.arena.alloc(value),
            span,
        }))
    }

    pub fn call(&self, callee: Expr<'ast>, args: Vec<Expr<'ast>>, ty: Type<'ast>) -> Expr<'ast> {
        let span = callee.span();
        Expr::Call(self.arena.alloc(CallExpr {
            callee: self.arena.alloc(callee),
            args: self.alloc_exprs(args),
            ty,
            span,
        }))
    }

    /// Call a function by name.
    pub fn call_fn(&self, name: &str, args: Vec<Expr<'ast>>, ty: Type<'ast>) -> Expr<'ast> {
        let callee = self.var(name, Type::Any);
        self.call(callee, args, ty)
    }

    pub fn member(&self, object: Expr<'ast>, member: &str, ty: Type<'ast>) -> Expr<'ast> {
        let member = self.ident(member);
        let span = object.span().merge(member.span);
        Expr::Member(self.arena.alloc(MemberExpr {
            object: self.arena.alloc(object),
            member,
            ty,
            span,
        }))
    }

    pub fn paren(&self, expr: Expr<'ast>) -> Expr<'ast> {
        let span = expr.span();
        Expr::Paren(self.arena.alloc(ParenExpr {
            expr: self.arena.alloc(expr),
            span,
        }))
    }

    /// An expression kind the AST does not model.
    pub fn raw_expr(&self, kind: &str) -> Expr<'ast> {
        Expr::Other(RawNode {
            kind: self.arena.alloc_str(kind),
            span: self.next_span(),
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn expr_stmt(&self, expr: Expr<'ast>) -> Stmt<'ast> {
        let span = expr.span();
        Stmt::Expr(ExprStmt { expr, span })
    }

    pub fn let_stmt(&self, name: &str, ty: Type<'ast>, init: Option<Expr<'ast>>) -> Stmt<'ast> {
        self.var_decl(name, ty, init, false)
    }

    pub fn const_stmt(&self, name: &str, ty: Type<'ast>, init: Expr<'ast>) -> Stmt<'ast> {
        self.var_decl(name, ty, Some(init), true)
    }

    fn var_decl(
        &self,
        name: &str,
        ty: Type<'ast>,
        init: Option<Expr<'ast>>,
        is_const: bool,
    ) -> Stmt<'ast> {
        let name = self.ident(name);
        let init = init.map(|e| &*self.arena.alloc(e));
        Stmt::VarDecl(VarDeclStmt {
            name,
            ty,
            init,
            is_const,
            span: name.span,
        })
    }

    pub fn return_stmt(&self, value: Option<Expr<'ast>>) -> Stmt<'ast> {
        let span = self.next_span();
        Stmt::Return(ReturnStmt {
            value: value.map(|e| &*self.arena.alloc(e)),
            span,
        })
    }

    pub fn throw_stmt(&self, value: Expr<'ast>) -> Stmt<'ast> {
        let span = self.next_span();
        Stmt::Throw(ThrowStmt {
            value: self.arena.alloc(value),
            span,
        })
    }

    pub fn break_stmt(&self) -> Stmt<'ast> {
        Stmt::Break(BreakStmt {
            span: self.next_span(),
        })
    }

    pub fn continue_stmt(&self) -> Stmt<'ast> {
        Stmt::Continue(ContinueStmt {
            span: self.next_span(),
        })
    }

    pub fn block_node(&self, stmts: Vec<Stmt<'ast>>) -> Block<'ast> {
        let open = self.next_span();
        let stmts = self.arena.alloc_slice_fill_iter(stmts);
        let close = self.next_span();
        Block {
            stmts,
            span: Span::new(self.file, open.line, 1, close.line, 2),
        }
    }

    pub fn block(&self, stmts: Vec<Stmt<'ast>>) -> Stmt<'ast> {
        Stmt::Block(self.block_node(stmts))
    }

    pub fn if_stmt(
        &self,
        condition: Expr<'ast>,
        then_branch: Stmt<'ast>,
        else_branch: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        let span = condition.span();
        Stmt::If(self.arena.alloc(IfStmt {
            condition: self.arena.alloc(condition),
            then_branch: self.arena.alloc(then_branch),
            else_branch: else_branch.map(|s| &*self.arena.alloc(s)),
            span,
        }))
    }

    pub fn while_stmt(&self, condition: Expr<'ast>, body: Stmt<'ast>) -> Stmt<'ast> {
        let span = condition.span();
        Stmt::While(self.arena.alloc(WhileStmt {
            condition: self.arena.alloc(condition),
            body: self.arena.alloc(body),
            span,
        }))
    }

    /// Try statement; `catch` is the optional bound name and handler body.
    pub fn try_stmt(
        &self,
        body: Vec<Stmt<'ast>>,
        catch: Option<(Option<&str>, Vec<Stmt<'ast>>)>,
        finally: Option<Vec<Stmt<'ast>>>,
    ) -> Stmt<'ast> {
        let span = self.next_span();
        let body = self.block_node(body);
        let catch = catch.map(|(param, stmts)| {
            let param = param.map(|p| self.ident(p));
            let body = self.block_node(stmts);
            CatchClause {
                param,
                body,
                span: body.span,
            }
        });
        let finally = finally.map(|stmts| self.block_node(stmts));
        Stmt::Try(self.arena.alloc(TryStmt {
            body,
            catch,
            finally,
            span,
        }))
    }

    /// A statement kind the AST does not model.
    pub fn raw_stmt(&self, kind: &str) -> Stmt<'ast> {
        Stmt::Other(RawNode {
            kind: self.arena.alloc_str(kind),
            span: self.next_span(),
        })
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn param(&self, name: &str, ty: Type<'ast>) -> Param<'ast> {
        let name = self.ident(name);
        Param {
            name,
            ty,
            span: name.span,
        }
    }

    fn params(&self, params: &[(&str, Type<'ast>)]) -> &'ast [Param<'ast>] {
        self.arena
            .alloc_slice_fill_iter(params.iter().map(|(name, ty)| self.param(name, *ty)))
    }

    pub fn annotation(&self, tag: &str, payload: &str) -> Annotation<'ast> {
        Annotation {
            tag: self.arena.alloc_str(tag),
            payload: self.arena.alloc_str(payload),
            span: self.next_span(),
        }
    }

    fn annotations(&self, tags: &[(&str, &str)]) -> &'ast [Annotation<'ast>] {
        self.arena
            .alloc_slice_fill_iter(tags.iter().map(|(tag, payload)| self.annotation(tag, payload)))
    }

    /// An exported function with a body.
    pub fn function(
        &self,
        name: &str,
        params: &[(&str, Type<'ast>)],
        return_type: Type<'ast>,
        body: Vec<Stmt<'ast>>,
    ) -> FunctionDecl<'ast> {
        let name = self.ident(name);
        let params = self.params(params);
        let body = self.block_node(body);
        FunctionDecl {
            name,
            params,
            return_type,
            body: Some(body),
            is_export: true,
            is_safe: false,
            annotations: &[],
            span: name.span.merge(body.span),
        }
    }

    /// A body-less function declaration with marker annotations.
    pub fn declared_function(
        &self,
        name: &str,
        params: &[(&str, Type<'ast>)],
        return_type: Type<'ast>,
        annotations: &[(&str, &str)],
    ) -> FunctionDecl<'ast> {
        let annotations = self.annotations(annotations);
        let name = self.ident(name);
        FunctionDecl {
            name,
            params: self.params(params),
            return_type,
            body: None,
            is_export: false,
            is_safe: false,
            annotations,
            span: name.span,
        }
    }

    pub fn item(&self, decl: FunctionDecl<'ast>) -> Item<'ast> {
        Item::Function(self.arena.alloc(decl))
    }

    pub fn const_item(&self, name: &str, ty: Type<'ast>, value: Expr<'ast>) -> Item<'ast> {
        let name = self.ident(name);
        Item::Const(self.arena.alloc(ConstDecl {
            name,
            ty,
            value: self.arena.alloc(value),
            span: name.span,
        }))
    }

    pub fn static_item(&self, name: &str, ty: Type<'ast>, init: Option<Expr<'ast>>) -> Item<'ast> {
        let name = self.ident(name);
        Item::Static(self.arena.alloc(StaticDecl {
            name,
            ty,
            init: init.map(|e| &*self.arena.alloc(e)),
            span: name.span,
        }))
    }

    pub fn interface(
        &self,
        name: &str,
        annotations: &[(&str, &str)],
        members: Vec<InterfaceMember<'ast>>,
    ) -> Item<'ast> {
        let annotations = self.annotations(annotations);
        let name = self.ident(name);
        Item::Interface(self.arena.alloc(InterfaceDecl {
            name,
            members: self.arena.alloc_slice_fill_iter(members),
            annotations,
            span: name.span,
        }))
    }

    pub fn method(
        &self,
        name: &str,
        params: &[(&str, Type<'ast>)],
        return_type: Type<'ast>,
        annotations: &[(&str, &str)],
    ) -> InterfaceMember<'ast> {
        let annotations = self.annotations(annotations);
        let name = self.ident(name);
        InterfaceMember {
            name,
            kind: MemberKind::Method,
            params: self.params(params),
            ty: return_type,
            annotations,
            span: name.span,
        }
    }

    pub fn property(
        &self,
        name: &str,
        ty: Type<'ast>,
        annotations: &[(&str, &str)],
    ) -> InterfaceMember<'ast> {
        let annotations = self.annotations(annotations);
        let name = self.ident(name);
        InterfaceMember {
            name,
            kind: MemberKind::Property,
            params: &[],
            ty,
            annotations,
            span: name.span,
        }
    }

    pub fn declare(&self, name: &str, interface: &str) -> Item<'ast> {
        let name = self.ident(name);
        Item::Declare(self.arena.alloc(DeclareDecl {
            name,
            interface: self.ident(interface),
            span: name.span,
        }))
    }

    /// An item kind the AST does not model.
    pub fn raw_item(&self, kind: &str) -> Item<'ast> {
        Item::Other(RawNode {
            kind: self.arena.alloc_str(kind),
            span: self.next_span(),
        })
    }

    pub fn program(&self, items: Vec<Item<'ast>>) -> Program<'ast> {
        let files = self.arena.alloc_slice_copy(&[SourceFile {
            id: self.file,
            path: self.path,
        }]);
        Program::new(files, self.arena.alloc_slice_fill_iter(items))
    }
}
