//! Typed program graph consumed by the contract compiler backend.
//!
//! The front end (parsing and type checking) is a separate collaborator; it
//! hands over a [`Program`] whose nodes are allocated in a `bumpalo` arena
//! and stay valid for the arena's lifetime. Every node carries a [`Span`],
//! every expression carries its checked [`Type`], and every node reports a
//! stable kind name used in diagnostics.
//!
//! [`AstBuilder`] offers terse constructors for building programs by hand.

mod builder;
pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;
pub mod types;

pub use builder::AstBuilder;
pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use stmt::*;
pub use types::*;

use contractc_core::{FileId, Span};

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A node the AST does not model, kept by kind name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawNode<'ast> {
    pub kind: &'ast str,
    pub span: Span,
}

/// A source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFile<'ast> {
    pub id: FileId,
    pub path: &'ast str,
}

/// A complete, type-checked program.
#[derive(Debug, Clone, Copy)]
pub struct Program<'ast> {
    files: &'ast [SourceFile<'ast>],
    items: &'ast [Item<'ast>],
}

impl<'ast> Program<'ast> {
    pub fn new(files: &'ast [SourceFile<'ast>], items: &'ast [Item<'ast>]) -> Self {
        Self { files, items }
    }

    /// Get the top-level items in declaration order.
    pub fn items(&self) -> &'ast [Item<'ast>] {
        self.items
    }

    pub fn files(&self) -> &'ast [SourceFile<'ast>] {
        self.files
    }

    /// Path of a document, if the program knows it.
    pub fn file_path(&self, id: FileId) -> Option<&'ast str> {
        self.files.iter().find(|f| f.id == id).map(|f| f.path)
    }

    /// Top-level functions with a body, in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &'ast FunctionDecl<'ast>> + 'ast {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) if f.body.is_some() => Some(*f),
            _ => None,
        })
    }
}
