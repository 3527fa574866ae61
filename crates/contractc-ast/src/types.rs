//! Resolved types attached to expressions and declarations.
//!
//! Types arrive already checked; the backend only inspects them to choose
//! opcodes (integer vs byte-string operators, equality flavor) and to build
//! the ABI.

use std::fmt;

/// A semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Type<'ast> {
    /// No value (function returns only).
    Void,
    Boolean,
    /// Arbitrary-precision integer.
    Integer,
    /// UTF-8 text.
    String,
    /// Raw bytes.
    ByteString,
    Hash160,
    Hash256,
    PublicKey,
    Signature,
    /// The type of the `null` literal.
    Null,
    /// Array of the element type.
    Array(&'ast Type<'ast>),
    /// Map from key to value type.
    Map(&'ast Type<'ast>, &'ast Type<'ast>),
    /// A named struct type.
    Struct(&'ast str),
    /// An opaque host object (storage context, iterator, ...).
    Interop(&'ast str),
    /// Unknown or dynamically typed.
    #[default]
    Any,
    /// Any other named type.
    Named(&'ast str),
}

impl<'ast> Type<'ast> {
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Boolean)
    }

    /// Types represented as byte strings on the stack.
    pub fn is_byte_like(&self) -> bool {
        matches!(
            self,
            Type::String
                | Type::ByteString
                | Type::Hash160
                | Type::Hash256
                | Type::PublicKey
                | Type::Signature
        )
    }

    /// Whether `.length` is meaningful for values of this type.
    pub fn has_length(&self) -> bool {
        self.is_byte_like() || matches!(self, Type::Array(_) | Type::Map(..))
    }
}

impl fmt::Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Boolean => write!(f, "boolean"),
            Type::Integer => write!(f, "integer"),
            Type::String => write!(f, "string"),
            Type::ByteString => write!(f, "ByteString"),
            Type::Hash160 => write!(f, "Hash160"),
            Type::Hash256 => write!(f, "Hash256"),
            Type::PublicKey => write!(f, "PublicKey"),
            Type::Signature => write!(f, "Signature"),
            Type::Null => write!(f, "null"),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
            Type::Struct(name) | Type::Interop(name) | Type::Named(name) => write!(f, "{}", name),
            Type::Any => write!(f, "any"),
        }
    }
}
