//! Debug information: source documents, method ranges and sequence points.
//!
//! Serialized in the compact string forms debuggers for the target chain
//! expect: a method range is `start-end` (inclusive), a sequence point is
//! `address[document]line:col-line:col`, and a parameter or variable is
//! `name,Type`.

use std::fmt;

use contractc_core::{Hash160, Span};
use serde::{Serialize, Serializer};

use super::ContractParamType;

/// Maps one instruction address to a source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencePoint {
    pub address: u32,
    /// Index into [`DebugInfo::documents`].
    pub document: usize,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SequencePoint {
    pub fn new(address: u32, document: usize, span: Span) -> Self {
        Self {
            address,
            document,
            start_line: span.line,
            start_col: span.col,
            end_line: span.end_line,
            end_col: span.end_col,
        }
    }
}

impl fmt::Display for SequencePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]{}:{}-{}:{}",
            self.address,
            self.document,
            self.start_line,
            self.start_col,
            self.end_line,
            self.end_col
        )
    }
}

impl Serialize for SequencePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Inclusive address range of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodRange {
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for MethodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl Serialize for MethodRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A named, typed slot as it appears in debug info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugSlot {
    pub name: String,
    pub ty: ContractParamType,
}

impl fmt::Display for DebugSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.name, self.ty)
    }
}

impl Serialize for DebugSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugMethod {
    pub id: String,
    pub name: String,
    pub range: MethodRange,
    pub params: Vec<DebugSlot>,
    #[serde(rename = "return")]
    pub return_type: ContractParamType,
    pub variables: Vec<DebugSlot>,
    #[serde(rename = "sequence-points")]
    pub sequence_points: Vec<SequencePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugEvent {
    pub id: String,
    pub name: String,
    pub params: Vec<DebugSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugInfo {
    pub hash: Hash160,
    pub documents: Vec<String>,
    pub methods: Vec<DebugMethod>,
    pub events: Vec<DebugEvent>,
    #[serde(rename = "static-variables")]
    pub static_variables: Vec<DebugSlot>,
}

impl DebugInfo {
    pub fn method(&self, name: &str) -> Option<&DebugMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
