//! Parsing of builtin marker annotations.
//!
//! Markers are doc-comment tags on declarations without a body:
//!
//! ```text
//! @syscall System.Runtime.CheckWitness
//! @nativeContract NeoToken
//! @operation SWAP; PUSHINT 2; PACK; CONVERT Struct
//! @methodToken 0xef4073a0f2b305a38ec4050e4d3d28bc40ea63f5 balanceOf
//! @event Transfer
//! @safe
//! ```

use contractc_ast::Annotation;
use contractc_core::{BindingError, Hash160};
use num_bigint::BigInt;

use super::{NativeContract, Syscall};
use crate::bytecode::{OpCode, StackItemType};
use crate::ir::Operation;

/// Informational tags carried by doc comments.
const DOC_TAGS: &[&str] = &["param", "returns", "remarks", "example", "see", "deprecated"];

/// A recognized marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Syscall(Syscall),
    NativeContract(Hash160),
    Operation(Vec<Operation>),
    MethodToken {
        hash: Hash160,
        /// Defaults to the declaration name.
        method: Option<String>,
    },
    /// Event name; defaults to the declaration name.
    Event(Option<String>),
    Safe,
}

impl Marker {
    pub fn tag(&self) -> &'static str {
        match self {
            Marker::Syscall(_) => "syscall",
            Marker::NativeContract(_) => "nativeContract",
            Marker::Operation(_) => "operation",
            Marker::MethodToken { .. } => "methodToken",
            Marker::Event(_) => "event",
            Marker::Safe => "safe",
        }
    }
}

/// Parse one annotation; doc tags yield `None`.
pub fn parse_marker(annotation: &Annotation<'_>) -> Result<Option<Marker>, BindingError> {
    let payload = annotation.payload.trim();
    let marker = match annotation.tag {
        tag if DOC_TAGS.contains(&tag) => return Ok(None),
        "syscall" => Marker::Syscall(parse_syscall(payload, annotation)?),
        "nativeContract" => Marker::NativeContract(parse_native(payload, annotation)?),
        "operation" => Marker::Operation(parse_operations(payload, annotation)?),
        "methodToken" => {
            let mut parts = payload.split_whitespace();
            let hash = parse_hash(parts.next().unwrap_or_default(), annotation)?;
            let method = parts.next().map(str::to_string);
            if parts.next().is_some() {
                return Err(malformed(annotation, "expected a hash and an optional method"));
            }
            Marker::MethodToken { hash, method }
        }
        "event" => {
            let name = payload.trim_matches('"');
            Marker::Event((!name.is_empty()).then(|| name.to_string()))
        }
        "safe" => Marker::Safe,
        other => {
            return Err(BindingError::UnsupportedBuiltin {
                name: format!("@{other}"),
                reason: "unknown annotation".to_string(),
                span: annotation.span,
            });
        }
    };
    Ok(Some(marker))
}

/// Parse every annotation of a declaration, dropping doc tags.
pub fn parse_markers(annotations: &[Annotation<'_>]) -> Result<Vec<Marker>, BindingError> {
    let mut markers = Vec::new();
    for annotation in annotations {
        if let Some(marker) = parse_marker(annotation)? {
            markers.push(marker);
        }
    }
    Ok(markers)
}

fn malformed(annotation: &Annotation<'_>, message: impl Into<String>) -> BindingError {
    BindingError::MalformedAnnotation {
        tag: annotation.tag.to_string(),
        message: message.into(),
        span: annotation.span,
    }
}

fn parse_syscall(payload: &str, annotation: &Annotation<'_>) -> Result<Syscall, BindingError> {
    if payload.is_empty() {
        return Err(malformed(annotation, "missing service name"));
    }
    Syscall::from_name(payload).ok_or_else(|| BindingError::UnsupportedBuiltin {
        name: payload.to_string(),
        reason: "unknown syscall".to_string(),
        span: annotation.span,
    })
}

fn parse_native(payload: &str, annotation: &Annotation<'_>) -> Result<Hash160, BindingError> {
    if payload.starts_with("0x") {
        return parse_hash(payload, annotation);
    }
    if payload.is_empty() {
        return Err(malformed(annotation, "missing contract name"));
    }
    NativeContract::from_name(payload)
        .map(NativeContract::hash)
        .ok_or_else(|| BindingError::UnsupportedBuiltin {
            name: payload.to_string(),
            reason: "unknown native contract".to_string(),
            span: annotation.span,
        })
}

fn parse_hash(text: &str, annotation: &Annotation<'_>) -> Result<Hash160, BindingError> {
    text.parse::<Hash160>()
        .map_err(|e| malformed(annotation, format!("bad contract hash '{text}': {e}")))
}

/// Parse a `;`-separated operation list.
fn parse_operations(
    payload: &str,
    annotation: &Annotation<'_>,
) -> Result<Vec<Operation>, BindingError> {
    let mut ops = Vec::new();
    for part in payload.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let mut words = part.split_whitespace();
        let mnemonic = words.next().unwrap_or_default();
        let operand = words.next();
        if words.next().is_some() {
            return Err(malformed(annotation, format!("too many operands in '{part}'")));
        }

        let op = match (mnemonic.to_ascii_uppercase().as_str(), operand) {
            ("CONVERT", Some(ty)) => Operation::Convert(parse_item_type(ty, annotation)?),
            ("ISTYPE", Some(ty)) => Operation::IsType(parse_item_type(ty, annotation)?),
            ("PUSHINT", Some(value)) => Operation::PushInt(
                value
                    .parse::<BigInt>()
                    .map_err(|_| malformed(annotation, format!("bad integer '{value}'")))?,
            ),
            ("CONVERT" | "ISTYPE" | "PUSHINT", None) => {
                return Err(malformed(annotation, format!("'{mnemonic}' needs an operand")));
            }
            (_, None) => {
                let opcode = OpCode::from_name(mnemonic)
                    .ok_or_else(|| malformed(annotation, format!("unknown opcode '{mnemonic}'")))?;
                if !opcode.is_simple() {
                    return Err(malformed(
                        annotation,
                        format!("'{}' takes an operand", opcode.name()),
                    ));
                }
                Operation::Simple(opcode)
            }
            (_, Some(_)) => {
                return Err(malformed(annotation, format!("unexpected operand in '{part}'")));
            }
        };
        ops.push(op);
    }

    if ops.is_empty() {
        return Err(malformed(annotation, "empty operation list"));
    }
    Ok(ops)
}

fn parse_item_type(text: &str, annotation: &Annotation<'_>) -> Result<StackItemType, BindingError> {
    StackItemType::parse(text)
        .ok_or_else(|| malformed(annotation, format!("unknown stack item type '{text}'")))
}
