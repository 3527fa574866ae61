//! Contract manifest and ABI.

use contractc_ast::Type;
use serde::{Deserialize, Serialize};

/// Coarse parameter type used by the ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractParamType {
    Void,
    Boolean,
    Integer,
    String,
    ByteArray,
    Hash160,
    Hash256,
    PublicKey,
    Signature,
    Array,
    Map,
    InteropInterface,
    Any,
}

impl ContractParamType {
    /// Map a checked source type onto the ABI enumeration.
    ///
    /// Structs travel as arrays; anything without a direct counterpart is
    /// `Any`.
    pub fn from_type(ty: &Type<'_>) -> Self {
        match ty {
            Type::Void => Self::Void,
            Type::Boolean => Self::Boolean,
            Type::Integer => Self::Integer,
            Type::String => Self::String,
            Type::ByteString => Self::ByteArray,
            Type::Hash160 => Self::Hash160,
            Type::Hash256 => Self::Hash256,
            Type::PublicKey => Self::PublicKey,
            Type::Signature => Self::Signature,
            Type::Array(_) | Type::Struct(_) => Self::Array,
            Type::Map(..) => Self::Map,
            Type::Interop(_) => Self::InteropInterface,
            Type::Null | Type::Any | Type::Named(_) => Self::Any,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::String => "String",
            Self::ByteArray => "ByteArray",
            Self::Hash160 => "Hash160",
            Self::Hash256 => "Hash256",
            Self::PublicKey => "PublicKey",
            Self::Signature => "Signature",
            Self::Array => "Array",
            Self::Map => "Map",
            Self::InteropInterface => "InteropInterface",
            Self::Any => "Any",
        }
    }
}

impl std::fmt::Display for ContractParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ContractParamType,
}

/// An entry of the ABI method table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiMethod {
    pub name: String,
    pub parameters: Vec<AbiParameter>,
    #[serde(rename = "returntype")]
    pub return_type: ContractParamType,
    /// Byte offset of the method in the script.
    pub offset: u32,
    pub safe: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEvent {
    pub name: String,
    pub parameters: Vec<AbiParameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAbi {
    pub methods: Vec<AbiMethod>,
    pub events: Vec<AbiEvent>,
}

impl ContractAbi {
    pub fn method(&self, name: &str) -> Option<&AbiMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Contracts and methods this contract may call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractPermission {
    pub contract: String,
    pub methods: String,
}

impl ContractPermission {
    /// Permission to call any method of any contract.
    pub fn wildcard() -> Self {
        Self {
            contract: "*".to_string(),
            methods: "*".to_string(),
        }
    }
}

/// The contract manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractManifest {
    pub name: String,
    pub groups: Vec<serde_json::Value>,
    pub features: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "supportedstandards")]
    pub supported_standards: Vec<String>,
    pub abi: ContractAbi,
    pub permissions: Vec<ContractPermission>,
    pub trusts: Vec<String>,
    pub extra: Option<serde_json::Value>,
}

impl ContractManifest {
    pub fn new(name: impl Into<String>, abi: ContractAbi) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
            features: serde_json::Map::new(),
            supported_standards: Vec::new(),
            abi,
            permissions: vec![ContractPermission::wildcard()],
            trusts: Vec::new(),
            extra: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
