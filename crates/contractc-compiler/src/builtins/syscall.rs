//! Interop services callable through `SYSCALL`.
//!
//! The 32-bit id of a service is the first four bytes of the SHA-256 hash
//! of its ASCII name, read little-endian.

use sha2::{Digest, Sha256};

macro_rules! syscalls {
    ($( $variant:ident => $name:literal, )*) => {
        /// Interop services provided by the target machine.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Syscall {
            $( $variant, )*
        }

        impl Syscall {
            pub const ALL: &'static [Syscall] = &[$(Syscall::$variant),*];

            /// Registered service name.
            pub fn name(self) -> &'static str {
                match self {
                    $(Syscall::$variant => $name,)*
                }
            }
        }
    };
}

syscalls! {
    ContractCall => "System.Contract.Call",
    ContractCallNative => "System.Contract.CallNative",
    ContractGetCallFlags => "System.Contract.GetCallFlags",
    ContractCreateStandardAccount => "System.Contract.CreateStandardAccount",
    ContractCreateMultisigAccount => "System.Contract.CreateMultisigAccount",
    ContractNativeOnPersist => "System.Contract.NativeOnPersist",
    ContractNativePostPersist => "System.Contract.NativePostPersist",
    CryptoCheckSig => "System.Crypto.CheckSig",
    CryptoCheckMultisig => "System.Crypto.CheckMultisig",
    IteratorNext => "System.Iterator.Next",
    IteratorValue => "System.Iterator.Value",
    RuntimePlatform => "System.Runtime.Platform",
    RuntimeGetNetwork => "System.Runtime.GetNetwork",
    RuntimeGetAddressVersion => "System.Runtime.GetAddressVersion",
    RuntimeGetTrigger => "System.Runtime.GetTrigger",
    RuntimeGetTime => "System.Runtime.GetTime",
    RuntimeGetScriptContainer => "System.Runtime.GetScriptContainer",
    RuntimeGetExecutingScriptHash => "System.Runtime.GetExecutingScriptHash",
    RuntimeGetCallingScriptHash => "System.Runtime.GetCallingScriptHash",
    RuntimeGetEntryScriptHash => "System.Runtime.GetEntryScriptHash",
    RuntimeCheckWitness => "System.Runtime.CheckWitness",
    RuntimeGetInvocationCounter => "System.Runtime.GetInvocationCounter",
    RuntimeGetRandom => "System.Runtime.GetRandom",
    RuntimeLog => "System.Runtime.Log",
    RuntimeNotify => "System.Runtime.Notify",
    RuntimeGetNotifications => "System.Runtime.GetNotifications",
    RuntimeGasLeft => "System.Runtime.GasLeft",
    RuntimeBurnGas => "System.Runtime.BurnGas",
    RuntimeCurrentSigners => "System.Runtime.CurrentSigners",
    StorageGetContext => "System.Storage.GetContext",
    StorageGetReadOnlyContext => "System.Storage.GetReadOnlyContext",
    StorageAsReadOnly => "System.Storage.AsReadOnly",
    StorageGet => "System.Storage.Get",
    StorageFind => "System.Storage.Find",
    StoragePut => "System.Storage.Put",
    StorageDelete => "System.Storage.Delete",
}

impl Syscall {
    /// Look up a service by its registered name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }

    /// The 32-bit id embedded after the `SYSCALL` opcode.
    pub fn id(self) -> u32 {
        let digest = Sha256::digest(self.name().as_bytes());
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}
