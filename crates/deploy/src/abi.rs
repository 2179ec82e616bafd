//! Constructor calldata encoding.

use std::fmt;

use alloy_core::dyn_abi::DynSolValue;
use alloy_core::primitives::{Address, U256};

/// A single constructor argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArg {
    /// An unsigned 256-bit integer.
    Uint(U256),
    /// An account or contract address.
    Address(Address),
    /// A UTF-8 string.
    String(String),
}

impl ConstructorArg {
    fn to_sol_value(&self) -> DynSolValue {
        match self {
            Self::Uint(value) => DynSolValue::Uint(*value, 256),
            Self::Address(address) => DynSolValue::Address(*address),
            Self::String(value) => DynSolValue::String(value.clone()),
        }
    }
}

impl fmt::Display for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "{value}"),
            Self::Address(address) => write!(f, "{address}"),
            Self::String(value) => write!(f, "{value}"),
        }
    }
}

/// ABI-encode constructor arguments in standard parameter layout, ready to
/// be appended to the creation bytecode.
pub fn encode_constructor_args(args: &[ConstructorArg]) -> Vec<u8> {
    let values: Vec<DynSolValue> = args.iter().map(ConstructorArg::to_sol_value).collect();
    DynSolValue::Tuple(values).abi_encode_params()
}
