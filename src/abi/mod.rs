//! Human-readable ABI: signature parsing, selectors, call encoding
//!
//! The contract interface is a list of Solidity-style declarations such as
//! `function balanceOf(address account) public view returns (uint256)`.
//! Each one is parsed into a [`Function`] carrying its canonical signature,
//! 4-byte selector and parameter types. [`Token`] values are encoded with the
//! standard head/tail layout for calls and decoded from return data.
//!
//! ```text
//! selector = keccak256("balanceOf(address)")[..4]
//! calldata = selector ++ head(args) ++ tail(args)
//! ```

mod codec;
mod signature;

pub use codec::{decode, encode, Token};
pub use signature::{Function, Param, ParamType, StateMutability};

/// ABI errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    #[error("Ambiguous function name: {0}")]
    AmbiguousFunction(String),
    #[error("{function}: expected {expected} arguments, got {got}")]
    ArgumentCount { function: String, expected: usize, got: usize },
    #[error("{function}: argument {index} is not a valid {expected}")]
    ArgumentType { function: String, index: usize, expected: String },
    #[error("Value does not fit in {0}")]
    Overflow(String),
    #[error("Data too short: need {needed} bytes at offset {offset}")]
    ShortData { offset: usize, needed: usize },
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type AbiResult<T> = Result<T, AbiError>;

/// Parsed contract interface
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Abi {
    functions: Vec<Function>,
}

impl Abi {
    pub fn parse<S: AsRef<str>>(signatures: &[S]) -> AbiResult<Self> {
        let functions = signatures
            .iter()
            .map(|s| Function::parse(s.as_ref()))
            .collect::<AbiResult<Vec<_>>>()?;
        Ok(Self { functions })
    }

    pub fn functions(&self) -> &[Function] { &self.functions }

    /// Look up by bare name, or by canonical signature when `name` contains `(`.
    pub fn function(&self, name: &str) -> AbiResult<&Function> {
        let mut matches = self.functions.iter().filter(|f| {
            if name.contains('(') { f.signature() == name } else { f.name == name }
        });
        let first = matches.next().ok_or_else(|| AbiError::UnknownFunction(name.into()))?;
        if matches.next().is_some() {
            return Err(AbiError::AmbiguousFunction(name.into()));
        }
        Ok(first)
    }

    pub fn by_selector(&self, selector: [u8; 4]) -> Option<&Function> {
        self.functions.iter().find(|f| f.selector() == selector)
    }
}
