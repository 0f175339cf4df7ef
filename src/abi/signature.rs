//! Solidity-style function declarations

use super::codec::{self, Token};
use super::{AbiError, AbiResult};
use crate::core::types::keccak256;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

const LOCATIONS: &[&str] = &["memory", "calldata", "storage"];
const MODIFIERS: &[&str] = &[
    "public", "external", "internal", "private", "view", "pure", "payable", "nonpayable", "virtual", "override",
];

fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*function\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(([^()]*)\)([^()]*?)(?:\breturns\s*\(([^()]*)\))?\s*$",
        )
        .expect("declaration regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Uint(usize),
    Address,
    Bool,
    String,
    Bytes,
    FixedBytes(usize),
    Array(Box<ParamType>),
}

impl ParamType {
    pub fn parse(raw: &str) -> AbiResult<Self> {
        let raw = raw.trim();
        if let Some(inner) = raw.strip_suffix("[]") {
            return Ok(ParamType::Array(Box::new(Self::parse(inner)?)));
        }
        if raw.ends_with(']') || raw.starts_with("int") || raw.starts_with('(') || raw.starts_with("tuple") {
            return Err(AbiError::UnsupportedType(raw.into()));
        }
        Ok(match raw {
            "address" => ParamType::Address,
            "bool" => ParamType::Bool,
            "string" => ParamType::String,
            "bytes" => ParamType::Bytes,
            "uint" => ParamType::Uint(256),
            _ => {
                if let Some(bits) = raw.strip_prefix("uint") {
                    let bits: usize = bits.parse().map_err(|_| AbiError::UnsupportedType(raw.into()))?;
                    if bits == 0 || bits > 256 || bits % 8 != 0 {
                        return Err(AbiError::UnsupportedType(raw.into()));
                    }
                    ParamType::Uint(bits)
                } else if let Some(size) = raw.strip_prefix("bytes") {
                    let size: usize = size.parse().map_err(|_| AbiError::UnsupportedType(raw.into()))?;
                    if size == 0 || size > 32 {
                        return Err(AbiError::UnsupportedType(raw.into()));
                    }
                    ParamType::FixedBytes(size)
                } else {
                    return Err(AbiError::UnsupportedType(raw.into()));
                }
            }
        })
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, ParamType::String | ParamType::Bytes | ParamType::Array(_))
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Address => f.write_str("address"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::String => f.write_str("string"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub kind: ParamType,
}

impl Param {
    fn parse(raw: &str) -> AbiResult<Self> {
        let mut words = raw.split_whitespace();
        let kind = ParamType::parse(words.next().ok_or_else(|| AbiError::InvalidSignature(raw.into()))?)?;
        let rest: Vec<&str> = words.filter(|w| !LOCATIONS.contains(w)).collect();
        let name = match rest.as_slice() {
            [] => None,
            [name] => Some((*name).to_string()),
            _ => return Err(AbiError::InvalidSignature(raw.into())),
        };
        Ok(Self { name, kind })
    }
}

fn parse_params(list: &str) -> AbiResult<Vec<Param>> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    list.split(',').map(Param::parse).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl Function {
    pub fn parse(declaration: &str) -> AbiResult<Self> {
        let caps = declaration_re()
            .captures(declaration)
            .ok_or_else(|| AbiError::InvalidSignature(declaration.into()))?;

        let mut state_mutability = StateMutability::NonPayable;
        for word in caps.get(3).map_or("", |m| m.as_str()).split_whitespace() {
            match word {
                "view" => state_mutability = StateMutability::View,
                "pure" => state_mutability = StateMutability::Pure,
                "payable" => state_mutability = StateMutability::Payable,
                w if MODIFIERS.contains(&w) => {}
                _ => return Err(AbiError::InvalidSignature(declaration.into())),
            }
        }

        Ok(Self {
            name: caps[1].to_string(),
            inputs: parse_params(&caps[2])?,
            outputs: parse_params(caps.get(4).map_or("", |m| m.as_str()))?,
            state_mutability,
        })
    }

    /// Canonical form used for the selector, e.g. `hasPurchased(address,uint256)`
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(|p| p.kind.to_string()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.state_mutability, StateMutability::View | StateMutability::Pure)
    }

    /// Selector followed by the encoded arguments. Arity and types are checked first.
    pub fn encode_input(&self, args: &[Token]) -> AbiResult<Vec<u8>> {
        if args.len() != self.inputs.len() {
            return Err(AbiError::ArgumentCount { function: self.name.clone(), expected: self.inputs.len(), got: args.len() });
        }
        for (index, (arg, param)) in args.iter().zip(&self.inputs).enumerate() {
            if !arg.matches(&param.kind) {
                return Err(AbiError::ArgumentType { function: self.name.clone(), index, expected: param.kind.to_string() });
            }
        }
        let mut data = self.selector().to_vec();
        data.extend(codec::encode(args));
        Ok(data)
    }

    pub fn decode_output(&self, data: &[u8]) -> AbiResult<Vec<Token>> {
        let types: Vec<ParamType> = self.outputs.iter().map(|p| p.kind.clone()).collect();
        codec::decode(&types, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Address;

    #[test]
    fn test_known_selectors() {
        let transfer = Function::parse("function transfer(address to, uint256 amount) external returns (bool)").unwrap();
        assert_eq!(hex::encode(transfer.selector()), "a9059cbb");
        let balance = Function::parse("function balanceOf(address account) public view returns (uint256)").unwrap();
        assert_eq!(hex::encode(balance.selector()), "70a08231");
        assert_eq!(balance.state_mutability, StateMutability::View);
    }

    #[test]
    fn test_param_forms() {
        let f = Function::parse("function f(uint a, bytes32, string calldata s, uint256[] memory ids) pure").unwrap();
        assert_eq!(f.signature(), "f(uint256,bytes32,string,uint256[])");
        assert_eq!(f.inputs[1].name, None);
        assert_eq!(f.inputs[2].name.as_deref(), Some("s"));
        assert!(f.is_read_only());
        assert!(f.outputs.is_empty());
    }

    #[test]
    fn test_rejects() {
        assert!(matches!(Function::parse("function f(int256 x)"), Err(AbiError::UnsupportedType(_))));
        assert!(matches!(Function::parse("function f(uint7 x)"), Err(AbiError::UnsupportedType(_))));
        assert!(matches!(Function::parse("function f(uint256[3] x)"), Err(AbiError::UnsupportedType(_))));
        assert!(matches!(Function::parse("function f() sometimes"), Err(AbiError::InvalidSignature(_))));
        assert!(matches!(Function::parse("function f(uint256 a b)"), Err(AbiError::InvalidSignature(_))));
    }

    #[test]
    fn test_encode_input_checks() {
        let f = Function::parse("function hasPurchased(address, uint256) public view returns (bool)").unwrap();
        let err = f.encode_input(&[Token::Uint(1)]).unwrap_err();
        assert_eq!(err, AbiError::ArgumentCount { function: "hasPurchased".into(), expected: 2, got: 1 });
        let err = f.encode_input(&[Token::Uint(1), Token::Uint(2)]).unwrap_err();
        assert!(matches!(err, AbiError::ArgumentType { index: 0, .. }));

        let data = f.encode_input(&[Token::Address(Address::ZERO), Token::Uint(7)]).unwrap();
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], &f.selector());
        assert_eq!(data[4 + 63], 7);
    }
}
