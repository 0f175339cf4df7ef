//! Head/tail encoding of call arguments and return values.
//!
//! Every static value takes one 32-byte word in the head. Dynamic values
//! (`string`, `bytes`, `T[]`) put an offset in the head and their length
//! prefixed body in the tail. Offsets are relative to the start of the
//! enclosing tuple.

use super::signature::ParamType;
use super::{AbiError, AbiResult};
use crate::core::encoding::{from_hex_data, to_hex_data};
use crate::core::types::Address;
use serde_json::Value;

const WORD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Unsigned integer. Wider on-chain values decode only up to `u128::MAX`.
    Uint(u128),
    Address(Address),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    Array(Vec<Token>),
}

impl Token {
    pub fn matches(&self, kind: &ParamType) -> bool {
        match (self, kind) {
            (Token::Uint(v), ParamType::Uint(bits)) => *bits >= 128 || *v >> *bits == 0,
            (Token::Address(_), ParamType::Address)
            | (Token::Bool(_), ParamType::Bool)
            | (Token::String(_), ParamType::String)
            | (Token::Bytes(_), ParamType::Bytes) => true,
            (Token::FixedBytes(b), ParamType::FixedBytes(size)) => b.len() == *size,
            (Token::Array(items), ParamType::Array(inner)) => items.iter().all(|t| t.matches(inner)),
            _ => false,
        }
    }

    pub fn into_uint(self) -> Option<u128> { if let Token::Uint(v) = self { Some(v) } else { None } }
    pub fn into_address(self) -> Option<Address> { if let Token::Address(a) = self { Some(a) } else { None } }
    pub fn into_bool(self) -> Option<bool> { if let Token::Bool(b) = self { Some(b) } else { None } }
    pub fn into_string(self) -> Option<String> { if let Token::String(s) = self { Some(s) } else { None } }
    pub fn into_array(self) -> Option<Vec<Token>> { if let Token::Array(a) = self { Some(a) } else { None } }

    /// JSON view for CLI and JS output. Integers become decimal strings.
    pub fn to_json(&self) -> Value {
        match self {
            Token::Uint(v) => Value::String(v.to_string()),
            Token::Address(a) => Value::String(a.to_checksum()),
            Token::Bool(b) => Value::Bool(*b),
            Token::String(s) => Value::String(s.clone()),
            Token::Bytes(b) | Token::FixedBytes(b) => Value::String(to_hex_data(b)),
            Token::Array(items) => Value::Array(items.iter().map(Token::to_json).collect()),
        }
    }

    /// Build a token of the given type from loosely typed JSON input.
    /// Integers may be JSON numbers, decimal strings or `0x` hex strings.
    pub fn from_json(value: &Value, kind: &ParamType) -> AbiResult<Self> {
        let mismatch = || AbiError::InvalidData(format!("{} is not a valid {}", value, kind));
        let token = match kind {
            ParamType::Uint(_) => Token::Uint(match value {
                Value::Number(n) => n.as_u64().map(u128::from).ok_or_else(mismatch)?,
                Value::String(s) => match s.strip_prefix("0x") {
                    Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
                        u128::from_str_radix(digits, 16).map_err(|_| mismatch())?
                    }
                    None if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                        s.parse::<u128>().map_err(|_| mismatch())?
                    }
                    _ => return Err(mismatch()),
                },
                _ => return Err(mismatch()),
            }),
            ParamType::Address => Token::Address(
                value.as_str().ok_or_else(mismatch)?.parse().map_err(|_| mismatch())?,
            ),
            ParamType::Bool => Token::Bool(value.as_bool().ok_or_else(mismatch)?),
            ParamType::String => Token::String(value.as_str().ok_or_else(mismatch)?.to_string()),
            ParamType::Bytes => Token::Bytes(from_hex_data(value.as_str().ok_or_else(mismatch)?).map_err(|_| mismatch())?),
            ParamType::FixedBytes(_) => {
                Token::FixedBytes(from_hex_data(value.as_str().ok_or_else(mismatch)?).map_err(|_| mismatch())?)
            }
            ParamType::Array(inner) => Token::Array(
                value
                    .as_array()
                    .ok_or_else(mismatch)?
                    .iter()
                    .map(|v| Token::from_json(v, inner))
                    .collect::<AbiResult<Vec<_>>>()?,
            ),
        };
        if !token.matches(kind) {
            return Err(mismatch());
        }
        Ok(token)
    }
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn padded(bytes: &[u8]) -> Vec<u8> {
    let mut out = uint_word(bytes.len() as u128).to_vec();
    out.extend_from_slice(bytes);
    let rem = bytes.len() % WORD;
    if rem != 0 {
        out.resize(out.len() + WORD - rem, 0);
    }
    out
}

pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = WORD * tokens.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for token in tokens {
        match token {
            Token::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            Token::Address(a) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(a.as_bytes());
                head.extend_from_slice(&word);
            }
            Token::Bool(b) => head.extend_from_slice(&uint_word(u128::from(*b))),
            Token::FixedBytes(b) => {
                let mut word = [0u8; WORD];
                let n = b.len().min(WORD);
                word[..n].copy_from_slice(&b[..n]);
                head.extend_from_slice(&word);
            }
            Token::String(s) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
                tail.extend(padded(s.as_bytes()));
            }
            Token::Bytes(b) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
                tail.extend(padded(b));
            }
            Token::Array(items) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
                tail.extend_from_slice(&uint_word(items.len() as u128));
                tail.extend(encode(items));
            }
        }
    }
    head.extend(tail);
    head
}

pub fn decode(types: &[ParamType], data: &[u8]) -> AbiResult<Vec<Token>> {
    types
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let head = word_at(data, i * WORD)?;
            if kind.is_dynamic() {
                decode_dynamic(kind, data, word_to_usize(&head)?)
            } else {
                decode_static(kind, &head)
            }
        })
        .collect()
}

fn word_at(data: &[u8], offset: usize) -> AbiResult<[u8; WORD]> {
    let end = offset.checked_add(WORD).ok_or(AbiError::ShortData { offset, needed: WORD })?;
    let slice = data.get(offset..end).ok_or(AbiError::ShortData { offset, needed: WORD })?;
    let mut word = [0u8; WORD];
    word.copy_from_slice(slice);
    Ok(word)
}

fn word_to_usize(word: &[u8; WORD]) -> AbiResult<usize> {
    if word[..24].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow("offset".into()));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(raw)).map_err(|_| AbiError::Overflow("offset".into()))
}

fn decode_static(kind: &ParamType, word: &[u8; WORD]) -> AbiResult<Token> {
    match kind {
        ParamType::Uint(bits) => {
            if word[..16].iter().any(|b| *b != 0) {
                return Err(AbiError::Overflow(format!("uint{} (u128 limit)", bits)));
            }
            let mut raw = [0u8; 16];
            raw.copy_from_slice(&word[16..]);
            let value = u128::from_be_bytes(raw);
            if *bits < 128 && value >> *bits != 0 {
                return Err(AbiError::InvalidData(format!("value exceeds uint{}", bits)));
            }
            Ok(Token::Uint(value))
        }
        ParamType::Address => {
            if word[..12].iter().any(|b| *b != 0) {
                return Err(AbiError::InvalidData("dirty address padding".into()));
            }
            let mut raw = [0u8; 20];
            raw.copy_from_slice(&word[12..]);
            Ok(Token::Address(Address::from_bytes(raw)))
        }
        ParamType::Bool => match (word[..31].iter().all(|b| *b == 0), word[31]) {
            (true, 0) => Ok(Token::Bool(false)),
            (true, 1) => Ok(Token::Bool(true)),
            _ => Err(AbiError::InvalidData("bool word is not 0 or 1".into())),
        },
        ParamType::FixedBytes(size) => Ok(Token::FixedBytes(word[..*size].to_vec())),
        _ => Err(AbiError::InvalidData(format!("{} is dynamic", kind))),
    }
}

fn decode_dynamic(kind: &ParamType, data: &[u8], offset: usize) -> AbiResult<Token> {
    let len = word_to_usize(&word_at(data, offset)?)?;
    let body_start = offset + WORD;
    match kind {
        ParamType::String | ParamType::Bytes => {
            let end = body_start.checked_add(len).ok_or(AbiError::ShortData { offset: body_start, needed: len })?;
            let bytes = data.get(body_start..end).ok_or(AbiError::ShortData { offset: body_start, needed: len })?.to_vec();
            if *kind == ParamType::Bytes {
                return Ok(Token::Bytes(bytes));
            }
            String::from_utf8(bytes)
                .map(Token::String)
                .map_err(|e| AbiError::InvalidData(format!("string utf8: {e}")))
        }
        ParamType::Array(inner) => {
            let body = data.get(body_start..).ok_or(AbiError::ShortData { offset: body_start, needed: 0 })?;
            // Each element owns at least one head word
            if len > body.len() / WORD {
                return Err(AbiError::ShortData { offset: body_start, needed: len.saturating_mul(WORD) });
            }
            let types = vec![(**inner).clone(); len];
            decode(&types, body).map(Token::Array)
        }
        _ => Err(AbiError::InvalidData(format!("{} is static", kind))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn word(hex_tail: &str) -> String { format!("{:0>64}", hex_tail) }

    #[test]
    fn test_encode_string_and_uint() {
        // (string "hi", uint256 5)
        let data = encode(&[Token::String("hi".into()), Token::Uint(5)]);
        let expected = [word("40"), word("5"), word("2"), format!("{:0<64}", "6869")].concat();
        assert_eq!(hex::encode(&data), expected);
    }

    #[test]
    fn test_decode_uint_array() {
        let data = hex::decode([word("20"), word("3"), word("1"), word("2"), word("a")].concat()).unwrap();
        let tokens = decode(&[ParamType::Array(Box::new(ParamType::Uint(256)))], &data).unwrap();
        assert_eq!(tokens, vec![Token::Array(vec![Token::Uint(1), Token::Uint(2), Token::Uint(10)])]);
    }

    #[test]
    fn test_nested_dynamic_offsets() {
        let tokens = vec![
            Token::Uint(9),
            Token::Array(vec![Token::String("a".into()), Token::String("bc".into())]),
            Token::Bytes(vec![1, 2, 3]),
            Token::Bool(true),
        ];
        let types = vec![
            ParamType::Uint(256),
            ParamType::Array(Box::new(ParamType::String)),
            ParamType::Bytes,
            ParamType::Bool,
        ];
        assert_eq!(decode(&types, &encode(&tokens)).unwrap(), tokens);
    }

    #[test]
    fn test_decode_guards() {
        let high = hex::decode(format!("{:f<64}", "1")).unwrap();
        assert!(matches!(decode(&[ParamType::Uint(256)], &high), Err(AbiError::Overflow(_))));

        let bad_bool = hex::decode(word("2")).unwrap();
        assert!(matches!(decode(&[ParamType::Bool], &bad_bool), Err(AbiError::InvalidData(_))));

        assert!(matches!(decode(&[ParamType::Uint(256)], &[0u8; 8]), Err(AbiError::ShortData { .. })));

        // Claims a million elements with no body
        let huge = hex::decode([word("20"), word("f4240")].concat()).unwrap();
        let array = ParamType::Array(Box::new(ParamType::Uint(256)));
        assert!(matches!(decode(&[array], &huge), Err(AbiError::ShortData { .. })));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Token::from_json(&json!(42), &ParamType::Uint(256)).unwrap(), Token::Uint(42));
        assert_eq!(Token::from_json(&json!("0x2a"), &ParamType::Uint(256)).unwrap(), Token::Uint(42));
        assert_eq!(
            Token::from_json(&json!("340282366920938463463374607431768211455"), &ParamType::Uint(256)).unwrap(),
            Token::Uint(u128::MAX)
        );
        assert!(Token::from_json(&json!(300), &ParamType::Uint(8)).is_err());
        for signed in ["0x+2a", "+42", "0x", "-1"] {
            assert!(Token::from_json(&json!(signed), &ParamType::Uint(256)).is_err(), "{signed}");
        }
        assert!(Token::from_json(&json!("nope"), &ParamType::Address).is_err());
        let ids = Token::from_json(&json!([1, "2"]), &ParamType::Array(Box::new(ParamType::Uint(256)))).unwrap();
        assert_eq!(ids.to_json(), json!(["1", "2"]));
    }
}
