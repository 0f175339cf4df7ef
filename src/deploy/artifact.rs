//! Compiled contract artifact (`abi` + `bytecode` JSON)

use super::DeployError;
use crate::core::encoding::from_hex_data;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    contract_name: Option<String>,
    abi: Value,
    bytecode: String,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: Option<String>,
    pub abi: Value,
    pub bytecode: Vec<u8>,
}

impl Artifact {
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DeployError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&raw)
    }

    pub fn parse(json: &str) -> Result<Self, DeployError> {
        let raw: RawArtifact = serde_json::from_str(json).map_err(|e| DeployError::Json(e.to_string()))?;
        let digits = raw.bytecode.trim();
        let digits = if digits.starts_with("0x") { digits.to_string() } else { format!("0x{}", digits) };
        let bytecode = from_hex_data(&digits).map_err(|e| DeployError::Json(format!("bytecode: {e}")))?;
        if bytecode.is_empty() {
            // Interfaces and abstract contracts compile to empty bytecode
            return Err(DeployError::EmptyBytecode);
        }
        Ok(Self { contract_name: raw.contract_name, abi: raw.abi, bytecode })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse() {
        let artifact = Artifact::parse(
            &json!({"contractName": "BlogSystem", "abi": [], "bytecode": "0x6080604052"}).to_string(),
        )
        .unwrap();
        assert_eq!(artifact.contract_name.as_deref(), Some("BlogSystem"));
        assert_eq!(artifact.bytecode, vec![0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn test_rejects_empty_and_missing() {
        let empty = Artifact::parse(&json!({"abi": [], "bytecode": "0x"}).to_string());
        assert!(matches!(empty, Err(DeployError::EmptyBytecode)));
        let missing = Artifact::parse(&json!({"abi": []}).to_string());
        assert!(matches!(missing, Err(DeployError::Json(_))));
        let io = Artifact::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(io, Err(DeployError::Io(_))));
    }
}
