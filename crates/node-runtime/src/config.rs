//! On-disk configuration (§6): the per-node JSON file and the shared
//! `ConsensusConfig` JSON file whose canonical encoding gates peer
//! compatibility via `consensus_hash`.

use crate::errors::RuntimeError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ConsensusConfig, NodeType};
use std::path::{Path, PathBuf};

/// This node's own identity and network configuration, loaded once at
/// startup. Distinct from [`ConsensusConfig`]: this file varies per node,
/// the consensus file is shared chain-wide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node_type: NodeType,
    pub address: Address,
    pub api_port: u16,
    pub p2p_port: u16,
    #[serde(default)]
    pub seed_peers: Vec<String>,
    pub public_ip: String,
    pub data_dir: PathBuf,
    pub private_key_file: PathBuf,
    pub public_key_file: PathBuf,
}

impl NodeConfig {
    /// Load and parse `path` as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn is_validator(&self) -> bool {
        self.node_type == NodeType::Validator
    }
}

/// Load the shared consensus configuration from `path`.
pub fn load_consensus_config(path: impl AsRef<Path>) -> Result<ConsensusConfig, RuntimeError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_node_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"{{
                "node_type": "Validator",
                "address": "{}",
                "api_port": 8080,
                "p2p_port": 30303,
                "seed_peers": ["seed1:30303"],
                "public_ip": "203.0.113.1",
                "data_dir": "/tmp/qc-data",
                "private_key_file": "/tmp/qc-data/priv.key",
                "public_key_file": "/tmp/qc-data/pub.key"
            }}"#,
            Address::derive(b"node").as_str()
        )
        .unwrap();

        let config = NodeConfig::load(&path).unwrap();
        assert_eq!(config.api_port, 8080);
        assert!(config.is_validator());
        assert_eq!(config.seed_peers, vec!["seed1:30303".to_string()]);
    }

    #[test]
    fn loads_the_shared_consensus_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consensus.json");
        let default_config = ConsensusConfig::default();
        std::fs::write(&path, serde_json::to_vec(&default_config).unwrap()).unwrap();

        let loaded = load_consensus_config(&path).unwrap();
        assert_eq!(loaded.consensus_hash(), default_config.consensus_hash());
    }
}
