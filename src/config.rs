//! TOML configuration for a governance-enabled node.
//!
//! Missing sections fall back to defaults, so a minimal file only names
//! what it changes. Keys and addresses are written as "0x…" hex strings.

use crate::consensus::EpochManager;
use crate::registry::AccessControlRegistry;
use crate::types::{Address, PeerRecord};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GovConfig {
    #[serde(default)]
    pub node: NodeSection,
    #[serde(default)]
    pub genesis: GenesisSection,
    #[serde(default)]
    pub gas: GasSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSection {
    pub data_dir:  String,
    pub chain_id:  u64,
    pub log_level: String,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self { data_dir: "./data/gov".into(), chain_id: 1, log_level: "info".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenesisSection {
    pub start_height: u64,
    pub owner: Address,
    pub peers: Vec<PeerRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GasSection {
    pub gas_manage_enabled: bool,
}

impl GovConfig {
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let s = fs::read_to_string(path)?;
        toml::from_str(&s)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("config parse: {e}")))
    }

    /// Defaults when the file is absent (fresh dev node).
    pub fn load_or_default(path: impl AsRef<Path>) -> io::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Bootstrap the epoch manager from the genesis section.
    pub fn epoch_manager(&self) -> EpochManager {
        EpochManager::genesis(self.genesis.peers.clone(), self.genesis.start_height)
    }

    /// Bootstrap the access-control registry: genesis owner, with gas
    /// management pre-toggled per the `[gas]` section.
    pub fn registry(&self) -> AccessControlRegistry {
        let mut reg = AccessControlRegistry::new(self.genesis.owner);
        if self.gas.gas_manage_enabled {
            // The genesis owner is always authorized for this.
            let _ = reg.enable_gas_manage(&self.genesis.owner, true);
        }
        reg
    }
}
