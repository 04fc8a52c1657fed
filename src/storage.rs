//! On-disk snapshots of governance state.
//!
//! Plain JSON files under a data directory, written atomically (`.tmp` then
//! rename) so a crash mid-write never corrupts the last good snapshot. The
//! embedding node decides when to save; loads happen once at startup.

use crate::metrics::metrics;
use crate::registry::AccessControlRegistry;
use crate::store::EpochStore;
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, io, path::Path};

const EPOCHS_FILE: &str = "epochs.json";
const GAS_CONFIG_FILE: &str = "gas_config.json";

#[derive(Clone)]
pub struct DataDir {
    pub root: String,
}

impl DataDir {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    fn p(&self, file: &str) -> String {
        format!("{}/{}", self.root, file)
    }

    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> io::Result<()> {
        self.ensure()?;
        let path = self.p(file);
        let tmp = format!("{path}.tmp");
        let out = serde_json::to_string_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{file} encode: {e}")))?;
        fs::write(&tmp, out)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> io::Result<Option<T>> {
        let path = self.p(file);
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)?;
        serde_json::from_str(&s)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{file} parse: {e}")))
    }

    pub fn save_epochs(&self, store: &EpochStore) -> io::Result<()> {
        self.write_json(EPOCHS_FILE, store)?;
        metrics().snapshots_saved.inc();
        Ok(())
    }

    pub fn load_epochs(&self) -> io::Result<Option<EpochStore>> {
        let store = self.read_json(EPOCHS_FILE)?;
        if store.is_some() {
            metrics().snapshots_loaded.inc();
        }
        Ok(store)
    }

    pub fn save_registry(&self, registry: &AccessControlRegistry) -> io::Result<()> {
        self.write_json(GAS_CONFIG_FILE, registry)?;
        metrics().snapshots_saved.inc();
        Ok(())
    }

    pub fn load_registry(&self) -> io::Result<Option<AccessControlRegistry>> {
        let reg = self.read_json(GAS_CONFIG_FILE)?;
        if reg.is_some() {
            metrics().snapshots_loaded.inc();
        }
        Ok(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::peers_hash;
    use crate::types::{Address, Epoch};

    #[test]
    fn epoch_store_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::new(tmp.path().to_string_lossy());

        let mut store = EpochStore::new(Epoch {
            id: 2,
            peers: vec![],
            start_height: 50,
            hash: peers_hash(&[]),
        });
        store.archive(Epoch { id: 1, peers: vec![], start_height: 0, hash: peers_hash(&[]) });

        dir.save_epochs(&store).unwrap();
        let loaded = dir.load_epochs().unwrap().unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn registry_round_trips_with_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::new(tmp.path().to_string_lossy());

        let owner = Address([1; 20]);
        let mut reg = AccessControlRegistry::new(owner);
        reg.set_gas_managers(&owner, &[Address([5; 20]), Address([3; 20])], true).unwrap();
        reg.block_account(&owner, Address([9; 20]), true).unwrap();

        dir.save_registry(&reg).unwrap();
        let loaded = dir.load_registry().unwrap().unwrap();
        assert_eq!(loaded, reg);
        assert_eq!(loaded.gas_manager_list(), reg.gas_manager_list());
    }

    #[test]
    fn absent_files_load_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::new(tmp.path().to_string_lossy());
        assert!(dir.load_epochs().unwrap().is_none());
        assert!(dir.load_registry().unwrap().is_none());
    }
}
