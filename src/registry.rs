//! Layered permission registry: owner, admin set, gas-manager and gas-user
//! sets, and a blacklist, plus the gas-manage enforcement flag.
//!
//! The owner may transfer ownership; owner and admins may mutate everything
//! else. Every mutation is idempotent: re-adding a present member or
//! removing an absent one is a no-op, not an error. All sets enumerate in
//! insertion order.

use crate::metrics::metrics;
use crate::types::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::hash::Hash;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("caller {0} is not authorized")]
    Unauthorized(Address),
}

/// Insertion-ordered set: a sequence for stable enumeration plus a hash
/// index for O(1) membership, kept in sync on every add and remove.
#[derive(Clone, Debug)]
pub struct OrderedSet<T> {
    items: Vec<T>,
    index: HashSet<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self { items: Vec::new(), index: HashSet::new() }
    }
}

// The index is a function of the items, so equality is item equality.
impl<T: PartialEq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    /// Returns false if the value was already present.
    pub fn insert(&mut self, value: T) -> bool {
        if !self.index.insert(value.clone()) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Returns false if the value was absent.
    pub fn remove(&mut self, value: &T) -> bool {
        if !self.index.remove(value) {
            return false;
        }
        self.items.retain(|v| v != value);
        true
    }

    pub fn contains(&self, value: &T) -> bool {
        self.index.contains(value)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Serialize> Serialize for OrderedSet<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(s)
    }
}

impl<'de, T: Deserialize<'de> + Eq + Hash + Clone> Deserialize<'de> for OrderedSet<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(d)?;
        let mut set = Self::default();
        for v in items {
            set.insert(v);
        }
        Ok(set)
    }
}

/// Chain-wide access control and gas-admission state.
///
/// A process-wide singleton on chain; here an explicit value owned by the
/// embedding node and threaded through every operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessControlRegistry {
    owner: Address,
    admins: OrderedSet<Address>,
    gas_managers: OrderedSet<Address>,
    gas_users: OrderedSet<Address>,
    blacklist: OrderedSet<Address>,
    gas_manage_enabled: bool,
}

impl AccessControlRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            admins: OrderedSet::default(),
            gas_managers: OrderedSet::default(),
            gas_users: OrderedSet::default(),
            blacklist: OrderedSet::default(),
            gas_manage_enabled: false,
        }
    }

    pub fn name(&self) -> &'static str {
        "oryn-chain-config"
    }

    fn require_owner(&self, caller: &Address) -> Result<(), RegistryError> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized(*caller))
        }
    }

    fn require_admin(&self, caller: &Address) -> Result<(), RegistryError> {
        if caller == &self.owner || self.admins.contains(caller) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized(*caller))
        }
    }

    fn apply(set: &mut OrderedSet<Address>, addresses: &[Address], enabled: bool) -> usize {
        let mut changed = 0;
        for a in addresses {
            let did = if enabled { set.insert(*a) } else { set.remove(a) };
            if did {
                changed += 1;
            }
        }
        changed
    }

    pub fn change_owner(&mut self, caller: &Address, new_owner: Address) -> Result<(), RegistryError> {
        self.require_owner(caller)?;
        info!(old = %self.owner, new = %new_owner, "config: owner changed");
        self.owner = new_owner;
        metrics().registry_updates.inc();
        Ok(())
    }

    pub fn set_admins(
        &mut self,
        caller: &Address,
        addresses: &[Address],
        enabled: bool,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        let changed = Self::apply(&mut self.admins, addresses, enabled);
        if changed > 0 {
            info!(changed, enabled, total = self.admins.len(), "config: admin set updated");
            metrics().registry_updates.inc();
        }
        Ok(())
    }

    pub fn set_gas_managers(
        &mut self,
        caller: &Address,
        addresses: &[Address],
        enabled: bool,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        let changed = Self::apply(&mut self.gas_managers, addresses, enabled);
        if changed > 0 {
            info!(changed, enabled, total = self.gas_managers.len(), "config: gas manager set updated");
            metrics().registry_updates.inc();
        }
        Ok(())
    }

    pub fn set_gas_manager(
        &mut self,
        caller: &Address,
        address: Address,
        enabled: bool,
    ) -> Result<(), RegistryError> {
        self.set_gas_managers(caller, &[address], enabled)
    }

    pub fn set_gas_users(
        &mut self,
        caller: &Address,
        addresses: &[Address],
        enabled: bool,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        let changed = Self::apply(&mut self.gas_users, addresses, enabled);
        if changed > 0 {
            info!(changed, enabled, total = self.gas_users.len(), "config: gas user set updated");
            metrics().registry_updates.inc();
        }
        Ok(())
    }

    pub fn block_account(
        &mut self,
        caller: &Address,
        address: Address,
        enabled: bool,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        let changed = Self::apply(&mut self.blacklist, &[address], enabled);
        if changed > 0 {
            info!(account = %address, blocked = enabled, "config: blacklist updated");
            metrics().registry_updates.inc();
        }
        Ok(())
    }

    pub fn enable_gas_manage(&mut self, caller: &Address, enabled: bool) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        if self.gas_manage_enabled != enabled {
            info!(enabled, "config: gas management toggled");
            metrics().registry_updates.inc();
        }
        self.gas_manage_enabled = enabled;
        Ok(())
    }

    // ── Queries (unrestricted, insertion order) ───────────────────────────

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn is_admin(&self, address: &Address) -> bool {
        self.admins.contains(address)
    }

    pub fn is_gas_manager(&self, address: &Address) -> bool {
        self.gas_managers.contains(address)
    }

    pub fn is_gas_user(&self, address: &Address) -> bool {
        self.gas_users.contains(address)
    }

    pub fn is_blocked(&self, address: &Address) -> bool {
        self.blacklist.contains(address)
    }

    pub fn is_gas_manage_enabled(&self) -> bool {
        self.gas_manage_enabled
    }

    pub fn admin_list(&self) -> &[Address] {
        self.admins.as_slice()
    }

    pub fn gas_manager_list(&self) -> &[Address] {
        self.gas_managers.as_slice()
    }

    pub fn gas_user_list(&self) -> &[Address] {
        self.gas_users.as_slice()
    }

    pub fn blacklist(&self) -> &[Address] {
        self.blacklist.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        Address([tag; 20])
    }

    #[test]
    fn ordered_set_preserves_insertion_order() {
        let mut set = OrderedSet::default();
        set.insert(addr(3));
        set.insert(addr(1));
        set.insert(addr(2));
        set.insert(addr(1)); // no-op
        assert_eq!(set.as_slice(), &[addr(3), addr(1), addr(2)]);
        set.remove(&addr(1));
        assert_eq!(set.as_slice(), &[addr(3), addr(2)]);
        assert!(!set.remove(&addr(1)));
    }

    #[test]
    fn setters_are_idempotent() {
        let owner = addr(1);
        let mut reg = AccessControlRegistry::new(owner);
        reg.set_gas_managers(&owner, &[addr(9)], true).unwrap();
        reg.set_gas_managers(&owner, &[addr(9)], true).unwrap();
        assert_eq!(reg.gas_manager_list(), &[addr(9)]);
        assert!(reg.is_gas_manager(&addr(9)));
        reg.set_gas_managers(&owner, &[addr(9)], false).unwrap();
        reg.set_gas_managers(&owner, &[addr(9)], false).unwrap();
        assert!(reg.gas_manager_list().is_empty());
    }

    #[test]
    fn only_owner_may_transfer_ownership() {
        let owner = addr(1);
        let mut reg = AccessControlRegistry::new(owner);
        reg.set_admins(&owner, &[addr(2)], true).unwrap();
        // Admins are not owners.
        assert_eq!(
            reg.change_owner(&addr(2), addr(2)),
            Err(RegistryError::Unauthorized(addr(2)))
        );
        reg.change_owner(&owner, addr(2)).unwrap();
        assert_eq!(reg.owner(), &addr(2));
        // The old owner lost the role.
        assert!(reg.change_owner(&owner, owner).is_err());
    }

    #[test]
    fn admins_may_mutate_role_sets() {
        let owner = addr(1);
        let admin = addr(2);
        let mut reg = AccessControlRegistry::new(owner);
        reg.set_admins(&owner, &[admin], true).unwrap();
        reg.set_gas_users(&admin, &[addr(5), addr(6)], true).unwrap();
        assert_eq!(reg.gas_user_list(), &[addr(5), addr(6)]);
        // Non-admins may not.
        assert!(reg.set_gas_users(&addr(9), &[addr(7)], true).is_err());
        assert_eq!(reg.gas_user_list(), &[addr(5), addr(6)]);
    }

    #[test]
    fn blacklist_toggles() {
        let owner = addr(1);
        let mut reg = AccessControlRegistry::new(owner);
        reg.block_account(&owner, addr(4), true).unwrap();
        assert!(reg.is_blocked(&addr(4)));
        assert_eq!(reg.blacklist(), &[addr(4)]);
        reg.block_account(&owner, addr(4), false).unwrap();
        assert!(!reg.is_blocked(&addr(4)));
        assert!(reg.blacklist().is_empty());
    }
}
