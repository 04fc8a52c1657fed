//! Gas admission gate, consulted before any value transfer or privileged
//! call. Pure predicate over registry state: a blacklisted sender is always
//! denied; with gas management enabled, the sender must additionally hold
//! the gas-manager or gas-user role.

use crate::metrics::metrics;
use crate::registry::AccessControlRegistry;
use crate::types::Address;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("account {0} is blacklisted")]
    Blocked(Address),
    #[error("gas management is enabled and {0} is neither gas manager nor gas user")]
    NotGasPermitted(Address),
}

pub fn check_admission(registry: &AccessControlRegistry, sender: &Address) -> Result<(), GateError> {
    if registry.is_blocked(sender) {
        warn!(sender = %sender, "gate: blacklisted sender denied");
        metrics().gate_denied.inc();
        return Err(GateError::Blocked(*sender));
    }
    if registry.is_gas_manage_enabled()
        && !registry.is_gas_manager(sender)
        && !registry.is_gas_user(sender)
    {
        warn!(sender = %sender, "gate: sender lacks gas role");
        metrics().gate_denied.inc();
        return Err(GateError::NotGasPermitted(*sender));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        Address([tag; 20])
    }

    #[test]
    fn open_chain_admits_everyone() {
        let reg = AccessControlRegistry::new(addr(1));
        assert_eq!(check_admission(&reg, &addr(9)), Ok(()));
    }

    #[test]
    fn blacklisted_sender_is_always_denied() {
        let owner = addr(1);
        let mut reg = AccessControlRegistry::new(owner);
        reg.block_account(&owner, addr(9), true).unwrap();
        assert_eq!(check_admission(&reg, &addr(9)), Err(GateError::Blocked(addr(9))));
        // Even a gas manager stays denied while blacklisted.
        reg.set_gas_managers(&owner, &[addr(9)], true).unwrap();
        reg.enable_gas_manage(&owner, true).unwrap();
        assert_eq!(check_admission(&reg, &addr(9)), Err(GateError::Blocked(addr(9))));
    }

    #[test]
    fn gas_manage_requires_a_role_and_is_reversible() {
        let owner = addr(1);
        let mut reg = AccessControlRegistry::new(owner);
        reg.enable_gas_manage(&owner, true).unwrap();
        assert_eq!(
            check_admission(&reg, &addr(9)),
            Err(GateError::NotGasPermitted(addr(9)))
        );

        reg.set_gas_users(&owner, &[addr(9)], true).unwrap();
        assert_eq!(check_admission(&reg, &addr(9)), Ok(()));

        reg.set_gas_users(&owner, &[addr(9)], false).unwrap();
        reg.set_gas_managers(&owner, &[addr(9)], true).unwrap();
        assert_eq!(check_admission(&reg, &addr(9)), Ok(()));

        // Disabling enforcement re-admits prior denials.
        reg.set_gas_managers(&owner, &[addr(9)], false).unwrap();
        assert!(check_admission(&reg, &addr(9)).is_err());
        reg.enable_gas_manage(&owner, false).unwrap();
        assert_eq!(check_admission(&reg, &addr(9)), Ok(()));
    }
}
