//! Admin gate
//!
//! Holds the single admin identity and decides whether a caller may perform a
//! gated write. The gate is a plain value: the registry clones it, applies a
//! transfer to the clone, persists, and only then swaps it in.

use attest_core::{PrincipalId, RegistryError, Result};
use serde::{Deserialize, Serialize};

/// Single-admin authorization gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminGate {
    admin: PrincipalId,
}

impl AdminGate {
    /// Create a gate with the given admin
    pub fn new(admin: PrincipalId) -> Self {
        Self { admin }
    }

    /// Current admin identity
    pub fn admin(&self) -> &PrincipalId {
        &self.admin
    }

    /// Whether `caller` is the current admin
    pub fn is_admin(&self, caller: &PrincipalId) -> bool {
        *caller == self.admin
    }

    /// Reject `caller` unless it is the current admin.
    ///
    /// `operation` only labels the rejection for logs and error messages.
    pub fn authorize(&self, caller: &PrincipalId, operation: &str) -> Result<()> {
        if self.is_admin(caller) {
            return Ok(());
        }

        tracing::warn!(%caller, operation, "Rejected gated write from non-admin caller");
        Err(RegistryError::not_authorized(format!(
            "{caller} may not perform {operation}"
        )))
    }

    /// Hand the admin role to `new_admin`, returning the previous admin.
    ///
    /// On error the gate is unchanged.
    pub fn transfer_admin(
        &mut self,
        caller: &PrincipalId,
        new_admin: PrincipalId,
    ) -> Result<PrincipalId> {
        self.authorize(caller, "transfer_admin")?;
        Ok(std::mem::replace(&mut self.admin, new_admin))
    }
}
