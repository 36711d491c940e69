//! The seam between role composition and wherever role definitions live.
//!
//! `thand-config`'s `ConfigRoot` implements this trait rather than
//! `thand-roles` depending on `thand-config`, so the composer never needs to
//! know about configuration reload, merge-patch, or sync state — it only
//! needs a name-keyed lookup of `Role` values (grounded on the seam
//! `r2e-openfga::registry::EngineRegistry` draws between "registry of
//! constructors" and "caller that resolves by name").

use thand_core::Role;

/// Read-only access to the set of known role definitions.
pub trait RoleLookup: Send + Sync {
    /// Looks up a role definition by its `name`. Provider-prefixed names
    /// (e.g. `"aws-prod:AdministratorAccess"`) are never resolved here —
    /// those are handled in [`crate::filter`] before the inherited name ever
    /// reaches this trait.
    fn get_role(&self, name: &str) -> Option<Role>;
}
