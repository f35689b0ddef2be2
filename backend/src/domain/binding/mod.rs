//! Binding extraction and reconciliation.

mod extract;
mod reconcile;

pub use extract::{BINDING_KEY_ATTR, BINDING_TYPE_ATTR, extract};
pub use reconcile::{ReconcilePlan, reconcile};
