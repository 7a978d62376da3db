//! Access domain - the form-access guard and its client-side cache.
//!
//! Nothing here grants access on its own authority. The guard only decides
//! whether gated forms are shown; every submission is re-checked against
//! the ledger when it happens.

mod access_state;
mod guard;

pub use access_state::AccessState;
pub use guard::{
    AccessDecision, AccessEvaluator, AccessInputs, AllowReason, BlockReason, GuardState,
};
