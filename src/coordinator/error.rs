//! Contract violations raised by the navigation interpreter.
//!
//! These are programming errors, not runtime conditions. They are logged and
//! then abort the current execution.

use thiserror::Error;

use super::arena::CoordinatorId;
use super::lifecycle::UnitId;
use crate::host::HostError;

#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("{name} ({coordinator}) bound root {requested} but is already bound to {existing}")]
    RootBoundTwice {
        coordinator: CoordinatorId,
        name: &'static str,
        existing: UnitId,
        requested: UnitId,
    },

    #[error("{name} ({coordinator}) issued start_flow after processing other effects")]
    StartFlowNotFirst {
        coordinator: CoordinatorId,
        name: &'static str,
    },

    #[error("{name} ({coordinator}) cannot end while its root {root} still presents {overlay}")]
    OverlayOnRoot {
        coordinator: CoordinatorId,
        name: &'static str,
        root: UnitId,
        overlay: UnitId,
    },

    #[error("{name} ({coordinator}) failed to dismiss its root {root}: {source}")]
    DismissFailed {
        coordinator: CoordinatorId,
        name: &'static str,
        root: UnitId,
        #[source]
        source: HostError,
    },
}

impl ContractViolation {
    pub(crate) fn raise(self) -> ! {
        tracing::error!(violation = %self, "navigation contract violated");
        panic!("navigation contract violated: {}", self);
    }
}
