use thiserror::Error;

use crate::coordinator::UnitId;

/// Errors reported by a presentation host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("unit {0} is not known to the host")]
    UnknownUnit(UnitId),

    #[error("unit {0} is not presented, pushed or installed as root")]
    NotPresented(UnitId),

    #[error("unit {over} already presents {presented}")]
    AlreadyPresenting { over: UnitId, presented: UnitId },

    #[error("unit {0} is not a stack")]
    NotAStack(UnitId),

    #[error("unit {0} was already released")]
    Released(UnitId),

    #[error("unit {0} is already shown")]
    AlreadyShown(UnitId),

    #[error("stack {0} has nothing to pop")]
    CannotPop(UnitId),
}
