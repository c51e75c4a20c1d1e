//! The navigator's inbox.
//!
//! Everything that reaches a navigator from outside the current call stack
//! (provider emissions, end-of-life notifications, late async resolutions)
//! goes through one FIFO queue, so delivery order is emission order.

use std::fmt;
use tokio::sync::mpsc;

use super::arena::CoordinatorId;
use super::navigation::Navigation;
use super::step::Step;

/// Identifies one `SubscribeSteps` effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

pub(crate) enum Event<S: Step> {
    Step {
        subscription: SubscriptionId,
        step: S,
    },
    SubscriptionEnded(SubscriptionId),
    RootReleased(CoordinatorId),
    Resolved {
        coordinator: CoordinatorId,
        navigation: Navigation<S>,
    },
}

impl<S: Step> fmt::Debug for Event<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Step { subscription, .. } => write!(f, "Step({})", subscription),
            Event::SubscriptionEnded(id) => write!(f, "SubscriptionEnded({})", id),
            Event::RootReleased(id) => write!(f, "RootReleased({})", id),
            Event::Resolved {
                coordinator,
                navigation,
            } => write!(f, "Resolved({}, {:?})", coordinator, navigation),
        }
    }
}

pub(crate) struct Mailbox<S: Step> {
    tx: mpsc::UnboundedSender<Event<S>>,
}

impl<S: Step> Clone for Mailbox<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: Step> Mailbox<S> {
    /// Queue an event. Returns `false` once the navigator is gone.
    pub(crate) fn post(&self, event: Event<S>) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(err) => {
                tracing::trace!(event = ?err.0, "mailbox closed, event dropped");
                false
            }
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub(crate) fn channel<S: Step>() -> (Mailbox<S>, mpsc::UnboundedReceiver<Event<S>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Mailbox { tx }, rx)
}
