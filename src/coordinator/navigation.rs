//! Declarative navigation effects.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::arena::CoordinatorId;
use super::lifecycle::UnitId;
use super::mailbox::{Event, Mailbox};
use super::navigator::Flow;
use super::step::{Step, StepProvider, StepStream};

/// Deferred operation carried by [`Navigation::Async`].
pub type AsyncOperation<S> = Box<dyn FnOnce(Resolver<S>) + Send>;

/// What a coordinator wants done in response to a step.
pub enum Navigation<S: Step> {
    /// Nothing to do.
    Undefined,

    /// Bind the coordinator's lifetime to `root`. Must be the first effect a
    /// coordinator processes, and only once.
    StartFlow { root: UnitId },

    /// Explicitly declare that this interaction subscribes nothing.
    SubscribeNoSteps,

    /// Receive steps from `steps` until `presenting` reaches end of life.
    SubscribeSteps {
        steps: StepStream<S>,
        presenting: UnitId,
    },

    /// Attach `child` under the current coordinator and dispatch `step` into it.
    StartChildFlow { child: Flow<S>, step: S },

    EndFlow,

    /// End the flow, then hand `step` to the parent, if there still is one.
    EndFlowAndForwardToParent(S),

    /// Several effects, interpreted strictly in order.
    Many(Vec<Navigation<S>>),

    /// Effect decided later. The operation gets a [`Resolver`] to report it.
    Async(AsyncOperation<S>),
}

impl<S: Step> Navigation<S> {
    pub fn subscribe<P>(provider: &P, presenting: UnitId) -> Self
    where
        P: StepProvider<S> + ?Sized,
    {
        Navigation::SubscribeSteps {
            steps: provider.steps(),
            presenting,
        }
    }

    pub fn start_child(child: Flow<S>, step: S) -> Self {
        Navigation::StartChildFlow { child, step }
    }

    pub fn deferred<F>(operation: F) -> Self
    where
        F: FnOnce(Resolver<S>) + Send + 'static,
    {
        Navigation::Async(Box::new(operation))
    }

    pub fn many(navigations: impl IntoIterator<Item = Navigation<S>>) -> Self {
        Navigation::Many(navigations.into_iter().collect())
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Navigation::Undefined => "undefined",
            Navigation::StartFlow { .. } => "start_flow",
            Navigation::SubscribeNoSteps => "subscribe_no_steps",
            Navigation::SubscribeSteps { .. } => "subscribe_steps",
            Navigation::StartChildFlow { .. } => "start_child_flow",
            Navigation::EndFlow => "end_flow",
            Navigation::EndFlowAndForwardToParent(_) => "end_flow_and_forward_to_parent",
            Navigation::Many(_) => "many",
            Navigation::Async(_) => "async",
        }
    }
}

impl<S: Step> fmt::Debug for Navigation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Navigation::StartFlow { root } => write!(f, "StartFlow({})", root),
            Navigation::SubscribeSteps { presenting, .. } => {
                write!(f, "SubscribeSteps(presenting: {})", presenting)
            }
            Navigation::StartChildFlow { child, .. } => {
                write!(f, "StartChildFlow({})", child.name())
            }
            Navigation::Many(navigations) => f.debug_list().entries(navigations).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

/// Where a resolution goes, depending on whether the operation has returned.
enum Delivery<S: Step> {
    /// Operation still running: keep the result for inline interpretation.
    Inline(Option<Navigation<S>>),
    /// Operation returned: post the result to the navigator.
    Posted,
}

pub(crate) struct ResolverSlot<S: Step> {
    delivery: Mutex<Delivery<S>>,
}

impl<S: Step> ResolverSlot<S> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            delivery: Mutex::new(Delivery::Inline(None)),
        })
    }

    /// Called once the operation returns. Yields a navigation resolved
    /// synchronously during the call, if any.
    pub(crate) fn finish_inline(&self) -> Option<Navigation<S>> {
        let mut delivery = self.delivery.lock();
        match std::mem::replace(&mut *delivery, Delivery::Posted) {
            Delivery::Inline(navigation) => navigation,
            Delivery::Posted => None,
        }
    }
}

/// Single-shot continuation handed to a deferred operation.
///
/// `resolve` consumes the resolver, so a navigation can be reported at most
/// once. Dropping it without resolving is allowed and means "no effect".
pub struct Resolver<S: Step> {
    coordinator: CoordinatorId,
    slot: Arc<ResolverSlot<S>>,
    mailbox: Mailbox<S>,
    alive: Arc<AtomicBool>,
}

impl<S: Step> Resolver<S> {
    pub(crate) fn new(
        coordinator: CoordinatorId,
        slot: Arc<ResolverSlot<S>>,
        mailbox: Mailbox<S>,
        alive: Arc<AtomicBool>,
    ) -> Self {
        Self {
            coordinator,
            slot,
            mailbox,
            alive,
        }
    }

    pub fn coordinator(&self) -> CoordinatorId {
        self.coordinator
    }

    /// True once the owning coordinator has ended; the result would be dropped.
    pub fn is_cancelled(&self) -> bool {
        !self.alive.load(Ordering::Acquire)
    }

    pub fn resolve(self, navigation: Navigation<S>) {
        let mut delivery = self.slot.delivery.lock();
        match &mut *delivery {
            Delivery::Inline(slot) => {
                *slot = Some(navigation);
            }
            Delivery::Posted => {
                drop(delivery);
                self.mailbox.post(Event::Resolved {
                    coordinator: self.coordinator,
                    navigation,
                });
            }
        }
    }
}

impl<S: Step> fmt::Debug for Resolver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("coordinator", &self.coordinator)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
