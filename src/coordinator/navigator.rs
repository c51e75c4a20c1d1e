//! The coordinator tree and the navigation interpreter.
//!
//! A [`Navigator`] owns every coordinator in an arena. Parent and child links
//! are plain handles, so the tree has no ownership cycles. Steps enter either
//! synchronously (bootstrap, child start, forward-to-parent) or through the
//! inbox (provider emissions, end-of-life events, late async resolutions).

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::arena::{Arena, CoordinatorId};
use super::context::FlowContext;
use super::error::ContractViolation;
use super::lifecycle::{Lifecycles, UnitId};
use super::mailbox::{self, Event, Mailbox, SubscriptionId};
use super::navigation::{AsyncOperation, Navigation, Resolver, ResolverSlot};
use super::step::{Step, StepStream, Subscription};
use crate::host::PresentationHost;

/// Navigation logic for one flow segment.
///
/// Implementations map each incoming step to a [`Navigation`]. Steps a
/// coordinator does not recognise should map to [`Navigation::Undefined`].
pub trait Coordinator<S: Step>: Send + 'static {
    fn navigate(&mut self, step: S, cx: &mut FlowContext<'_>) -> Navigation<S> {
        let _ = (step, cx);
        Navigation::Undefined
    }

    /// Name used in logs and diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn into_flow(self) -> Flow<S>
    where
        Self: Sized,
    {
        Flow::new(self)
    }
}

type Completion = Box<dyn FnOnce() + Send>;

/// A coordinator ready to be started, with an optional end-of-flow callback.
pub struct Flow<S: Step> {
    coordinator: Box<dyn Coordinator<S>>,
    on_end_flow: Option<Completion>,
}

impl<S: Step> Flow<S> {
    pub fn new(coordinator: impl Coordinator<S>) -> Self {
        Self {
            coordinator: Box::new(coordinator),
            on_end_flow: None,
        }
    }

    /// Run `callback` once, when this flow ends.
    pub fn on_end_flow<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_end_flow = Some(Box::new(callback));
        self
    }

    pub fn name(&self) -> &'static str {
        self.coordinator.name()
    }
}

impl<S: Step> fmt::Debug for Flow<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("coordinator", &self.name())
            .field("on_end_flow", &self.on_end_flow.is_some())
            .finish()
    }
}

struct ActiveSubscription {
    id: SubscriptionId,
    presenting: UnitId,
    _guard: Subscription,
}

struct Node<S: Step> {
    /// Taken out while the coordinator is inside `navigate`.
    coordinator: Option<Box<dyn Coordinator<S>>>,
    name: &'static str,
    on_end_flow: Option<Completion>,
    parent: Option<CoordinatorId>,
    children: Vec<CoordinatorId>,
    subscriptions: Vec<ActiveSubscription>,
    root: Option<UnitId>,
    /// Set once the node processed any effect; `StartFlow` must come first.
    started: bool,
    alive: Arc<AtomicBool>,
}

impl<S: Step> Node<S> {
    fn new(flow: Flow<S>, parent: Option<CoordinatorId>) -> Self {
        let name = flow.coordinator.name();
        Self {
            coordinator: Some(flow.coordinator),
            name,
            on_end_flow: flow.on_end_flow,
            parent,
            children: Vec::new(),
            subscriptions: Vec::new(),
            root: None,
            started: false,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }
}

/// Owns a forest of coordinators and interprets their navigations.
///
/// All interpretation runs on whichever task drives the navigator; there is
/// no internal locking around the tree.
pub struct Navigator<S: Step, H: PresentationHost> {
    arena: Arena<Node<S>>,
    host: H,
    lifecycles: Lifecycles,
    mailbox: Mailbox<S>,
    inbox: mpsc::UnboundedReceiver<Event<S>>,
    owners: HashMap<SubscriptionId, CoordinatorId>,
    next_subscription: u64,
}

impl<S: Step, H: PresentationHost> Navigator<S, H> {
    pub fn new(host: H) -> Self {
        let lifecycles = host.lifecycles().clone();
        let (mailbox, inbox) = mailbox::channel();
        Self {
            arena: Arena::new(),
            host,
            lifecycles,
            mailbox,
            inbox,
            owners: HashMap::new(),
            next_subscription: 0,
        }
    }

    /// Start a parentless coordinator tree by dispatching `step` into `flow`.
    ///
    /// For coordinators with a parent, return
    /// [`Navigation::StartChildFlow`] from the parent instead.
    pub fn start(&mut self, flow: Flow<S>, step: S) -> CoordinatorId {
        let id = self.arena.insert(Node::new(flow, None));
        tracing::info!(coordinator = %id, name = self.name_of(id), "starting root flow");
        self.dispatch(id, step);
        id
    }

    /// Handle every event already queued. Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.inbox.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Handle events as they arrive until every flow has ended.
    pub async fn run(&mut self) {
        while !self.is_empty() {
            let Some(event) = self.inbox.recv().await else {
                break;
            };
            self.handle(event);
        }
        tracing::info!("all flows ended");
    }

    pub fn contains(&self, id: CoordinatorId) -> bool {
        self.arena.contains(id)
    }

    pub fn parent(&self, id: CoordinatorId) -> Option<CoordinatorId> {
        self.arena.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: CoordinatorId) -> &[CoordinatorId] {
        self.arena
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn root_unit(&self, id: CoordinatorId) -> Option<UnitId> {
        self.arena.get(id).and_then(|node| node.root)
    }

    /// Units whose end of life will cancel one of this coordinator's
    /// subscriptions, in subscription order.
    pub fn subscribed_units(&self, id: CoordinatorId) -> Vec<UnitId> {
        self.arena
            .get(id)
            .map(|node| node.subscriptions.iter().map(|s| s.presenting).collect())
            .unwrap_or_default()
    }

    pub fn subscription_count(&self, id: CoordinatorId) -> usize {
        self.arena
            .get(id)
            .map(|node| node.subscriptions.len())
            .unwrap_or(0)
    }

    /// Coordinators without a parent.
    pub fn roots(&self) -> Vec<CoordinatorId> {
        self.arena
            .ids()
            .filter(|id| self.parent(*id).is_none())
            .collect()
    }

    /// Number of live coordinators across all trees.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn lifecycles(&self) -> &Lifecycles {
        &self.lifecycles
    }

    fn name_of(&self, id: CoordinatorId) -> &'static str {
        self.arena.get(id).map(|node| node.name).unwrap_or("<ended>")
    }

    fn handle(&mut self, event: Event<S>) {
        tracing::trace!(?event, "handling event");
        match event {
            Event::Step { subscription, step } => match self.owners.get(&subscription) {
                Some(&owner) => self.dispatch(owner, step),
                None => {
                    tracing::trace!(%subscription, "step arrived after subscription ended");
                }
            },
            Event::SubscriptionEnded(subscription) => self.end_subscription(subscription),
            Event::RootReleased(id) => {
                if self.contains(id) {
                    tracing::debug!(coordinator = %id, name = self.name_of(id), "root released");
                }
                self.teardown(id);
            }
            Event::Resolved {
                coordinator,
                navigation,
            } => {
                if self.contains(coordinator) {
                    self.interpret(coordinator, navigation);
                } else {
                    tracing::debug!(
                        %coordinator,
                        kind = navigation.kind(),
                        "async navigation resolved after its flow ended, dropped"
                    );
                }
            }
        }
    }

    /// Ask the coordinator for a navigation and interpret it.
    fn dispatch(&mut self, id: CoordinatorId, step: S) {
        let Some(node) = self.arena.get_mut(id) else {
            tracing::debug!(coordinator = %id, "step for ended coordinator dropped");
            return;
        };
        let Some(mut coordinator) = node.coordinator.take() else {
            tracing::warn!(coordinator = %id, "coordinator is already navigating, step dropped");
            return;
        };

        let navigation = {
            let mut cx = FlowContext::new(id, &mut self.host);
            coordinator.navigate(step, &mut cx)
        };
        tracing::debug!(coordinator = %id, ?navigation, "navigate");

        if let Some(node) = self.arena.get_mut(id) {
            node.coordinator = Some(coordinator);
        }
        self.interpret(id, navigation);
    }

    /// Effects past the liveness guard below only ever see live
    /// coordinators; their own arena lookups cannot miss.
    fn interpret(&mut self, id: CoordinatorId, navigation: Navigation<S>) {
        match navigation {
            Navigation::Undefined | Navigation::SubscribeNoSteps => {}
            Navigation::Many(navigations) => {
                for navigation in navigations {
                    self.interpret(id, navigation);
                }
            }
            effect if !self.contains(id) => {
                tracing::debug!(coordinator = %id, kind = effect.kind(), "effect for ended coordinator skipped");
            }
            Navigation::StartFlow { root } => self.bind_root(id, root),
            Navigation::SubscribeSteps { steps, presenting } => {
                self.subscribe(id, steps, presenting)
            }
            Navigation::StartChildFlow { child, step } => self.start_child(id, child, step),
            Navigation::EndFlow => self.end_flow(id),
            Navigation::EndFlowAndForwardToParent(step) => {
                let parent = self.parent(id);
                self.end_flow(id);
                match parent.filter(|parent| self.contains(*parent)) {
                    Some(parent) => self.dispatch(parent, step),
                    None => {
                        tracing::debug!(coordinator = %id, "no parent to forward to");
                    }
                }
            }
            Navigation::Async(operation) => self.defer(id, operation),
        }
    }

    /// Mark the node as having processed an effect. Returns the node.
    fn begin_effect(&mut self, id: CoordinatorId) -> Option<&mut Node<S>> {
        let node = self.arena.get_mut(id)?;
        node.started = true;
        Some(node)
    }

    fn bind_root(&mut self, id: CoordinatorId, root: UnitId) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        if let Some(existing) = node.root {
            ContractViolation::RootBoundTwice {
                coordinator: id,
                name: node.name,
                existing,
                requested: root,
            }
            .raise();
        }
        if node.started {
            ContractViolation::StartFlowNotFirst {
                coordinator: id,
                name: node.name,
            }
            .raise();
        }
        node.started = true;
        node.root = Some(root);
        tracing::debug!(coordinator = %id, name = node.name, %root, "flow bound to root");

        let mailbox = self.mailbox.clone();
        self.lifecycles.end_of_life(root).listen(move || {
            mailbox.post(Event::RootReleased(id));
        });
    }

    fn subscribe(&mut self, id: CoordinatorId, steps: StepStream<S>, presenting: UnitId) {
        let subscription = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        let guard = steps.attach(subscription, self.mailbox.clone());

        let Some(node) = self.begin_effect(id) else {
            return;
        };
        node.subscriptions.push(ActiveSubscription {
            id: subscription,
            presenting,
            _guard: guard,
        });
        self.owners.insert(subscription, id);
        tracing::debug!(coordinator = %id, %subscription, %presenting, "subscribed to steps");

        let mailbox = self.mailbox.clone();
        self.lifecycles.end_of_life(presenting).listen(move || {
            mailbox.post(Event::SubscriptionEnded(subscription));
        });
    }

    fn end_subscription(&mut self, subscription: SubscriptionId) {
        let Some(owner) = self.owners.remove(&subscription) else {
            return;
        };
        if let Some(node) = self.arena.get_mut(owner) {
            node.subscriptions.retain(|active| active.id != subscription);
            tracing::debug!(coordinator = %owner, %subscription, "subscription ended");
        }
    }

    fn start_child(&mut self, parent: CoordinatorId, child: Flow<S>, step: S) {
        let child_name = child.name();
        let child_id = self.arena.insert(Node::new(child, Some(parent)));
        if let Some(node) = self.begin_effect(parent) {
            node.children.push(child_id);
        }
        tracing::info!(%parent, child = %child_id, name = child_name, "starting child flow");
        self.dispatch(child_id, step);
    }

    fn end_flow(&mut self, id: CoordinatorId) {
        let Some(node) = self.begin_effect(id) else {
            return;
        };
        let name = node.name;
        let Some(root) = node.root else {
            self.teardown(id);
            return;
        };

        if self.lifecycles.is_released(root) {
            tracing::debug!(coordinator = %id, %root, "root already released, teardown pending");
            return;
        }
        if let Some(overlay) = self.host.presented(root) {
            ContractViolation::OverlayOnRoot {
                coordinator: id,
                name,
                root,
                overlay,
            }
            .raise();
        }

        // The release of the root re-enters here as `RootReleased` and
        // performs the actual teardown.
        tracing::debug!(coordinator = %id, name, %root, "dismissing root to end flow");
        if let Err(source) = self.host.dismiss(root) {
            ContractViolation::DismissFailed {
                coordinator: id,
                name,
                root,
                source,
            }
            .raise();
        }
    }

    /// Detach the node from its parent, drop its state and run its completion.
    fn teardown(&mut self, id: CoordinatorId) {
        let Some(node) = self.arena.remove(id) else {
            return;
        };
        node.alive.store(false, Ordering::Release);

        if let Some(parent) = node.parent.and_then(|parent| self.arena.get_mut(parent)) {
            parent.children.retain(|child| *child != id);
        }
        for subscription in &node.subscriptions {
            self.owners.remove(&subscription.id);
        }

        let mut abandoned = 0;
        for child in node.children {
            abandoned += self.reclaim(child);
        }
        tracing::info!(coordinator = %id, name = node.name, abandoned, "flow ended");

        if let Some(on_end_flow) = node.on_end_flow {
            on_end_flow();
        }
    }

    /// Drop an abandoned subtree without running completions.
    fn reclaim(&mut self, id: CoordinatorId) -> usize {
        let Some(node) = self.arena.remove(id) else {
            return 0;
        };
        node.alive.store(false, Ordering::Release);
        for subscription in &node.subscriptions {
            self.owners.remove(&subscription.id);
        }
        tracing::debug!(coordinator = %id, name = node.name, "abandoned flow reclaimed");

        let mut reclaimed = 1;
        for child in node.children {
            reclaimed += self.reclaim(child);
        }
        reclaimed
    }

    fn defer(&mut self, id: CoordinatorId, operation: AsyncOperation<S>) {
        // Not an effect itself: a resolved `StartFlow` may still come first.
        let Some(alive) = self.arena.get(id).map(|node| Arc::clone(&node.alive)) else {
            return;
        };
        let slot = ResolverSlot::new();
        let resolver = Resolver::new(id, Arc::clone(&slot), self.mailbox.clone(), alive);

        operation(resolver);

        if let Some(navigation) = slot.finish_inline() {
            tracing::trace!(coordinator = %id, "async navigation resolved inline");
            self.interpret(id, navigation);
        }
    }
}
