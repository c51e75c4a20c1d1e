//! Steps and the streams that carry them.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

use super::mailbox::{Event, Mailbox, SubscriptionId};

/// Marker trait for step values.
///
/// A step says "something happened that needs a navigation decision":
/// - User actions (a tapped button, a submitted form)
/// - Domain events (login finished, data arrived)
/// - Requests forwarded from a finished child flow
///
/// Applications usually define one enum of step families and let each
/// coordinator match the families it understands.
pub trait Step: Clone + Send + 'static {}

/// Anything that exposes a stream of steps, typically a view-model.
pub trait StepProvider<S: Step> {
    fn steps(&self) -> StepStream<S>;
}

struct Subscriber<S: Step> {
    id: SubscriptionId,
    mailbox: Mailbox<S>,
}

type Subscribers<S> = Arc<Mutex<Vec<Subscriber<S>>>>;

/// Source end of a step stream, owned by a view-model.
///
/// Each [`emit`](Self::emit) reaches every subscriber that is still attached,
/// in call order.
pub struct StepEmitter<S: Step> {
    subscribers: Subscribers<S>,
}

impl<S: Step> Clone for StepEmitter<S> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<S: Step> Default for StepEmitter<S> {
    fn default() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<S: Step> StepEmitter<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `step` to every live subscriber. Returns how many got it.
    pub fn emit(&self, step: S) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|subscriber| !subscriber.mailbox.is_closed());
        let mut delivered = 0;
        for subscriber in subscribers.iter() {
            let event = Event::Step {
                subscription: subscriber.id,
                step: step.clone(),
            };
            if subscriber.mailbox.post(event) {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn stream(&self) -> StepStream<S> {
        StepStream {
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<S: Step> fmt::Debug for StepEmitter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepEmitter")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<S: Step> StepProvider<S> for StepEmitter<S> {
    fn steps(&self) -> StepStream<S> {
        self.stream()
    }
}

/// Subscribable end of a step stream.
pub struct StepStream<S: Step> {
    subscribers: Subscribers<S>,
}

impl<S: Step> Clone for StepStream<S> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<S: Step> StepStream<S> {
    pub(crate) fn attach(&self, id: SubscriptionId, mailbox: Mailbox<S>) -> Subscription {
        self.subscribers.lock().push(Subscriber { id, mailbox });
        let subscribers: Weak<Mutex<Vec<Subscriber<S>>>> = Arc::downgrade(&self.subscribers);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(subscribers) = subscribers.upgrade() {
                    subscribers.lock().retain(|subscriber| subscriber.id != id);
                }
            })),
        }
    }
}

/// Detaches its subscriber from the stream when dropped.
pub(crate) struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::mailbox;

    #[derive(Clone, Debug, PartialEq)]
    struct Ping(u32);

    impl Step for Ping {}

    #[test]
    fn emit_without_subscribers_delivers_nothing() {
        let emitter = StepEmitter::new();
        assert_eq!(emitter.emit(Ping(1)), 0);
    }

    #[test]
    fn emit_reaches_attached_subscriber_in_order() {
        let emitter = StepEmitter::new();
        let (mailbox, mut inbox) = mailbox::channel();
        let _subscription = emitter.steps().attach(SubscriptionId(7), mailbox);

        emitter.emit(Ping(1));
        emitter.emit(Ping(2));

        let mut seen = Vec::new();
        while let Ok(event) = inbox.try_recv() {
            match event {
                Event::Step { subscription, step } => {
                    assert_eq!(subscription, SubscriptionId(7));
                    seen.push(step);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(seen, vec![Ping(1), Ping(2)]);
    }

    #[test]
    fn dropping_subscription_detaches() {
        let emitter = StepEmitter::new();
        let (mailbox, _inbox) = mailbox::channel();
        let subscription = emitter.stream().attach(SubscriptionId(1), mailbox);
        assert_eq!(emitter.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(emitter.subscriber_count(), 0);
        assert_eq!(emitter.emit(Ping(3)), 0);
    }

    #[test]
    fn closed_mailboxes_are_pruned() {
        let emitter = StepEmitter::new();
        let (mailbox, inbox) = mailbox::channel();
        let _subscription = emitter.stream().attach(SubscriptionId(1), mailbox);
        drop(inbox);

        assert_eq!(emitter.emit(Ping(4)), 0);
        assert_eq!(emitter.subscriber_count(), 0);
    }
}
