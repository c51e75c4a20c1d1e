//! End-of-life signals for presented units.
//!
//! A presentation host calls [`Lifecycles::release`] when it closes a unit.
//! Anything that asked for that unit's [`EndOfLife`] is notified exactly once.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_UNIT: AtomicU64 = AtomicU64::new(1);

/// Opaque handle for a presented visual unit (a screen, a stack, an alert).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    /// Mint a process-wide unique unit handle.
    pub fn next() -> Self {
        UnitId(NEXT_UNIT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

type Listener = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct SignalState {
    released: bool,
    listeners: Vec<Listener>,
}

struct UnitSignal {
    unit: UnitId,
    state: Mutex<SignalState>,
}

impl UnitSignal {
    fn new(unit: UnitId, released: bool) -> Self {
        Self {
            unit,
            state: Mutex::new(SignalState {
                released,
                listeners: Vec::new(),
            }),
        }
    }

    /// Flip to released and hand back the listeners to notify.
    fn fire(&self) -> Option<Vec<Listener>> {
        let mut state = self.state.lock();
        if state.released {
            return None;
        }
        state.released = true;
        Some(std::mem::take(&mut state.listeners))
    }
}

/// One-shot end-of-life stream for a single unit.
///
/// Clones and redundant [`Lifecycles::end_of_life`] requests for the same
/// unit all observe the same underlying emission.
#[derive(Clone)]
pub struct EndOfLife {
    signal: Arc<UnitSignal>,
}

impl EndOfLife {
    pub fn unit(&self) -> UnitId {
        self.signal.unit
    }

    pub fn is_released(&self) -> bool {
        self.signal.state.lock().released
    }

    /// Run `listener` when the unit is released.
    ///
    /// If the unit is already gone the listener runs immediately.
    pub fn listen<F>(&self, listener: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.signal.state.lock();
        if state.released {
            drop(state);
            listener();
            return;
        }
        state.listeners.push(Box::new(listener));
    }
}

impl fmt::Debug for EndOfLife {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndOfLife")
            .field("unit", &self.signal.unit)
            .field("released", &self.is_released())
            .finish()
    }
}

#[derive(Default)]
struct Registry {
    pending: HashMap<UnitId, Arc<UnitSignal>>,
    /// Every unit ever released. Never pruned: a late `end_of_life` request
    /// or a host re-showing a closed unit must still see it as released.
    /// Costs one id per closed unit for the life of the registry.
    released: HashSet<UnitId>,
}

/// Shared registry of unit end-of-life signals.
///
/// Cheap to clone; every clone talks to the same registry.
#[derive(Clone, Default)]
pub struct Lifecycles {
    inner: Arc<Mutex<Registry>>,
}

impl Lifecycles {
    pub fn new() -> Self {
        Self::default()
    }

    /// The end-of-life stream for `unit`.
    pub fn end_of_life(&self, unit: UnitId) -> EndOfLife {
        let mut registry = self.inner.lock();
        if registry.released.contains(&unit) {
            return EndOfLife {
                signal: Arc::new(UnitSignal::new(unit, true)),
            };
        }
        let signal = registry
            .pending
            .entry(unit)
            .or_insert_with(|| Arc::new(UnitSignal::new(unit, false)));
        EndOfLife {
            signal: Arc::clone(signal),
        }
    }

    /// Announce that `unit` is gone. Returns `false` if it already was.
    pub fn release(&self, unit: UnitId) -> bool {
        let signal = {
            let mut registry = self.inner.lock();
            if !registry.released.insert(unit) {
                return false;
            }
            registry.pending.remove(&unit)
        };

        let Some(signal) = signal else {
            tracing::trace!(%unit, "unit released with no listeners");
            return true;
        };

        // Listeners run outside every lock; they may post to mailboxes or
        // query this registry again.
        let listeners = signal.fire().unwrap_or_default();
        tracing::debug!(%unit, listeners = listeners.len(), "unit released");
        for listener in listeners {
            listener();
        }
        true
    }

    pub fn is_released(&self, unit: UnitId) -> bool {
        self.inner.lock().released.contains(&unit)
    }

    /// Number of units released so far. Grows by one per closed unit.
    pub fn released_count(&self) -> usize {
        self.inner.lock().released.len()
    }

    /// Number of units with a live end-of-life signal still waiting.
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }
}
