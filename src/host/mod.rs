//! Presentation host: the collaborator that actually shows and hides units.
//!
//! The coordinator core never draws anything. Concrete flows call a host to
//! present, push and dismiss units, and the host reports every unit it closes
//! through [`Lifecycles::release`].

mod error;
mod headless;

pub use error::HostError;
pub use headless::HeadlessHost;

use crate::coordinator::{Lifecycles, UnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// A single screen.
    Screen,
    /// A container that screens are pushed onto.
    Stack,
}

/// A visual unit handed to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub title: String,
    pub kind: UnitKind,
}

impl Unit {
    pub fn screen(title: impl Into<String>) -> Self {
        Self {
            id: UnitId::next(),
            title: title.into(),
            kind: UnitKind::Screen,
        }
    }

    pub fn stack(title: impl Into<String>) -> Self {
        Self {
            id: UnitId::next(),
            title: title.into(),
            kind: UnitKind::Stack,
        }
    }
}

/// Operations a presentation layer offers to coordinators.
///
/// Implementations must call [`Lifecycles::release`] on the registry returned
/// by [`lifecycles`](Self::lifecycles) for every unit they close, whether the
/// close was requested through this trait or by the user.
pub trait PresentationHost: Send {
    fn lifecycles(&self) -> &Lifecycles;

    /// Install `unit` as the window root, closing the previous root.
    fn set_root(&mut self, unit: Unit) -> Result<(), HostError>;

    /// Show `unit` modally over `over`.
    fn present(&mut self, over: UnitId, unit: Unit) -> Result<(), HostError>;

    /// Push `unit` onto the stack `stack`.
    fn push(&mut self, stack: UnitId, unit: Unit) -> Result<(), HostError>;

    /// Close `unit` along with everything it contains or presents.
    fn dismiss(&mut self, unit: UnitId) -> Result<(), HostError>;

    /// The unit currently presented modally over `unit`, if any.
    fn presented(&self, unit: UnitId) -> Option<UnitId>;
}
