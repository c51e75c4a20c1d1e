//! Reactive coordinator primitives.
//!
//! Navigation logic lives in coordinators, not in views.
//!
//! # Architecture
//!
//! ```text
//! View ──→ ViewModel ──Step──→ Coordinator::navigate ──→ Navigation
//!                                   ↑                        │
//!                                   └──── Navigator ←────────┘
//! ```
//!
//! - **Step**: something happened that needs a navigation decision
//! - **StepProvider**: a view-model exposing a stream of steps
//! - **Navigation**: declarative description of the effects to perform
//! - **Lifecycles**: one-shot end-of-life signals for presented units
//! - **Navigator**: owns the coordinator tree and interprets navigations

mod arena;
mod context;
mod error;
mod lifecycle;
mod mailbox;
mod navigation;
mod navigator;
mod step;

pub use arena::CoordinatorId;
pub use context::FlowContext;
pub use error::ContractViolation;
pub use lifecycle::{EndOfLife, Lifecycles, UnitId};
pub use navigation::{AsyncOperation, Navigation, Resolver};
pub use navigator::{Coordinator, Flow, Navigator};
pub use step::{Step, StepEmitter, StepProvider, StepStream};
