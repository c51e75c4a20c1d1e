//! Shared test utilities: a scripted coordinator and an event log.

#![allow(dead_code, unused_imports)]

use parking_lot::Mutex;
use std::sync::Arc;

use reactive_coordinator::coordinator::{
    Coordinator, Flow, FlowContext, Navigation, Navigator, Step, StepEmitter, UnitId,
};
use reactive_coordinator::host::{HeadlessHost, PresentationHost, Unit};

/// Step type for tests: just a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestStep(pub &'static str);

impl Step for TestStep {}

pub type TestNavigator = Navigator<TestStep, HeadlessHost>;

/// Ordered record of what coordinators saw, shared across a test.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }
}

type Handler = Box<dyn FnMut(&'static str, &mut FlowContext<'_>) -> Navigation<TestStep> + Send>;

/// Coordinator whose navigation is a closure. Logs every step as
/// "`label`:`step`" before handling it.
pub struct Scripted {
    label: &'static str,
    log: Log,
    handler: Handler,
}

impl Coordinator<TestStep> for Scripted {
    fn navigate(&mut self, step: TestStep, cx: &mut FlowContext<'_>) -> Navigation<TestStep> {
        self.log.push(format!("{}:{}", self.label, step.0));
        (self.handler)(step.0, cx)
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

/// A scripted flow that logs "end:`label`" when it ends.
pub fn scripted<F>(label: &'static str, log: &Log, handler: F) -> Flow<TestStep>
where
    F: FnMut(&'static str, &mut FlowContext<'_>) -> Navigation<TestStep> + Send + 'static,
{
    let ended = log.clone();
    Scripted {
        label,
        log: log.clone(),
        handler: Box::new(handler),
    }
    .into_flow()
    .on_end_flow(move || ended.push(format!("end:{}", label)))
}

/// A scripted flow that only logs and never navigates.
pub fn idle(label: &'static str, log: &Log) -> Flow<TestStep> {
    scripted(label, log, |_, _| Navigation::Undefined)
}

pub fn navigator() -> (TestNavigator, HeadlessHost) {
    let host = HeadlessHost::new();
    (Navigator::new(host.clone()), host)
}

/// Show a fresh screen as the window root and return its id.
pub fn window_root(host: &HeadlessHost, title: &str) -> UnitId {
    let unit = Unit::screen(title);
    let id = unit.id;
    host.clone()
        .set_root(unit)
        .expect("window root should be accepted");
    id
}
