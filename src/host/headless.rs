//! In-memory presentation host.
//!
//! Models a single window with navigation stacks and modal presentation,
//! without drawing anything. Used by the demo binary and by tests.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use super::error::HostError;
use super::{PresentationHost, Unit, UnitKind};
use crate::coordinator::{Lifecycles, UnitId};

#[derive(Debug)]
struct UnitRecord {
    title: String,
    kind: UnitKind,
    /// Screens pushed onto this unit, bottom first. Stacks only.
    screens: Vec<UnitId>,
    /// Unit presented modally over this one.
    presented: Option<UnitId>,
    /// Unit this one is presented over.
    presenter: Option<UnitId>,
    /// Stack this one is pushed onto.
    container: Option<UnitId>,
}

impl UnitRecord {
    fn new(unit: &Unit) -> Self {
        Self {
            title: unit.title.clone(),
            kind: unit.kind,
            screens: Vec::new(),
            presented: None,
            presenter: None,
            container: None,
        }
    }
}

#[derive(Debug, Default)]
struct HostState {
    window: Option<UnitId>,
    units: HashMap<UnitId, UnitRecord>,
}

impl HostState {
    fn check_new(&self, lifecycles: &Lifecycles, unit: &Unit) -> Result<(), HostError> {
        if lifecycles.is_released(unit.id) {
            return Err(HostError::Released(unit.id));
        }
        if self.units.contains_key(&unit.id) {
            return Err(HostError::AlreadyShown(unit.id));
        }
        Ok(())
    }

    fn record(&self, unit: UnitId) -> Result<&UnitRecord, HostError> {
        self.units.get(&unit).ok_or(HostError::UnknownUnit(unit))
    }

    /// Remove `unit` and everything it holds, deepest first.
    fn detach_tree(&mut self, unit: UnitId, removed: &mut Vec<UnitId>) {
        let Some(record) = self.units.remove(&unit) else {
            return;
        };
        if let Some(presented) = record.presented {
            self.detach_tree(presented, removed);
        }
        for screen in record.screens.iter().rev() {
            self.detach_tree(*screen, removed);
        }
        removed.push(unit);
    }

    fn dismiss(&mut self, unit: UnitId) -> Result<Vec<UnitId>, HostError> {
        let (presenter, container, presented) = {
            let record = self.record(unit)?;
            (record.presenter, record.container, record.presented)
        };
        let mut removed = Vec::new();

        if let Some(presenter) = presenter {
            if let Some(presenter) = self.units.get_mut(&presenter) {
                presenter.presented = None;
            }
            self.detach_tree(unit, &mut removed);
        } else if self.window == Some(unit) {
            self.window = None;
            self.detach_tree(unit, &mut removed);
        } else if let Some(stack) = container {
            let screens = self
                .units
                .get_mut(&stack)
                .map(|stack| &mut stack.screens)
                .ok_or(HostError::UnknownUnit(stack))?;
            let position = screens
                .iter()
                .position(|screen| *screen == unit)
                .ok_or(HostError::NotPresented(unit))?;
            let popped: Vec<UnitId> = screens.drain(position..).collect();
            for screen in popped.into_iter().rev() {
                self.detach_tree(screen, &mut removed);
            }
        } else if let Some(presented) = presented {
            // Dismissing a presenter closes what it presents.
            return self.dismiss(presented);
        } else {
            return Err(HostError::NotPresented(unit));
        }
        Ok(removed)
    }

    fn visible(&self) -> Option<UnitId> {
        let mut current = self.window?;
        loop {
            let record = self.units.get(&current)?;
            if let Some(presented) = record.presented {
                current = presented;
            } else if let Some(top) = record.screens.last() {
                if self.units.get(top).and_then(|top| top.presented).is_none() {
                    return Some(*top);
                }
                current = *top;
            } else {
                return Some(current);
            }
        }
    }

    fn describe_into(&self, unit: UnitId, depth: usize, out: &mut String) {
        let Some(record) = self.units.get(&unit) else {
            return;
        };
        let marker = match record.kind {
            UnitKind::Stack => "[stack]",
            UnitKind::Screen => "",
        };
        let _ = writeln!(
            out,
            "{}{} {}{}",
            "  ".repeat(depth),
            unit,
            record.title,
            marker
        );
        for screen in &record.screens {
            self.describe_into(*screen, depth + 1, out);
        }
        if let Some(presented) = record.presented {
            let _ = writeln!(out, "{}presents:", "  ".repeat(depth + 1));
            self.describe_into(presented, depth + 2, out);
        }
    }
}

/// Clonable handle to an in-memory window.
///
/// Every clone drives the same window, so a test or a script can act as the
/// "user" while a navigator holds its own clone.
#[derive(Clone, Default)]
pub struct HeadlessHost {
    state: Arc<Mutex<HostState>>,
    lifecycles: Lifecycles,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lifecycles(lifecycles: Lifecycles) -> Self {
        Self {
            state: Arc::default(),
            lifecycles,
        }
    }

    /// Release every removed unit, outside the state lock.
    fn release_all(&self, removed: Vec<UnitId>) {
        for unit in removed {
            self.lifecycles.release(unit);
        }
    }

    /// Pop the top screen of `stack`, as a back button would.
    ///
    /// The bottom screen of a stack cannot be popped.
    pub fn back(&self, stack: UnitId) -> Result<UnitId, HostError> {
        let removed = {
            let mut state = self.state.lock();
            let record = state.record(stack)?;
            if record.kind != UnitKind::Stack {
                return Err(HostError::NotAStack(stack));
            }
            if record.screens.len() < 2 {
                return Err(HostError::CannotPop(stack));
            }
            let top = record.screens[record.screens.len() - 1];
            state.dismiss(top)?
        };
        let top = removed.last().copied().ok_or(HostError::CannotPop(stack))?;
        tracing::debug!(%stack, popped = %top, "back");
        self.release_all(removed);
        Ok(top)
    }

    /// Close the window root and everything under it.
    pub fn close_window(&self) -> Result<(), HostError> {
        let root = self.state.lock().window;
        match root {
            Some(root) => self.dismiss_unit(root),
            None => Ok(()),
        }
    }

    fn dismiss_unit(&self, unit: UnitId) -> Result<(), HostError> {
        let removed = self.state.lock().dismiss(unit)?;
        tracing::debug!(%unit, closed = removed.len(), "dismissed");
        self.release_all(removed);
        Ok(())
    }

    /// Dismiss `unit` on the user's behalf.
    pub fn user_dismiss(&self, unit: UnitId) -> Result<(), HostError> {
        self.dismiss_unit(unit)
    }

    pub fn window_root(&self) -> Option<UnitId> {
        self.state.lock().window
    }

    /// Top-most unit the user currently sees.
    pub fn visible(&self) -> Option<UnitId> {
        self.state.lock().visible()
    }

    pub fn visible_title(&self) -> Option<String> {
        let state = self.state.lock();
        let unit = state.visible()?;
        state.units.get(&unit).map(|record| record.title.clone())
    }

    pub fn title(&self, unit: UnitId) -> Option<String> {
        self.state
            .lock()
            .units
            .get(&unit)
            .map(|record| record.title.clone())
    }

    pub fn is_shown(&self, unit: UnitId) -> bool {
        self.state.lock().units.contains_key(&unit)
    }

    /// Screens on `stack`, bottom first.
    pub fn screens(&self, stack: UnitId) -> Vec<UnitId> {
        self.state
            .lock()
            .units
            .get(&stack)
            .map(|record| record.screens.clone())
            .unwrap_or_default()
    }

    /// Text rendering of the window hierarchy.
    pub fn describe(&self) -> String {
        let state = self.state.lock();
        let mut out = String::new();
        match state.window {
            Some(root) => state.describe_into(root, 0, &mut out),
            None => out.push_str("<no window root>\n"),
        }
        out
    }
}

impl PresentationHost for HeadlessHost {
    fn lifecycles(&self) -> &Lifecycles {
        &self.lifecycles
    }

    fn set_root(&mut self, unit: Unit) -> Result<(), HostError> {
        let removed = {
            let mut state = self.state.lock();
            state.check_new(&self.lifecycles, &unit)?;
            let mut removed = Vec::new();
            if let Some(previous) = state.window.take() {
                state.detach_tree(previous, &mut removed);
            }
            tracing::debug!(unit = %unit.id, title = %unit.title, "set window root");
            state.units.insert(unit.id, UnitRecord::new(&unit));
            state.window = Some(unit.id);
            removed
        };
        self.release_all(removed);
        Ok(())
    }

    fn present(&mut self, over: UnitId, unit: Unit) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.check_new(&self.lifecycles, &unit)?;
        let presenter = state
            .units
            .get_mut(&over)
            .ok_or(HostError::UnknownUnit(over))?;
        if let Some(presented) = presenter.presented {
            return Err(HostError::AlreadyPresenting { over, presented });
        }
        presenter.presented = Some(unit.id);

        let mut record = UnitRecord::new(&unit);
        record.presenter = Some(over);
        tracing::debug!(%over, unit = %unit.id, title = %unit.title, "present");
        state.units.insert(unit.id, record);
        Ok(())
    }

    fn push(&mut self, stack: UnitId, unit: Unit) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.check_new(&self.lifecycles, &unit)?;
        let container = state
            .units
            .get_mut(&stack)
            .ok_or(HostError::UnknownUnit(stack))?;
        if container.kind != UnitKind::Stack {
            return Err(HostError::NotAStack(stack));
        }
        container.screens.push(unit.id);

        let mut record = UnitRecord::new(&unit);
        record.container = Some(stack);
        tracing::debug!(%stack, unit = %unit.id, title = %unit.title, "push");
        state.units.insert(unit.id, record);
        Ok(())
    }

    fn dismiss(&mut self, unit: UnitId) -> Result<(), HostError> {
        self.dismiss_unit(unit)
    }

    fn presented(&self, unit: UnitId) -> Option<UnitId> {
        self.state
            .lock()
            .units
            .get(&unit)
            .and_then(|record| record.presented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn window_with_stack(host: &mut HeadlessHost) -> (UnitId, UnitId) {
        let nav = Unit::stack("Navigation");
        let home = Unit::screen("Home");
        let (nav_id, home_id) = (nav.id, home.id);
        host.set_root(nav).unwrap();
        host.push(nav_id, home).unwrap();
        (nav_id, home_id)
    }

    #[test]
    fn push_and_back() {
        let mut host = HeadlessHost::new();
        let (nav, home) = window_with_stack(&mut host);
        let greet = Unit::screen("Greet");
        let greet_id = greet.id;
        host.push(nav, greet).unwrap();
        assert_eq!(host.visible(), Some(greet_id));

        assert_eq!(host.back(nav).unwrap(), greet_id);
        assert_eq!(host.visible(), Some(home));
        assert!(host.lifecycles().is_released(greet_id));
        assert!(!host.lifecycles().is_released(home));
    }

    #[test]
    fn bottom_screen_cannot_be_popped() {
        let mut host = HeadlessHost::new();
        let (nav, _) = window_with_stack(&mut host);
        assert_eq!(host.back(nav), Err(HostError::CannotPop(nav)));
    }

    #[test]
    fn present_twice_over_same_unit_fails() {
        let mut host = HeadlessHost::new();
        let (nav, _) = window_with_stack(&mut host);
        let first = Unit::screen("Alert");
        let first_id = first.id;
        host.present(nav, first).unwrap();

        let second = Unit::screen("Login");
        assert_eq!(
            host.present(nav, second),
            Err(HostError::AlreadyPresenting {
                over: nav,
                presented: first_id
            })
        );
        assert_eq!(host.presented(nav), Some(first_id));
    }

    #[test]
    fn dismiss_presented_releases_it() {
        let mut host = HeadlessHost::new();
        let (nav, home) = window_with_stack(&mut host);
        let login = Unit::screen("Login");
        let login_id = login.id;
        host.present(nav, login).unwrap();
        assert_eq!(host.visible(), Some(login_id));

        host.dismiss(login_id).unwrap();
        assert_eq!(host.presented(nav), None);
        assert_eq!(host.visible(), Some(home));
        assert!(host.lifecycles().is_released(login_id));
    }

    #[test]
    fn close_window_releases_deepest_first() {
        let mut host = HeadlessHost::new();
        let (nav, home) = window_with_stack(&mut host);
        let alert = Unit::screen("Alert");
        let alert_id = alert.id;
        host.present(nav, alert).unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));
        for unit in [nav, home, alert_id] {
            let order = Arc::clone(&order);
            host.lifecycles()
                .end_of_life(unit)
                .listen(move || order.lock().push(unit));
        }

        host.close_window().unwrap();
        assert_eq!(*order.lock(), vec![alert_id, home, nav]);
        assert_eq!(host.window_root(), None);
    }

    #[test]
    fn replacing_root_releases_previous() {
        let mut host = HeadlessHost::new();
        let (nav, home) = window_with_stack(&mut host);
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        host.lifecycles().end_of_life(home).listen(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        host.set_root(Unit::screen("Other")).unwrap();
        assert!(!host.is_shown(nav));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn released_unit_cannot_be_shown_again() {
        let mut host = HeadlessHost::new();
        let (nav, _) = window_with_stack(&mut host);
        let greet = Unit::screen("Greet");
        host.push(nav, greet.clone()).unwrap();
        host.back(nav).unwrap();

        assert_eq!(host.push(nav, greet.clone()), Err(HostError::Released(greet.id)));
    }

    #[test]
    fn push_onto_screen_fails() {
        let mut host = HeadlessHost::new();
        let (_, home) = window_with_stack(&mut host);
        assert_eq!(
            host.push(home, Unit::screen("Greet")),
            Err(HostError::NotAStack(home))
        );
    }

    #[test]
    fn describe_lists_hierarchy() {
        let mut host = HeadlessHost::new();
        let (nav, _) = window_with_stack(&mut host);
        host.present(nav, Unit::screen("Alert")).unwrap();

        let text = host.describe();
        assert!(text.contains("Navigation[stack]"));
        assert!(text.contains("Home"));
        assert!(text.contains("presents:"));
        assert!(text.contains("Alert"));
    }
}
