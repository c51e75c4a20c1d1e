use super::arena::CoordinatorId;
use crate::host::PresentationHost;

/// What a coordinator can reach while deciding on a navigation.
pub struct FlowContext<'a> {
    id: CoordinatorId,
    host: &'a mut dyn PresentationHost,
}

impl<'a> FlowContext<'a> {
    pub(crate) fn new(id: CoordinatorId, host: &'a mut dyn PresentationHost) -> Self {
        Self { id, host }
    }

    /// Handle of the coordinator being asked to navigate.
    pub fn id(&self) -> CoordinatorId {
        self.id
    }

    pub fn host(&mut self) -> &mut (dyn PresentationHost + 'a) {
        &mut *self.host
    }
}
