//! Which view-model backs which shown unit.
//!
//! Stands in for the view layer: whoever plays the user looks up the model
//! of the visible unit and taps on it.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{GreetViewModel, HomeViewModel, LoginViewModel, SettingsViewModel};
use crate::coordinator::{Lifecycles, UnitId};

#[derive(Clone, Debug)]
pub enum ScreenModel {
    Home(HomeViewModel),
    Login(LoginViewModel),
    Greet(GreetViewModel),
    Settings(SettingsViewModel),
}

impl ScreenModel {
    pub fn title(&self) -> &'static str {
        match self {
            ScreenModel::Home(_) => "Home",
            ScreenModel::Login(_) => "Login",
            ScreenModel::Greet(_) => "Greet",
            ScreenModel::Settings(_) => "Settings",
        }
    }
}

/// Shared map from unit to view-model. Entries leave when their unit is
/// released.
#[derive(Clone, Debug, Default)]
pub struct Screens {
    models: Arc<Mutex<HashMap<UnitId, ScreenModel>>>,
}

impl Screens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, lifecycles: &Lifecycles, unit: UnitId, model: ScreenModel) {
        self.models.lock().insert(unit, model);
        let models = Arc::downgrade(&self.models);
        lifecycles.end_of_life(unit).listen(move || {
            if let Some(models) = models.upgrade() {
                models.lock().remove(&unit);
            }
        });
    }

    pub fn get(&self, unit: UnitId) -> Option<ScreenModel> {
        self.models.lock().get(&unit).cloned()
    }

    pub fn len(&self) -> usize {
        self.models.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.lock().is_empty()
    }
}
