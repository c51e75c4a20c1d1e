use super::AppStep;
use crate::coordinator::{StepEmitter, StepProvider, StepStream};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsStep {
    ShowVersion(String),
}

#[derive(Clone, Debug)]
pub struct SettingsViewModel {
    steps: StepEmitter<AppStep>,
    app_version: String,
}

impl SettingsViewModel {
    pub fn new(app_version: impl Into<String>) -> Self {
        Self {
            steps: StepEmitter::new(),
            app_version: app_version.into(),
        }
    }

    pub fn tap_version(&self) {
        self.steps.emit(AppStep::Settings(SettingsStep::ShowVersion(
            self.app_version.clone(),
        )));
    }
}

impl StepProvider<AppStep> for SettingsViewModel {
    fn steps(&self) -> StepStream<AppStep> {
        self.steps.stream()
    }
}
