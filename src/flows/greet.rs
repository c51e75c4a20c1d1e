use super::AppStep;
use crate::coordinator::{StepEmitter, StepProvider, StepStream};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GreetStep {
    /// Open the version alert.
    ShowVersion(String),
}

/// Greets whoever logged in, if anyone.
#[derive(Clone, Debug)]
pub struct GreetViewModel {
    steps: StepEmitter<AppStep>,
    login_name: Option<String>,
    app_version: String,
}

impl GreetViewModel {
    pub fn new(login_name: Option<String>, app_version: impl Into<String>) -> Self {
        Self {
            steps: StepEmitter::new(),
            login_name,
            app_version: app_version.into(),
        }
    }

    pub fn login_name(&self) -> Option<&str> {
        self.login_name.as_deref()
    }

    pub fn greeting(&self) -> String {
        match &self.login_name {
            Some(name) => format!("Hello, {}!", name),
            None => "You have not logged in yet".to_string(),
        }
    }

    pub fn tap_version(&self) {
        self.steps.emit(AppStep::Greet(GreetStep::ShowVersion(
            self.app_version.clone(),
        )));
    }
}

impl StepProvider<AppStep> for GreetViewModel {
    fn steps(&self) -> StepStream<AppStep> {
        self.steps.stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_depends_on_login() {
        assert_eq!(
            GreetViewModel::new(Some("Ada".into()), "1.0.0").greeting(),
            "Hello, Ada!"
        );
        assert_eq!(
            GreetViewModel::new(None, "1.0.0").greeting(),
            "You have not logged in yet"
        );
    }
}
