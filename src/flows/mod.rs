//! Sample flows built on the coordinator core.
//!
//! ```text
//! Navigation[stack] ── HomeCoordinator
//!   ├─ Home            (HomeViewModel)
//!   ├─ Greet           (GreetViewModel, pushed)
//!   ├─ Settings        (SettingsViewModel, pushed)
//!   └─ presents:
//!        Login         (LoginViewModel, LoginCoordinator child)
//!        Version alert
//! ```

mod greet;
mod home;
mod login;
mod screens;
mod settings;

pub use greet::{GreetStep, GreetViewModel};
pub use home::{HomeCoordinator, HomeStep, HomeViewModel};
pub use login::{LoginCoordinator, LoginStep, LoginViewModel};
pub use screens::{ScreenModel, Screens};
pub use settings::{SettingsStep, SettingsViewModel};

use crate::coordinator::Step;

/// Every step the sample app can emit, grouped by family.
#[derive(Clone, Debug)]
pub enum AppStep {
    Home(HomeStep),
    Login(LoginStep),
    Greet(GreetStep),
    Settings(SettingsStep),
}

impl Step for AppStep {}
