//! Scripted "user" for the headless demo.
//!
//! Each action looks at the visible unit, finds its view-model and taps on
//! it, or drives the host directly for back/dismiss/close.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::flows::{ScreenModel, Screens};
use crate::host::{HeadlessHost, HostError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DemoAction {
    /// Home: open the login screen.
    Login,
    /// Login: submit a name.
    Submit(String),
    /// Login: cancel.
    Cancel,
    /// Home: forget the login name.
    Logout,
    /// Home: open the greet screen.
    Greet,
    /// Home: open the settings screen.
    Settings,
    /// Greet or settings: show the version alert.
    Version,
    /// Dismiss the visible alert.
    Ok,
    /// Pop the top screen of the window stack.
    Back,
    /// Close the window.
    Close,
}

impl FromStr for DemoAction {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(name) = s.strip_prefix("submit:") {
            let name = name.trim();
            if name.is_empty() {
                return Err(DemoError::UnknownAction(s.to_string()));
            }
            return Ok(DemoAction::Submit(name.to_string()));
        }
        match s {
            "login" => Ok(DemoAction::Login),
            "cancel" => Ok(DemoAction::Cancel),
            "logout" => Ok(DemoAction::Logout),
            "greet" => Ok(DemoAction::Greet),
            "settings" => Ok(DemoAction::Settings),
            "version" => Ok(DemoAction::Version),
            "ok" => Ok(DemoAction::Ok),
            "back" => Ok(DemoAction::Back),
            "close" => Ok(DemoAction::Close),
            other => Err(DemoError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for DemoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoAction::Login => f.write_str("login"),
            DemoAction::Submit(name) => write!(f, "submit:{}", name),
            DemoAction::Cancel => f.write_str("cancel"),
            DemoAction::Logout => f.write_str("logout"),
            DemoAction::Greet => f.write_str("greet"),
            DemoAction::Settings => f.write_str("settings"),
            DemoAction::Version => f.write_str("version"),
            DemoAction::Ok => f.write_str("ok"),
            DemoAction::Back => f.write_str("back"),
            DemoAction::Close => f.write_str("close"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("unknown demo action '{0}'")]
    UnknownAction(String),

    #[error("nothing is visible")]
    NothingVisible,

    #[error("'{action}' is not available on '{screen}'")]
    NotAvailable { action: DemoAction, screen: String },

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Applies demo actions to a headless window.
#[derive(Clone)]
pub struct DemoDriver {
    host: HeadlessHost,
    screens: Screens,
}

impl DemoDriver {
    pub fn new(host: HeadlessHost, screens: Screens) -> Self {
        Self { host, screens }
    }

    pub fn perform(&self, action: &DemoAction) -> Result<(), DemoError> {
        tracing::info!(%action, "demo action");
        match action {
            DemoAction::Back => {
                let root = self.host.window_root().ok_or(DemoError::NothingVisible)?;
                self.host.back(root)?;
                return Ok(());
            }
            DemoAction::Close => {
                self.host.close_window()?;
                return Ok(());
            }
            _ => {}
        }

        let visible = self.host.visible().ok_or(DemoError::NothingVisible)?;
        match (action, self.screens.get(visible)) {
            (DemoAction::Login, Some(ScreenModel::Home(home))) => {
                home.tap_login();
            }
            (DemoAction::Logout, Some(ScreenModel::Home(home))) => home.tap_logout(),
            (DemoAction::Greet, Some(ScreenModel::Home(home))) => {
                home.tap_greet();
            }
            (DemoAction::Settings, Some(ScreenModel::Home(home))) => {
                home.tap_settings();
            }
            (DemoAction::Submit(name), Some(ScreenModel::Login(login))) => {
                login.tap_login(name.clone())
            }
            (DemoAction::Cancel, Some(ScreenModel::Login(login))) => login.tap_cancel(),
            (DemoAction::Version, Some(ScreenModel::Greet(greet))) => greet.tap_version(),
            (DemoAction::Version, Some(ScreenModel::Settings(settings))) => {
                settings.tap_version()
            }
            // Units without a model are alerts.
            (DemoAction::Ok, None) => self.host.user_dismiss(visible)?,
            _ => {
                return Err(DemoError::NotAvailable {
                    action: action.clone(),
                    screen: self.host.title(visible).unwrap_or_default(),
                })
            }
        }
        Ok(())
    }
}
