use parking_lot::Mutex;
use std::sync::Arc;

use super::{
    AppStep, GreetStep, GreetViewModel, LoginCoordinator, LoginStep, LoginViewModel, ScreenModel,
    Screens, SettingsStep, SettingsViewModel,
};
use crate::coordinator::{
    Coordinator, FlowContext, Navigation, StepEmitter, StepProvider, StepStream, UnitId,
};
use crate::host::{HostError, Unit};

#[derive(Clone, Debug)]
pub enum HomeStep {
    /// Install the home screen as the window root.
    Launch,
    ShowLogin(LoginViewModel),
    ShowGreet(GreetViewModel),
    ShowSettings(SettingsViewModel),
}

/// Home screen: login, logout, greet and settings buttons.
#[derive(Clone, Debug)]
pub struct HomeViewModel {
    steps: StepEmitter<AppStep>,
    login_name: Arc<Mutex<Option<String>>>,
    app_version: String,
}

impl HomeViewModel {
    pub fn new(app_version: impl Into<String>) -> Self {
        Self {
            steps: StepEmitter::new(),
            login_name: Arc::new(Mutex::new(None)),
            app_version: app_version.into(),
        }
    }

    pub fn login_name(&self) -> Option<String> {
        self.login_name.lock().clone()
    }

    /// Ask for the login screen. A successful login updates this model's
    /// login name and opens a greet screen for it.
    pub fn tap_login(&self) -> LoginViewModel {
        let login_name = Arc::clone(&self.login_name);
        let app_version = self.app_version.clone();
        let login = LoginViewModel::new(move |name: String| {
            *login_name.lock() = Some(name.clone());
            GreetViewModel::new(Some(name), app_version.clone())
        });
        self.steps
            .emit(AppStep::Home(HomeStep::ShowLogin(login.clone())));
        login
    }

    pub fn tap_logout(&self) {
        *self.login_name.lock() = None;
    }

    pub fn tap_greet(&self) -> GreetViewModel {
        let greet = GreetViewModel::new(self.login_name(), self.app_version.clone());
        self.steps
            .emit(AppStep::Home(HomeStep::ShowGreet(greet.clone())));
        greet
    }

    pub fn tap_settings(&self) -> SettingsViewModel {
        let settings = SettingsViewModel::new(self.app_version.clone());
        self.steps
            .emit(AppStep::Home(HomeStep::ShowSettings(settings.clone())));
        settings
    }
}

impl StepProvider<AppStep> for HomeViewModel {
    fn steps(&self) -> StepStream<AppStep> {
        self.steps.stream()
    }
}

/// Root flow of the app. Owns the navigation stack and everything pushed on
/// it; login runs as a child flow.
pub struct HomeCoordinator {
    screens: Screens,
    app_version: String,
    nav: Option<UnitId>,
}

impl HomeCoordinator {
    pub fn new(screens: Screens, app_version: impl Into<String>) -> Self {
        Self {
            screens,
            app_version: app_version.into(),
            nav: None,
        }
    }

    fn navigate_home(
        &mut self,
        step: HomeStep,
        cx: &mut FlowContext<'_>,
    ) -> Result<Navigation<AppStep>, HostError> {
        match step {
            HomeStep::Launch => self.launch(cx),
            HomeStep::ShowLogin(view_model) => Ok(self.show_login(view_model)),
            HomeStep::ShowGreet(view_model) => {
                self.push_screen(cx, "Greet", ScreenModel::Greet(view_model.clone()), &view_model)
            }
            HomeStep::ShowSettings(view_model) => self.push_screen(
                cx,
                "Settings",
                ScreenModel::Settings(view_model.clone()),
                &view_model,
            ),
        }
    }

    fn launch(&mut self, cx: &mut FlowContext<'_>) -> Result<Navigation<AppStep>, HostError> {
        let nav = Unit::stack("Navigation");
        let home = Unit::screen("Home");
        let (nav_id, home_id) = (nav.id, home.id);
        let view_model = HomeViewModel::new(self.app_version.clone());

        cx.host().set_root(nav)?;
        cx.host().push(nav_id, home)?;
        self.screens.register(
            cx.host().lifecycles(),
            home_id,
            ScreenModel::Home(view_model.clone()),
        );
        self.nav = Some(nav_id);

        Ok(Navigation::many([
            // The stack is the lifetime of the whole app flow.
            Navigation::StartFlow { root: nav_id },
            Navigation::subscribe(&view_model, nav_id),
        ]))
    }

    fn show_login(&self, view_model: LoginViewModel) -> Navigation<AppStep> {
        let Some(nav) = self.nav else {
            return Navigation::Undefined;
        };
        let login = LoginCoordinator::new(self.screens.clone());
        Navigation::start_child(
            login.into_flow(),
            AppStep::Login(LoginStep::Launch {
                view_model,
                presenter: nav,
            }),
        )
    }

    fn push_screen<P>(
        &self,
        cx: &mut FlowContext<'_>,
        title: &str,
        model: ScreenModel,
        provider: &P,
    ) -> Result<Navigation<AppStep>, HostError>
    where
        P: StepProvider<AppStep>,
    {
        let Some(nav) = self.nav else {
            return Ok(Navigation::Undefined);
        };
        let screen = Unit::screen(title);
        let screen_id = screen.id;
        cx.host().push(nav, screen)?;
        self.screens
            .register(cx.host().lifecycles(), screen_id, model);
        Ok(Navigation::subscribe(provider, screen_id))
    }

    fn show_version(
        &self,
        version: &str,
        cx: &mut FlowContext<'_>,
    ) -> Result<Navigation<AppStep>, HostError> {
        let Some(nav) = self.nav else {
            return Ok(Navigation::Undefined);
        };
        cx.host()
            .present(nav, Unit::screen(format!("Version {}", version)))?;
        Ok(Navigation::SubscribeNoSteps)
    }
}

impl Coordinator<AppStep> for HomeCoordinator {
    fn navigate(&mut self, step: AppStep, cx: &mut FlowContext<'_>) -> Navigation<AppStep> {
        let result = match step {
            AppStep::Home(step) => self.navigate_home(step, cx),
            AppStep::Greet(GreetStep::ShowVersion(version))
            | AppStep::Settings(SettingsStep::ShowVersion(version)) => {
                self.show_version(&version, cx)
            }
            AppStep::Login(_) => Ok(Navigation::Undefined),
        };
        result.unwrap_or_else(|err| {
            tracing::warn!(coordinator = %cx.id(), error = %err, "home navigation failed");
            Navigation::Undefined
        })
    }

    fn name(&self) -> &'static str {
        "HomeCoordinator"
    }
}
