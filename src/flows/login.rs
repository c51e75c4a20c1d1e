use std::fmt;
use std::sync::Arc;

use super::{AppStep, GreetViewModel, HomeStep, ScreenModel, Screens};
use crate::coordinator::{
    Coordinator, FlowContext, Navigation, StepEmitter, StepProvider, StepStream, UnitId,
};
use crate::host::Unit;

#[derive(Clone, Debug)]
pub enum LoginStep {
    /// Present the login screen over `presenter`.
    Launch {
        view_model: LoginViewModel,
        presenter: UnitId,
    },
    Submit(String),
    Cancel,
}

type OnLogin = Arc<dyn Fn(String) -> GreetViewModel + Send + Sync>;

#[derive(Clone)]
pub struct LoginViewModel {
    steps: StepEmitter<AppStep>,
    on_login: OnLogin,
}

impl LoginViewModel {
    /// `on_login` runs once a name is submitted and builds the greet screen
    /// to open afterwards.
    pub fn new<F>(on_login: F) -> Self
    where
        F: Fn(String) -> GreetViewModel + Send + Sync + 'static,
    {
        Self {
            steps: StepEmitter::new(),
            on_login: Arc::new(on_login),
        }
    }

    pub fn tap_login(&self, name: impl Into<String>) {
        self.steps
            .emit(AppStep::Login(LoginStep::Submit(name.into())));
    }

    pub fn tap_cancel(&self) {
        self.steps.emit(AppStep::Login(LoginStep::Cancel));
    }

    pub fn log_in(&self, name: String) -> GreetViewModel {
        (self.on_login)(name)
    }
}

impl fmt::Debug for LoginViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginViewModel")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl StepProvider<AppStep> for LoginViewModel {
    fn steps(&self) -> StepStream<AppStep> {
        self.steps.stream()
    }
}

/// Modal login flow, bound to the presented login screen.
pub struct LoginCoordinator {
    screens: Screens,
    view_model: Option<LoginViewModel>,
}

impl LoginCoordinator {
    pub fn new(screens: Screens) -> Self {
        Self {
            screens,
            view_model: None,
        }
    }

    fn launch(
        &mut self,
        view_model: LoginViewModel,
        presenter: UnitId,
        cx: &mut FlowContext<'_>,
    ) -> Navigation<AppStep> {
        let login = Unit::screen("Login");
        let login_id = login.id;
        if let Err(err) = cx.host().present(presenter, login) {
            tracing::warn!(coordinator = %cx.id(), error = %err, "login screen not presented");
            return Navigation::EndFlow;
        }
        self.screens.register(
            cx.host().lifecycles(),
            login_id,
            ScreenModel::Login(view_model.clone()),
        );
        let subscribe = Navigation::subscribe(&view_model, login_id);
        self.view_model = Some(view_model);

        Navigation::many([Navigation::StartFlow { root: login_id }, subscribe])
    }

    fn submit(&self, name: String) -> Navigation<AppStep> {
        let Some(view_model) = self.view_model.clone() else {
            return Navigation::Undefined;
        };
        Navigation::deferred(move |resolver| {
            let greet = view_model.log_in(name);
            resolver.resolve(Navigation::EndFlowAndForwardToParent(AppStep::Home(
                HomeStep::ShowGreet(greet),
            )));
        })
    }
}

impl Coordinator<AppStep> for LoginCoordinator {
    fn navigate(&mut self, step: AppStep, cx: &mut FlowContext<'_>) -> Navigation<AppStep> {
        match step {
            AppStep::Login(LoginStep::Launch {
                view_model,
                presenter,
            }) => self.launch(view_model, presenter, cx),
            AppStep::Login(LoginStep::Submit(name)) => self.submit(name),
            AppStep::Login(LoginStep::Cancel) => Navigation::EndFlow,
            _ => Navigation::Undefined,
        }
    }

    fn name(&self) -> &'static str {
        "LoginCoordinator"
    }
}
