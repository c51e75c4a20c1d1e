mod common;

use parking_lot::Mutex;
use reactive_coordinator::coordinator::{Coordinator, CoordinatorId, Navigator};
use reactive_coordinator::demo::{DemoAction, DemoDriver, DemoError};
use reactive_coordinator::flows::{
    AppStep, HomeCoordinator, HomeStep, HomeViewModel, LoginViewModel, ScreenModel, Screens,
};
use reactive_coordinator::host::HeadlessHost;
use std::sync::Arc;
use std::time::Duration;

struct App {
    nav: Navigator<AppStep, HeadlessHost>,
    host: HeadlessHost,
    screens: Screens,
    home: CoordinatorId,
    ended: Arc<Mutex<bool>>,
}

impl App {
    fn launch() -> Self {
        let host = HeadlessHost::new();
        let screens = Screens::new();
        let ended = Arc::new(Mutex::new(false));
        let mut nav = Navigator::new(host.clone());

        let flag = Arc::clone(&ended);
        let flow = HomeCoordinator::new(screens.clone(), "2.1.0")
            .into_flow()
            .on_end_flow(move || *flag.lock() = true);
        let home = nav.start(flow, AppStep::Home(HomeStep::Launch));

        Self {
            nav,
            host,
            screens,
            home,
            ended,
        }
    }

    fn visible_model(&self) -> Option<ScreenModel> {
        self.host.visible().and_then(|unit| self.screens.get(unit))
    }

    fn home_model(&self) -> HomeViewModel {
        match self.visible_model() {
            Some(ScreenModel::Home(home)) => home,
            other => panic!("expected home on top, got {:?}", other),
        }
    }

    fn login_model(&self) -> LoginViewModel {
        match self.visible_model() {
            Some(ScreenModel::Login(login)) => login,
            other => panic!("expected login on top, got {:?}", other),
        }
    }

    fn settle(&mut self) {
        self.nav.process_pending();
    }
}

#[test]
fn launch_installs_home_in_a_stack() {
    let app = App::launch();

    let root = app.nav.root_unit(app.home).unwrap();
    assert_eq!(app.host.window_root(), Some(root));
    assert_eq!(app.host.screens(root).len(), 1);
    assert_eq!(app.host.visible_title().as_deref(), Some("Home"));
    assert_eq!(app.nav.subscription_count(app.home), 1);
}

#[test]
fn greet_is_pushed_and_popped() {
    let mut app = App::launch();
    app.home_model().tap_greet();
    app.settle();

    assert_eq!(app.host.visible_title().as_deref(), Some("Greet"));
    assert_eq!(app.nav.subscription_count(app.home), 2);
    match app.visible_model() {
        Some(ScreenModel::Greet(greet)) => {
            assert_eq!(greet.greeting(), "You have not logged in yet")
        }
        other => panic!("expected greet, got {:?}", other),
    }

    let stack = app.host.window_root().unwrap();
    app.host.back(stack).unwrap();
    app.settle();

    assert_eq!(app.host.visible_title().as_deref(), Some("Home"));
    assert_eq!(app.nav.subscription_count(app.home), 1);
    assert_eq!(app.screens.len(), 1);
}

#[test]
fn login_runs_as_child_and_forwards_greet() {
    let mut app = App::launch();
    let home = app.home_model();
    home.tap_login();
    app.settle();

    assert_eq!(app.nav.children(app.home).len(), 1);
    assert_eq!(app.host.visible_title().as_deref(), Some("Login"));

    app.login_model().tap_login("Ada");
    app.settle();

    assert!(app.nav.children(app.home).is_empty());
    assert_eq!(app.nav.len(), 1);
    assert_eq!(home.login_name().as_deref(), Some("Ada"));
    match app.visible_model() {
        Some(ScreenModel::Greet(greet)) => assert_eq!(greet.greeting(), "Hello, Ada!"),
        other => panic!("expected greet, got {:?}", other),
    }
}

#[test]
fn cancelling_login_ends_the_child_only() {
    let mut app = App::launch();
    app.home_model().tap_login();
    app.settle();

    app.login_model().tap_cancel();
    app.settle();

    assert!(app.nav.children(app.home).is_empty());
    assert!(app.nav.contains(app.home));
    assert_eq!(app.host.visible_title().as_deref(), Some("Home"));
    assert!(!*app.ended.lock());
}

#[test]
fn user_dismissing_login_ends_the_child() {
    let mut app = App::launch();
    app.home_model().tap_login();
    app.settle();
    let login = app.host.visible().unwrap();

    app.host.user_dismiss(login).unwrap();
    app.settle();

    assert!(app.nav.children(app.home).is_empty());
    assert_eq!(app.host.visible_title().as_deref(), Some("Home"));
}

#[test]
fn logout_forgets_the_name() {
    let mut app = App::launch();
    let home = app.home_model();
    home.tap_login();
    app.settle();
    app.login_model().tap_login("Ada");
    app.settle();

    home.tap_logout();
    assert_eq!(home.login_name(), None);
    assert_eq!(home.tap_greet().login_name(), None);
}

#[test]
fn version_alert_is_presented_and_dismissed() {
    let mut app = App::launch();
    let driver = DemoDriver::new(app.host.clone(), app.screens.clone());

    driver.perform(&DemoAction::Settings).unwrap();
    app.settle();
    driver.perform(&DemoAction::Version).unwrap();
    app.settle();
    assert_eq!(app.host.visible_title().as_deref(), Some("Version 2.1.0"));

    driver.perform(&DemoAction::Ok).unwrap();
    app.settle();
    assert_eq!(app.host.visible_title().as_deref(), Some("Settings"));
}

#[test]
fn actions_on_the_wrong_screen_are_rejected() {
    let app = App::launch();
    let driver = DemoDriver::new(app.host.clone(), app.screens.clone());

    assert!(matches!(
        driver.perform(&DemoAction::Version),
        Err(DemoError::NotAvailable { .. })
    ));
    assert!(matches!(
        driver.perform(&DemoAction::Back),
        Err(DemoError::Host(_))
    ));
}

#[test]
fn closing_the_window_ends_everything() {
    let mut app = App::launch();
    app.home_model().tap_login();
    app.settle();
    assert_eq!(app.nav.len(), 2);

    app.host.close_window().unwrap();
    app.settle();

    assert!(app.nav.is_empty());
    assert!(*app.ended.lock());
    assert!(app.screens.is_empty());
}

#[tokio::test]
async fn run_returns_once_the_window_closes() {
    let mut app = App::launch();
    let driver = DemoDriver::new(app.host.clone(), app.screens.clone());
    let actions: Vec<DemoAction> = ["greet", "back", "login", "submit:Ada", "back", "close"]
        .iter()
        .map(|action| action.parse().unwrap())
        .collect();

    let script = tokio::spawn(async move {
        for action in actions {
            tokio::time::sleep(Duration::from_millis(10)).await;
            driver.perform(&action).unwrap();
        }
    });

    tokio::time::timeout(Duration::from_secs(5), app.nav.run())
        .await
        .expect("navigator should stop after close");
    script.await.unwrap();

    assert!(app.nav.is_empty());
    assert!(*app.ended.lock());
}
