//! Navigation state: the active screen plus a generation counter that
//! detects responses arriving after the user already moved on.

use shared::domain::Employee;
use tracing::{info, warn};

use crate::{
    error::ServiceError,
    router::Route,
    screens::{CreateScreen, EditScreen, ListScreen, SubmitError},
    EmployeeService,
};

#[derive(Debug)]
pub enum Screen {
    Home,
    List(ListScreen),
    Create(CreateScreen),
    Edit(EditScreen),
    NotFound(String),
}

/// Issued when a screen starts loading; only honoured while the session is
/// still on the navigation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    route: Route,
}

impl LoadTicket {
    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Employees(Result<Vec<Employee>, ServiceError>),
    Employee(Result<Employee, ServiceError>),
}

#[derive(Debug)]
pub struct Session {
    route: Route,
    screen: Screen,
    generation: u64,
    email_domain: String,
}

impl Session {
    pub fn new(email_domain: impl Into<String>) -> Self {
        Self {
            route: Route::Home,
            screen: Screen::Home,
            generation: 0,
            email_domain: email_domain.into(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn navigate(&mut self, path: &str) -> &Route {
        self.go(Route::parse(path));
        &self.route
    }

    /// Replaces the current screen with a fresh one for `route`. Any load
    /// still in flight for the previous screen becomes stale.
    pub fn go(&mut self, route: Route) {
        self.generation += 1;
        self.screen = match &route {
            Route::Home => Screen::Home,
            Route::List => Screen::List(ListScreen::new()),
            Route::Create => Screen::Create(CreateScreen::new(&self.email_domain)),
            Route::Edit(id) => Screen::Edit(EditScreen::new(*id, &self.email_domain)),
            Route::NotFound(path) => Screen::NotFound(path.clone()),
        };
        info!(route = %route, generation = self.generation, "navigated");
        self.route = route;
    }

    /// `None` when the current screen needs no data.
    pub fn begin_load(&self) -> Option<LoadTicket> {
        match self.route {
            Route::List | Route::Edit(_) => Some(LoadTicket {
                generation: self.generation,
                route: self.route.clone(),
            }),
            _ => None,
        }
    }

    pub async fn fetch<S>(ticket: &LoadTicket, service: &S) -> Option<LoadOutcome>
    where
        S: EmployeeService + ?Sized,
    {
        match ticket.route {
            Route::List => Some(LoadOutcome::Employees(service.get_employees().await)),
            Route::Edit(id) => Some(LoadOutcome::Employee(service.get_employee(id).await)),
            _ => None,
        }
    }

    /// Applies a load result to the current screen. Returns `false` and
    /// drops the result when the ticket belongs to an earlier navigation.
    pub fn finish_load(&mut self, ticket: &LoadTicket, outcome: LoadOutcome) -> bool {
        if ticket.generation != self.generation {
            warn!(
                ticket_route = %ticket.route,
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "discarding stale load response"
            );
            return false;
        }
        match (&mut self.screen, outcome) {
            (Screen::List(screen), LoadOutcome::Employees(result)) => screen.apply(result),
            (Screen::Edit(screen), LoadOutcome::Employee(result)) => screen.apply(result),
            _ => {
                warn!(route = %self.route, "load response does not match current screen");
                return false;
            }
        }
        true
    }

    pub async fn load_current<S>(&mut self, service: &S) -> bool
    where
        S: EmployeeService + ?Sized,
    {
        let Some(ticket) = self.begin_load() else {
            return false;
        };
        match Self::fetch(&ticket, service).await {
            Some(outcome) => self.finish_load(&ticket, outcome),
            None => false,
        }
    }

    /// Navigates to `path` and loads whatever the new screen needs.
    pub async fn open<S>(&mut self, path: &str, service: &S) -> &Screen
    where
        S: EmployeeService + ?Sized,
    {
        self.navigate(path);
        self.load_current(service).await;
        &self.screen
    }

    /// Submits the current form. On success the session moves to the
    /// returned route and loads it; on failure it stays put.
    pub async fn submit<S>(&mut self, service: &S) -> Result<Route, SubmitError>
    where
        S: EmployeeService + ?Sized,
    {
        let next = match &mut self.screen {
            Screen::Create(screen) => screen.submit(service).await?,
            Screen::Edit(screen) => screen.submit(service).await?,
            _ => return Err(SubmitError::NoForm),
        };
        self.go(next.clone());
        self.load_current(service).await;
        Ok(next)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
