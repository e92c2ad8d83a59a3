// src/routes.rs
//! Route table and the session-based navigation guard

use serde::Serialize;

use crate::app_log;
use crate::session::SessionStore;

pub const HOME_PATH: &str = "/";
pub const AUTH_PATH: &str = "/auth";
pub const ONBOARDING_PATH: &str = "/onboarding";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "id", rename_all = "kebab-case")]
pub enum Route {
    Home,
    Auth,
    Onboarding,
    Dashboard,
    Jobs,
    Resume,
    Match(String),
    Settings,
    Applications,
    SavedJobs,
    Interviews,
    InterviewRoom(Option<String>),
    Messages,
}

impl Route {
    /// Match a path against the route table. Query strings and a trailing
    /// slash are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["auth"] => Route::Auth,
            ["onboarding"] => Route::Onboarding,
            ["dashboard"] => Route::Dashboard,
            ["jobs"] => Route::Jobs,
            ["resume"] => Route::Resume,
            ["match", id] => Route::Match(id.to_string()),
            ["settings"] => Route::Settings,
            ["applications"] => Route::Applications,
            ["saved-jobs"] => Route::SavedJobs,
            ["interviews"] => Route::Interviews,
            ["interview"] => Route::InterviewRoom(None),
            ["interview", id] => Route::InterviewRoom(Some(id.to_string())),
            ["messages"] => Route::Messages,
            _ => return None,
        };
        Some(route)
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Home | Route::Auth)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME_PATH.to_string(),
            Route::Auth => AUTH_PATH.to_string(),
            Route::Onboarding => ONBOARDING_PATH.to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Jobs => "/jobs".to_string(),
            Route::Resume => "/resume".to_string(),
            Route::Match(id) => format!("/match/{}", id),
            Route::Settings => "/settings".to_string(),
            Route::Applications => "/applications".to_string(),
            Route::SavedJobs => "/saved-jobs".to_string(),
            Route::Interviews => "/interviews".to_string(),
            Route::InterviewRoom(None) => "/interview".to_string(),
            Route::InterviewRoom(Some(id)) => format!("/interview/{}", id),
            Route::Messages => "/messages".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "lowercase")]
pub enum Navigation {
    Render(Route),
    Redirect(&'static str),
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn resolve(path: &str, session: &SessionStore) -> Navigation {
        let authenticated = session.is_authenticated();

        let navigation = match Route::parse(path) {
            None => Navigation::Redirect(HOME_PATH),
            Some(Route::Auth) if authenticated => Navigation::Redirect(ONBOARDING_PATH),
            Some(route) if route.is_protected() && !authenticated => Navigation::Redirect(AUTH_PATH),
            Some(route) => Navigation::Render(route),
        };

        app_log!(debug, "Route {} resolved to {:?}", path, navigation);
        navigation
    }
}
