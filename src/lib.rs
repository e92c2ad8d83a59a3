//! Client-side state for the job matching demo: session, notifications,
//! display language and the first-run onboarding wizard.

pub mod app;
pub mod cli;
pub mod core;
pub mod locale;
pub mod logging;
pub mod notification;
pub mod onboarding;
pub mod ports;
pub mod routes;
pub mod session;
pub mod types;
pub mod utils;

pub use app::App;
pub use locale::{Language, LocaleStore};
pub use notification::{Notification, NotificationKind, NotificationStore};
pub use onboarding::{OnboardingResult, OnboardingWizard, Questionnaire};
pub use routes::{Navigation, Route, RouteGuard};
pub use session::{Session, SessionStore, User};
