//! Navigation against a live session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends call [`Navigator::enter`] on every navigation and run
//! [`Navigator::follow`] alongside the UI so a session change (logout, stale
//! token) moves the visitor off a view they can no longer see.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::sync::{Arc, Mutex, PoisonError};

use super::guard::{Admission, RouteGuard, View, ViewClass};
use crate::state::auth::SessionController;

pub struct Navigator {
    controller: Arc<SessionController>,
    guard: RouteGuard,
    current: Mutex<View>,
}

impl Navigator {
    #[must_use]
    pub fn new(controller: Arc<SessionController>, guard: RouteGuard) -> Self {
        Self { controller, guard, current: Mutex::new(View::Root) }
    }

    #[must_use]
    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    #[must_use]
    pub fn guard(&self) -> RouteGuard {
        self.guard
    }

    /// The view last requested or redirected to.
    #[must_use]
    pub fn current_view(&self) -> View {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Navigate to `view`.
    ///
    /// An `AuthRequired` view that would render first refreshes the profile;
    /// if that fails the controller has already fallen back to guest and the
    /// visitor is redirected instead of seeing a broken screen.
    pub async fn enter(&self, view: View) -> Admission {
        let admission = self.guard.resolve(view, &self.controller.current_session());
        let admission = match admission {
            Admission::Render if self.guard.policy().class_of(view) == ViewClass::AuthRequired => {
                match self.controller.refresh_profile().await {
                    Ok(_) => Admission::Render,
                    Err(e) => {
                        tracing::debug!(view = %view, error_code = e.error_code(), "profile refresh failed on entry");
                        self.guard.resolve(view, &self.controller.current_session())
                    }
                }
            }
            other => other,
        };
        self.settle(view, admission);
        admission
    }

    /// Re-run admission for the current view against the current session.
    #[must_use]
    pub fn reevaluate(&self) -> Admission {
        let view = self.current_view();
        let admission = self.guard.resolve(view, &self.controller.current_session());
        self.settle(view, admission);
        admission
    }

    /// Re-evaluate on every session change, calling `on_redirect` with the
    /// new view whenever the current one is no longer admissible. Runs until
    /// the surrounding task is cancelled.
    pub async fn follow<F>(&self, mut on_redirect: F)
    where
        F: FnMut(View) + Send,
    {
        let mut rx = self.controller.subscribe();
        while rx.changed().await.is_ok() {
            if let Admission::Redirect(to) = self.reevaluate() {
                tracing::debug!(to = %to, "session change redirected navigation");
                on_redirect(to);
            }
        }
    }

    fn settle(&self, requested: View, admission: Admission) {
        let landed = match admission {
            Admission::Redirect(to) => to,
            Admission::Render | Admission::Wait => requested,
        };
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = landed;
    }
}
