//! Middleware objects.
//!
//! A middleware bundles up to three steps that belong together, for example a
//! timer that starts in `before`, reports in `after` and also reports in
//! `on_error`. [`Pipeline::use_middleware`](crate::Pipeline::use_middleware)
//! registers each present slot exactly as the single-purpose calls would.
//!
//! ```rust
//! use strata::Middleware;
//!
//! let timer: Middleware<String, (), String> = Middleware::new("timer")
//!     .before(|_ctx| Box::pin(async { Ok(()) }))
//!     .after(|_ctx| Box::pin(async { Ok(()) }));
//! assert!(!timer.is_empty());
//! ```

use std::borrow::Cow;

use crate::context::Context;
use crate::step::{BoxFuture, Step, StepResult};

/// Up to three related steps registered together under one name.
pub struct Middleware<Req, Meta, Res> {
    pub(crate) name: Cow<'static, str>,
    pub(crate) before: Option<Step<Req, Meta, Res>>,
    pub(crate) after: Option<Step<Req, Meta, Res>>,
    pub(crate) on_error: Option<Step<Req, Meta, Res>>,
}

impl<Req, Meta, Res> Middleware<Req, Meta, Res> {
    /// A middleware with no slots. Registering it as-is is a
    /// [`ConfigError`](crate::ConfigError).
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), before: None, after: None, on_error: None }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn before<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.before = Some(Step::new(self.name.clone(), f));
        self
    }

    pub fn after<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.after = Some(Step::new(self.name.clone(), f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.on_error = Some(Step::new(self.name.clone(), f));
        self
    }

    /// True when no slot is filled.
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none() && self.on_error.is_none()
    }
}
