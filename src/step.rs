//! Middleware steps and their type erasure.
//!
//! # How steps are stored
//!
//! A pipeline keeps steps of many different closure types in one `Vec`, so
//! each closure is hidden behind a trait object:
//!
//! ```text
//! |ctx| Box::pin(async move { … })      ← user writes this
//!        ↓ pipeline.before(f)
//! Step { name, func: Arc::new(f) }      ← one heap allocation, at setup
//!        ↓ snapshot at invocation start
//! step.call(&mut ctx)                   ← one Arc clone + one vtable call
//! ```
//!
//! The closure borrows the context for exactly as long as its future lives,
//! which is why the signature is higher-ranked over `'a` and the future is
//! boxed: the runner awaits it in place before moving on.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::BoxError;

/// A heap-allocated, type-erased future borrowing the context for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a step resolves to: `Ok(())` proceeds, `Err(e)` proceeds with `e`.
pub type StepResult = Result<(), BoxError>;

type StepFn<Req, Meta, Res> =
    dyn for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, StepResult> + Send + Sync;

/// One registered middleware function, with the name it is reported under.
///
/// Cloning is one atomic increment; the pipeline clones every step when it
/// snapshots its lists at the start of an invocation.
pub struct Step<Req, Meta, Res> {
    name: Cow<'static, str>,
    func: Arc<StepFn<Req, Meta, Res>>,
}

impl<Req, Meta, Res> Step<Req, Meta, Res> {
    /// Wraps `f` under `name`.
    ///
    /// ```rust
    /// use strata::Step;
    ///
    /// let tag = Step::<Vec<String>, (), String>::new("tag", |ctx| {
    ///     Box::pin(async move {
    ///         ctx.request_mut().push("tagged".to_owned());
    ///         Ok(())
    ///     })
    /// });
    /// assert_eq!(tag.name(), "tag");
    /// ```
    pub fn new<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        Self { name: name.into(), func: Arc::new(f) }
    }

    pub fn name(&self) -> &str { &self.name }

    pub(crate) fn call<'a>(&'a self, ctx: &'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, StepResult> {
        (self.func)(ctx)
    }
}

impl<Req, Meta, Res> Clone for Step<Req, Meta, Res> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), func: Arc::clone(&self.func) }
    }
}

impl<Req, Meta, Res> fmt::Debug for Step<Req, Meta, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Step").field(&self.name).finish()
    }
}
