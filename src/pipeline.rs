//! The pipeline: three middleware lists around one handler.
//!
//! # Invocation
//!
//! ```text
//! before[0] → before[1] → … → handler → after[n] → … → after[0] → Ok(response)
//!     └──────────────┴── any Err or panic ──┴──────────────┘
//!                              ↓
//!          on_error[0] → on_error[1] → … → recovered?  Ok(response) : Err(error)
//! ```
//!
//! `after` steps run in reverse registration order, unwinding the way the
//! `before` steps wound up. `before` and `on_error` steps run in registration
//! order.
//!
//! # Registration while running
//!
//! Registration takes `&self`, so a pipeline shared through an `Arc` can grow
//! while invocations are in flight. Each invocation copies the three lists
//! when it starts and never looks at them again; a step registered mid-run
//! takes effect from the next invocation on.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;

use parking_lot::RwLock;
use tracing::{Instrument, debug, debug_span, warn};

use crate::context::Context;
use crate::error::{BoxError, ConfigError};
use crate::handler::{self, BoxedHandler};
use crate::middleware::Middleware;
use crate::runner::{guarded, run_error_steps, run_steps};
use crate::stage::Stage;
use crate::step::{BoxFuture, Step, StepResult};

/// A handler wrapped in `before`, `after` and `on_error` middleware.
///
/// ```rust,no_run
/// use strata::Pipeline;
///
/// #[tokio::main]
/// async fn main() {
///     let greet = Pipeline::<String, (), String>::named("greet", |ctx| {
///         Box::pin(async move { Ok(format!("hello, {}", ctx.request())) })
///     });
///
///     greet
///         .before(|ctx| Box::pin(async move {
///             if ctx.request().is_empty() {
///                 return Err("missing name".into());
///             }
///             Ok(())
///         }))
///         .on_error(|ctx| Box::pin(async move {
///             ctx.set_response("hello, stranger".to_owned());
///             Ok(())
///         }));
///
///     let reply = greet.call(String::new(), ()).await.unwrap();
///     assert_eq!(reply.as_deref(), Some("hello, stranger"));
/// }
/// ```
pub struct Pipeline<Req, Meta, Res> {
    name: Cow<'static, str>,
    handler: BoxedHandler<Req, Meta, Res>,
    before: RwLock<Vec<Step<Req, Meta, Res>>>,
    after: RwLock<Vec<Step<Req, Meta, Res>>>,
    on_error: RwLock<Vec<Step<Req, Meta, Res>>>,
}

/// The step lists one invocation runs, copied when it starts.
struct Plan<Req, Meta, Res> {
    before: Vec<Step<Req, Meta, Res>>,
    after: Vec<Step<Req, Meta, Res>>,
    on_error: Vec<Step<Req, Meta, Res>>,
}

/// Read-only view of the registered step names, in execution order.
///
/// Meant for tests and tooling; invocations never consult it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Registered {
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub on_error: Vec<String>,
}

impl<Req, Meta, Res> Pipeline<Req, Meta, Res> {
    /// Wraps `handler` in an empty pipeline named `"pipeline"`.
    pub fn new<F>(handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, Result<Res, BoxError>>
            + Send
            + Sync
            + 'static,
    {
        Self::named("pipeline", handler)
    }

    /// Wraps `handler` in an empty pipeline. `name` is recorded on the
    /// tracing span of every invocation.
    pub fn named<F>(name: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, Result<Res, BoxError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            handler: handler::boxed(handler),
            before: RwLock::new(Vec::new()),
            after: RwLock::new(Vec::new()),
            on_error: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str { &self.name }

    // ── Registration ─────────────────────────────────────────────────────────

    /// Registers every slot `middleware` fills. Returns `self` for chaining.
    ///
    /// Equivalent to calling [`before_step`](Self::before_step),
    /// [`after_step`](Self::after_step) and
    /// [`on_error_step`](Self::on_error_step) for the filled slots. Those steps
    /// are reported by [`registered`](Self::registered) under the middleware's
    /// name, whereas [`before`](Self::before) and friends name a bare closure
    /// after its type.
    pub fn use_middleware(&self, middleware: Middleware<Req, Meta, Res>) -> Result<&Self, ConfigError> {
        if middleware.is_empty() {
            return Err(ConfigError::EmptyMiddleware { name: middleware.name.into_owned() });
        }

        let Middleware { before, after, on_error, .. } = middleware;
        if let Some(step) = before {
            self.before_step(step);
        }
        if let Some(step) = after {
            self.after_step(step);
        }
        if let Some(step) = on_error {
            self.on_error_step(step);
        }
        Ok(self)
    }

    /// Appends a `before` step. Steps run in registration order.
    pub fn before<F>(&self, f: F) -> &Self
    where
        F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.before_step(Step::new(type_name::<F>(), f))
    }

    /// Prepends an `after` step. Steps run in reverse registration order.
    pub fn after<F>(&self, f: F) -> &Self
    where
        F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.after_step(Step::new(type_name::<F>(), f))
    }

    /// Appends an `on_error` step. Steps run in registration order.
    pub fn on_error<F>(&self, f: F) -> &Self
    where
        F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.on_error_step(Step::new(type_name::<F>(), f))
    }

    pub fn before_step(&self, step: Step<Req, Meta, Res>) -> &Self {
        debug!(pipeline = %self.name, step = step.name(), "registered before step");
        self.before.write().push(step);
        self
    }

    pub fn after_step(&self, step: Step<Req, Meta, Res>) -> &Self {
        debug!(pipeline = %self.name, step = step.name(), "registered after step");
        self.after.write().insert(0, step);
        self
    }

    pub fn on_error_step(&self, step: Step<Req, Meta, Res>) -> &Self {
        debug!(pipeline = %self.name, step = step.name(), "registered on_error step");
        self.on_error.write().push(step);
        self
    }

    /// Names of the registered steps, in the order an invocation runs them.
    pub fn registered(&self) -> Registered {
        fn names<Req, Meta, Res>(steps: &RwLock<Vec<Step<Req, Meta, Res>>>) -> Vec<String> {
            steps.read().iter().map(|s| s.name().to_owned()).collect()
        }

        Registered {
            before: names(&self.before),
            after: names(&self.after),
            on_error: names(&self.on_error),
        }
    }

    // ── Invocation ───────────────────────────────────────────────────────────

    /// Runs one invocation and resolves to its single outcome.
    ///
    /// `Ok` carries whatever response the context holds at the end, which is
    /// `None` only when an error step recovered without setting one. `Err`
    /// carries the error no error step recovered from.
    pub async fn call(&self, request: Req, meta: Meta) -> Result<Option<Res>, BoxError> {
        let plan = self.plan();
        let mut ctx = Context::new(request, meta);
        let span = debug_span!("pipeline", name = %self.name);
        self.execute(&plan, &mut ctx).instrument(span).await
    }

    /// Callback form of [`call`](Self::call): `callback` runs exactly once,
    /// with the same outcome `call` would have returned.
    pub async fn invoke<C>(&self, request: Req, meta: Meta, callback: C)
    where
        C: FnOnce(Result<Option<Res>, BoxError>),
    {
        callback(self.call(request, meta).await);
    }

    fn plan(&self) -> Plan<Req, Meta, Res> {
        Plan {
            before: self.before.read().clone(),
            after: self.after.read().clone(),
            on_error: self.on_error.read().clone(),
        }
    }

    async fn execute(
        &self,
        plan: &Plan<Req, Meta, Res>,
        ctx: &mut Context<Req, Meta, Res>,
    ) -> Result<Option<Res>, BoxError> {
        if let Err(err) = self.run_main(plan, ctx).await {
            debug!(error = %err, steps = plan.on_error.len(), "entering error stage");
            ctx.error = Some(err);

            if let Err(err) = run_error_steps(&plan.on_error, ctx).await {
                warn!(error = %err, "invocation failed");
                return Err(err);
            }
            debug!("error recovered");
        }

        Ok(ctx.response.take())
    }

    async fn run_main(
        &self,
        plan: &Plan<Req, Meta, Res>,
        ctx: &mut Context<Req, Meta, Res>,
    ) -> StepResult {
        debug!(stage = %Stage::Before, steps = plan.before.len(), "entering stage");
        run_steps(Stage::Before, &plan.before, ctx).await?;

        debug!(stage = %Stage::Handler, "entering stage");
        let response = guarded(Stage::Handler, async { (self.handler)(ctx).await }).await??;
        ctx.response = Some(response);

        debug!(stage = %Stage::After, steps = plan.after.len(), "entering stage");
        run_steps(Stage::After, &plan.after, ctx).await
    }
}

impl<Req, Meta, Res> fmt::Debug for Pipeline<Req, Meta, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("registered", &self.registered())
            .finish_non_exhaustive()
    }
}
