//! Sequential and error-stage runners.
//!
//! Both walk a snapshot slice of steps head-to-tail, awaiting each step before
//! starting the next. They differ only in how an error changes the walk:
//!
//! | Runner | Step returns `Err(e)` | Step returns `Ok(())` | Step panics |
//! |---|---|---|---|
//! | [`run_steps`] | stop, return `Err(e)` | next step | stop, return `Err(Panicked)` |
//! | [`run_error_steps`] | `e` becomes pending, next step | mark handled for the rest of the stage, next step | stop, return `Err(Panicked)` |
//!
//! Each runner is a single future resolving to a single `Result`, so "done
//! fires exactly once" holds by construction.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{error, trace};

use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::stage::Stage;
use crate::step::{Step, StepResult};

/// Runs `steps` in order, stopping at the first error.
pub(crate) async fn run_steps<Req, Meta, Res>(
    stage: Stage,
    steps: &[Step<Req, Meta, Res>],
    ctx: &mut Context<Req, Meta, Res>,
) -> StepResult {
    for step in steps {
        trace!(%stage, step = step.name(), "running step");
        guarded(stage, async { step.call(ctx).await }).await??;
    }
    Ok(())
}

/// Runs the error stage over the error already pending in `ctx`.
///
/// Every step gets a turn. Once a step recovers, the stage succeeds even if
/// later steps pass the error along; only a panic can still fail it.
pub(crate) async fn run_error_steps<Req, Meta, Res>(
    steps: &[Step<Req, Meta, Res>],
    ctx: &mut Context<Req, Meta, Res>,
) -> StepResult {
    ctx.handled = false;

    for step in steps {
        trace!(step = step.name(), handled = ctx.handled, "running error step");
        match guarded(Stage::Error, async { step.call(ctx).await }).await? {
            Ok(()) => ctx.handled = true,
            Err(err) => ctx.error = Some(err),
        }
    }

    if ctx.handled {
        return Ok(());
    }
    match ctx.error.take() {
        Some(err) => Err(err),
        // A step took the error and then failed to return one; nothing is left
        // to report.
        None => Ok(()),
    }
}

/// Polls `fut` with panics caught. The outer `Err` means the future panicked.
///
/// The future is built inside the caller's `async` block, so a panic while
/// constructing it is caught here too.
pub(crate) async fn guarded<T, F>(stage: Stage, fut: F) -> Result<Result<T, BoxError>, Error>
where
    F: Future<Output = Result<T, BoxError>>,
{
    AssertUnwindSafe(fut).catch_unwind().await.map_err(|payload| {
        let message = panic_message(&*payload);
        error!(%stage, %message, "caught panic");
        Error::Panicked { stage, message }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
