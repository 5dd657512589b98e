//! The wrapped handler and its type erasure.
//!
//! The handler receives the same `&mut Context` the steps see, so it can read
//! anything a `before` step prepared and leave state for the `after` steps.
//! It returns the response instead of writing it into the context; the
//! pipeline stores it there before the `after` stage begins.

use crate::context::Context;
use crate::error::BoxError;
use crate::step::BoxFuture;

/// Type-erased handler owned by a [`Pipeline`](crate::Pipeline).
///
/// `Box` rather than `Arc`: the pipeline is the only owner, and invocations
/// borrow it through `&self`.
pub(crate) type BoxedHandler<Req, Meta, Res> = Box<
    dyn for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, Result<Res, BoxError>>
        + Send
        + Sync,
>;

pub(crate) fn boxed<Req, Meta, Res, F>(f: F) -> BoxedHandler<Req, Meta, Res>
where
    F: for<'a> Fn(&'a mut Context<Req, Meta, Res>) -> BoxFuture<'a, Result<Res, BoxError>>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}
