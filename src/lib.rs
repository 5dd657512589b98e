//! # strata
//!
//! Ordered middleware around a single async handler.
//! One input in, one outcome out.
//!
//! ## The contract
//!
//! A [`Pipeline`] wraps one handler with three lists of steps:
//!
//! - **before** — run in registration order, ahead of the handler
//! - **after** — run in *reverse* registration order, once the handler succeeded
//! - **on_error** — run in registration order whenever anything above failed
//!
//! Every step gets `&mut` [`Context`] and returns a boxed future. `Ok(())`
//! proceeds; `Err(e)` short-circuits to the error stage. Error steps recover by
//! returning `Ok(())`, and the invocation then succeeds with whatever response
//! the context holds. A panic in any step or in the handler is caught and
//! reported as [`Error::Panicked`]; it never unwinds out of the pipeline.
//!
//! What strata deliberately leaves to the host:
//!
//! - **Runtime** — no executor is required; the pipeline is just a future
//! - **Timeouts and cancellation** — drop the future, or wrap it in a timeout
//! - **Retries** — a failed invocation is reported once and that is all
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strata::{Middleware, Pipeline};
//!
//! #[derive(Debug, Default)]
//! struct Reply { ok: bool, timestamp: Option<u64> }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Pipeline::<Vec<String>, (), Reply>::new(|_ctx| {
//!         Box::pin(async { Ok(Reply { ok: true, timestamp: None }) })
//!     });
//!
//!     app.use_middleware(
//!         Middleware::<Vec<String>, (), Reply>::new("timestamp").after(|ctx| Box::pin(async move {
//!             if let Some(reply) = ctx.response_mut() {
//!                 reply.timestamp = Some(1_700_000_000);
//!             }
//!             Ok(())
//!         })),
//!     )
//!     .unwrap();
//!
//!     let reply = app.call(Vec::new(), ()).await.unwrap();
//!     println!("{reply:?}");
//! }
//! ```

mod context;
mod error;
mod handler;
mod pipeline;
mod runner;
mod stage;
mod step;

pub mod middleware;

pub use context::Context;
pub use error::{BoxError, ConfigError, Error};
pub use middleware::Middleware;
pub use pipeline::{Pipeline, Registered};
pub use stage::Stage;
pub use step::{BoxFuture, Step, StepResult};
