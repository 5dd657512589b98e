//! Minimal strata example — an HTTP-shaped handler with request-id, timing
//! and error-envelope middleware.
//!
//! Run with:
//!   cargo run --example basic

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http::{HeaderValue, Request, Response, StatusCode};
use strata::{Middleware, Pipeline};

/// Invocation metadata, the way a function runtime would hand it over.
#[derive(Debug)]
struct Invocation {
    function: &'static str,
    started: Option<Instant>,
}

type App = Pipeline<Request<Bytes>, Invocation, Response<Bytes>>;
type Mw = Middleware<Request<Bytes>, Invocation, Response<Bytes>>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let app = App::named("users", |ctx| {
        Box::pin(async move {
            let req = ctx.request();
            if req.body().is_empty() {
                return Err("empty body".into());
            }
            let id = req.headers().get("x-request-id").cloned();

            let mut res = Response::builder().status(StatusCode::CREATED);
            if let Some(id) = id {
                res = res.header("x-request-id", id);
            }
            Ok(res.body(Bytes::from_static(br#"{"id":"99"}"#))?)
        })
    });

    app.use_middleware(request_id()).expect("request-id middleware");
    app.use_middleware(timing()).expect("timing middleware");
    app.on_error(|ctx| {
        let message = ctx.error().map(ToString::to_string).unwrap_or_default();
        Box::pin(async move {
            let body = format!(r#"{{"error":"{message}"}}"#);
            let res = Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .body(Bytes::from(body))?;
            ctx.set_response(res);
            Ok(())
        })
    });

    let created = app
        .call(request(r#"{"name":"alice"}"#), invocation())
        .await
        .expect("created");
    report("POST /users", created);

    let rejected = app.call(request(""), invocation()).await.expect("rejected");
    report("POST /users (empty)", rejected);
}

fn request_id() -> Mw {
    Mw::new("request-id").before(|ctx| {
        Box::pin(async move {
            let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
            let value = format!("{nanos:x}").parse::<HeaderValue>()?;
            ctx.request_mut().headers_mut().insert("x-request-id", value);
            Ok(())
        })
    })
}

fn timing() -> Mw {
    Mw::new("timing")
        .before(|ctx| {
            ctx.meta_mut().started = Some(Instant::now());
            Box::pin(async { Ok(()) })
        })
        .after(|ctx| {
            if let Some(started) = ctx.meta().started {
                tracing::info!(
                    function = ctx.meta().function,
                    elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
                    "handled"
                );
            }
            Box::pin(async { Ok(()) })
        })
}

fn request(body: &'static str) -> Request<Bytes> {
    Request::builder()
        .method("POST")
        .uri("/users")
        .body(Bytes::from_static(body.as_bytes()))
        .expect("valid request")
}

fn invocation() -> Invocation {
    Invocation { function: "create-user", started: None }
}

fn report(label: &str, res: Option<Response<Bytes>>) {
    match res {
        Some(res) => println!("{label} → {} {}", res.status(), String::from_utf8_lossy(res.body())),
        None => println!("{label} → no response"),
    }
}
