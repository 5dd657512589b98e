//! Per-invocation execution context.

use crate::error::BoxError;

/// The mutable record shared by every step and the handler of one invocation.
///
/// A fresh `Context` is created when an invocation starts and dropped when it
/// ends. Steps receive it as `&mut Context`, so every read and write is
/// visible at the call site and no two steps ever hold it at the same time.
pub struct Context<Req, Meta, Res> {
    pub(crate) request: Req,
    pub(crate) meta: Meta,
    pub(crate) response: Option<Res>,
    pub(crate) error: Option<BoxError>,
    pub(crate) handled: bool,
}

impl<Req, Meta, Res> Context<Req, Meta, Res> {
    pub(crate) fn new(request: Req, meta: Meta) -> Self {
        Self { request, meta, response: None, error: None, handled: false }
    }

    pub fn request(&self) -> &Req { &self.request }
    pub fn request_mut(&mut self) -> &mut Req { &mut self.request }
    pub fn meta(&self) -> &Meta { &self.meta }
    pub fn meta_mut(&mut self) -> &mut Meta { &mut self.meta }

    /// The current response, if the handler or a step has set one.
    pub fn response(&self) -> Option<&Res> { self.response.as_ref() }
    pub fn response_mut(&mut self) -> Option<&mut Res> { self.response.as_mut() }

    /// Replaces the response. Error steps use this to recover with a fallback.
    pub fn set_response(&mut self, response: Res) {
        self.response = Some(response);
    }

    pub fn take_response(&mut self) -> Option<Res> { self.response.take() }

    /// The pending error. Only ever `Some` while the error stage runs.
    ///
    /// A step that recovers does not clear it: later error steps still see the
    /// error unless the recovering step called [`take_error`](Self::take_error).
    pub fn error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.error.as_deref()
    }

    /// Clears the pending error and hands it to the caller.
    pub fn take_error(&mut self) -> Option<BoxError> { self.error.take() }
}

impl<Req, Meta, Res> std::fmt::Debug for Context<Req, Meta, Res>
where
    Req: std::fmt::Debug,
    Meta: std::fmt::Debug,
    Res: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request", &self.request)
            .field("meta", &self.meta)
            .field("response", &self.response)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
