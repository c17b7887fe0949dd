use std::sync::Arc;

use super::context::RequestContext;
use super::response::ResponseWriter;

/// What the dispatcher should do after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next handler in the chain, if any.
    Continue,
    /// Stop the chain and end dispatch, even if nothing was written.
    Stop,
}

/// Result of a single handler invocation.
///
/// An `Err` stops the chain and is handed back to the caller of
/// [`Dispatcher::handle`](super::Dispatcher::handle) untouched.
pub type HandlerResult = anyhow::Result<Flow>;

/// A link in a route's handler chain.
///
/// Implemented for every `Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult`,
/// so plain functions and closures can be registered directly. Handlers run
/// inside the request coroutine; blocking I/O yields to the `may` scheduler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: &mut RequestContext, res: &mut ResponseWriter) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult + Send + Sync + 'static,
{
    fn call(&self, req: &mut RequestContext, res: &mut ResponseWriter) -> HandlerResult {
        self(req, res)
    }
}

/// Ordered handlers for one route.
///
/// Cloning is cheap: handlers are shared, which is what lets a mounted
/// sub-router's entries be copied into the parent table.
#[derive(Clone)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Start a chain with a closure or function handler.
    pub fn new<F>(first: F) -> Self
    where
        F: Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult + Send + Sync + 'static,
    {
        Self::from_handler(first)
    }

    /// Start a chain with any [`Handler`] implementation.
    pub fn from_handler<H: Handler>(first: H) -> Self {
        Self {
            handlers: vec![Arc::new(first)],
        }
    }

    /// Append a closure or function handler.
    #[must_use]
    pub fn then<F>(self, next: F) -> Self
    where
        F: Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult + Send + Sync + 'static,
    {
        self.then_handler(next)
    }

    /// Append any [`Handler`] implementation.
    #[must_use]
    pub fn then_handler<H: Handler>(mut self, next: H) -> Self {
        self.handlers.push(Arc::new(next));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Handler>> {
        self.handlers.iter()
    }
}

impl From<Vec<Arc<dyn Handler>>> for HandlerChain {
    fn from(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { handlers }
    }
}
