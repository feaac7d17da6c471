//! Hooks observing and steering the bind lifecycle.

use std::sync::Arc;

use super::context::BindContext;
use crate::BindResult;
use crate::error::BindError;
use crate::name::PropertyName;

/// Callbacks invoked around every bind of a name.
///
/// Every method has a no-op default so implementations override only what
/// they need.
pub trait BindHandler: Send + Sync {
    /// A bind of `name` is about to start.
    fn on_start(&self, _name: &PropertyName, _target_type: &'static str, _context: &BindContext) {}

    /// A value was bound for `name`.
    fn on_success(&self, _name: &PropertyName, _target_type: &'static str, _context: &BindContext) {}

    /// Binding `name` failed.
    ///
    /// Returning `Ok(())` swallows the error and the bind continues as if
    /// nothing was found.
    ///
    /// # Errors
    ///
    /// The default propagates `error` unchanged.
    fn on_failure(
        &self,
        _name: &PropertyName,
        _target_type: &'static str,
        error: Arc<BindError>,
        _context: &BindContext,
    ) -> BindResult<()> {
        Err(error)
    }

    /// The bind of `name` finished, bound or not.
    fn on_finish(
        &self,
        _name: &PropertyName,
        _target_type: &'static str,
        _bound: bool,
        _context: &BindContext,
    ) {
    }

    /// No instance of the target could be created.
    ///
    /// Implementations may return a richer error.
    fn on_create_failure(
        &self,
        _name: &PropertyName,
        _target_type: &'static str,
        error: Arc<BindError>,
    ) -> Arc<BindError> {
        error
    }
}

/// Handler that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl BindHandler for NoopHandler {}

/// Swallows every failure, logging it at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreErrorsHandler;

impl BindHandler for IgnoreErrorsHandler {
    fn on_failure(
        &self,
        name: &PropertyName,
        target_type: &'static str,
        error: Arc<BindError>,
        _context: &BindContext,
    ) -> BindResult<()> {
        tracing::warn!(name = %name, target_type, error = %error, "ignoring bind failure");
        Ok(())
    }
}

/// Logs every lifecycle event at `trace`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHandler;

impl BindHandler for TracingHandler {
    fn on_start(&self, name: &PropertyName, target_type: &'static str, context: &BindContext) {
        tracing::trace!(name = %name, target_type, depth = context.depth(), "bind start");
    }

    fn on_success(&self, name: &PropertyName, target_type: &'static str, context: &BindContext) {
        tracing::trace!(name = %name, target_type, depth = context.depth(), "bind success");
    }

    fn on_failure(
        &self,
        name: &PropertyName,
        target_type: &'static str,
        error: Arc<BindError>,
        context: &BindContext,
    ) -> BindResult<()> {
        tracing::trace!(name = %name, target_type, depth = context.depth(), error = %error, "bind failure");
        Err(error)
    }

    fn on_finish(&self, name: &PropertyName, target_type: &'static str, bound: bool, context: &BindContext) {
        tracing::trace!(name = %name, target_type, bound, phase = ?context.phase(), "bind finish");
    }
}
