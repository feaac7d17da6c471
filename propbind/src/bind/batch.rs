//! Binding several independent targets with per-target failure isolation.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use super::bindable::Bindable;
use super::context::BindOptions;
use super::target::Bind;
use super::Binder;
use crate::BindResult;
use crate::error::BindError;

type Value = Box<dyn Any + Send>;
type Job = Box<dyn FnOnce(&Binder) -> Result<Value, Arc<BindError>> + Send>;

/// A set of targets bound one after another.
///
/// A failing target is logged and recorded; the remaining targets are still
/// bound.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use propbind::{BindBatch, BindOptions, Binder, MapSource, PropertySource, SourceSet};
///
/// let source = Arc::new(MapSource::new("app", [("a.port", "80"), ("b.port", "nope")]));
/// let binder = Binder::new(SourceSet::single(source as Arc<dyn PropertySource>));
/// let mut report = BindBatch::new(&binder)
///     .register::<u16>("a.port", BindOptions::default())
///     .register::<u16>("b.port", BindOptions::default())
///     .run();
/// assert_eq!(report.failures().count(), 1);
/// assert_eq!(report.take::<u16>("a.port").unwrap().unwrap(), 80);
/// ```
pub struct BindBatch<'b> {
    binder: &'b Binder,
    targets: Vec<(String, &'static str, Job)>,
}

impl<'b> BindBatch<'b> {
    /// An empty batch bound by `binder`.
    #[must_use]
    pub const fn new(binder: &'b Binder) -> Self {
        Self {
            binder,
            targets: Vec::new(),
        }
    }

    /// Add a target bound, or created empty, at `prefix`.
    #[must_use]
    pub fn register<T: Bind>(mut self, prefix: impl Into<String>, options: BindOptions) -> Self {
        let label: String = prefix.into();
        let name = label.clone();
        let job: Job = Box::new(move |binder| {
            binder
                .bind_or_create_with::<T>(&name, Bindable::of(), options)
                .map(|value| Box::new(value) as Value)
        });
        self.targets.push((label, type_name::<T>(), job));
        self
    }

    /// Bind every target.
    #[must_use]
    pub fn run(self) -> BatchReport {
        let outcomes = self
            .targets
            .into_iter()
            .map(|(prefix, target_type, job)| {
                let outcome = job(self.binder);
                match &outcome {
                    Ok(_) => tracing::debug!(prefix = %prefix, target_type, "bound target"),
                    Err(error) => {
                        tracing::error!(prefix = %prefix, target_type, error = %error, "failed to bind target");
                    }
                }
                (prefix, outcome)
            })
            .collect();
        BatchReport { outcomes }
    }
}

impl fmt::Debug for BindBatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindBatch")
            .field("binder", self.binder)
            .field(
                "targets",
                &self.targets.iter().map(|(p, t, _)| (p, t)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Outcome of a [`BindBatch`].
pub struct BatchReport {
    outcomes: Vec<(String, Result<Value, Arc<BindError>>)>,
}

impl BatchReport {
    /// Remove and return the outcome for `prefix`.
    ///
    /// Returns `None` when no target was registered at `prefix`, when it was
    /// already taken, or when `T` is not the registered type.
    pub fn take<T: Bind>(&mut self, prefix: &str) -> Option<BindResult<T>> {
        let index = self.outcomes.iter().position(|(p, outcome)| {
            p == prefix && outcome.as_ref().map_or(true, |value| value.is::<T>())
        })?;
        let (_, outcome) = self.outcomes.swap_remove(index);
        match outcome {
            Ok(value) => value.downcast::<T>().ok().map(|value| Ok(*value)),
            Err(error) => Some(Err(error)),
        }
    }

    /// Targets that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Arc<BindError>)> {
        self.outcomes
            .iter()
            .filter_map(|(prefix, outcome)| outcome.as_ref().err().map(|e| (prefix.as_str(), e)))
    }

    /// Whether every remaining target succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_ok())
    }

    /// Number of outcomes not yet taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether every outcome has been taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl fmt::Debug for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.outcomes
                    .iter()
                    .map(|(prefix, outcome)| (prefix, outcome.as_ref().map(|_| "bound"))),
            )
            .finish()
    }
}
