//! Data objects: composites bound property by property.
//!
//! A data object describes itself once through [`DataObject::describe`]. The
//! resulting [`ObjectShape`] may offer a constructor binder, a setter binder
//! or both; the binder picks one per bind.

mod constructor;
mod setter;

pub use constructor::{Arguments, ConstructorShape, Parameter};
pub use setter::{Property, SetterShape};

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use super::Binder;
use super::bindable::BindMethod;
use super::context::BindContext;
use super::target::Bind;
use crate::BindResult;
use crate::error::BindError;
use crate::name::PropertyName;
use crate::resolve::Resolver;
use crate::source::DescendantState;

/// A composite type described by a shape.
///
/// Usually implemented through `#[derive(DataObject)]`.
pub trait DataObject: Bind {
    /// Describe how instances are created and populated.
    fn describe() -> ObjectShape<Self>;
}

/// The binders available for a data object type.
pub struct ObjectShape<T> {
    constructor: Option<ConstructorShape<T>>,
    setters: Option<SetterShape<T>>,
}

impl<T> ObjectShape<T> {
    /// A shape with no binders.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            constructor: None,
            setters: None,
        }
    }

    /// Offer constructor binding.
    #[must_use]
    pub fn with_constructor(mut self, constructor: ConstructorShape<T>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Offer setter binding.
    #[must_use]
    pub fn with_setters(mut self, setters: SetterShape<T>) -> Self {
        self.setters = Some(setters);
        self
    }

    /// The constructor binder, if offered.
    #[must_use]
    pub const fn constructor(&self) -> Option<&ConstructorShape<T>> {
        self.constructor.as_ref()
    }

    /// The setter binder, if offered.
    #[must_use]
    pub const fn setters(&self) -> Option<&SetterShape<T>> {
        self.setters.as_ref()
    }
}

impl<T> Default for ObjectShape<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObjectShape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectShape")
            .field("target", &type_name::<T>())
            .field("constructor", &self.constructor)
            .field("setters", &self.setters)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Constructor,
    Setter,
}

impl Binder {
    /// Bind a data object at `name`, merging into `existing` when the setter
    /// binder is used.
    ///
    /// Called from the `Bind` implementation generated by
    /// `#[derive(DataObject)]`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::CyclicBind`] when the same type is already being
    /// bound at `name`, [`BindError::InstanceCreation`] when the shape offers
    /// no usable binder, and any error raised by the chosen binder.
    pub fn bind_data_object<T: DataObject>(
        &self,
        name: &PropertyName,
        existing: Option<T>,
        context: &mut BindContext,
    ) -> BindResult<Option<T>> {
        if context.depth() > 1
            && Resolver::new(context.sources()).descendant_state(name) == DescendantState::Absent
        {
            return Ok(existing);
        }
        context
            .begin_object(TypeId::of::<T>(), name)
            .map_err(|chain| {
                Arc::new(BindError::CyclicBind {
                    name: name.clone(),
                    chain,
                })
            })?;
        let result = self.run_plan(name, existing, context);
        context.end_object();
        result
    }

    fn run_plan<T: DataObject>(
        &self,
        name: &PropertyName,
        existing: Option<T>,
        context: &mut BindContext,
    ) -> BindResult<Option<T>> {
        let shape = self.registry().shape::<T>();
        let plan = match context.requested_method() {
            Some(BindMethod::Constructor) => shape.constructor().map(|_| Plan::Constructor),
            Some(BindMethod::Setter) => shape.setters().map(|_| Plan::Setter),
            None if existing.is_some() && shape.setters().is_some() => Some(Plan::Setter),
            None if shape.constructor().is_some() => Some(Plan::Constructor),
            None => shape.setters().map(|_| Plan::Setter),
        };
        tracing::trace!(name = %name, target_type = type_name::<T>(), ?plan, "binding data object");
        match (plan, shape.constructor(), shape.setters()) {
            (Some(Plan::Constructor), Some(constructor), _) => {
                constructor.bind(self, name, existing, context)
            }
            (Some(Plan::Setter), _, Some(setters)) => setters.bind(self, name, existing, context),
            _ => Err(Arc::new(BindError::InstanceCreation {
                name: name.clone(),
                target_type: type_name::<T>(),
                reason: "no constructor or setter binding is available".into(),
            })),
        }
    }

    /// Create a data object without binding any property.
    ///
    /// Setter shapes create their default instance; constructor shapes use
    /// each parameter's fallback.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingRequiredParameter`] when a constructor
    /// parameter has no fallback, and any error raised by the constructor.
    pub fn create_data_object<T: DataObject>(&self, name: &PropertyName) -> BindResult<Option<T>> {
        let shape = self.registry().shape::<T>();
        if let Some(setters) = shape.setters() {
            return Ok(Some(setters.create()));
        }
        match shape.constructor() {
            Some(constructor) => constructor.create(name).map(Some),
            None => Ok(None),
        }
    }
}
