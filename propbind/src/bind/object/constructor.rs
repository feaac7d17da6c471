//! Constructor binding: resolve every parameter, then construct once.

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::bind::{BindContext, Bindable, Binder, Bind};
use crate::error::BindError;
use crate::name::PropertyName;
use crate::{BindResult, BindResultExt};

type Slot = Box<dyn Any + Send>;
type Fallback = Box<dyn Fn() -> Slot + Send + Sync>;
type ParameterBinder =
    Box<dyn Fn(&Binder, &PropertyName, &mut BindContext) -> BindResult<Option<Slot>> + Send + Sync>;
type Construct<T> = Box<dyn Fn(&mut Arguments) -> BindResult<T> + Send + Sync>;

/// One constructor parameter.
///
/// # Examples
///
/// ```
/// use propbind::Parameter;
///
/// let host = Parameter::required::<String>("host");
/// let port = Parameter::with_default::<u16>("port", || 8080);
/// assert!(host.is_required());
/// assert!(!port.is_required());
/// ```
pub struct Parameter {
    name: Option<Cow<'static, str>>,
    type_name: &'static str,
    fallback: Option<Fallback>,
    flatten: bool,
    bind: ParameterBinder,
}

impl Parameter {
    /// A parameter that must be bound.
    #[must_use]
    pub fn required<F: Bind>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::build::<F, F>(Some(name.into()), None, |value| value)
    }

    /// A parameter whose slot holds `Option<F>`, `None` when unbound.
    #[must_use]
    pub fn optional<F: Bind>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::build::<F, Option<F>>(
            Some(name.into()),
            Some(Box::new(|| Box::new(None::<F>) as Slot)),
            Some,
        )
    }

    /// A parameter that falls back to `default` when unbound.
    #[must_use]
    pub fn with_default<F: Bind>(
        name: impl Into<Cow<'static, str>>,
        default: impl Fn() -> F + Send + Sync + 'static,
    ) -> Self {
        Self::build::<F, F>(
            Some(name.into()),
            Some(Box::new(move || Box::new(default()) as Slot)),
            |value| value,
        )
    }

    /// A required parameter with no recoverable name.
    ///
    /// Binding fails with [`BindError::ParameterNamesUnavailable`] unless the
    /// parameter is flattened.
    #[must_use]
    pub fn unnamed<F: Bind>() -> Self {
        Self::build::<F, F>(None, None, |value| value)
    }

    fn build<F: Bind, S: Send + 'static>(
        name: Option<Cow<'static, str>>,
        fallback: Option<Fallback>,
        wrap: fn(F) -> S,
    ) -> Self {
        Self {
            name,
            type_name: type_name::<F>(),
            fallback,
            flatten: false,
            bind: Box::new(move |binder, name, context| {
                Ok(binder
                    .bind_name::<F>(name, Bindable::of(), context)?
                    .map(|value| Box::new(wrap(value)) as Slot))
            }),
        }
    }

    /// Bind this parameter from the object's own prefix instead of a child
    /// name.
    #[must_use]
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// The parameter name, when known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether binding fails when the parameter has no value.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.fallback.is_none()
    }

    /// Whether the parameter binds from the object's prefix.
    #[must_use]
    pub const fn is_flattened(&self) -> bool {
        self.flatten
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    fn target(&self, prefix: &PropertyName) -> BindResult<PropertyName> {
        match (&self.name, self.flatten) {
            (_, true) | (None, false) => Ok(prefix.clone()),
            (Some(name), false) => prefix.append(name).into_bind(),
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("required", &self.is_required())
            .field("flatten", &self.flatten)
            .finish()
    }
}

/// Bound parameter values handed to a constructor, in declaration order.
#[derive(Debug)]
pub struct Arguments {
    name: PropertyName,
    target_type: &'static str,
    slots: Vec<Option<Slot>>,
}

impl Arguments {
    /// Take the value at `index`.
    ///
    /// Optional parameters hold `Option<F>`; every other parameter holds `F`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::InstanceCreation`] when the slot is empty,
    /// already taken or holds another type.
    pub fn take<F: 'static>(&mut self, index: usize) -> BindResult<F> {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .and_then(|slot| slot.downcast::<F>().ok())
            .map(|value| *value)
            .ok_or_else(|| {
                Arc::new(BindError::InstanceCreation {
                    name: self.name.clone(),
                    target_type: self.target_type,
                    reason: format!("argument {index} is missing or is not a {}", type_name::<F>()),
                })
            })
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the constructor takes no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// A constructor and its parameters.
pub struct ConstructorShape<T> {
    parameters: Vec<Parameter>,
    construct: Construct<T>,
}

impl<T: 'static> ConstructorShape<T> {
    /// Describe a constructor taking `parameters`.
    #[must_use]
    pub fn new<C>(parameters: Vec<Parameter>, construct: C) -> Self
    where
        C: Fn(&mut Arguments) -> BindResult<T> + Send + Sync + 'static,
    {
        Self {
            parameters,
            construct: Box::new(construct),
        }
    }

    /// The parameters, in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn bind(
        &self,
        binder: &Binder,
        name: &PropertyName,
        existing: Option<T>,
        context: &mut BindContext,
    ) -> BindResult<Option<T>> {
        let target_type = type_name::<T>();
        if self.parameters.iter().any(|p| p.name.is_none() && !p.flatten) {
            return Err(Arc::new(BindError::ParameterNamesUnavailable { target_type }));
        }
        let mut slots = Vec::with_capacity(self.parameters.len());
        let mut errors = Vec::new();
        let mut missing = Vec::new();
        let mut any_bound = false;
        for parameter in &self.parameters {
            let target = parameter.target(name)?;
            match (parameter.bind)(binder, &target, context) {
                Ok(Some(value)) => {
                    any_bound = true;
                    slots.push(Some(value));
                }
                Ok(None) => {
                    if let Some(fallback) = &parameter.fallback {
                        slots.push(Some(fallback()));
                    } else {
                        missing.push(missing_parameter::<T>(name, parameter, Vec::new()));
                        slots.push(None);
                    }
                }
                Err(error) if parameter.is_required() => {
                    errors.push(missing_parameter::<T>(name, parameter, vec![error]));
                    slots.push(None);
                }
                Err(error) => {
                    errors.push(error);
                    slots.push(None);
                }
            }
        }
        if !any_bound && errors.is_empty() && (context.depth() > 1 || missing.is_empty()) {
            return Ok(existing);
        }
        errors.extend(missing);
        if let Some(error) = BindError::collapse(errors) {
            return Err(error);
        }
        let mut arguments = Arguments {
            name: name.clone(),
            target_type,
            slots,
        };
        (self.construct)(&mut arguments)
            .map(Some)
            .map_err(|error| binder.handler().on_create_failure(name, target_type, error))
    }

    pub(crate) fn create(&self, name: &PropertyName) -> BindResult<T> {
        let mut slots = Vec::with_capacity(self.parameters.len());
        let mut missing = Vec::new();
        for parameter in &self.parameters {
            match &parameter.fallback {
                Some(fallback) => slots.push(Some(fallback())),
                None => {
                    missing.push(missing_parameter::<T>(name, parameter, Vec::new()));
                    slots.push(None);
                }
            }
        }
        if let Some(error) = BindError::collapse(missing) {
            return Err(error);
        }
        let mut arguments = Arguments {
            name: name.clone(),
            target_type: type_name::<T>(),
            slots,
        };
        (self.construct)(&mut arguments)
    }
}

fn missing_parameter<T>(
    name: &PropertyName,
    parameter: &Parameter,
    suppressed: Vec<Arc<BindError>>,
) -> Arc<BindError> {
    Arc::new(BindError::MissingRequiredParameter {
        name: name.clone(),
        parameter: parameter.label().to_owned(),
        target_type: type_name::<T>(),
        suppressed,
    })
}

impl<T> fmt::Debug for ConstructorShape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorShape")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
