//! Setter binding: create or reuse an instance, then assign each property.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::bind::{BindContext, Bindable, Binder, Bind};
use crate::error::BindError;
use crate::name::PropertyName;
use crate::{BindResult, BindResultExt};

type Assign<T> = Box<
    dyn Fn(&mut T, &Binder, &PropertyName, &mut BindContext) -> BindResult<bool> + Send + Sync,
>;

/// One settable property of `T`.
pub struct Property<T> {
    name: Cow<'static, str>,
    target_type: &'static str,
    required: bool,
    flatten: bool,
    assign: Assign<T>,
}

impl<T: 'static> Property<T> {
    /// A property reached through `access`.
    ///
    /// The current value is handed to the nested bind as its existing value,
    /// so nested objects merge rather than being replaced.
    #[must_use]
    pub fn new<F: Bind + Clone>(
        name: impl Into<Cow<'static, str>>,
        access: fn(&mut T) -> &mut F,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: type_name::<F>(),
            required: false,
            flatten: false,
            assign: Box::new(move |target, binder, name, context| {
                let slot = access(target);
                let before = context.bound_count();
                let bound = binder.bind_name::<F>(
                    name,
                    Bindable::of().with_existing_value(slot.clone()),
                    context,
                )?;
                if let Some(value) = bound {
                    *slot = value;
                }
                Ok(context.bound_count() > before)
            }),
        }
    }
}

impl<T> Property<T> {
    /// Fail the bind when this property receives no value and there is no
    /// existing instance.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Bind from the object's own prefix instead of a child name.
    #[must_use]
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// The property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the property is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    fn target(&self, prefix: &PropertyName) -> BindResult<PropertyName> {
        if self.flatten {
            Ok(prefix.clone())
        } else {
            prefix.append(&self.name).into_bind()
        }
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("target_type", &self.target_type)
            .field("required", &self.required)
            .field("flatten", &self.flatten)
            .finish_non_exhaustive()
    }
}

/// A default constructor plus the properties assigned after creation.
pub struct SetterShape<T> {
    create: Box<dyn Fn() -> T + Send + Sync>,
    properties: Vec<Property<T>>,
}

impl<T: 'static> SetterShape<T> {
    /// Describe a type created by `create`.
    #[must_use]
    pub fn new(create: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            create: Box::new(create),
            properties: Vec::new(),
        }
    }

    /// Add a property.
    #[must_use]
    pub fn with_property(mut self, property: Property<T>) -> Self {
        self.properties.push(property);
        self
    }

    /// The properties, in assignment order.
    #[must_use]
    pub fn properties(&self) -> &[Property<T>] {
        &self.properties
    }

    /// A fresh instance with nothing bound.
    #[must_use]
    pub fn create(&self) -> T {
        (self.create)()
    }

    pub(crate) fn bind(
        &self,
        binder: &Binder,
        name: &PropertyName,
        existing: Option<T>,
        context: &mut BindContext,
    ) -> BindResult<Option<T>> {
        let had_existing = existing.is_some();
        let mut target = existing.unwrap_or_else(|| self.create());
        let ignore_invalid = context.options().ignore_invalid_fields;
        let mut errors = Vec::new();
        let mut missing = Vec::new();
        let mut any_bound = false;
        for property in &self.properties {
            let field = property.target(name)?;
            match (property.assign)(&mut target, binder, &field, context) {
                Ok(true) => any_bound = true,
                Ok(false) => {
                    if property.required && !had_existing {
                        missing.push((field, property.target_type));
                    }
                }
                Err(error) if error.is_conversion() && ignore_invalid => {
                    tracing::debug!(name = %field, error = %error, "ignoring invalid field");
                }
                Err(error) if error.is_conversion() => {
                    errors.push(Arc::new(BindError::InvalidField {
                        name: field,
                        source: error,
                    }));
                }
                Err(error) => errors.push(error),
            }
        }
        if let Some(error) = BindError::collapse(errors) {
            return Err(error);
        }
        if !any_bound && !had_existing && (context.depth() > 1 || missing.is_empty()) {
            return Ok(None);
        }
        let unset = missing
            .into_iter()
            .map(|(field, target_type)| {
                Arc::new(BindError::MissingRequiredProperty {
                    name: field,
                    target_type,
                })
            })
            .collect();
        BindError::collapse(unset).map_or(Ok(Some(target)), Err)
    }
}

impl<T> fmt::Debug for SetterShape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetterShape")
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
