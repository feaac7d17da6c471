//! The binder: turns resolved properties into typed values.
//!
//! [`Binder::bind`] walks a target type through a small state machine. Scalar
//! types resolve a single value and convert it; collections and maps discover
//! their entries from descendant names; data objects delegate to a
//! constructor or setter binder described by their [`ObjectShape`]. Every
//! nested bind goes back through [`Binder::bind_name`], so handlers, defaults
//! and cycle detection apply uniformly.

mod aggregate;
mod batch;
mod bindable;
mod context;
mod handler;
mod object;
mod registry;
mod target;

pub use batch::{BatchReport, BindBatch};
pub use bindable::{BindMethod, Bindable};
pub use context::{BindContext, BindOptions, BindPhase};
pub use handler::{BindHandler, IgnoreErrorsHandler, NoopHandler, TracingHandler};
pub use object::{
    Arguments, ConstructorShape, DataObject, ObjectShape, Parameter, Property, SetterShape,
};
pub use registry::ShapeRegistry;
pub use target::{Bind, Shape, Tracked};

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::convert::ConversionFailure;
use crate::error::{BindError, UnboundProperty};
use crate::name::PropertyName;
use crate::origin::Origin;
use crate::resolve::{PlaceholderResolver, Resolver};
use crate::source::{ConfigurationProperty, SourceSet};
use crate::{BindResult, BindResultExt};

/// A bound value together with every property that fed it.
#[derive(Debug, Clone)]
pub struct BindOutcome<T> {
    /// The bound value, or `None` when nothing was found.
    pub value: Option<T>,
    /// Properties consumed, in binding order.
    pub properties: Vec<ConfigurationProperty>,
}

impl<T> BindOutcome<T> {
    /// Origin of the value bound under `name`.
    ///
    /// Returns `None` for malformed names, unbound names or values without
    /// an origin.
    #[must_use]
    pub fn origin_of(&self, name: &str) -> Option<&Arc<Origin>> {
        let wanted = PropertyName::parse(name).ok()?;
        self.properties
            .iter()
            .find(|property| property.name() == &wanted)
            .and_then(ConfigurationProperty::origin)
    }
}

/// Binds typed values from an ordered [`SourceSet`].
///
/// A binder is cheap to clone and safe to share between threads; each call
/// builds its own [`BindContext`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use propbind::{Bindable, Binder, MapSource, PropertySource, SourceSet};
///
/// let source = Arc::new(MapSource::new("defaults", [("app.ports", "80,443")]));
/// let binder = Binder::new(SourceSet::single(source as Arc<dyn PropertySource>));
/// let ports: Vec<u16> = binder.bind("app.ports", Bindable::of()).unwrap().unwrap();
/// assert_eq!(ports, [80, 443]);
/// ```
#[derive(Clone)]
pub struct Binder {
    sources: SourceSet,
    registry: Arc<ShapeRegistry>,
    handler: Arc<dyn BindHandler>,
    placeholders: bool,
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("sources", &self.sources)
            .field("registry", &self.registry)
            .field("placeholders", &self.placeholders)
            .finish_non_exhaustive()
    }
}

impl Binder {
    /// Bind from `sources` with a fresh registry, no handler and placeholder
    /// expansion enabled.
    #[must_use]
    pub fn new(sources: impl Into<SourceSet>) -> Self {
        Self {
            sources: sources.into(),
            registry: Arc::new(ShapeRegistry::new()),
            handler: Arc::new(NoopHandler),
            placeholders: true,
        }
    }

    /// Share a shape registry with other binders.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ShapeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Observe or steer binds with `handler`.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn BindHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Enable or disable `${...}` expansion.
    #[must_use]
    pub const fn with_placeholders(mut self, enabled: bool) -> Self {
        self.placeholders = enabled;
        self
    }

    /// The sources bound from.
    #[must_use]
    pub const fn sources(&self) -> &SourceSet {
        &self.sources
    }

    /// The shape registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ShapeRegistry> {
        &self.registry
    }

    pub(crate) fn handler(&self) -> &dyn BindHandler {
        self.handler.as_ref()
    }

    /// Bind `name` with default options.
    ///
    /// Returns `Ok(None)` when nothing was found and no default applies.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::InvalidName`] for a malformed name and any
    /// error raised while binding.
    pub fn bind<T: Bind>(&self, name: &str, target: Bindable<T>) -> BindResult<Option<T>> {
        self.bind_with(name, target, BindOptions::default())
    }

    /// Bind `name` with explicit options.
    ///
    /// # Errors
    ///
    /// As [`bind`](Self::bind), plus [`BindError::UnboundProperties`] when
    /// unknown fields are not ignored.
    pub fn bind_with<T: Bind>(
        &self,
        name: &str,
        target: Bindable<T>,
        options: BindOptions,
    ) -> BindResult<Option<T>> {
        self.bind_traced(name, target, options)
            .map(|outcome| outcome.value)
    }

    /// Bind `name` and report every property consumed.
    ///
    /// # Errors
    ///
    /// As [`bind_with`](Self::bind_with).
    pub fn bind_traced<T: Bind>(
        &self,
        name: &str,
        target: Bindable<T>,
        options: BindOptions,
    ) -> BindResult<BindOutcome<T>> {
        let root = PropertyName::parse(name).into_bind()?;
        let mut context = BindContext::new(self.sources.clone(), options);
        let value = self.bind_name(&root, target, &mut context)?;
        if value.is_some() && !options.ignore_unknown_fields {
            self.check_unbound(&root, &context)?;
        }
        Ok(BindOutcome {
            value,
            properties: context.into_bound(),
        })
    }

    /// Bind `name`, creating an empty instance when nothing was found.
    ///
    /// # Errors
    ///
    /// As [`bind`](Self::bind), plus [`BindError::InstanceCreation`] (passed
    /// through [`BindHandler::on_create_failure`]) when no instance can be
    /// created.
    pub fn bind_or_create<T: Bind>(&self, name: &str, target: Bindable<T>) -> BindResult<T> {
        self.bind_or_create_with(name, target, BindOptions::default())
    }

    /// [`bind_or_create`](Self::bind_or_create) with explicit options.
    ///
    /// # Errors
    ///
    /// As [`bind_or_create`](Self::bind_or_create).
    pub fn bind_or_create_with<T: Bind>(
        &self,
        name: &str,
        target: Bindable<T>,
        options: BindOptions,
    ) -> BindResult<T> {
        if let Some(value) = self.bind_with(name, target, options)? {
            return Ok(value);
        }
        let parsed = PropertyName::parse(name).into_bind()?;
        let target_type = type_name::<T>();
        match T::create(self, &parsed) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(self.handler.on_create_failure(
                &parsed,
                target_type,
                Arc::new(BindError::InstanceCreation {
                    name: parsed.clone(),
                    target_type,
                    reason: "nothing was bound and the type has no empty instance".into(),
                }),
            )),
            Err(error) => Err(self.handler.on_create_failure(&parsed, target_type, error)),
        }
    }

    /// Merge properties under `name` into `existing`.
    ///
    /// # Errors
    ///
    /// As [`bind_or_create`](Self::bind_or_create).
    pub fn bind_into<T: Bind>(&self, name: &str, existing: T) -> BindResult<T> {
        self.bind_or_create(name, Bindable::of().with_existing_value(existing))
    }

    /// Bind one name inside an ongoing bind.
    ///
    /// This is the recursive entry point used by collections, maps and data
    /// objects.
    ///
    /// # Errors
    ///
    /// Returns any error not swallowed by the handler.
    pub fn bind_name<T: Bind>(
        &self,
        name: &PropertyName,
        target: Bindable<T>,
        context: &mut BindContext,
    ) -> BindResult<Option<T>> {
        let target_type = type_name::<T>();
        let (existing, default, method) = target.into_parts();
        context.enter(method);
        self.handler.on_start(name, target_type, context);
        let result = self
            .bind_shape::<T>(name, existing, context)
            .or_else(|error| {
                context.set_phase(BindPhase::Failed);
                tracing::trace!(name = %name, target_type, error = %error, "bind failed");
                self.handler
                    .on_failure(name, target_type, error, context)
                    .map(|()| None)
            })
            .map(|bound| bound.or_else(|| default.map(|supply| supply())));
        if let Ok(Some(_)) = &result {
            context.set_phase(BindPhase::Bound);
            self.handler.on_success(name, target_type, context);
        }
        self.handler
            .on_finish(name, target_type, matches!(result, Ok(Some(_))), context);
        context.leave();
        result
    }

    fn bind_shape<T: Bind>(
        &self,
        name: &PropertyName,
        existing: Option<T>,
        context: &mut BindContext,
    ) -> BindResult<Option<T>> {
        match T::shape() {
            Shape::Scalar => {
                context.set_phase(BindPhase::ResolvingScalar);
                let Some(found) = Resolver::new(context.sources()).find(name) else {
                    return Ok(existing);
                };
                let property = self.resolve_placeholders(found, context)?;
                let value = T::from_property(&property)
                    .map_err(|failure| conversion_error::<T>(&property, &failure))?;
                tracing::trace!(name = %name, source = property.source_name(), "bound scalar");
                context.record_bound(property);
                Ok(Some(value))
            }
            Shape::Indexed | Shape::Map => {
                context.set_phase(BindPhase::ResolvingAggregate);
                T::bind_composite(self, name, existing, context)
            }
            Shape::DataObject => {
                context.set_phase(BindPhase::ResolvingDataObject);
                T::bind_composite(self, name, existing, context)
            }
        }
    }

    pub(crate) fn resolve_placeholders(
        &self,
        property: ConfigurationProperty,
        context: &BindContext,
    ) -> BindResult<ConfigurationProperty> {
        if !self.placeholders {
            return Ok(property);
        }
        let expanded = match property.value() {
            Value::String(text) if text.contains("${") => {
                PlaceholderResolver::new(Resolver::new(context.root_sources())).resolve(text)?
            }
            _ => return Ok(property),
        };
        Ok(property.with_value(expanded))
    }

    fn check_unbound(&self, name: &PropertyName, context: &BindContext) -> BindResult<()> {
        let mut unbound: Vec<UnboundProperty> = Vec::new();
        for source in &self.sources {
            let Some(children) = source.descendant_names(name) else {
                continue;
            };
            for child in children {
                if context.was_bound(&child)
                    || context.covered_by_aggregate(&child)
                    || unbound.iter().any(|known| known.name == child)
                {
                    continue;
                }
                let origin = source.get(&child).and_then(|p| p.origin().cloned());
                if origin
                    .as_deref()
                    .is_some_and(|known| context.consumed_origin(source.name(), known))
                {
                    continue;
                }
                unbound.push(UnboundProperty {
                    name: child,
                    origin,
                });
            }
        }
        if unbound.is_empty() {
            Ok(())
        } else {
            Err(Arc::new(BindError::UnboundProperties {
                name: name.clone(),
                unbound,
            }))
        }
    }
}

pub(crate) fn conversion_error<T>(
    property: &ConfigurationProperty,
    failure: &ConversionFailure,
) -> Arc<BindError> {
    Arc::new(BindError::TypeConversion {
        name: property.name().clone(),
        value: property.text().into_owned(),
        source_name: property.source_name().to_owned(),
        target_type: type_name::<T>(),
        origin: property.origin().cloned(),
        reason: failure.to_string(),
    })
}
