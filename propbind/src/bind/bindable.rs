//! Description of a bind target.

use std::fmt;

/// Which data-object binder to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMethod {
    /// Resolve every constructor parameter, then construct.
    Constructor,
    /// Create or reuse an instance and assign properties one by one.
    Setter,
}

type DefaultSupplier<T> = Box<dyn FnOnce() -> T + Send>;

/// What to bind: an optional existing value, an optional default and an
/// optional [`BindMethod`] hint.
///
/// # Examples
///
/// ```
/// use propbind::Bindable;
///
/// let target = Bindable::<u16>::of().with_default(|| 8080);
/// assert!(target.existing_value().is_none());
/// ```
pub struct Bindable<T> {
    existing: Option<T>,
    default: Option<DefaultSupplier<T>>,
    method: Option<BindMethod>,
}

impl<T> Bindable<T> {
    /// A target with no existing value, default or hint.
    #[must_use]
    pub const fn of() -> Self {
        Self {
            existing: None,
            default: None,
            method: None,
        }
    }

    /// Merge into `value`; absent properties keep their current values.
    #[must_use]
    pub fn with_existing_value(mut self, value: T) -> Self {
        self.existing = Some(value);
        self
    }

    /// Use `supplier` when nothing is bound.
    #[must_use]
    pub fn with_default<F>(mut self, supplier: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.default = Some(Box::new(supplier));
        self
    }

    /// Force a particular data-object binder.
    #[must_use]
    pub fn with_bind_method(mut self, method: BindMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// The value bound into, if any.
    #[must_use]
    pub const fn existing_value(&self) -> Option<&T> {
        self.existing.as_ref()
    }

    /// The method hint, if any.
    #[must_use]
    pub const fn bind_method(&self) -> Option<BindMethod> {
        self.method
    }

    pub(crate) fn into_parts(self) -> (Option<T>, Option<DefaultSupplier<T>>, Option<BindMethod>) {
        (self.existing, self.default, self.method)
    }
}

impl<T> Default for Bindable<T> {
    fn default() -> Self {
        Self::of()
    }
}

impl<T: fmt::Debug> fmt::Debug for Bindable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindable")
            .field("existing", &self.existing)
            .field("has_default", &self.default.is_some())
            .field("method", &self.method)
            .finish()
    }
}
