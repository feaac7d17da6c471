//! Per-bind mutable state.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use super::bindable::BindMethod;
use crate::name::PropertyName;
use crate::origin::Origin;
use crate::source::{ConfigurationProperty, PropertySource, SourceSet};

/// Policies applied to one top-level bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOptions {
    /// Skip setter fields whose values fail to convert instead of failing.
    pub ignore_invalid_fields: bool,
    /// Allow properties under the bound prefix that nothing consumed.
    pub ignore_unknown_fields: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl BindOptions {
    /// Strict conversions, unknown properties tolerated.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ignore_invalid_fields: false,
            ignore_unknown_fields: true,
        }
    }

    /// Set [`ignore_invalid_fields`](Self::ignore_invalid_fields).
    #[must_use]
    pub const fn with_ignore_invalid_fields(mut self, ignore: bool) -> Self {
        self.ignore_invalid_fields = ignore;
        self
    }

    /// Set [`ignore_unknown_fields`](Self::ignore_unknown_fields).
    #[must_use]
    pub const fn with_ignore_unknown_fields(mut self, ignore: bool) -> Self {
        self.ignore_unknown_fields = ignore;
        self
    }
}

/// Where the binder currently is for the name being bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindPhase {
    /// A bind has started but no shape was chosen yet.
    Started,
    /// Looking for a single value.
    ResolvingScalar,
    /// Discovering collection or map entries.
    ResolvingAggregate,
    /// Binding the properties of a data object.
    ResolvingDataObject,
    /// The bind produced a value.
    Bound,
    /// The bind raised an error.
    Failed,
}

/// State shared by every nested bind below one top-level call.
#[derive(Debug)]
pub struct BindContext {
    root: SourceSet,
    scopes: Vec<SourceSet>,
    depth: usize,
    methods: Vec<Option<BindMethod>>,
    objects: Vec<(TypeId, PropertyName)>,
    bound: Vec<ConfigurationProperty>,
    bound_names: HashSet<PropertyName>,
    aggregates: Vec<PropertyName>,
    phase: BindPhase,
    options: BindOptions,
}

impl BindContext {
    pub(crate) fn new(root: SourceSet, options: BindOptions) -> Self {
        Self {
            root,
            scopes: Vec::new(),
            depth: 0,
            methods: Vec::new(),
            objects: Vec::new(),
            bound: Vec::new(),
            bound_names: HashSet::new(),
            aggregates: Vec::new(),
            phase: BindPhase::Started,
            options,
        }
    }

    /// Nesting depth; the top-level bind runs at depth 1.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Phase of the innermost bind.
    #[must_use]
    pub const fn phase(&self) -> BindPhase {
        self.phase
    }

    /// Policies for this bind.
    #[must_use]
    pub const fn options(&self) -> BindOptions {
        self.options
    }

    /// Sources visible to the current bind.
    ///
    /// Indexed collections restrict nested binds to the single source that
    /// supplies the collection.
    #[must_use]
    pub fn sources(&self) -> &SourceSet {
        self.scopes.last().unwrap_or(&self.root)
    }

    /// Every source, ignoring any restriction.
    #[must_use]
    pub const fn root_sources(&self) -> &SourceSet {
        &self.root
    }

    /// How many values have been bound so far.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    /// Every value bound so far, in binding order.
    #[must_use]
    pub fn bound_properties(&self) -> &[ConfigurationProperty] {
        &self.bound
    }

    /// Whether a value was bound for `name`.
    #[must_use]
    pub fn was_bound(&self, name: &PropertyName) -> bool {
        self.bound_names.contains(name)
    }

    pub(crate) fn into_bound(self) -> Vec<ConfigurationProperty> {
        self.bound
    }

    pub(crate) fn record_bound(&mut self, property: ConfigurationProperty) {
        self.bound_names.insert(property.name().clone());
        self.bound.push(property);
    }

    /// Whether a bound property from `source` came from `origin`.
    ///
    /// Sources such as the environment spell one value under several
    /// names.
    pub(crate) fn consumed_origin(&self, source: &str, origin: &Origin) -> bool {
        self.bound.iter().any(|property| {
            property.source_name() == source
                && property.origin().is_some_and(|seen| **seen == *origin)
        })
    }

    pub(crate) fn record_aggregate(&mut self, name: &PropertyName) {
        self.aggregates.push(name.clone());
    }

    pub(crate) fn covered_by_aggregate(&self, name: &PropertyName) -> bool {
        self.aggregates
            .iter()
            .any(|root| root == name || root.is_ancestor_of(name))
    }

    pub(crate) const fn set_phase(&mut self, phase: BindPhase) {
        self.phase = phase;
    }

    pub(crate) fn enter(&mut self, method: Option<BindMethod>) {
        self.depth += 1;
        self.methods.push(method);
        self.phase = BindPhase::Started;
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.methods.pop();
    }

    pub(crate) fn requested_method(&self) -> Option<BindMethod> {
        self.methods.last().copied().flatten()
    }

    pub(crate) fn with_source<R>(
        &mut self,
        source: Arc<dyn PropertySource>,
        run: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.scopes.push(SourceSet::single(source));
        let result = run(self);
        self.scopes.pop();
        result
    }

    /// Record entry into a data object; returns the chain when it is a cycle.
    pub(crate) fn begin_object(&mut self, type_id: TypeId, name: &PropertyName) -> Result<(), String> {
        if self
            .objects
            .iter()
            .any(|(id, active)| *id == type_id && active == name)
        {
            return Err(self.chain_to(name));
        }
        self.objects.push((type_id, name.clone()));
        Ok(())
    }

    pub(crate) fn end_object(&mut self) {
        self.objects.pop();
    }

    fn chain_to(&self, name: &PropertyName) -> String {
        self.objects
            .iter()
            .map(|(_, active)| active)
            .chain(std::iter::once(name))
            .map(|n| format!("'{n}'"))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
