//! Adapter from a merged `Figment` to a property source.

use std::sync::Arc;

use camino::Utf8PathBuf;
use figment::{Figment, Metadata, Source};
use serde_json::Value;

use super::{ConfigurationProperty, OriginStrategy, PropertySource, StructuredSource};
use crate::name::PropertyName;
use crate::origin::Origin;
use crate::{BindGatherExt, BindResult};

/// A source over the values of a [`Figment`].
///
/// Values are extracted once; origins come from the figment metadata of the
/// closest key that has any, so values read from files point at the file.
#[derive(Debug)]
pub struct FigmentSource {
    inner: StructuredSource,
}

impl FigmentSource {
    /// Extract every value of `figment`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Gathering`](crate::BindError::Gathering) when the
    /// figment cannot produce a value tree.
    pub fn new(name: impl Into<String>, figment: &Figment) -> BindResult<Self> {
        let root: Value = figment.extract().into_bind_gathering()?;
        let lookup = figment.clone();
        let resolve = move |key: &str| origin_from_metadata(&lookup, key);
        Ok(Self {
            inner: StructuredSource::new(name, root)
                .with_origins(OriginStrategy::Custom(Arc::new(resolve))),
        })
    }
}

fn origin_from_metadata(figment: &Figment, key: &str) -> Option<Arc<Origin>> {
    let mut path = key;
    loop {
        if let Some(metadata) = figment.find_metadata(path) {
            return Some(Arc::new(describe(metadata, key)));
        }
        let (shorter, _) = path.rsplit_once('.')?;
        path = shorter;
    }
}

fn describe(metadata: &Metadata, key: &str) -> Origin {
    match &metadata.source {
        Some(Source::File(path)) => {
            let resource = Utf8PathBuf::from_path_buf(path.clone())
                .unwrap_or_else(|raw| Utf8PathBuf::from(raw.to_string_lossy().into_owned()));
            Origin::text_resource(resource).with_key(key)
        }
        _ => Origin::property_source(metadata.name.to_string(), key),
    }
}

impl PropertySource for FigmentSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        self.inner.get(name)
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        self.inner.property_names()
    }

    fn descendant_names(&self, name: &PropertyName) -> Option<Vec<PropertyName>> {
        self.inner.descendant_names(name)
    }
}
