//! Relaxed, origin-tracking configuration property binding.
//!
//! `propbind` binds typed values from an ordered set of property sources.
//! Names are matched relaxedly, so `my-app.max-connections`,
//! `myApp.maxConnections` and `MY_APP_MAXCONNECTIONS` all address the same
//! property, and every bound value remembers where it came from.
//!
//! ```
//! use std::sync::Arc;
//! use propbind::{Bindable, Binder, DataObject, MapSource, PropertySource, SourceSet};
//!
//! #[derive(Debug, Clone, Default, DataObject)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! let source = Arc::new(MapSource::new(
//!     "defaults",
//!     [("app.server.host", "localhost"), ("app.server.port", "8080")],
//! ));
//! let binder = Binder::new(SourceSet::single(source as Arc<dyn PropertySource>));
//! let server: Server = binder.bind("app.server", Bindable::of())?.unwrap_or_default();
//! assert_eq!(server.port, 8080);
//! # Ok::<(), std::sync::Arc<propbind::BindError>>(())
//! ```
//!
//! Sources are supplied most specific first; the first source holding a
//! value wins. See [`SourceSet`] for composition and [`Binder`] for the
//! entry points.

use std::sync::Arc;

pub use propbind_macros::{ConfigEnum, DataObject};

mod bind;
mod convert;
mod error;
mod file;
pub mod name;
mod origin;
mod resolve;
mod result_ext;
mod source;

pub use bind::{
    Arguments, BatchReport, Bind, BindBatch, BindContext, BindHandler, BindMethod, BindOptions,
    BindOutcome, BindPhase, Bindable, Binder, ConstructorShape, DataObject, IgnoreErrorsHandler,
    NoopHandler, ObjectShape, Parameter, Property, SetterShape, Shape, ShapeRegistry, Tracked,
    TracingHandler,
};
pub use convert::{ConversionFailure, parse_duration, parse_from_str};
pub use error::{AggregatedErrors, BindError, UnboundProperty};
pub use file::{canonicalise, load_config_file};
pub use name::{InvalidNameFormat, PropertyName};
pub use origin::{Location, Origin, OriginKind, OriginProvider};
pub use resolve::{PlaceholderResolver, Resolution, Resolver};
pub use result_ext::{BindGatherExt, BindResultExt};
pub use source::{
    AliasedSource, AttachedSources, CommandLineSource, ConfigurationProperty, DescendantState,
    EnvironmentSource, FigmentSource, FilteredSource, MapSource, OriginStrategy, PrefixedSource,
    PropertyNameAliases, PropertySource, SourceSet, StructuredSource,
};

/// Result type used throughout the crate; errors are shared so they can be
/// aggregated.
pub type BindResult<T> = Result<T, Arc<BindError>>;
