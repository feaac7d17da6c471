//! Command-line argument source.

use std::sync::Arc;

use serde_json::Value;

use super::{ConfigurationProperty, MapSource, PropertySource};
use crate::error::BindError;
use crate::name::PropertyName;
use crate::origin::Origin;
use crate::BindResult;

/// A source built from `--key=value` arguments.
///
/// `--flag` without a value binds as an empty string. An option given more
/// than once is joined with commas, so it binds naturally to collections.
/// Arguments not starting with `--` are kept as non-option arguments, as is
/// everything after a bare `--`.
///
/// # Examples
///
/// ```
/// use propbind::{CommandLineSource, PropertyName, PropertySource};
///
/// let source = CommandLineSource::parse(["--server.port=9000", "run"]).unwrap();
/// let port = source.get(&PropertyName::parse("server.port").unwrap()).unwrap();
/// assert_eq!(port.text(), "9000");
/// assert_eq!(source.non_option_args(), ["run"]);
/// ```
#[derive(Debug)]
pub struct CommandLineSource {
    options: MapSource,
    non_option_args: Vec<String>,
}

impl CommandLineSource {
    /// Source name used in origins.
    pub const NAME: &'static str = "commandLineArgs";

    /// Parse arguments, excluding the program name.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::InvalidArgument`] for options with an empty name
    /// such as `--=x`.
    pub fn parse<I, S>(args: I) -> BindResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options: Vec<(String, Vec<String>, Arc<Origin>)> = Vec::new();
        let mut non_option_args = Vec::new();
        let mut rest_are_positional = false;
        for (position, arg) in args.into_iter().map(Into::into).enumerate() {
            if rest_are_positional {
                non_option_args.push(arg);
                continue;
            }
            if arg == "--" {
                rest_are_positional = true;
                continue;
            }
            let Some(option) = arg.strip_prefix("--") else {
                non_option_args.push(arg);
                continue;
            };
            let (key, value) = option
                .split_once('=')
                .unwrap_or((option, ""));
            if key.is_empty() {
                return Err(Arc::new(BindError::InvalidArgument {
                    argument: arg.clone(),
                    reason: "option name is empty".into(),
                }));
            }
            match options.iter_mut().find(|(existing, _, _)| existing == key) {
                Some((_, values, _)) => values.push(value.to_owned()),
                None => options.push((
                    key.to_owned(),
                    vec![value.to_owned()],
                    Arc::new(Origin::command_line(arg.as_str(), position)),
                )),
            }
        }
        let entries = options
            .into_iter()
            .map(|(key, values, origin)| (key, Value::String(values.join(",")), origin));
        Ok(Self {
            options: MapSource::with_origins(Self::NAME, entries),
            non_option_args,
        })
    }

    /// Arguments that were not options.
    #[must_use]
    pub fn non_option_args(&self) -> &[String] {
        &self.non_option_args
    }
}

impl PropertySource for CommandLineSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get(&self, name: &PropertyName) -> Option<ConfigurationProperty> {
        self.options.get(name)
    }

    fn property_names(&self) -> Option<Vec<PropertyName>> {
        self.options.property_names()
    }
}
