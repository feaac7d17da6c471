//! Rendering of resolved properties.

use std::io::{self, Write};

use propbind::ConfigurationProperty;

/// Write one property with its source and every origin in its chain.
pub(crate) fn write_detail(
    out: &mut impl Write,
    property: &ConfigurationProperty,
    resolved: &str,
) -> io::Result<()> {
    writeln!(out, "{} = {resolved}", property.name())?;
    if resolved != property.text() {
        writeln!(out, "  raw: {}", property.text())?;
    }
    writeln!(out, "  source: {}", property.source_name())?;
    if let Some(origin) = property.origin() {
        writeln!(out, "  origin: {origin}")?;
        for parent in origin.parents() {
            writeln!(out, "  imported from: {parent}")?;
        }
    }
    Ok(())
}

/// Write one line per property: name, value and winning origin.
pub(crate) fn write_summary(
    out: &mut impl Write,
    properties: &[(ConfigurationProperty, String)],
) -> io::Result<()> {
    for (property, resolved) in properties {
        match property.origin() {
            Some(origin) => writeln!(out, "{} = {resolved}  ({origin})", property.name())?,
            None => writeln!(
                out,
                "{} = {resolved}  ({})",
                property.name(),
                property.source_name()
            )?,
        }
    }
    Ok(())
}
