//! Configuration validation.

use super::Config;
use crate::error::{DocError, Result};
use crate::xml::TemporalZone;

/// Validate the configuration.
///
/// Key declarations and parameter lists are checked by parsing them, so the
/// messages match what building the key would report. Missing column types
/// are allowed here; they may still be resolved from cursor metadata.
pub fn validate(config: &Config) -> Result<()> {
    if config.key.unique_key.trim().is_empty() {
        return Err(DocError::Config(
            "Invalid db.uniqueKey parameter: value cannot be empty.".into(),
        ));
    }
    config.key.builder()?;

    config
        .xml
        .time_zone
        .parse::<TemporalZone>()
        .map_err(|_| {
            DocError::Config(format!(
                "xml.time_zone must be 'local' or an offset like '+05:30', got '{}'",
                config.xml.time_zone
            ))
        })?;

    Ok(())
}
