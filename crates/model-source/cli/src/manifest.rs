use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use strum::{Display, EnumString};

#[derive(Copy, Clone, Debug, Default, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

pub(crate) fn read<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parses a manifest written either in YAML or in JSON.
pub(crate) fn parse<T>(content: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    ::serde_yaml::from_str(content).map_err(Into::into)
}

pub(crate) fn dump<T>(value: &T, format: OutputFormat) -> Result<String>
where
    T: Serialize,
{
    match format {
        OutputFormat::Json => ::serde_json::to_string_pretty(value)
            .map(|mut content| {
                content.push('\n');
                content
            })
            .map_err(Into::into),
        OutputFormat::Yaml => ::serde_yaml::to_string(value).map_err(Into::into),
    }
}
