use crate::monitor::anchor::Corner;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// A configuration change addressed to the monitor controller.
///
/// Commands describe the desired state, so applying one twice is the same as
/// applying it once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    SetEnabled(bool),
    SetLocation(Corner),
    SetColor(String),
}

impl ConfigCommand {
    pub fn location(code: &str) -> Self {
        ConfigCommand::SetLocation(Corner::from_code(code))
    }

    pub fn color(value: impl Into<String>) -> Self {
        ConfigCommand::SetColor(value.into())
    }
}

/// Raw request as it arrives from the settings screen: every field optional.
///
/// `enabled` accepts a boolean or the strings `"true"`/`"false"` in any case;
/// `location` accepts a number or its string form. A field of the wrong JSON
/// type never rejects the request: a bad location falls back to top-left and a
/// bad color to unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequest {
    #[serde(
        default,
        deserialize_with = "deserialize_enabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_location",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
}

impl ConfigRequest {
    pub fn from_json(line: &str) -> Result<Self> {
        serde_json::from_str(line).context("deserialize overlay config request")
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.location.is_none() && self.color.is_none()
    }

    /// Location and color come before the enable flag so a request that turns
    /// the overlay on creates it with the final placement and color.
    pub fn into_commands(self) -> Vec<ConfigCommand> {
        let mut commands = Vec::with_capacity(3);
        if let Some(location) = self.location {
            commands.push(ConfigCommand::location(&location));
        }
        if let Some(color) = self.color {
            commands.push(ConfigCommand::SetColor(color));
        }
        if let Some(enabled) = self.enabled {
            commands.push(ConfigCommand::SetEnabled(enabled));
        }
        commands
    }
}

pub(crate) fn parse_enabled_text(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EnabledWire {
    Flag(bool),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocationWire {
    Code(i64),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorWire {
    Text(String),
    Other(serde_json::Value),
}

fn deserialize_enabled<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let enabled = match Option::<EnabledWire>::deserialize(deserializer)? {
        Some(EnabledWire::Flag(flag)) => Some(flag),
        Some(EnabledWire::Text(text)) => {
            let parsed = parse_enabled_text(&text);
            if parsed.is_none() {
                tracing::debug!(value = %text, "ignoring unrecognised enabled value");
            }
            parsed
        }
        Some(EnabledWire::Other(value)) => {
            tracing::debug!(%value, "ignoring unrecognised enabled value");
            None
        }
        None => None,
    };
    Ok(enabled)
}

fn deserialize_location<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LocationWire>::deserialize(deserializer)? {
        Some(LocationWire::Code(code)) => Some(code.to_string()),
        Some(LocationWire::Text(text)) => Some(text),
        // Not a corner code, so it resolves to top-left.
        Some(LocationWire::Other(value)) => {
            tracing::debug!(%value, "unrecognised location value");
            Some(value.to_string())
        }
        None => None,
    })
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ColorWire>::deserialize(deserializer)? {
        Some(ColorWire::Text(text)) => Some(text),
        // Empty text parses to the unset color.
        Some(ColorWire::Other(value)) => {
            tracing::debug!(%value, "unrecognised color value");
            Some(String::new())
        }
        None => None,
    })
}
