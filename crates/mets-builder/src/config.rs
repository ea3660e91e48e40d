//! Serializer configuration.
//!
//! [`SerializerConfig`] controls output formatting only; it never changes
//! what the document says. It can be kept in a TOML file next to other
//! packaging settings.

use serde::{Deserialize, Serialize};

use crate::error::{MetsError, MetsResult};

/// Schema location of the Finnish national METS profile.
pub const METS_FI_SCHEMA_LOCATION: &str =
    "http://www.loc.gov/METS/ http://digitalpreservation.fi/schemas/mets/mets.xsd";

/// Output options of the document serializer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Spaces per nesting level. Zero writes the document on one line.
    pub indent: usize,
    /// Whether to start with an XML declaration.
    pub xml_declaration: bool,
    /// Value of `xsi:schemaLocation` on the root element.
    pub schema_location: String,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            indent: 0,
            xml_declaration: true,
            schema_location: METS_FI_SCHEMA_LOCATION.to_string(),
        }
    }
}

impl SerializerConfig {
    /// Indented output, two spaces per level.
    pub fn pretty() -> Self {
        Self {
            indent: 2,
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> MetsResult<Self> {
        toml::from_str(source).map_err(|e| MetsError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> MetsResult<String> {
        toml::to_string(self).map_err(|e| MetsError::Config(e.to_string()))
    }
}
