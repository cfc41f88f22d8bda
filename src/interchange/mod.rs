//! Web template JSON interchange.
//!
//! The compiled tree is written as the camelCase JSON document consumed by
//! form renderers and data converters:
//!
//! ```text
//! {
//!   "templateId": "vital_signs",
//!   "version": "2.3",
//!   "defaultLanguage": "en",
//!   "languages": ["en"],
//!   "tree": { "id": "vital_signs", "rmType": "COMPOSITION", "min": 1, "max": 1,
//!             "children": [ ... ] }
//! }
//! ```
//!
//! Absent and empty values are omitted, keys keep a fixed order.

mod error;
mod json;

pub use error::InterchangeError;
pub use json::{node_to_json, template_to_json};

use serde::{Serialize, Serializer};

use crate::template::WebTemplate;

impl Serialize for WebTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        template_to_json(self).serialize(serializer)
    }
}

impl WebTemplate {
    /// The template as a JSON string.
    pub fn as_json(&self, pretty: bool) -> Result<String, InterchangeError> {
        let value = template_to_json(self);
        Ok(if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        })
    }

    /// Write the template as JSON.
    pub fn write<W: std::io::Write>(&self, writer: W, pretty: bool) -> Result<(), InterchangeError> {
        let value = template_to_json(self);
        if pretty {
            serde_json::to_writer_pretty(writer, &value)?;
        } else {
            serde_json::to_writer(writer, &value)?;
        }
        Ok(())
    }
}
