//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Document id (unique key) configuration.
    pub key: KeyConfig,

    /// XML rendering configuration.
    #[serde(default)]
    pub xml: XmlConfig,
}

/// Unique key declaration and query parameter lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Key declaration, e.g. `"id:int, name:string"`.
    pub unique_key: String,

    /// Use the single string key value as the document id, unescaped.
    #[serde(default)]
    pub doc_id_is_url: bool,

    /// Key columns bound to the content query; blank means all, in order.
    #[serde(default)]
    pub content_sql_parameters: String,

    /// Key columns bound to the ACL query; blank means all, in order.
    #[serde(default)]
    pub acl_sql_parameters: String,
}

/// XML rendering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XmlConfig {
    /// Zone for TIME and TIMESTAMP offsets: `local` or a fixed offset such as `+05:30`.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
        }
    }
}

fn default_time_zone() -> String {
    "local".to_string()
}
