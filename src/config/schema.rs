use serde::Deserialize;
use std::collections::BTreeMap;

/// TOML-deserializable config file. All fields are Option for layered merging.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub defaults: DefaultsFileConfig,
    #[serde(default)]
    pub stylus: StylusFileConfig,
    #[serde(default)]
    pub resolve: ResolveFileConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DefaultsFileConfig {
    pub format: Option<String>,
}

/// `[stylus]`: compiler-side options.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StylusFileConfig {
    /// Relative entries are taken from the config file's directory.
    pub paths: Option<Vec<String>>,
    pub include_css: Option<bool>,
    pub import: Option<Vec<String>>,
    #[serde(default)]
    pub define: BTreeMap<String, String>,
}

/// `[resolve]`: host resolver options.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ResolveFileConfig {
    #[serde(default)]
    pub alias: BTreeMap<String, String>,
    pub modules: Option<Vec<String>>,
    pub condition_names: Option<Vec<String>>,
    pub main_fields: Option<Vec<String>>,
    pub main_files: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
}

impl FileConfig {
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
