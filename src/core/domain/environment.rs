//! Resolved environment.

use serde::Serialize;

use super::Properties;

/// One named document contributing to an [`Environment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySource {
    name: String,
    source: Properties,
}

impl PropertySource {
    pub fn new(name: impl Into<String>, source: Properties) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Origin of this source (e.g., `git:/srv/config/config-client.yml`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &Properties {
        &self.source
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.source.get(key)
    }
}

/// The resolved configuration for one application/profile/label request.
///
/// Sources are ordered by priority: the first source containing a key wins.
/// Source names are unique within an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    name: String,
    profiles: Vec<String>,
    label: Option<String>,
    version: Option<String>,
    #[serde(rename = "propertySources")]
    property_sources: Vec<PropertySource>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new(
        name: impl Into<String>,
        profiles: Vec<String>,
        label: Option<String>,
        version: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            profiles,
            label,
            version,
            property_sources: Vec::new(),
        }
    }

    /// Append a source at the lowest priority so far.
    ///
    /// Returns `false` and leaves the environment untouched if a source with
    /// the same name is already present.
    pub fn push(&mut self, source: PropertySource) -> bool {
        if self
            .property_sources
            .iter()
            .any(|s| s.name == source.name)
        {
            return false;
        }
        self.property_sources.push(source);
        true
    }

    /// Look up a key, first source wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.property_sources.iter().find_map(|s| s.get(key))
    }

    /// Merge every source into one map, honoring priority.
    ///
    /// Keys appear in the order of the highest-priority source defining them,
    /// with keys from lower sources appended after.
    pub fn flatten(&self) -> Properties {
        let mut merged = Properties::new();
        for source in &self.property_sources {
            for (k, v) in source.properties().iter() {
                if !merged.contains_key(k) {
                    merged.insert(k, v);
                }
            }
        }
        merged
    }

    /// Application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Revision id the sources were read at.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn property_sources(&self) -> &[PropertySource] {
        &self.property_sources
    }

    pub fn is_empty(&self) -> bool {
        self.property_sources.is_empty()
    }
}
