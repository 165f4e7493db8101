//! Configuration system
//!
//! [`MapperSettings`] is the serializable form of a mapper's configuration.
//! It loads from `.toml` or `.ron` files through the [`Config`] trait and is
//! applied to a [`LabeledDataMapper`] in one call.

pub use serde::{Deserialize, Serialize};

use crate::format::FormatError;
use crate::labels::{ComponentRangePolicy, CoordinateSystem, FieldDataRef, LabelMode, LabeledDataMapper};
use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match ConfigFormat::of(path)? {
            ConfigFormat::Toml => Self::from_toml(&contents),
            ConfigFormat::Ron => Self::from_ron(&contents),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::of(path)? {
            ConfigFormat::Toml => self.to_toml()?,
            ConfigFormat::Ron => self.to_ron()?,
        };
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Parse from TOML text
    fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse from RON text
    fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Render as TOML text
    fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Render as RON text
    fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The settings name an invalid label format
    #[error("Invalid settings: {0}")]
    Format(#[from] FormatError),
}

/// Serializable mapper configuration
///
/// Every field is optional in the file; missing ones take the mapper defaults.
///
/// ```toml
/// label_mode = "FieldData"
/// label_format = "%6.2f"
/// field_data = { Name = "temp" }
/// coordinate_system = "World"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperSettings {
    /// Which data labels the points
    pub label_mode: LabelMode,
    /// printf-style format; `None` uses the per-kind default
    pub label_format: Option<String>,
    /// Labeled component; `None` labels all of them
    pub labeled_component: Option<usize>,
    /// Out-of-range component handling
    pub component_policy: ComponentRangePolicy,
    /// Field data column used in field data mode
    pub field_data: FieldDataRef,
    /// Output coordinate system
    pub coordinate_system: CoordinateSystem,
    /// Upper bound on the label count
    pub max_labels: Option<usize>,
    /// Integer point array selecting each label's text property
    pub label_type_array: Option<String>,
}

impl Config for MapperSettings {}

impl MapperSettings {
    /// Capture the configuration of `mapper`
    pub fn from_mapper(mapper: &LabeledDataMapper) -> Self {
        Self {
            label_mode: mapper.label_mode(),
            label_format: mapper.label_format().map(str::to_string),
            labeled_component: mapper.labeled_component(),
            component_policy: mapper.component_range_policy(),
            field_data: mapper.field_data_ref().clone(),
            coordinate_system: mapper.coordinate_system(),
            max_labels: mapper.max_labels(),
            label_type_array: mapper.label_type_array_name().map(str::to_string),
        }
    }

    /// Configure `mapper`
    ///
    /// The format is validated first; on error the mapper is left unchanged.
    pub fn apply_to(&self, mapper: &mut LabeledDataMapper) -> Result<(), ConfigError> {
        mapper.set_label_format(self.label_format.as_deref())?;
        mapper.set_label_mode(self.label_mode);
        mapper.set_labeled_component(self.labeled_component);
        mapper.set_component_range_policy(self.component_policy);
        mapper.set_field_data_ref(self.field_data.clone());
        mapper.set_coordinate_system(self.coordinate_system);
        mapper.set_max_labels(self.max_labels);
        mapper.set_label_type_array_name(self.label_type_array.as_deref());
        log::debug!("Applied mapper settings: {self:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_settings_apply_to_mapper() {
        let settings = MapperSettings::from_toml(
            r#"
            label_mode = "FieldData"
            label_format = "%6.2f"
            field_data = { Name = "temp" }
            labeled_component = 1
            "#,
        )
        .unwrap();

        let mut mapper = LabeledDataMapper::new();
        settings.apply_to(&mut mapper).unwrap();
        assert_eq!(mapper.label_mode(), LabelMode::FieldData);
        assert_eq!(mapper.label_format(), Some("%6.2f"));
        assert_eq!(mapper.field_data_name(), Some("temp"));
        assert_eq!(mapper.labeled_component(), Some(1));
        assert_eq!(mapper.coordinate_system(), CoordinateSystem::World);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(MapperSettings::from_toml("").unwrap(), MapperSettings::default());
        assert_eq!(MapperSettings::from_ron("()").unwrap(), MapperSettings::default());
    }

    #[test]
    fn test_ron_settings_round_trip_through_mapper() {
        let settings = MapperSettings {
            label_mode: LabelMode::Vectors,
            label_format: Some("%.3e".to_string()),
            coordinate_system: CoordinateSystem::Display,
            max_labels: Some(64),
            ..Default::default()
        };
        let text = settings.to_ron().unwrap();
        let parsed = MapperSettings::from_ron(&text).unwrap();

        let mut mapper = LabeledDataMapper::new();
        parsed.apply_to(&mut mapper).unwrap();
        assert_eq!(MapperSettings::from_mapper(&mapper), settings);
    }

    #[test]
    fn test_invalid_format_leaves_mapper_untouched() {
        let settings = MapperSettings {
            label_mode: LabelMode::Scalars,
            label_format: Some("%k".to_string()),
            ..Default::default()
        };
        let mut mapper = LabeledDataMapper::new();
        let err = settings.apply_to(&mut mapper).unwrap_err();
        assert!(matches!(err, ConfigError::Format(FormatError::UnknownConversion { conversion: 'k', .. })));
        assert_eq!(mapper.label_mode(), LabelMode::Ids);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = MapperSettings::default().save_to_file("settings.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
