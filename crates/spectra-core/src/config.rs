//! Domain model files
//!
//! A domain model is a TOML document describing the reflected types and
//! the metamodel options:
//!
//! ```toml
//! [metamodel]
//! exclude-prefixes = ["internal."]
//! services = ["dom.ReportService"]
//!
//! [[types]]
//! name = "dom.Customer"
//! annotations = { nature = "entity", title = "name" }
//!
//! [[types.properties]]
//! name = "name"
//! type = "string"
//! ```

use crate::descriptor::{TypeCatalog, TypeDescriptor, BUILTIN_VALUE_TYPES};
use crate::factory::ProgrammingModel;
use crate::ident::TypeName;
use crate::loader::SpecificationLoader;
use crate::managed::DomainObject;
use crate::services::StaticServiceRegistry;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Domain model loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("Failed to read domain model: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse domain model: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The model is inconsistent
    #[error("Invalid domain model: {0}")]
    ValidationError(String),
}

/// `[metamodel]` options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetamodelOptions {
    /// Type-name prefixes hidden from the metamodel
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,

    /// Types instantiated as services for action contribution
    #[serde(default)]
    pub services: Vec<TypeName>,
}

/// A parsed domain model file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainModel {
    /// Metamodel options
    #[serde(default)]
    pub metamodel: MetamodelOptions,

    /// Reflected types
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

impl DomainModel {
    /// Load a domain model from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a domain model from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let model: DomainModel = toml::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    /// Check names are unique and references resolve
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut declared: FxHashSet<&str> = BUILTIN_VALUE_TYPES.iter().copied().collect();

        for descriptor in &self.types {
            let name = descriptor.name.full_name();
            if name.is_empty() {
                return Err(ConfigError::ValidationError("Type name cannot be empty".to_string()));
            }
            if !declared.insert(name) {
                return Err(ConfigError::ValidationError(format!("Type '{}' is declared twice", name)));
            }
        }

        for descriptor in &self.types {
            let supertypes = descriptor.superclass.iter().chain(&descriptor.interfaces);
            for supertype in supertypes {
                if !declared.contains(supertype.full_name()) {
                    return Err(ConfigError::ValidationError(format!(
                        "Type '{}' extends undeclared type '{}'",
                        descriptor.name, supertype
                    )));
                }
            }
        }

        for service in &self.metamodel.services {
            if !declared.contains(service.full_name()) {
                return Err(ConfigError::ValidationError(format!(
                    "Service '{}' is not a declared type",
                    service
                )));
            }
        }
        Ok(())
    }

    /// A catalog holding the builtins and every declared type
    pub fn catalog(&self) -> TypeCatalog {
        let catalog = TypeCatalog::with_exclusions(self.metamodel.exclude_prefixes.clone());
        for descriptor in &self.types {
            catalog.register(descriptor.clone());
        }
        catalog
    }

    /// One instance per configured service type
    pub fn service_registry(&self) -> StaticServiceRegistry {
        StaticServiceRegistry::new(
            self.metamodel
                .services
                .iter()
                .map(|name| DomainObject::builder(name.full_name()).build())
                .collect(),
        )
    }

    /// A loader over this model with the standard programming model
    pub fn loader(&self) -> SpecificationLoader {
        self.loader_with(ProgrammingModel::standard())
    }

    /// A loader over this model with a custom programming model
    pub fn loader_with(&self, programming_model: ProgrammingModel) -> SpecificationLoader {
        SpecificationLoader::builder()
            .source(self.catalog())
            .programming_model(programming_model)
            .services(self.service_registry())
            .build()
    }
}
