//! Inspector subcommands.

pub mod actions;
pub mod check;
pub mod facet;
pub mod inspect;
pub mod list;

use crate::output::StyledOutput;
use anyhow::Context;
use spectra_core::{DomainModel, ObjectSpecId, ObjectSpecification, SpecificationLoader, TypeName};
use std::path::Path;
use std::sync::Arc;
use termcolor::ColorChoice;

/// A loaded domain model and the loader built over it.
pub struct Session {
    pub loader: SpecificationLoader,
    color: ColorChoice,
}

impl Session {
    pub fn open(path: &Path, color: ColorChoice) -> anyhow::Result<Self> {
        let model = DomainModel::from_file(path)
            .with_context(|| format!("Failed to load domain model {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            types = model.types.len(),
            services = model.metamodel.services.len(),
            "domain model loaded"
        );
        Ok(Self {
            loader: model.loader(),
            color,
        })
    }

    pub fn output(&self) -> StyledOutput {
        StyledOutput::new(self.color)
    }

    /// Resolve a fully-qualified or logical type name.
    pub fn specification(&self, name: &str) -> anyhow::Result<Arc<ObjectSpecification>> {
        if let Some(spec) = self.loader.load_by_name(name)? {
            return Ok(spec);
        }
        self.loader
            .lookup_by_spec_id(&ObjectSpecId::new(name))?
            .with_context(|| format!("Unknown type '{}'", name))
    }

    /// Every type the model declares, sorted.
    pub fn type_names(&self) -> Vec<TypeName> {
        self.loader.source().type_names()
    }
}

pub(crate) fn names(specs: &[Arc<ObjectSpecification>]) -> Vec<String> {
    specs.iter().map(|spec| spec.full_name().to_string()).collect()
}
