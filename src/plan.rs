//! Aggregates resource descriptors into one test plan.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use snafu::Snafu;

use crate::{
    config::DEFAULT_TIMEOUT_SECONDS,
    resource::{ResourceDescriptor, ResourceId},
};

#[derive(Debug, Snafu)]
pub enum PlanError {
    #[snafu(display("no resources to test"))]
    NoResources,
    #[snafu(display("resource {} is listed more than once", resource))]
    DuplicateResource { resource: ResourceId },
}

/// Options that apply to the whole test case.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PlanOptions {
    pub default_timeout_seconds: u64,
    pub setup_script: Option<PathBuf>,
    pub teardown_script: Option<PathBuf>,
    pub skip_update: bool,
    pub skip_import: bool,
    pub skip_delete: bool,
    pub only_clean_uptest_resources: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            default_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            setup_script: None,
            teardown_script: None,
            skip_update: false,
            skip_import: false,
            skip_delete: false,
            only_clean_uptest_resources: false,
        }
    }
}

/// An immutable, ordered test plan.
#[derive(Debug, Clone, PartialEq)]
pub struct TestPlan {
    resources: Vec<ResourceDescriptor>,
    effective_timeout_seconds: u64,
    options: PlanOptions,
}

impl TestPlan {
    /// Every resource, in input order.
    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    /// The resources under test, in input order.
    pub fn subjects(&self) -> impl DoubleEndedIterator<Item = &ResourceDescriptor> {
        self.resources.iter().filter(|resource| resource.is_subject())
    }

    /// Subjects whose external identity is verified across an import.
    ///
    /// When the plan holds a root resource only roots are imported.
    pub fn import_targets(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        let roots_only = self.subjects().any(|resource| resource.is_root);
        self.subjects()
            .filter(move |resource| !resource.skip_import && (!roots_only || resource.is_root))
    }

    /// The largest timeout of the plan default and every subject.
    pub fn effective_timeout_seconds(&self) -> u64 {
        self.effective_timeout_seconds
    }

    pub fn setup_script(&self) -> Option<&Path> {
        self.options.setup_script.as_deref()
    }

    pub fn teardown_script(&self) -> Option<&Path> {
        self.options.teardown_script.as_deref()
    }

    pub fn skip_update(&self) -> bool {
        self.options.skip_update
    }

    pub fn skip_import(&self) -> bool {
        self.options.skip_import
    }

    pub fn skip_delete(&self) -> bool {
        self.options.skip_delete
    }

    pub fn only_clean_uptest_resources(&self) -> bool {
        self.options.only_clean_uptest_resources
    }

    /// Override the computed effective timeout.
    #[cfg(test)]
    pub(crate) fn with_effective_timeout_seconds(mut self, effective_timeout_seconds: u64) -> Self {
        self.effective_timeout_seconds = effective_timeout_seconds;
        self
    }
}

/// Collects descriptors in order and validates them into a [`TestPlan`].
#[derive(Debug)]
pub struct TestPlanBuilder {
    options: PlanOptions,
    resources: Vec<ResourceDescriptor>,
}

impl TestPlanBuilder {
    pub fn new(options: PlanOptions) -> Self {
        Self {
            options,
            resources: Vec::new(),
        }
    }

    pub fn resource(mut self, resource: ResourceDescriptor) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn resources(mut self, resources: impl IntoIterator<Item = ResourceDescriptor>) -> Self {
        self.resources.extend(resources);
        self
    }

    pub fn build(self) -> Result<TestPlan, PlanError> {
        let mut seen = HashSet::with_capacity(self.resources.len());
        for resource in &self.resources {
            let id = resource.id();
            if !seen.insert(id.clone()) {
                return Err(PlanError::DuplicateResource { resource: id });
            }
        }

        let effective_timeout_seconds = self
            .resources
            .iter()
            .filter(|resource| resource.is_subject())
            .map(|resource| resource.timeout_seconds)
            .fold(self.options.default_timeout_seconds, u64::max);

        if !self.resources.iter().any(ResourceDescriptor::is_subject) {
            return Err(PlanError::NoResources);
        }

        debug!(
            message = "Built test plan.",
            resources = self.resources.len(),
            effective_timeout_seconds,
        );
        Ok(TestPlan {
            resources: self.resources,
            effective_timeout_seconds,
            options: self.options,
        })
    }
}
