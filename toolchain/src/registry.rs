use crate::config::ToolchainConfig;
use crate::ecosystems::{GoToolchain, NodeToolchain, PythonToolchain, RustToolchain};
use crate::provider::Toolchain;
use crate::types::ProjectKind;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Maps each recognized [`ProjectKind`] to the toolchain that serves it.
pub struct ToolchainRegistry {
    toolchains: HashMap<ProjectKind, Arc<dyn Toolchain>>,
}

impl ToolchainRegistry {
    pub fn new() -> Self {
        Self {
            toolchains: HashMap::new(),
        }
    }

    /// Registry holding the built-in toolchain for every supported ecosystem.
    pub fn from_config(config: &ToolchainConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PythonToolchain::new(config)));
        registry.register(Arc::new(NodeToolchain::new(config)));
        registry.register(Arc::new(GoToolchain::new(config)));
        registry.register(Arc::new(RustToolchain::new(config)));
        registry
    }

    /// Register a toolchain under its own kind, replacing any previous one.
    pub fn register(&mut self, toolchain: Arc<dyn Toolchain>) {
        let kind = toolchain.kind();
        if !kind.is_known() {
            warn!("Refusing to register toolchain '{}' for unknown kind", toolchain.name());
            return;
        }
        self.toolchains.insert(kind, toolchain);
    }

    pub fn get(&self, kind: ProjectKind) -> Option<Arc<dyn Toolchain>> {
        self.toolchains.get(&kind).cloned()
    }

    pub fn kinds(&self) -> Vec<ProjectKind> {
        let mut kinds: Vec<_> = self.toolchains.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.toolchains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toolchains.is_empty()
    }
}

impl Default for ToolchainRegistry {
    fn default() -> Self {
        Self::from_config(&ToolchainConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ToolchainResult;
    use crate::types::{CommandLine, Task};
    use async_trait::async_trait;
    use std::path::Path;

    struct Custom(ProjectKind);

    #[async_trait]
    impl Toolchain for Custom {
        fn kind(&self) -> ProjectKind {
            self.0
        }

        fn command(&self, _task: Task, _dir: &Path) -> ToolchainResult<CommandLine> {
            Ok(CommandLine::new("custom", Vec::<String>::new()))
        }
    }

    #[test]
    fn test_default_registry() {
        let registry = ToolchainRegistry::default();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.kinds(), ProjectKind::PRECEDENCE.to_vec());
        assert!(registry.get(ProjectKind::Unknown).is_none());
        assert_eq!(registry.get(ProjectKind::Node).unwrap().name(), "node");
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = ToolchainRegistry::default();
        registry.register(Arc::new(Custom(ProjectKind::Rust)));
        assert_eq!(registry.len(), 4);

        let rust = registry.get(ProjectKind::Rust).unwrap();
        let cmd = rust.command(Task::Test, Path::new(".")).unwrap();
        assert_eq!(cmd.program, "custom");
    }

    #[test]
    fn test_unknown_kind_is_never_registered() {
        let mut registry = ToolchainRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(Custom(ProjectKind::Unknown)));
        assert!(registry.is_empty());
    }
}
