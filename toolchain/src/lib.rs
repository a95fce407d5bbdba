pub mod config;
pub mod ecosystems;
pub mod process;
pub mod provider;
pub mod registry;
pub mod types;

pub use config::{CommandOverrides, ToolchainConfig};
pub use ecosystems::{GoToolchain, NodeToolchain, PythonToolchain, RustToolchain};
pub use process::{execute, ExecOptions};
pub use provider::{Toolchain, ToolchainError, ToolchainResult};
pub use registry::ToolchainRegistry;
pub use types::{
    CommandLine, ExitOutcome, ProjectKind, Task, SPAWN_FAILURE_EXIT_CODE, TIMEOUT_EXIT_CODE,
};

pub mod prelude {
    pub use crate::config::*;
    pub use crate::ecosystems::*;
    pub use crate::process::*;
    pub use crate::provider::*;
    pub use crate::registry::*;
    pub use crate::types::*;
}
