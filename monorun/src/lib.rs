pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod report;
pub mod runner;
pub mod telemetry;

pub use config::{ConfigError, Overrides, RunnerConfig, DEFAULT_CONFIG_FILE};
pub use discovery::{discover, Discovery, DiscoveryError, ProjectEntry};
pub use dispatch::{Dispatcher, RunResult};
pub use report::{
    ReportError, Reporter, RunReport, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS,
};
pub use runner::{RunError, Runner, RunnerResult};

pub use toolchain::{ProjectKind, Task};
