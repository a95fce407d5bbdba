use clap::{ArgAction, Parser, Subcommand};
use monorun::{
    Overrides, Reporter, RunError, RunReport, Runner, RunnerConfig, Task, DEFAULT_CONFIG_FILE,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "monorun")]
#[command(about = "Discover monorepo sub-projects and run their toolchains")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ./monorun.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the projects
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Directory receiving the summary log
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Run up to N projects at once
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Kill a project's command after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Discard toolchain output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print machine-readable JSON to stdout
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Run every project's test suite (the default)
    Test,
    /// Install every project's dependencies
    Install,
    /// List discovered projects and their toolchains
    List,
    /// Count files and lines per extension
    Stats {
        /// Tree to analyse
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Where to write the JSON stats (defaults to <PATH>/project_stats.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// The requested subcommand; none means `test`.
    fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Test)
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            log_dir: self.log_dir.clone(),
            jobs: self.jobs,
            timeout_secs: self.timeout,
            quiet: self.quiet,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    monorun::telemetry::init(cli.verbose);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    };

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

async fn run(cli: Cli) -> Result<i32, RunError> {
    let config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    let runner = Runner::new(config.apply(&cli.overrides()));

    match cli.command() {
        Commands::Test => run_task(&runner, Task::Test, cli.json).await,
        Commands::Install => run_task(&runner, Task::Install, cli.json).await,
        Commands::List => list_projects(&runner, cli.json),
        Commands::Stats { path, output } => project_stats(&path, output, cli.json),
    }
}

async fn run_task(runner: &Runner, task: Task, json: bool) -> Result<i32, RunError> {
    let report = runner.run(task).await?;
    print_report(runner, &report, json)?;
    Ok(report.exit_code())
}

fn print_report(runner: &Runner, report: &RunReport, json: bool) -> Result<(), RunError> {
    if json {
        println!("{}", Reporter::to_json(report)?);
        return Ok(());
    }

    print!("{}", Reporter::new(&runner.config().log_dir).render(report));
    println!("Log written to {}", runner.log_path(report.task).display());
    Ok(())
}

fn list_projects(runner: &Runner, json: bool) -> Result<i32, RunError> {
    let entries = runner.discover()?;

    if json {
        let rendered = serde_json::to_string_pretty(&entries)
            .map_err(|e| RunError::Report(e.into()))?;
        println!("{}", rendered);
        return Ok(monorun::EXIT_SUCCESS);
    }

    if entries.is_empty() {
        println!(
            "No projects found under {}",
            runner.config().root.display()
        );
    }
    for entry in entries {
        println!(
            "  - {:<24} {:<8} {}",
            entry.name,
            entry.kind.to_string(),
            entry.marker.as_deref().unwrap_or("(no marker)")
        );
    }
    Ok(monorun::EXIT_SUCCESS)
}

fn project_stats(path: &Path, output: Option<PathBuf>, json: bool) -> Result<i32, RunError> {
    let stats = stats::collect(path)?;
    let output = output.unwrap_or_else(|| path.join("project_stats.json"));
    stats.write_json(&output)?;

    if json {
        let rendered = serde_json::to_string_pretty(&stats)
            .map_err(stats::StatsError::from)?;
        println!("{}", rendered);
    } else {
        println!("Analyzing repository: {}", path.display());
        print!("{}", stats.render());
        println!("\nStats saved to {}", output.display());
    }
    Ok(monorun::EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monorun::EXIT_CONFIG_ERROR;
    use std::ffi::OsString;
    use tempfile::TempDir;

    #[test]
    fn test_no_subcommand_means_test() {
        let cli = Cli::try_parse_from(["monorun"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.command(), Commands::Test);
        assert_eq!(cli.overrides(), Overrides::default());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "monorun", "install", "--root", "repo", "--jobs", "4", "--timeout", "30", "-q", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.command(), Commands::Install);
        assert_eq!(cli.verbose, 2);

        let overrides = cli.overrides();
        assert_eq!(overrides.root, Some(PathBuf::from("repo")));
        assert_eq!(overrides.jobs, Some(4));
        assert_eq!(overrides.timeout_secs, Some(30));
        assert!(overrides.quiet);
    }

    #[test]
    fn test_stats_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["monorun", "stats"]).unwrap();
        assert_eq!(
            cli.command(),
            Commands::Stats {
                path: PathBuf::from("."),
                output: None
            }
        );
    }

    #[test]
    fn test_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["monorun", "deploy"]).is_err());
    }

    #[tokio::test]
    async fn test_missing_explicit_config_exits_with_config_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        let cli = Cli::try_parse_from([
            OsString::from("monorun"),
            OsString::from("--config"),
            missing.into_os_string(),
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG_ERROR);
    }
}
