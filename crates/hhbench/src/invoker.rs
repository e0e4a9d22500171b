//! Running the external benchmark executable.
//!
//! Every invocation measures one sweep point once (`-r 1`); replicates are
//! separate invocations. Calls block until the process exits and are never
//! overlapped, since concurrent runs would contend for the CPU and skew the
//! throughput being measured.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use hhbench_core::SweepConfiguration;

use crate::config::ExperimentConfig;
use crate::error::InvocationError;

/// Longest stderr excerpt carried in an [`InvocationError::Failed`].
const STDERR_EXCERPT: usize = 512;

/// Produces the raw stdout of one benchmark run.
pub trait BenchmarkInvoker {
    /// Run `configuration` once and return everything written to stdout.
    ///
    /// `replicate` is informational; the same configuration is invoked once
    /// per replicate.
    fn invoke(
        &self,
        configuration: &SweepConfiguration,
        replicate: usize,
    ) -> Result<String, InvocationError>;
}

impl<F> BenchmarkInvoker for F
where
    F: Fn(&SweepConfiguration, usize) -> Result<String, InvocationError>,
{
    fn invoke(
        &self,
        configuration: &SweepConfiguration,
        replicate: usize,
    ) -> Result<String, InvocationError> {
        self(configuration, replicate)
    }
}

/// Invokes the executable as a child process.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    executable: PathBuf,
    launcher: Vec<OsString>,
}

impl ProcessInvoker {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            launcher: Vec::new(),
        }
    }

    /// Prefix every invocation with `launcher`, e.g. `taskset -c 2`.
    pub fn with_launcher(mut self, launcher: Vec<OsString>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self::new(&config.executable).with_launcher(config.launcher.clone())
    }

    /// Full argument vector, program first.
    pub fn command_line(&self, configuration: &SweepConfiguration) -> Vec<OsString> {
        let mut argv = self.launcher.clone();
        argv.push(self.executable.clone().into_os_string());
        argv.extend(build_arguments(configuration));
        argv
    }
}

impl BenchmarkInvoker for ProcessInvoker {
    fn invoke(
        &self,
        configuration: &SweepConfiguration,
        replicate: usize,
    ) -> Result<String, InvocationError> {
        let argv = self.command_line(configuration);
        let Some((program, args)) = argv.split_first() else {
            return Err(InvocationError::Launch {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };
        let program_name = program.to_string_lossy().into_owned();
        tracing::debug!(replicate, argv = ?argv, "invoking benchmark");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| InvocationError::Launch {
                program: program_name.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(InvocationError::Failed {
                program: program_name,
                status: output.status,
                stderr: excerpt(&String::from_utf8_lossy(&output.stderr)),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    match trimmed.char_indices().nth(STDERR_EXCERPT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_owned(),
    }
}

/// Executable flags for one configuration.
///
/// Order: the varying parameter, then `-phi`, `-r 1`, `-gamma`, `-z` and
/// `-f`, each fixed flag only when its value is set.
pub fn build_arguments(configuration: &SweepConfiguration) -> Vec<OsString> {
    let fixed = &configuration.fixed;
    let mut args: Vec<OsString> = Vec::with_capacity(12);
    let mut flag = |name: &str, value: &dyn AsRef<OsStr>| {
        args.push(name.into());
        args.push(value.as_ref().to_owned());
    };

    flag(
        configuration.family().flag(),
        &configuration.parameter.value().to_string(),
    );
    if let Some(phi) = fixed.threshold {
        flag("-phi", &phi.to_string());
    }
    flag("-r", &"1");
    if let Some(gamma) = fixed.decay {
        flag("-gamma", &gamma.to_string());
    }
    if let Some(z) = fixed.skew {
        flag("-z", &z.to_string());
    }
    if let Some(trace) = &fixed.trace {
        flag("-f", trace);
    }
    args
}
