//! Engine adapter: serialises an invocation into the external engine's
//! arguments, runs it to completion, and maps its failure signals.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use storyreel_common::config::EngineConfig;
use storyreel_common::error::{StoryreelError, StoryreelResult};

use crate::graph::CompiledGraph;

/// One `-i` input with the options that precede it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineInput {
    pub options: Vec<String>,
    pub path: PathBuf,
}

/// A complete engine invocation, minus the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineInvocation {
    inputs: Vec<EngineInput>,
    filter_complex: Option<String>,
    maps: Vec<String>,
    output_args: Vec<String>,
    output: PathBuf,
    overwrite: bool,
}

impl EngineInvocation {
    /// Create an invocation writing to `output`, overwriting it if present.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            filter_complex: None,
            maps: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
            overwrite: true,
        }
    }

    /// Add an input preceded by `options`.
    pub fn input<I, S>(mut self, path: impl AsRef<Path>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(EngineInput {
            options: options.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Attach a compiled graph and map each of its outputs.
    pub fn graph(mut self, graph: &CompiledGraph) -> Self {
        if !graph.is_empty() {
            self.filter_complex = Some(graph.to_filter_complex());
        }
        self.maps
            .extend(graph.outputs().iter().map(|label| format!("[{label}]")));
        self
    }

    /// Add an output argument (after inputs, graph and maps).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn inputs(&self) -> &[EngineInput] {
        &self.inputs
    }

    pub fn filter_complex(&self) -> Option<&str> {
        self.filter_complex.as_deref()
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Argument vector, deterministic for a given invocation.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        args.push(if self.overwrite { "-y" } else { "-n" }.to_string());

        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.display().to_string());
        }

        if let Some(filter) = &self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(filter.clone());
        }

        for map in &self.maps {
            args.push("-map".to_string());
            args.push(map.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.display().to_string());
        args
    }

    /// Shell-like rendering for logs and dry runs.
    pub fn to_command_line(&self, binary: &Path) -> String {
        std::iter::once(binary.display().to_string())
            .chain(self.to_args().into_iter().map(|arg| shell_quote(&arg)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Progress callback for engine runs.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send>;

/// Progress report parsed from the engine's `-progress` stream.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Output timestamp reached so far.
    pub out_time_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    pub stage: RenderStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Rendering,
    Finalizing,
    Complete,
}

/// Handle on the external engine binary.
#[derive(Debug, Clone)]
pub struct Engine {
    binary: PathBuf,
}

impl Engine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.ffmpeg.clone())
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Check if the binary can be found.
    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    /// Run an invocation to completion.
    ///
    /// Blocking. A non-zero exit carries the engine's stderr verbatim; an exit
    /// of zero that leaves no (or an empty) output file is reported as
    /// [`StoryreelError::OutputMissing`].
    pub fn execute(&self, invocation: &EngineInvocation) -> StoryreelResult<()> {
        self.execute_with_progress(invocation, None, None)
    }

    /// Like [`Engine::execute`], reporting progress against
    /// `expected_duration_secs` when a callback is given.
    pub fn execute_with_progress(
        &self,
        invocation: &EngineInvocation,
        expected_duration_secs: Option<f64>,
        progress: Option<ProgressCallback>,
    ) -> StoryreelResult<()> {
        let mut args = invocation.to_args();
        if progress.is_some() {
            let at = args.len().min(1);
            args.splice(
                at..at,
                ["-progress", "pipe:1", "-nostats"].map(String::from),
            );
        }

        tracing::debug!(binary = %self.binary.display(), ?args, "Running engine");
        let start = std::time::Instant::now();

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                StoryreelError::engine_execution(
                    "not started",
                    format!("failed to start {}: {e}", self.binary.display()),
                )
            })?;

        tracing::info!(
            pid = child.id(),
            args_len = args.len(),
            output = %invocation.output_path().display(),
            "Engine process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StoryreelError::engine_execution("not started", "stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| StoryreelError::engine_execution("not started", "stderr not captured"))?;

        // Drain stderr concurrently so a chatty engine never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read engine stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut state = ProgressState::default();
        let mut read_error = None;
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) => {
                    read_error = Some(err);
                    break;
                }
            }

            let Some(cb) = &progress else {
                continue;
            };
            if let Some((key, value)) = line.trim().split_once('=') {
                state.update(key, value);
                if key == "progress" {
                    cb(progress_report(
                        &state,
                        expected_duration_secs.unwrap_or(0.0),
                        start.elapsed().as_secs_f64(),
                    ));
                }
            }
        }

        // Closing stdout lets an engine still writing progress exit.
        drop(reader);
        let status = child.wait()?;
        let diagnostics = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if let Some(err) = read_error {
            tracing::warn!(%status, error = %err, "Engine progress output unreadable");
            return Err(StoryreelError::engine_execution(
                status.to_string(),
                format!(
                    "failed to read engine progress: {err}\n{}",
                    diagnostics.trim()
                )
                .trim_end(),
            ));
        }

        if !status.success() {
            tracing::warn!(%status, "Engine exited with failure");
            return Err(StoryreelError::engine_execution(
                status.to_string(),
                diagnostics.trim(),
            ));
        }

        ensure_output(invocation.output_path())?;

        if let Some(cb) = &progress {
            cb(RenderProgress {
                progress: 1.0,
                out_time_secs: expected_duration_secs.unwrap_or(state.out_time_secs),
                eta_secs: 0.0,
                stage: RenderStage::Complete,
            });
        }

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            output = %invocation.output_path().display(),
            "Engine run complete"
        );
        Ok(())
    }
}

/// Post-hoc check that the engine actually wrote something.
pub fn ensure_output(path: &Path) -> StoryreelResult<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(StoryreelError::OutputMissing {
            path: path.to_path_buf(),
        }),
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // The engine reports microseconds under both names.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> RenderProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    RenderProgress {
        progress: if state.complete { 1.0 } else { progress },
        out_time_secs: state.out_time_secs,
        eta_secs,
        stage: if state.complete {
            RenderStage::Finalizing
        } else {
            RenderStage::Rendering
        },
    }
}
