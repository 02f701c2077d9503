//! # Editor Sessions
//!
//! Host side of an out-of-process edit. [`open_config`] serializes the live
//! settings, launches the editor through an [`EditorLauncher`], and spawns a
//! task that applies every update line the editor prints. [`ConfigSession::wait`]
//! resolves once the editor closes its stdout and exits.
//!
//! Updates are applied atomically: a line that fails to decode or validate,
//! or is not UTF-8 at all, leaves the live settings untouched and the
//! session keeps reading.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use subconf_common::DynamicSettings;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::protocol::{self, EDIT_COMMAND};

/// Settings shared between the host and the update reader task.
pub type SharedSettings = Arc<RwLock<DynamicSettings>>;

pub fn shared(settings: DynamicSettings) -> SharedSettings {
    Arc::new(RwLock::new(settings))
}

/// A running editor: the stream of update lines and, for real processes, the
/// child handle to reap.
pub struct EditorProcess {
    updates: Box<dyn AsyncBufRead + Send + Unpin>,
    child: Option<Child>,
}

impl EditorProcess {
    pub fn from_child(mut child: Child) -> Result<Self> {
        let stdout = child.stdout.take().ok_or(SessionError::MissingStdout)?;
        Ok(Self {
            updates: Box::new(BufReader::new(stdout)),
            child: Some(child),
        })
    }

    /// Wraps an arbitrary byte stream, for editors that are not processes.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            updates: Box::new(BufReader::new(reader)),
            child: None,
        }
    }
}

/// Starts an editor for the given schema and initial payload.
#[async_trait]
pub trait EditorLauncher: Send + Sync {
    async fn launch(&self, schema: &str, payload: &str) -> Result<EditorProcess>;
}

/// Launches the editor as a child process: `program leading_args... schema payload`.
///
/// Stdin and stderr are inherited so the editor can draw on the same terminal;
/// stdout is the update channel.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Re-runs the current executable in editor mode.
    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?).with_args([EDIT_COMMAND]))
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

#[async_trait]
impl EditorLauncher for ProcessLauncher {
    async fn launch(&self, schema: &str, payload: &str) -> Result<EditorProcess> {
        debug!(
            "Launching editor {} for schema `{}`",
            self.program.display(),
            schema
        );
        let child = Command::new(&self.program)
            .args(&self.leading_args)
            .args(protocol::editor_args(schema, payload))
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SessionError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;
        EditorProcess::from_child(child)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct UpdateCounts {
    applied: usize,
    rejected: usize,
}

/// Outcome of one editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub updates_applied: usize,
    pub updates_rejected: usize,
    /// `None` when the editor was not a child process.
    pub exit_status: Option<ExitStatus>,
}

impl SessionSummary {
    pub fn exited_cleanly(&self) -> bool {
        self.exit_status.is_none_or(|status| status.success())
    }

    /// The editor was discarded rather than closed.
    pub fn aborted(&self) -> bool {
        self.exit_status
            .and_then(|status| status.code())
            .is_some_and(|code| code == protocol::ABORTED_EXIT_CODE)
    }
}

/// An editor that is open and feeding updates into the shared settings.
pub struct ConfigSession {
    reader: JoinHandle<Result<UpdateCounts>>,
    child: Option<Child>,
}

impl ConfigSession {
    /// Waits for the editor to close its output and exit.
    pub async fn wait(self) -> Result<SessionSummary> {
        let Self { reader, child } = self;
        let counts = reader.await??;
        let exit_status = match child {
            Some(mut child) => Some(child.wait().await?),
            None => None,
        };
        Ok(SessionSummary {
            updates_applied: counts.applied,
            updates_rejected: counts.rejected,
            exit_status,
        })
    }
}

/// Opens an editor on `settings` and starts applying its updates.
pub async fn open_config(
    settings: SharedSettings,
    launcher: &dyn EditorLauncher,
) -> Result<ConfigSession> {
    let (schema, payload) = {
        let guard = settings.read().unwrap_or_else(PoisonError::into_inner);
        (guard.schema().to_string(), protocol::encode_update(&guard))
    };

    let EditorProcess { updates, child } = launcher.launch(&schema, &payload).await?;
    let reader = tokio::spawn(pump_updates(updates, settings));

    Ok(ConfigSession { reader, child })
}

async fn pump_updates(
    mut updates: Box<dyn AsyncBufRead + Send + Unpin>,
    settings: SharedSettings,
) -> Result<UpdateCounts> {
    let mut counts = UpdateCounts::default();
    let mut buf: Vec<u8> = Vec::new();

    loop {
        buf.clear();
        if updates.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            counts.rejected += 1;
            warn!("Ignoring settings update: line is not valid UTF-8");
            continue;
        };
        match apply_update(&settings, line) {
            Ok(true) => {
                counts.applied += 1;
                // the editor owns the terminal while the session is open
                debug!("Received settings: {}", line.trim());
            }
            Ok(false) => {}
            Err(err) => {
                counts.rejected += 1;
                warn!("Ignoring settings update: {}", err);
            }
        }
    }
    Ok(counts)
}

fn apply_update(settings: &SharedSettings, line: &str) -> Result<bool> {
    let Some(document) = protocol::decode_update(line)? else {
        return Ok(false);
    };
    let mut guard = settings.write().unwrap_or_else(PoisonError::into_inner);
    let mut staged = guard.clone();
    staged.deserialize(&document)?;
    *guard = staged;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;
    use subconf_common::SchemaRegistry;

    struct ScriptedLauncher {
        output: String,
        launches: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedLauncher {
        fn new(output: &str) -> Self {
            Self {
                output: output.to_string(),
                launches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EditorLauncher for ScriptedLauncher {
        async fn launch(&self, schema: &str, payload: &str) -> Result<EditorProcess> {
            self.launches
                .lock()
                .unwrap()
                .push((schema.to_string(), payload.to_string()));
            Ok(EditorProcess::from_reader(Cursor::new(self.output.clone().into_bytes())))
        }
    }

    fn example() -> SharedSettings {
        shared(SchemaRegistry::builtin().create("example").unwrap())
    }

    #[tokio::test]
    async fn passes_schema_and_current_state_to_launcher() {
        let settings = example();
        settings.write().unwrap().set("example2", "current").unwrap();
        let launcher = ScriptedLauncher::new("");

        open_config(settings.clone(), &launcher).await.unwrap().wait().await.unwrap();

        let launches = launcher.launches.lock().unwrap();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].0, "example");
        assert!(launches[0].1.contains(r#""example2":"current""#));
    }

    #[tokio::test]
    async fn applies_each_update_line_in_order() {
        let settings = example();
        let launcher = ScriptedLauncher::new(
            "{\"example1\":true,\"example3\":1}\n\n{\"example3\":2,\"example4\":0.25}\n",
        );

        let summary = open_config(settings.clone(), &launcher)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(summary.updates_applied, 2);
        assert_eq!(summary.updates_rejected, 0);
        assert!(summary.exit_status.is_none());
        assert!(summary.exited_cleanly());

        let guard = settings.read().unwrap();
        assert!(guard.get::<bool>("example1").unwrap());
        assert_eq!(guard.get::<i32>("example3").unwrap(), 2);
        assert_eq!(guard.get::<f64>("example4").unwrap(), 0.25);
    }

    #[tokio::test]
    async fn rejected_lines_leave_settings_untouched() {
        let settings = example();
        let launcher = ScriptedLauncher::new(
            "not json\n{\"example1\":true,\"example3\":\"three\"}\n{\"example2\":\"ok\"}\n",
        );

        let summary = open_config(settings.clone(), &launcher)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(summary.updates_applied, 1);
        assert_eq!(summary.updates_rejected, 2);

        let guard = settings.read().unwrap();
        // the second line failed on example3, so example1 must not have changed
        assert!(!guard.get::<bool>("example1").unwrap());
        assert_eq!(guard.get::<String>("example2").unwrap(), "ok");
    }

    #[tokio::test]
    async fn non_utf8_line_is_rejected_without_ending_session() {
        let settings = example();
        let mut output: Vec<u8> = b"\xff\xfe\n".to_vec();
        output.extend_from_slice(b"{\"example3\":5}\n");
        let EditorProcess { updates, .. } = EditorProcess::from_reader(Cursor::new(output));

        let counts = pump_updates(updates, settings.clone()).await.unwrap();

        assert_eq!(counts, UpdateCounts { applied: 1, rejected: 1 });
        assert_eq!(settings.read().unwrap().get::<i32>("example3").unwrap(), 5);
    }

    #[test]
    fn current_exe_launcher_runs_edit_subcommand() {
        let launcher = ProcessLauncher::current_exe().unwrap();
        assert_eq!(launcher.leading_args, vec![EDIT_COMMAND.to_string()]);
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let launcher = ProcessLauncher::new("/nonexistent/subconf-editor");
        let result = open_config(example(), &launcher).await;
        assert!(matches!(result, Err(SessionError::Launch { .. })));
    }
}
