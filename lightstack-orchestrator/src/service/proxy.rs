//! Reverse-proxy controller
//!
//! Sends start/stop/reload signals to the external nginx instance that
//! fronts the stacks. Failures are reported as `false`, never as errors;
//! callers decide whether a failed signal is fatal.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::config::{CommandSpec, ProxyCommands};
use crate::service::process::{ProcessRequest, ProcessRunner};

/// Control signals for the reverse proxy
///
/// Provisioning only reloads; `start` and `stop` are for operators embedding
/// the controller and have no HTTP route.
#[async_trait]
pub trait ProxyController: Send + Sync {
    async fn reload(&self) -> bool;
    async fn start(&self) -> bool;
    async fn stop(&self) -> bool;
}

/// [`ProxyController`] that runs the configured control commands
pub struct CommandProxyController {
    runner: Arc<dyn ProcessRunner>,
    commands: ProxyCommands,
}

impl CommandProxyController {
    pub fn new(runner: Arc<dyn ProcessRunner>, commands: ProxyCommands) -> Self {
        Self { runner, commands }
    }

    async fn signal(&self, action: &str, command: &CommandSpec) -> bool {
        info!("Sending {} to reverse proxy", action);

        let request = ProcessRequest::new(&command.program).args(command.args.iter().cloned());
        match self.runner.run(request).await {
            Ok(output) if output.success() => true,
            Ok(output) => {
                error!(
                    "Reverse proxy {} failed (exit code {}): {}",
                    action,
                    output.exit_code,
                    output.stderr.trim()
                );
                false
            }
            Err(e) => {
                error!("Reverse proxy {} could not be executed: {:#}", action, e);
                false
            }
        }
    }
}

#[async_trait]
impl ProxyController for CommandProxyController {
    async fn reload(&self) -> bool {
        self.signal("reload", &self.commands.reload).await
    }

    async fn start(&self) -> bool {
        self.signal("start", &self.commands.start).await
    }

    async fn stop(&self) -> bool {
        self.signal("stop", &self.commands.stop).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::service::process::TokioProcessRunner;
    use crate::service::testing::write_script;

    fn controller(dir: &std::path::Path, reload_body: &str) -> CommandProxyController {
        let reload = write_script(dir, "reload.sh", reload_body);
        let marker = dir.join("started");
        let start = write_script(dir, "start.sh", &format!("touch {}", marker.display()));

        CommandProxyController::new(
            Arc::new(TokioProcessRunner::new()),
            ProxyCommands {
                reload: CommandSpec::parse(&reload.display().to_string()).unwrap(),
                start: CommandSpec::parse(&start.display().to_string()).unwrap(),
                stop: CommandSpec::parse("/nonexistent/lightstack/nginx-stop").unwrap(),
            },
        )
    }

    #[tokio::test]
    async fn test_reload_success() {
        let dir = tempfile::tempdir().unwrap();
        assert!(controller(dir.path(), "exit 0").reload().await);
    }

    #[tokio::test]
    async fn test_reload_non_zero_exit_is_false() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!controller(dir.path(), "echo bad config >&2; exit 1").reload().await);
    }

    #[tokio::test]
    async fn test_start_runs_command() {
        let dir = tempfile::tempdir().unwrap();
        assert!(controller(dir.path(), "exit 0").start().await);
        assert!(dir.path().join("started").exists());
    }

    #[tokio::test]
    async fn test_missing_command_is_false() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!controller(dir.path(), "exit 0").stop().await);
    }
}
