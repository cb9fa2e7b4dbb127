use crate::filter::{filter_rows, RowFilter};
use crate::ps::{output_lines, parse_ps_output, PS_ARGS};
use anyhow::{bail, Context, Result};
use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::Docker;
use futures_util::StreamExt;
use pstree_common::ProcessRecord;

/// Anything that can produce a snapshot of a container's processes.
#[async_trait::async_trait]
pub trait ProcessSource: Send + Sync {
    async fn list_processes(&self) -> Result<Vec<ProcessRecord>>;
}

/// Lists processes by running `ps` inside a running container.
#[derive(Clone)]
pub struct DockerProcessSource {
    docker: Docker,
    container: String,
    filters: Vec<RowFilter>,
}

impl DockerProcessSource {
    pub fn new(docker: Docker, container: impl Into<String>, filters: Vec<RowFilter>) -> Self {
        Self {
            docker,
            container: container.into(),
            filters,
        }
    }

    pub fn connect(container: impl Into<String>, filters: Vec<RowFilter>) -> Result<Self> {
        let docker =
            Docker::connect_with_local_defaults().context("Failed to connect to Docker")?;
        Ok(Self::new(docker, container, filters))
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    async fn exec_output(&self, cmd: &[&str]) -> Result<Vec<u8>> {
        let exec = self
            .docker
            .create_exec(
                &self.container,
                CreateExecOptions {
                    cmd: Some(cmd.to_vec()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("Failed to create exec in container {}", self.container))?;

        let mut stdout = Vec::new();
        match self.docker.start_exec(&exec.id, None).await? {
            StartExecResults::Attached { mut output, .. } => {
                while let Some(chunk) = output.next().await {
                    match chunk? {
                        LogOutput::StdOut { message } => stdout.extend_from_slice(&message),
                        LogOutput::StdErr { message } => tracing::warn!(
                            "[{}] {}",
                            self.container,
                            String::from_utf8_lossy(&message).trim_end()
                        ),
                        _ => {}
                    }
                }
            }
            StartExecResults::Detached => bail!("Exec in {} detached unexpectedly", self.container),
        }

        let exit_code = self.docker.inspect_exec(&exec.id).await?.exit_code;
        if let Some(code) = exit_code.filter(|code| *code != 0) {
            bail!(
                "`{}` exited with code {} in container {}",
                cmd.join(" "),
                code,
                self.container
            );
        }

        Ok(stdout)
    }
}

#[async_trait::async_trait]
impl ProcessSource for DockerProcessSource {
    async fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        let raw = self.exec_output(&PS_ARGS).await?;
        let rows = parse_ps_output(&output_lines(&raw))?;
        let rows = filter_rows(rows, &self.filters);
        tracing::debug!("Listed {} processes in {}", rows.len(), self.container);
        Ok(rows)
    }
}
