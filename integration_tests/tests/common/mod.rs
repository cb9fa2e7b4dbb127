use anyhow::{bail, Context, Result};
use bollard::container::{
    Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::Docker;
use futures_util::stream::StreamExt;
use pstree_extracts::{DockerProcessSource, ProcessSource};
use tokio::time::{sleep, Duration};

/// Ships without procps. Container commands install it with [`with_procps`].
pub const IMAGE: &str = "debian:bookworm-slim";
const READY_ATTEMPTS: u32 = 180;

/// Prefixes `script` with a procps install so that `ps` exists once `script`
/// starts running.
pub fn with_procps(script: &str) -> String {
    format!(
        "command -v ps >/dev/null || (apt-get update -qq && apt-get install -y -qq procps) >/dev/null 2>&1; {}",
        script
    )
}

/// Polls until `ps` runs in the container, i.e. until the procps install is
/// done.
pub async fn wait_until_listable(source: &DockerProcessSource) -> Result<()> {
    for _ in 0..READY_ATTEMPTS {
        if source.list_processes().await.is_ok() {
            return Ok(());
        }
        sleep(Duration::from_secs(1)).await;
    }
    bail!("ps never became available in {}", source.container())
}

/// A throwaway container, removed by [`TestContainer::remove`].
pub struct TestContainer {
    pub docker: Docker,
    pub name: String,
}

impl TestContainer {
    pub async fn start(name: &str, cmd: &[&str]) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults().context("Failed to connect to Docker")?;

        let mut pull = docker.create_image(
            Some(CreateImageOptions {
                from_image: IMAGE,
                ..Default::default()
            }),
            None,
            None,
        );
        while let Some(progress) = pull.next().await {
            progress.with_context(|| format!("Failed to pull {}", IMAGE))?;
        }

        // Leftover from an aborted run.
        let _ = docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await;

        docker
            .create_container(
                Some(CreateContainerOptions {
                    name,
                    platform: None,
                }),
                Config {
                    image: Some(IMAGE),
                    cmd: Some(cmd.to_vec()),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("Failed to create container {}", name))?;
        docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await
            .with_context(|| format!("Failed to start container {}", name))?;

        Ok(TestContainer {
            docker,
            name: name.to_string(),
        })
    }

    pub async fn remove(self) -> Result<()> {
        self.docker
            .remove_container(
                &self.name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
            .with_context(|| format!("Failed to remove container {}", self.name))
    }
}
