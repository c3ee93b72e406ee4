use crate::models::{UploadError, UploadItem};
use crate::services::uploader::Uploader;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

/// Environment variables handed to the upload engine command.
pub const ENV_VIDEO_PATH: &str = "YTBULK_VIDEO_PATH";
pub const ENV_TITLE: &str = "YTBULK_TITLE";
pub const ENV_DESCRIPTION: &str = "YTBULK_DESCRIPTION";
pub const ENV_CATEGORY_ID: &str = "YTBULK_CATEGORY_ID";
pub const ENV_KEYWORDS: &str = "YTBULK_KEYWORDS";
pub const ENV_THUMBNAIL_PATH: &str = "YTBULK_THUMBNAIL_PATH";
pub const ENV_CLIENT_SECRETS: &str = "YTBULK_CLIENT_SECRETS";

/// Uploader that delegates each video to an external engine command.
///
/// The command runs through the platform shell (`sh -c` / `cmd /C`) once per
/// item, with the item's metadata in `YTBULK_*` environment variables. The
/// last non-empty line the command prints on stdout is taken as the video id.
///
/// Failure mapping:
/// - command exceeds the timeout: transient
/// - command cannot be spawned: transient
/// - non-zero exit, or exit 0 with nothing on stdout: permanent
///
/// The child is killed if the upload future is dropped, so cancelling a run
/// also stops the engine.
#[derive(Debug, Clone)]
pub struct CommandUploader {
    command: String,
    timeout: Duration,
    client_secrets: Option<Utf8PathBuf>,
}

impl CommandUploader {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
            client_secrets: None,
        }
    }

    /// Pass a client secrets path through to the engine.
    pub fn with_client_secrets(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.client_secrets = Some(path.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Environment for one item, in a stable order.
    pub fn build_environment(&self, item: &UploadItem) -> Vec<(&'static str, String)> {
        let mut env = vec![
            (ENV_VIDEO_PATH, item.video_path().to_string()),
            (ENV_TITLE, item.title.clone()),
            (ENV_DESCRIPTION, item.description.clone()),
            (ENV_CATEGORY_ID, item.category_id.clone()),
            (ENV_KEYWORDS, item.keywords.join(",")),
        ];

        if let Some(ref thumbnail) = item.thumbnail {
            env.push((ENV_THUMBNAIL_PATH, thumbnail.to_string()));
        }
        if let Some(ref secrets) = self.client_secrets {
            env.push((ENV_CLIENT_SECRETS, secrets.to_string()));
        }

        env
    }

    /// Last non-empty stdout line, trimmed.
    pub fn parse_video_id(stdout: &str) -> Option<String> {
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(str::to_string)
    }

    fn shell_command(&self) -> Command {
        if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", &self.command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", &self.command]);
            c
        }
    }
}

#[async_trait]
impl Uploader for CommandUploader {
    async fn upload(&self, item: &UploadItem) -> Result<String, UploadError> {
        tracing::info!("Executing upload command for {}", item.video_path());

        let start = Instant::now();

        let mut cmd = self.shell_command();
        cmd.envs(self.build_environment(item))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| UploadError::transient(format!("Failed to spawn upload command: {}", e)))?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::warn!("Upload command timed out after {:?}", self.timeout);
                UploadError::transient(format!("Upload timed out after {:?}", self.timeout))
            })?
            .map_err(|e| UploadError::transient(format!("Failed to wait for upload command: {}", e)))?;

        let exit_code = output.status.code().unwrap_or(-1);
        tracing::info!(
            "Upload command completed in {:.2}s with exit code {}",
            start.elapsed().as_secs_f32(),
            exit_code
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .last()
                .unwrap_or("no error output");
            return Err(UploadError::permanent(format!(
                "Upload command exited with code {}: {}",
                exit_code, detail
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_video_id(&stdout)
            .ok_or_else(|| UploadError::permanent("Upload command printed no video id"))
    }
}
