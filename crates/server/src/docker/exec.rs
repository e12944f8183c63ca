//! Exec domain — run a command in a container and collect its output.

use bollard::exec::{StartExecOptions, StartExecResults};
use bollard::models::ExecConfig;
use futures_util::stream::StreamExt;

use super::client::{DockerClient, DockerError};
use super::stream::{self, FrameDecoder};

/// Collected result of a one-shot exec.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExecOutcome {
    pub output: String,
    pub exit_code: i64,
}

impl DockerClient {
    /// Run `cmd` inside a container, wait for it to finish, and return the
    /// combined output and exit code.
    ///
    /// Exec attach output is demultiplexed exactly like `logs` output: when
    /// the first chunk carries the Engine framing the whole stream goes
    /// through an incremental [`FrameDecoder`] (frames may split across
    /// chunks); TTY output is passed through as UTF-8.
    pub async fn exec_command(
        &self,
        container_id: &str,
        cmd: Vec<String>,
        working_dir: Option<String>,
        env: Vec<String>,
        tty: bool,
    ) -> Result<ExecOutcome, DockerError> {
        let config = ExecConfig {
            attach_stdin: Some(false),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            tty: Some(tty),
            cmd: Some(cmd),
            env: if env.is_empty() { None } else { Some(env) },
            working_dir,
            ..Default::default()
        };

        let created = self
            .client
            .create_exec(container_id, config)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ContainerNotFound(container_id.to_string()),
                other => DockerError::BollardError(other),
            })?;

        let options = Some(StartExecOptions {
            detach: false,
            tty,
            ..Default::default()
        });

        let results = self.client.start_exec(&created.id, options).await?;

        let output = match results {
            StartExecResults::Attached { output, .. } => {
                collect_attached(output).await?
            }
            StartExecResults::Detached => String::new(),
        };

        let inspect = self.client.inspect_exec(&created.id).await?;
        if inspect.running == Some(true) {
            return Err(DockerError::ExecFailed(
                "exec still running after stream ended".to_string(),
            ));
        }

        Ok(ExecOutcome {
            output,
            exit_code: inspect.exit_code.unwrap_or(0),
        })
    }
}

/// Drain an attached exec stream into decoded text.
async fn collect_attached(
    mut output: impl futures_util::Stream<Item = Result<bollard::container::LogOutput, bollard::errors::Error>>
        + Unpin,
) -> Result<String, DockerError> {
    let mut decoder = FrameDecoder::new();
    let mut text = String::new();
    let mut framed: Option<bool> = None;

    while let Some(chunk) = output.next().await {
        let bytes = chunk?.into_bytes();
        let is_framed = *framed.get_or_insert_with(|| stream::looks_multiplexed(&bytes));
        if is_framed {
            text.push_str(&decoder.feed(&bytes));
        } else {
            text.push_str(&String::from_utf8_lossy(&bytes));
        }
    }

    if decoder.has_pending() {
        tracing::debug!("Exec stream ended mid-frame; dropping incomplete tail");
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream::iter;

    fn frame(channel: u8, payload: &[u8]) -> bytes::Bytes {
        let mut buf = vec![channel, 0, 0, 0];
        buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(payload);
        bytes::Bytes::from(buf)
    }

    fn chunk(bytes: bytes::Bytes) -> Result<bollard::container::LogOutput, bollard::errors::Error> {
        Ok(bollard::container::LogOutput::StdOut { message: bytes })
    }

    #[tokio::test]
    async fn attached_framed_output_is_demuxed() {
        let frames = frame(1, b"hello ");
        let mut second = frame(2, b"world").to_vec();
        // Split the second frame across two chunks.
        let tail = bytes::Bytes::from(second.split_off(5));
        let head = bytes::Bytes::from(second);

        let chunks = iter(vec![chunk(frames), chunk(head), chunk(tail)]);
        let text = collect_attached(chunks).await.unwrap();
        assert_eq!(text, "hello world");
    }

    #[tokio::test]
    async fn attached_tty_output_passes_through() {
        let chunks = iter(vec![
            chunk(bytes::Bytes::from_static(b"plain ")),
            chunk(bytes::Bytes::from_static(b"text\n")),
        ]);
        let text = collect_attached(chunks).await.unwrap();
        assert_eq!(text, "plain text\n");
    }

    #[tokio::test]
    async fn empty_attached_stream_is_empty_text() {
        let chunks = iter(Vec::<Result<bollard::container::LogOutput, bollard::errors::Error>>::new());
        let text = collect_attached(chunks).await.unwrap();
        assert_eq!(text, "");
    }
}
