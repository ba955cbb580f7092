use std::process::Stdio;

use log::debug;
use tokio::{io::AsyncWriteExt, process::Command};

use crate::Error;

/// Where collaborator commands run.
///
/// The context is chosen once at the CLI boundary: [SshExec] for the normal
/// case of driving the cluster from a workstation, [LocalExec] when the tool
/// itself runs on the cluster. Core logic never probes the environment to
/// find out which one it got.
pub trait Executor {
    /// Run a shell command and capture its stdout. Non-zero exit is an error.
    #[allow(async_fn_in_trait)]
    async fn output(&self, command: &str) -> Result<Vec<u8>, Error>;

    /// Run a shell command, feeding it `stdin`. Non-zero exit is an error.
    #[allow(async_fn_in_trait)]
    async fn input(&self, command: &str, stdin: &[u8]) -> Result<(), Error>;

    /// Fetch a text file's content.
    #[allow(async_fn_in_trait)]
    async fn read_file(&self, path: &str) -> Result<String, Error> {
        let bytes = self.output(&format!("cat '{path}'")).await?;

        String::from_utf8(bytes)
            .map_err(|e| Error::CommandFailed(format!("`{path}` is not valid UTF-8: {e}")))
    }

    /// Overwrite a file in full.
    ///
    /// The content goes to `<path>.tmp` first and is renamed into place, so
    /// an interrupted write leaves either the old or the new content, never
    /// a truncated hybrid.
    #[allow(async_fn_in_trait)]
    async fn write_file(&self, path: &str, contents: &str) -> Result<(), Error> {
        self.input(
            &format!("cat > '{path}.tmp' && mv '{path}.tmp' '{path}'"),
            contents.as_bytes(),
        )
        .await
    }
}

async fn run(mut command: Command, label: &str, stdin: Option<&[u8]>) -> Result<Vec<u8>, Error> {
    command.stdout(Stdio::piped());
    command.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    let mut child = command.spawn()?;

    if let Some(bytes) = stdin {
        let mut handle = child.stdin.take().expect("stdin was configured as piped");
        handle.write_all(bytes).await?;
        handle.shutdown().await?;
    }

    let output = child.wait_with_output().await?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(Error::CommandFailed(format!(
            "`{label}` exited with {}",
            output.status
        )))
    }
}

/// Runs commands on the cluster's login host over ssh.
///
/// Commands are passed to the remote login shell verbatim, so `$USER` and
/// similar expand on the remote side.
#[derive(Debug, Clone)]
pub struct SshExec {
    host: String,
}

impl SshExec {
    pub fn new(host: impl Into<String>) -> Self {
        SshExec { host: host.into() }
    }

    fn command(&self, command: &str) -> Command {
        let mut ssh = Command::new("ssh");
        ssh.arg(&self.host).arg(command);
        ssh
    }
}

impl Executor for SshExec {
    async fn output(&self, command: &str) -> Result<Vec<u8>, Error> {
        debug!("remote::SshExec::output({}): {command}", self.host);
        run(self.command(command), command, None).await
    }

    async fn input(&self, command: &str, stdin: &[u8]) -> Result<(), Error> {
        debug!(
            "remote::SshExec::input({}): {command} ({} bytes)",
            self.host,
            stdin.len()
        );
        run(self.command(command), command, Some(stdin)).await.map(|_| ())
    }
}

/// Runs commands directly on this machine through `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct LocalExec;

impl LocalExec {
    fn command(command: &str) -> Command {
        let mut sh = Command::new("sh");
        sh.arg("-c").arg(command);
        sh
    }
}

impl Executor for LocalExec {
    async fn output(&self, command: &str) -> Result<Vec<u8>, Error> {
        debug!("remote::LocalExec::output: {command}");
        run(Self::command(command), command, None).await
    }

    async fn input(&self, command: &str, stdin: &[u8]) -> Result<(), Error> {
        debug!("remote::LocalExec::input: {command} ({} bytes)", stdin.len());
        run(Self::command(command), command, Some(stdin)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;

    fn scratch_path(name: &str) -> String {
        format!(
            "{}/libnbsched-remote-test-{}-{name}",
            env::temp_dir().display(),
            process::id()
        )
    }

    #[tokio::test]
    async fn test_local_output() {
        let output = LocalExec.output("echo hello").await.unwrap();
        assert_eq!(output, b"hello\n");
    }

    #[tokio::test]
    async fn test_local_output_failure() {
        assert!(matches!(
            LocalExec.output("exit 3").await,
            Err(Error::CommandFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_local_file_round_trip() {
        let path = scratch_path("round-trip");

        LocalExec.write_file(&path, "first\n").await.unwrap();
        assert_eq!(LocalExec.read_file(&path).await.unwrap(), "first\n");

        LocalExec.write_file(&path, "second\n").await.unwrap();
        assert_eq!(LocalExec.read_file(&path).await.unwrap(), "second\n");

        // the temporary file must not survive a successful write
        assert!(!fs::exists(format!("{path}.tmp")).unwrap());

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_local_read_missing_file() {
        assert!(matches!(
            LocalExec.read_file(&scratch_path("missing")).await,
            Err(Error::CommandFailed(_))
        ));
    }
}
