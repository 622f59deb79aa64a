use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;

use super::types::{CommandSpec, ProcessOutput};

/// Run a command to completion and capture its output.
///
/// Blocks until the process exits. Stdout and stderr are drained on
/// separate threads so a chatty tool cannot deadlock on a full pipe.
/// A failure to spawn is reported in [`ProcessOutput::spawn_error`] rather
/// than returned as an error.
pub fn run(spec: &CommandSpec, default_cwd: &Path) -> ProcessOutput {
    let cwd = spec.cwd.as_deref().unwrap_or(default_cwd);
    tracing::debug!(command = %spec.display(), cwd = %cwd.display(), "spawning");

    let mut child = match Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(cwd)
        .envs(spec.env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!(program = %spec.program, error = %e, "spawn failed");
            return ProcessOutput {
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                spawn_error: Some(format!("failed to start `{}`: {e}", spec.program)),
            };
        }
    };

    let stdout = child.stdout.take().map(|s| drain("stdout", s));
    let stderr = child.stderr.take().map(|s| drain("stderr", s));

    let status = child.wait();

    let stdout = join(stdout);
    let stderr = join(stderr);

    match status {
        Ok(status) => ProcessOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            spawn_error: None,
        },
        Err(e) => ProcessOutput {
            exit_code: None,
            stdout,
            stderr,
            spawn_error: Some(format!("failed to wait for `{}`: {e}", spec.program)),
        },
    }
}

fn drain<R: Read + Send + 'static>(stream: &'static str, source: R) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        let mut reader = BufReader::new(source);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&raw);
                    tracing::trace!(stream = stream, "{}", line.trim_end());
                    buf.push_str(&line);
                }
            }
        }
        buf
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
