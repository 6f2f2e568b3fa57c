//! Child-process runner behind the `run_command` endpoint.
//!
//! One detached worker thread per invocation. The worker never touches UI
//! state; the supplied sink is its only channel back, and cards fold the
//! streamed strings into their own state on their next frame.

use std::{
    io::{BufRead, BufReader},
    process::{Command, Stdio},
    sync::Arc,
    thread,
};

/// Marker appended after the exit-code line once the child has terminated.
pub const PROCESS_COMPLETED: &str = "<PROCESS_COMPLETED>";

/// Receives partial stdout, the exit-code line, and the completion marker.
pub type OutputSink = Arc<dyn Fn(String) + Send + Sync>;

/// Spawn `cmd` under `sh -c` and stream its stdout to `sink` line by line.
/// No cancellation; the worker ends when the child does.
pub fn run_command(cmd: &str, sink: OutputSink) {
    let cmd = cmd.to_string();
    thread::spawn(move || {
        let child = Command::new("sh")
            .arg("-c")
            .arg(&cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(component = "shell", %cmd, error = %e, "spawn failed");
                sink(format!("failed to run '{cmd}': {e}"));
                sink(format!("\n{PROCESS_COMPLETED}"));
                return;
            }
        };

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => sink(line.clone()),
                    Err(e) => {
                        tracing::warn!(component = "shell", error = %e, "stdout read failed");
                        break;
                    }
                }
            }
        }

        let code = match child.wait() {
            Ok(status) => status.code().unwrap_or(-1),
            Err(_) => -1,
        };
        sink(format!("\nexit code {code}"));
        sink(format!("\n{PROCESS_COMPLETED}"));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    fn collect_until_marker(cmd: &str) -> String {
        let buf = Arc::new(Mutex::new(String::new()));
        let sink_buf = buf.clone();
        let sink: OutputSink = Arc::new(move |chunk| {
            sink_buf.lock().unwrap().push_str(&chunk);
        });
        run_command(cmd, sink);

        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            {
                let out = buf.lock().unwrap();
                if out.contains(PROCESS_COMPLETED) {
                    return out.clone();
                }
            }
            assert!(Instant::now() < deadline, "command did not complete");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn streams_stdout_and_appends_exit_line() {
        let out = collect_until_marker("printf 'alpha\\nbeta\\n'");
        assert!(out.contains("alpha\n"));
        assert!(out.contains("beta\n"));
        assert!(out.contains("\nexit code 0"));
        assert!(out.ends_with(&format!("\n{PROCESS_COMPLETED}")));
    }

    #[test]
    fn nonzero_exit_code_is_reported() {
        let out = collect_until_marker("exit 3");
        assert!(out.contains("\nexit code 3"));
    }
}
