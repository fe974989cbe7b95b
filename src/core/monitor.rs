//! Child output monitoring
//!
//! The child's stdout and stderr pipes are drained by two reader threads
//! into a single channel, giving the launcher one merged, line-oriented
//! stream. The launcher's main thread performs the single blocking receive
//! loop; there is no other work for it to do.

use std::io::{BufRead, BufReader, Read};
use std::process::Child;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

/// Result of watching child output for the ready sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// A line contained the ready sentinel; the child is on its own now
    Ready,
    /// Output ended, or the deadline passed, without the sentinel.
    /// Carries the newline-joined captured output.
    StartupFailure(String),
}

/// Merge the child's output pipes into one line channel.
pub fn merged_lines(child: &mut Child) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    if let Some(stdout) = child.stdout.take() {
        spawn_reader(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_reader(stderr, tx);
    }
    rx
}

fn spawn_reader(stream: impl Read + Send + 'static, tx: mpsc::Sender<String>) {
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
}

/// Watch `lines` until one case-insensitively contains `sentinel`, the
/// stream closes, or the optional `timeout` elapses. No line past the
/// match is consumed.
///
/// `timeout` of `None` preserves the historical behavior: a child that
/// never emits the sentinel and never closes its stream blocks forever.
pub fn watch(
    lines: &Receiver<String>,
    sentinel: &str,
    timeout: Option<Duration>,
) -> MonitorOutcome {
    let sentinel = sentinel.to_lowercase();
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut captured: Vec<String> = Vec::new();

    loop {
        let next = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match lines.recv_timeout(remaining) {
                    Ok(line) => Some(line),
                    Err(RecvTimeoutError::Timeout) => {
                        info!("No ready signal within the configured timeout");
                        return MonitorOutcome::StartupFailure(captured.join("\n"));
                    }
                    Err(RecvTimeoutError::Disconnected) => None,
                }
            }
            None => lines.recv().ok(),
        };

        match next {
            Some(line) => {
                debug!("child: {}", line);
                if line.to_lowercase().contains(&sentinel) {
                    return MonitorOutcome::Ready;
                }
                captured.push(line);
            }
            None => return MonitorOutcome::StartupFailure(captured.join("\n")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::launch::READY_SENTINEL;

    #[test]
    fn stops_at_ready_sentinel_and_reads_no_further() {
        let (tx, rx) = mpsc::channel();
        tx.send("starting".to_string()).unwrap();
        tx.send("jmemory ok".to_string()).unwrap();
        tx.send("ignored-later-line".to_string()).unwrap();

        let outcome = watch(&rx, READY_SENTINEL, None);
        assert_eq!(outcome, MonitorOutcome::Ready);
        // the line after the sentinel is still queued, unconsumed
        assert_eq!(rx.try_recv().unwrap(), "ignored-later-line");
    }

    #[test]
    fn sentinel_match_is_case_insensitive_substring() {
        let (tx, rx) = mpsc::channel();
        tx.send("12:00:01 INFO JMemory OK - heap applied".to_string())
            .unwrap();

        assert_eq!(watch(&rx, READY_SENTINEL, None), MonitorOutcome::Ready);
    }

    #[test]
    fn stream_end_without_sentinel_reports_captured_output() {
        let (tx, rx) = mpsc::channel();
        tx.send("error: cannot find class".to_string()).unwrap();
        drop(tx);

        let outcome = watch(&rx, READY_SENTINEL, None);
        assert_eq!(
            outcome,
            MonitorOutcome::StartupFailure("error: cannot find class".to_string())
        );
    }

    #[test]
    fn multiple_lines_are_joined_with_newlines() {
        let (tx, rx) = mpsc::channel();
        tx.send("first".to_string()).unwrap();
        tx.send("second".to_string()).unwrap();
        drop(tx);

        let outcome = watch(&rx, READY_SENTINEL, None);
        assert_eq!(
            outcome,
            MonitorOutcome::StartupFailure("first\nsecond".to_string())
        );
    }

    #[test]
    fn timeout_reports_output_seen_so_far() {
        let (tx, rx) = mpsc::channel();
        tx.send("still starting".to_string()).unwrap();

        // keep tx alive so the stream stays open past the deadline
        let outcome = watch(&rx, READY_SENTINEL, Some(Duration::from_millis(50)));
        assert_eq!(
            outcome,
            MonitorOutcome::StartupFailure("still starting".to_string())
        );
        drop(tx);
    }
}
