//! Output sinks for rendered access lines

use std::io::Write;

/// Destination for whole access lines. Implementations must write each line
/// atomically with respect to concurrent callers and must not panic.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes to stdout, holding the stdout lock for the whole line
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write_line(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
            // stdout closed
            tracing::trace!("dropped access line");
        }
    }
}

/// Captures lines in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }
}

#[cfg(test)]
impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_sink_keeps_whole_lines_under_contention() {
        let sink = Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        sink.write_line(&format!("worker-{} line-{}", worker, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|l| l.starts_with("worker-") && l.contains(" line-")));
    }
}
