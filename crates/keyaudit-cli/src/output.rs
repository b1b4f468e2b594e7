use std::io::{self, Write};

use keyaudit_core::{AuditReport, Diagnostic};

/// Where report lines (stdout) and progress (stderr) are written.
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl Console {
    pub fn stdio() -> Self {
        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
        }
    }

    /// `[n/total] Model`, redrawn in place.
    pub fn progress(&mut self, current: usize, total: usize, label: &str) -> io::Result<()> {
        write!(self.err, "\r\x1b[2K[{current}/{total}] {label}")?;
        self.err.flush()
    }

    pub fn progress_finish(&mut self) -> io::Result<()> {
        writeln!(self.err)
    }

    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.err, "{message}")
    }

    pub fn line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")
    }

    pub fn diagnostic(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        writeln!(self.out, "NOTE  {diagnostic}")
    }

    /// Visible report lines followed by the per-mode summary.
    pub fn report(&mut self, report: &AuditReport) -> io::Result<()> {
        for line in report.render_lines() {
            self.line(&line)?;
        }
        self.line(&report.summary_line())
    }
}

#[cfg(test)]
pub(crate) mod capture {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::Console;

    /// In-memory buffer shared between a console and the test reading it.
    #[derive(Clone, Default)]
    pub struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        pub fn contents(&self) -> String {
            let bytes = self.0.lock().expect("buffer lock").clone();
            String::from_utf8(bytes).expect("utf8 output")
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// A console writing into two buffers: (console, stdout, stderr).
    pub fn console() -> (Console, Buffer, Buffer) {
        let out = Buffer::default();
        let err = Buffer::default();
        let console = Console {
            out: Box::new(out.clone()),
            err: Box::new(err.clone()),
        };
        (console, out, err)
    }
}
