//! CUPS command-line backend
//!
//! Submission stages the payload in a temporary file and hands it to
//! `lp -o raw`; listing parses `lpstat -p`.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

use tracing::{debug, info, instrument, warn};

use crate::error::{PrintError, PrintResult};
use crate::printer::{RawPrinter, check_printer_name};

/// Leading token of a printer line in `lpstat -p` output
const PRINTER_LINE_PREFIX: &str = "printer ";
/// `lpstat` banner when no queue is configured
const NO_DESTINATIONS: &str = "No destinations added";

/// Printer queues reached through `lp` / `lpstat`
#[derive(Debug, Clone)]
pub struct CupsBackend {
    submit_program: OsString,
    status_program: OsString,
    staging_dir: Option<PathBuf>,
}

impl Default for CupsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CupsBackend {
    pub fn new() -> Self {
        Self {
            submit_program: "lp".into(),
            status_program: "lpstat".into(),
            staging_dir: None,
        }
    }

    /// Use alternative submission / status tools
    pub fn with_programs(
        mut self,
        submit_program: impl Into<OsString>,
        status_program: impl Into<OsString>,
    ) -> Self {
        self.submit_program = submit_program.into();
        self.status_program = status_program.into();
        self
    }

    /// Stage payloads in `dir` instead of the system temp directory
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    fn stage(&self, data: &[u8]) -> PrintResult<tempfile::TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pos-print-").suffix(".raw");

        let mut file = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(PrintError::Staging)?;

        file.write_all(data).map_err(PrintError::Staging)?;
        file.flush().map_err(PrintError::Staging)?;

        // Closes the handle; the path is still removed on drop
        Ok(file.into_temp_path())
    }

    fn run(&self, command: &mut Command, program: &OsString) -> PrintResult<Output> {
        command
            .output()
            .map_err(|source| PrintError::SubprocessInvocation {
                program: program.to_string_lossy().into_owned(),
                source,
            })
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_string()
}

/// Extract queue names from `lpstat -p` output
///
/// Only lines starting with `printer ` count; anything else (blank lines,
/// error banners, wrapped status text) is ignored.
pub fn parse_lpstat(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(PRINTER_LINE_PREFIX))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

impl RawPrinter for CupsBackend {
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    fn submit_raw_bytes(&self, printer_name: &str, data: &[u8]) -> PrintResult<()> {
        check_printer_name(printer_name)?;

        let staged = self.stage(data)?;
        debug!(path = %staged.display(), "Payload staged");

        let output = self.run(
            Command::new(&self.submit_program)
                .arg("-d")
                .arg(printer_name)
                .args(["-o", "raw"])
                .arg(&*staged),
            &self.submit_program,
        )?;

        if let Err(e) = staged.close() {
            warn!(error = %e, "Failed to remove staging file");
        }

        if !output.status.success() {
            return Err(PrintError::SubprocessNonZeroExit {
                program: self.submit_program.to_string_lossy().into_owned(),
                status: output.status,
                output: combined_output(&output),
            });
        }

        info!(lp = %combined_output(&output), "Print job sent successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    fn list_printers(&self) -> PrintResult<Vec<String>> {
        let output = self.run(
            Command::new(&self.status_program)
                .arg("-p")
                .env("LC_ALL", "C"),
            &self.status_program,
        )?;
        let text = combined_output(&output);

        if !output.status.success() {
            if text.contains(NO_DESTINATIONS) {
                return Ok(Vec::new());
            }
            return Err(PrintError::SubprocessNonZeroExit {
                program: self.status_program.to_string_lossy().into_owned(),
                status: output.status,
                output: text,
            });
        }

        Ok(parse_lpstat(&text))
    }

    fn backend_name(&self) -> &'static str {
        "cups"
    }
}
