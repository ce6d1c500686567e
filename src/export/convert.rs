use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::ExportFormat;
use crate::error::TernaryError;

/// Executable names tried on `PATH`.
const CONVERTER_NAMES: &[&str] = if cfg!(windows) {
    &["rsvg-convert.exe"]
} else {
    &["rsvg-convert"]
};

/// Converts an SVG document to another file format.
pub trait SvgConverter {
    fn convert(&self, svg: &[u8], format: ExportFormat) -> Result<Vec<u8>, TernaryError>;
}

/// Pipes SVG through librsvg's `rsvg-convert`.
#[derive(Debug, Clone, Default)]
pub struct ExternalConverter {
    /// Explicit executable; `PATH` is searched when unset.
    pub program: Option<PathBuf>,
}

impl ExternalConverter {
    pub fn new(program: Option<PathBuf>) -> Self {
        Self { program }
    }

    /// Resolve the executable to run.
    pub fn locate(&self) -> Result<PathBuf, TernaryError> {
        match &self.program {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(path) => Err(TernaryError::ExternalToolMissing {
                program: path.display().to_string(),
            }),
            None => find_on_path(CONVERTER_NAMES).ok_or_else(|| TernaryError::ExternalToolMissing {
                program: CONVERTER_NAMES[0].to_string(),
            }),
        }
    }
}

/// First `names` entry found in a `PATH` directory.
pub fn find_on_path(names: &[&str]) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

impl SvgConverter for ExternalConverter {
    fn convert(&self, svg: &[u8], format: ExportFormat) -> Result<Vec<u8>, TernaryError> {
        let program = self.locate()?;
        log::debug!("converting svg to {} with {}", format.extension(), program.display());
        run_converter(&program, svg, format)
    }
}

fn run_converter(program: &Path, svg: &[u8], format: ExportFormat) -> Result<Vec<u8>, TernaryError> {
    let name = program.display().to_string();
    let failure = |detail: String| TernaryError::ExternalToolFailure {
        program: name.clone(),
        detail,
    };

    let mut child = Command::new(program)
        .args(["--format", format.extension()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TernaryError::ExternalToolMissing {
                program: name.clone(),
            },
            _ => failure(format!("failed to start: {e}")),
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| failure("failed to open stdin".to_string()))?;

    // Feed stdin from a helper thread so a large output cannot fill the
    // stdout pipe while we are still writing.
    let (written, output) = std::thread::scope(|scope| {
        let writer = scope.spawn(move || stdin.write_all(svg));
        let output = child.wait_with_output();
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
        (written, output)
    });

    let output = output.map_err(|e| failure(format!("failed to wait: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(failure(format!("{} {stderr}", output.status).trim().to_string()));
    }
    written.map_err(|e| failure(format!("writing svg to stdin: {e}")))?;
    if output.stdout.is_empty() {
        return Err(failure("produced no output".to_string()));
    }
    Ok(output.stdout)
}
