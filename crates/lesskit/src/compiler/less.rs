use super::{Compiler, CompilerError};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Adapter around the external `lessc` executable.
///
/// Source text is fed on stdin and compiled CSS read from stdout. The child
/// runs in the source file's directory so relative `@import`s resolve next
/// to the source.
pub struct LessCompiler {
    program: String,
}

impl LessCompiler {
    pub fn new() -> Self {
        Self { program: "lessc".to_string() }
    }

    /// Use a different executable than `lessc`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    /// Verify the external compiler is runnable. Call once at startup; a
    /// missing executable is fatal, not recoverable.
    pub fn probe(&self) -> Result<(), CompilerError> {
        match Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(_) => Ok(()),
            Err(e) => Err(CompilerError::MissingCompiler(format!(
                "`{}` is not runnable ({e}); install the less compiler \
                 (`npm install -g less`) or register a custom compiler",
                self.program
            ))),
        }
    }
}

impl Default for LessCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for LessCompiler {
    fn extensions(&self) -> &[&str] {
        &["less", "lss"]
    }

    fn compile(&self, source: &str, path: &Path) -> Result<String, CompilerError> {
        let mut command = Command::new(&self.program);
        command.arg("-").stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = path.parent().filter(|d| d.is_dir()) {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;

        {
            let mut stdin = child.stdin.take().ok_or_else(|| {
                CompilerError::CompileFailed("failed to open compiler stdin".to_string())
            })?;
            // A child that rejects the input may exit before reading all of
            // it; its exit status carries the actual fault
            if let Err(e) = stdin.write_all(source.as_bytes()) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(CompilerError::CompileFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
