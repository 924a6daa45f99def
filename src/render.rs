//! Invocation of the external typesetting tool.

use crate::console::Console;
use crate::error::RenderError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Number of renderer runs per document; the second run resolves the
/// references recorded by the first.
pub const PASSES: u32 = 2;

/// Trait for turning a document source into a finished document.
#[async_trait]
pub trait Render: Send + Sync {
    /// Renders `source_file`, a file name relative to `dir`.
    async fn render(&self, dir: &Path, source_file: &str) -> Result<(), RenderError>;
}

/// Runs a LaTeX-style command line tool.
pub struct LatexRenderer {
    program: PathBuf,
    console: Console,
}

impl LatexRenderer {
    /// Looks up `command` on PATH.
    pub fn locate(command: &str, console: Console) -> Result<Self, RenderError> {
        let program = which::which(command).map_err(|source| RenderError::NotFound {
            command: command.to_string(),
            source,
        })?;

        Ok(Self { program, console })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Render for LatexRenderer {
    async fn render(&self, dir: &Path, source_file: &str) -> Result<(), RenderError> {
        for pass in 1..=PASSES {
            let status = tokio::process::Command::new(&self.program)
                .arg(source_file)
                .current_dir(dir)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await?;

            if !status.success() {
                self.console.warning(&format!(
                    "{} pass {}/{} on {} exited with {}",
                    self.program.display(),
                    pass,
                    PASSES,
                    source_file,
                    status
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Renderer that only records what it was asked to render.
    #[derive(Default)]
    pub(crate) struct RecordingRenderer {
        pub(crate) calls: Mutex<Vec<(PathBuf, String)>>,
    }

    #[async_trait]
    impl Render for RecordingRenderer {
        async fn render(&self, dir: &Path, source_file: &str) -> Result<(), RenderError> {
            self.calls
                .lock()
                .unwrap()
                .push((dir.to_path_buf(), source_file.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_locate_missing_command() {
        let err = LatexRenderer::locate("definitely-not-a-typesetter-xyz", Console::with_colors(false))
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::NotFound { .. }));
        assert!(err.to_string().contains("definitely-not-a-typesetter-xyz"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_runs_every_pass_in_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake-tex");
        std::fs::write(&script, "#!/bin/sh\necho \"$1\" >> passes.log\nexit 1\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let renderer = LatexRenderer::locate(script.to_str().unwrap(), Console::with_colors(false)).unwrap();
        renderer.render(dir.path(), "Vol1.tex").await.unwrap();

        let log = std::fs::read_to_string(dir.path().join("passes.log")).unwrap();
        assert_eq!(log, "Vol1.tex\nVol1.tex\n");
    }
}
