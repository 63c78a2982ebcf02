use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::error::{ManimalError, ManimalResult};

/// Container extension of every rendered clip.
pub const VIDEO_EXT: &str = "mp4";

/// Directory the renderer writes its own output tree into, under its working directory.
pub const RENDERER_MEDIA_DIR: &str = "media";

/// Renderer quality preset.
///
/// Each preset pairs the command-line flag with the directory tag the renderer files its output
/// under; both must change together when the engine changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Quality {
    /// 854x480 @ 15fps, the fast preview preset.
    #[default]
    Low,
    Medium,
    High,
    Production,
    FourK,
}

impl Quality {
    pub fn flag(self) -> &'static str {
        match self {
            Quality::Low => "-ql",
            Quality::Medium => "-qm",
            Quality::High => "-qh",
            Quality::Production => "-qp",
            Quality::FourK => "-qk",
        }
    }

    pub fn dir_tag(self) -> &'static str {
        match self {
            Quality::Low => "480p15",
            Quality::Medium => "720p30",
            Quality::High => "1080p60",
            Quality::Production => "1440p60",
            Quality::FourK => "2160p60",
        }
    }
}

/// One clip to render.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    pub topic: String,
    /// Source file name as it appears in the catalog.
    pub file: String,
    pub entry: String,
    /// Absolute path of the source file handed to the renderer.
    pub source: PathBuf,
    /// Working directory of the renderer process.
    pub work_dir: PathBuf,
}

impl RenderRequest {
    /// `<entry>.mp4`
    pub fn output_file_name(&self) -> String {
        clip_file_name(&self.entry)
    }

    /// Source file name without its final extension.
    pub fn file_stem(&self) -> &str {
        self.file
            .rsplit_once('.')
            .map_or(self.file.as_str(), |(stem, _)| stem)
    }
}

pub fn clip_file_name(entry: &str) -> String {
    format!("{entry}.{VIDEO_EXT}")
}

/// External rendering engine seam.
///
/// `render` blocks until the engine is done. A successful return only means the engine reported
/// success; callers locate the clip through [`Renderer::expected_output`] and treat its absence
/// as a failure.
pub trait Renderer {
    fn render(&mut self, req: &RenderRequest) -> ManimalResult<()>;

    /// Where the engine leaves the clip for `req` once `render` returns.
    fn expected_output(&self, req: &RenderRequest) -> PathBuf;
}

#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Program name or path of the renderer executable.
    pub program: PathBuf,
    pub quality: Quality,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("manim"),
            quality: Quality::Low,
        }
    }
}

/// Renders by spawning the `manim` command line once per clip.
#[derive(Clone, Debug, Default)]
pub struct ManimRenderer {
    cfg: RendererConfig,
}

impl ManimRenderer {
    pub fn new(cfg: RendererConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.cfg
    }

    pub fn command(&self, req: &RenderRequest) -> Command {
        let mut cmd = Command::new(&self.cfg.program);
        cmd.arg(self.cfg.quality.flag())
            .arg("--output_file")
            .arg(req.output_file_name())
            .arg(&req.source)
            .arg(&req.entry)
            .current_dir(&req.work_dir)
            .stdin(Stdio::null());
        cmd
    }

    /// Run `<program> --version` and return its first line of output.
    pub fn probe(&self) -> ManimalResult<String> {
        let output = Command::new(&self.cfg.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ManimalError::render(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.cfg.program.display()
                ))
            })?;

        if !output.status.success() {
            return Err(ManimalError::render(format!(
                "'{} --version' exited with status {}: {}",
                self.cfg.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }
}

impl Renderer for ManimRenderer {
    fn render(&mut self, req: &RenderRequest) -> ManimalResult<()> {
        let output = self.command(req).output().map_err(|e| {
            ManimalError::render(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                self.cfg.program.display()
            ))
        })?;

        tracing::debug!(
            entry = %req.entry,
            status = %output.status,
            stdout_bytes = output.stdout.len(),
            "renderer finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ManimalError::render(format!(
                "{} exited with status {}: {}",
                self.cfg.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn expected_output(&self, req: &RenderRequest) -> PathBuf {
        manim_output_path(&req.work_dir, req, self.cfg.quality)
    }
}

/// `<root>/media/videos/<topic>/<file-stem>/<quality-tag>/<entry>.mp4`
pub fn manim_output_path(root: &Path, req: &RenderRequest, quality: Quality) -> PathBuf {
    root.join(RENDERER_MEDIA_DIR)
        .join("videos")
        .join(&req.topic)
        .join(req.file_stem())
        .join(quality.dir_tag())
        .join(req.output_file_name())
}

#[cfg(test)]
#[path = "../tests/unit/render.rs"]
mod tests;
