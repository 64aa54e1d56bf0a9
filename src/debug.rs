use anyhow::Result;
use image::{GrayImage, RgbImage};
use std::path::{Path, PathBuf};

/// Where intermediate images are written when debug output is on.
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// The directory must be empty or non-existent; it is created if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }

    /// `<dir>/<stage>/<index:02>.png`, creating the stage directory.
    pub fn image_path(&self, stage: &str, index: usize) -> Result<PathBuf> {
        let stage_dir = self.output_dir.join(stage);
        std::fs::create_dir_all(&stage_dir)?;
        Ok(stage_dir.join(format!("{:02}.png", index)))
    }

    pub fn save_gray(&self, stage: &str, index: usize, image: &GrayImage) -> Result<()> {
        let path = self.image_path(stage, index)?;
        save_nonempty(image.width(), image.height(), &path, || image.save(&path))
    }

    pub fn save_rgb(&self, stage: &str, index: usize, image: &RgbImage) -> Result<()> {
        let path = self.image_path(stage, index)?;
        save_nonempty(image.width(), image.height(), &path, || image.save(&path))
    }
}

// PNG cannot hold a zero-sized image; those are skipped.
fn save_nonempty(
    width: u32,
    height: u32,
    path: &Path,
    save: impl FnOnce() -> image::ImageResult<()>,
) -> Result<()> {
    if width == 0 || height == 0 {
        return Ok(());
    }
    save().map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", path.display(), e))?;
    log::debug!("saved {}", path.display());
    Ok(())
}
