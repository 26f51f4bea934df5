//! PNG export of the current frame.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::ColorType;
use log::info;

use crate::canvas::Canvas;
use crate::error::Result;

/// `xmas-motion-<unix millis>.png`
pub fn screenshot_name(at: SystemTime) -> String {
    let millis = at.duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    format!("xmas-motion-{}.png", millis)
}

/// Write the canvas into `dir` and return the file's path. Creates `dir`
/// if it does not exist yet.
pub fn save_screenshot(canvas: &Canvas, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(screenshot_name(SystemTime::now()));
    image::save_buffer(
        &path,
        &canvas.to_rgba_bytes(),
        canvas.width() as u32,
        canvas.height() as u32,
        ColorType::Rgba8,
    )?;
    info!("screenshot saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snow_field::Color;
    use std::time::Duration;

    #[test]
    fn name_uses_epoch_millis() {
        let at = UNIX_EPOCH + Duration::from_millis(1_703_462_400_123);
        assert_eq!(screenshot_name(at), "xmas-motion-1703462400123.png");
    }

    #[test]
    fn writes_readable_png() {
        let mut canvas = Canvas::new(6, 4);
        canvas.clear(Color::rgb(0x05, 0x1B, 0x11));
        canvas.fill_rect(0, 0, 1, 1, Color::rgb(255, 0, 0));

        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("shots");
        let path = save_screenshot(&canvas, &nested).unwrap();
        assert!(path.starts_with(&nested));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (6, 4));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(5, 3).0, [0x05, 0x1B, 0x11, 255]);
    }
}
