use anyhow::{anyhow, Context};
use image::{GrayImage, RgbImage};
use std::path::Path;

fn open_checked(path: &Path) -> crate::Result<image::DynamicImage> {
    if !path.exists() {
        return Err(anyhow!("Image file does not exist: {}", path.display()));
    }
    image::open(path).with_context(|| format!("Failed to decode image {}", path.display()))
}

/// Load a binary edge image as single-channel 8-bit.
pub fn load_edge_image<P: AsRef<Path>>(path: P) -> crate::Result<GrayImage> {
    Ok(open_checked(path.as_ref())?.to_luma8())
}

/// Load a template marker image as 3-channel 8-bit.
pub fn load_marker_image<P: AsRef<Path>>(path: P) -> crate::Result<RgbImage> {
    Ok(open_checked(path.as_ref())?.to_rgb8())
}

pub fn validate_image_size(dimensions: (u32, u32), min_size: u32) -> crate::Result<()> {
    let (width, height) = dimensions;
    if width < min_size || height < min_size {
        return Err(anyhow!(
            "Image too small: {}x{}, minimum: {}x{}",
            width,
            height,
            min_size,
            min_size
        ));
    }
    Ok(())
}
