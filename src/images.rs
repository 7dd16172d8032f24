use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::Path;

/// Target sizes for every icon set, largest first.
pub const SIZES: [u32; 8] = [1024, 512, 256, 128, 64, 48, 32, 16];

pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("unable to load image {}", path.display()))?;
    Ok(img.into_rgba8())
}

/// Draws the images on top of each other, each one centred on a canvas
/// as large as the widest and tallest input.
pub fn stack(images: &[&RgbaImage]) -> RgbaImage {
    let width = images.iter().map(|img| img.width()).max().unwrap_or(0);
    let height = images.iter().map(|img| img.height()).max().unwrap_or(0);
    let mut canvas = RgbaImage::new(width, height);
    for img in images {
        let x = (width - img.width()) / 2;
        let y = (height - img.height()) / 2;
        imageops::overlay(&mut canvas, *img, x as i64, y as i64);
    }
    canvas
}

/// Fits `src` inside a `width` x `height` box without distorting it. Any
/// leftover area stays transparent.
pub fn scale(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    assert!(
        width > 0 && height > 0,
        "target size must be positive, got {}x{}",
        width,
        height
    );
    if src.width() == width && src.height() == height {
        return src.clone();
    }
    let mut canvas = RgbaImage::new(width, height);
    if src.width() == 0 || src.height() == 0 {
        return canvas;
    }

    let ratio = f64::min(
        width as f64 / src.width() as f64,
        height as f64 / src.height() as f64,
    );
    let fit_w = ((src.width() as f64 * ratio).round() as u32).clamp(1, width);
    let fit_h = ((src.height() as f64 * ratio).round() as u32).clamp(1, height);
    let resized = imageops::resize(src, fit_w, fit_h, FilterType::Lanczos3);

    let x = (width - fit_w) / 2;
    let y = (height - fit_h) / 2;
    imageops::replace(&mut canvas, &resized, x as i64, y as i64);
    canvas
}

pub fn scale_to(src: &RgbaImage, sizes: &[(u32, u32)]) -> Vec<RgbaImage> {
    sizes.iter().map(|&(w, h)| scale(src, w, h)).collect()
}

/// Resampled bitmaps of one source, unique by width.
#[derive(Debug, Clone, Default)]
pub struct VariantSet {
    images: Vec<RgbaImage>,
}

impl VariantSet {
    pub fn new(images: Vec<RgbaImage>) -> Self {
        let mut unique: Vec<RgbaImage> = Vec::with_capacity(images.len());
        for img in images {
            if unique.iter().any(|kept| kept.width() == img.width()) {
                log::warn!("dropping duplicate {}px variant", img.width());
                continue;
            }
            unique.push(img);
        }
        Self { images: unique }
    }

    pub fn get(&self, width: u32) -> Option<&RgbaImage> {
        self.images.iter().find(|img| img.width() == width)
    }

    /// Variants matching `widths`, in that order. Widths with no variant
    /// are left out.
    pub fn select(&self, widths: &[u32]) -> Vec<&RgbaImage> {
        widths.iter().filter_map(|&w| self.get(w)).collect()
    }

    pub fn widths(&self) -> Vec<u32> {
        self.images.iter().map(|img| img.width()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RgbaImage> {
        self.images.iter()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

pub fn create_variants(src: &RgbaImage) -> VariantSet {
    let sizes: Vec<(u32, u32)> = SIZES.iter().map(|&s| (s, s)).collect();
    VariantSet::new(scale_to(src, &sizes))
}
