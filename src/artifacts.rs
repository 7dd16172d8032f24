use crate::images::VariantSet;
use anyhow::{Context, Result};
use icns::{IconFamily, IconType};
use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use image::{ImageFormat, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IconFormat {
    Icns,
    Ico,
    Png,
}

impl IconFormat {
    pub fn all() -> &'static [IconFormat] {
        &[Self::Icns, Self::Ico, Self::Png]
    }

    /// Directory name under the output root; also the file extension.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Icns => "icns",
            Self::Ico => "ico",
            Self::Png => "png",
        }
    }

    pub fn extension(self) -> &'static str {
        self.dir_name()
    }

    pub fn required_widths(self) -> &'static [u32] {
        match self {
            Self::Icns => &[1024, 512, 256, 128, 64, 32, 16],
            Self::Ico => &[256, 48, 32, 16],
            Self::Png => &[256],
        }
    }

    pub fn artifact_path(self, output_dir: &Path, name: &str) -> PathBuf {
        output_dir
            .join(self.dir_name())
            .join(format!("{}.{}", name, self.extension()))
    }
}

impl std::fmt::Display for IconFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

fn icns_type(width: u32) -> Option<IconType> {
    match width {
        16 => Some(IconType::RGBA32_16x16),
        32 => Some(IconType::RGBA32_32x32),
        64 => Some(IconType::RGBA32_64x64),
        128 => Some(IconType::RGBA32_128x128),
        256 => Some(IconType::RGBA32_256x256),
        512 => Some(IconType::RGBA32_512x512),
        1024 => Some(IconType::RGBA32_512x512_2x),
        _ => None,
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn finish(mut out: BufWriter<File>, path: &Path) -> Result<()> {
    out.flush()
        .with_context(|| format!("unable to write {}", path.display()))
}

fn encode_icns(images: &[&RgbaImage], path: &Path) -> Result<()> {
    let mut family = IconFamily::new();
    for img in images {
        let Some(icon_type) = icns_type(img.width()) else {
            log::warn!("no ICNS slot for {}px, skipping", img.width());
            continue;
        };
        let icns_img = icns::Image::from_data(
            icns::PixelFormat::RGBA,
            img.width(),
            img.height(),
            img.as_raw().clone(),
        )
        .with_context(|| format!("unable to prepare {}px ICNS image", img.width()))?;
        family
            .add_icon_with_type(&icns_img, icon_type)
            .with_context(|| format!("unable to encode {}px into {}", img.width(), path.display()))?;
    }
    let mut out = create(path)?;
    family
        .write(&mut out)
        .with_context(|| format!("unable to write {}", path.display()))?;
    finish(out, path)
}

fn encode_ico(images: &[&RgbaImage], path: &Path) -> Result<()> {
    let mut icon_dir = IconDir::new(ResourceType::Icon);
    for img in images {
        let icon_image = IconImage::from_rgba_data(img.width(), img.height(), img.as_raw().clone());
        let entry = IconDirEntry::encode(&icon_image)
            .with_context(|| format!("unable to encode {}px into {}", img.width(), path.display()))?;
        icon_dir.add_entry(entry);
    }
    let mut out = create(path)?;
    icon_dir
        .write(&mut out)
        .with_context(|| format!("unable to write {}", path.display()))?;
    finish(out, path)
}

pub fn write_png(img: &RgbaImage, path: &Path) -> Result<()> {
    let mut out = create(path)?;
    img.write_to(&mut out, ImageFormat::Png)
        .with_context(|| format!("unable to encode {}", path.display()))?;
    finish(out, path)
}

/// Writes `name` in one container format. Required widths missing from
/// `variants` are left out of the container. Returns false when nothing
/// was written, which only happens for a plain PNG without its 256px
/// variant.
pub fn write_artifact(
    output_dir: &Path,
    format: IconFormat,
    name: &str,
    variants: &VariantSet,
) -> Result<bool> {
    let path = format.artifact_path(output_dir, name);
    let selected = variants.select(format.required_widths());
    if selected.len() < format.required_widths().len() {
        log::warn!(
            "{}: {} of {} sizes available",
            path.display(),
            selected.len(),
            format.required_widths().len()
        );
    }
    match format {
        IconFormat::Icns => encode_icns(&selected, &path)?,
        IconFormat::Ico => encode_ico(&selected, &path)?,
        IconFormat::Png => match selected.first() {
            Some(img) => write_png(img, &path)?,
            None => return Ok(false),
        },
    }
    log::debug!("wrote {}", path.display());
    Ok(true)
}

/// Writes `name` in every format and returns how many files were skipped
/// for lack of sizes.
pub fn write_icon_set(output_dir: &Path, name: &str, variants: &VariantSet) -> Result<usize> {
    let mut skipped = 0;
    for &format in IconFormat::all() {
        if !write_artifact(output_dir, format, name, variants)? {
            log::warn!("{} {} not written: no {}px variant", name, format, format.required_widths()[0]);
            skipped += 1;
        }
    }
    log::info!("icon set {} written", name);
    Ok(skipped)
}

/// Writes `<name>.png` at `base` pixels and `<name>@2x.png` at twice that.
pub fn write_resources(dir: &Path, name: &str, variants: &VariantSet, base: u32) -> Result<()> {
    for (width, file_name) in [
        (base, format!("{}.png", name)),
        (base * 2, format!("{}@2x.png", name)),
    ] {
        match variants.get(width) {
            Some(img) => write_png(img, &dir.join(file_name))?,
            None => log::warn!("{}: no {}px variant for {}", dir.display(), width, file_name),
        }
    }
    Ok(())
}

pub fn write_app_resources(dir: &Path, variants: &VariantSet) -> Result<()> {
    for img in variants.iter() {
        write_png(img, &dir.join(format!("app_{}.png", img.width())))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::create_variants;
    use image::Rgba;
    use std::fs;

    fn output_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for &format in IconFormat::all() {
            fs::create_dir_all(dir.path().join(format.dir_name())).unwrap();
        }
        dir
    }

    fn variants(widths: &[u32]) -> VariantSet {
        VariantSet::new(
            widths
                .iter()
                .map(|&w| RgbaImage::from_pixel(w, w, Rgba([40, 80, 120, 255])))
                .collect(),
        )
    }

    #[test]
    fn full_set_writes_one_file_per_format() {
        let dir = output_dir();
        let set = create_variants(&RgbaImage::from_pixel(64, 64, Rgba([1, 2, 3, 255])));
        assert_eq!(write_icon_set(dir.path(), "app", &set).unwrap(), 0);

        for &format in IconFormat::all() {
            let entries: Vec<_> = fs::read_dir(dir.path().join(format.dir_name()))
                .unwrap()
                .map(|e| e.unwrap().file_name().into_string().unwrap())
                .collect();
            assert_eq!(entries, vec![format!("app.{}", format.extension())]);
        }

        let png = image::open(dir.path().join("png/app.png")).unwrap();
        assert_eq!((png.width(), png.height()), (256, 256));
    }

    #[test]
    fn full_set_containers_hold_every_required_size() {
        let dir = output_dir();
        let set = create_variants(&RgbaImage::from_pixel(300, 120, Rgba([9, 90, 180, 255])));
        write_icon_set(dir.path(), "app", &set).unwrap();

        let family = IconFamily::read(File::open(dir.path().join("icns/app.icns")).unwrap()).unwrap();
        let mut types = family.available_icons();
        types.sort_by_key(|t| t.pixel_width());
        let widths: Vec<u32> = types.iter().map(|t| t.pixel_width()).collect();
        assert_eq!(widths, vec![16, 32, 64, 128, 256, 512, 1024]);
        assert!(types.contains(&IconType::RGBA32_512x512_2x));
        assert!(types.contains(&IconType::RGBA32_64x64));

        let icon_dir = IconDir::read(File::open(dir.path().join("ico/app.ico")).unwrap()).unwrap();
        let mut widths: Vec<u32> = icon_dir.entries().iter().map(|e| e.width()).collect();
        widths.sort();
        assert_eq!(widths, vec![16, 32, 48, 256]);
    }

    #[test]
    fn icon_set_reports_skipped_png() {
        let dir = output_dir();
        let skipped = write_icon_set(dir.path(), "small", &variants(&[128, 32, 16])).unwrap();
        assert_eq!(skipped, 1);
        assert!(dir.path().join("icns/small.icns").exists());
        assert!(dir.path().join("ico/small.ico").exists());
        assert!(!dir.path().join("png/small.png").exists());
    }

    #[test]
    fn ico_holds_only_available_sizes() {
        let dir = output_dir();
        let set = variants(&[256, 32]);
        assert!(write_artifact(dir.path(), IconFormat::Ico, "partial", &set).unwrap());

        let file = File::open(dir.path().join("ico/partial.ico")).unwrap();
        let icon_dir = IconDir::read(file).unwrap();
        let mut widths: Vec<u32> = icon_dir.entries().iter().map(|e| e.width()).collect();
        widths.sort();
        assert_eq!(widths, vec![32, 256]);
    }

    #[test]
    fn icns_holds_only_available_sizes() {
        let dir = output_dir();
        let set = variants(&[128, 48, 16]);
        assert!(write_artifact(dir.path(), IconFormat::Icns, "partial", &set).unwrap());

        let file = File::open(dir.path().join("icns/partial.icns")).unwrap();
        let family = IconFamily::read(file).unwrap();
        let mut types = family.available_icons();
        types.sort_by_key(|t| t.pixel_width());
        assert_eq!(types, vec![IconType::RGBA32_16x16, IconType::RGBA32_128x128]);
    }

    #[test]
    fn png_without_256_is_skipped() {
        let dir = output_dir();
        let set = variants(&[128, 64]);
        assert!(!write_artifact(dir.path(), IconFormat::Png, "small", &set).unwrap());
        assert!(!dir.path().join("png/small.png").exists());
    }

    #[test]
    fn resources_at_one_and_two_x() {
        let dir = tempfile::tempdir().unwrap();
        write_resources(dir.path(), "eqp_marker", &variants(&[128, 64]), 64).unwrap();

        let one = image::open(dir.path().join("eqp_marker.png")).unwrap();
        let two = image::open(dir.path().join("eqp_marker@2x.png")).unwrap();
        assert_eq!(one.width(), 64);
        assert_eq!(two.width(), 128);
    }

    #[test]
    fn resources_tolerate_missing_double() {
        let dir = tempfile::tempdir().unwrap();
        write_resources(dir.path(), "lone", &variants(&[16]), 16).unwrap();
        assert!(dir.path().join("lone.png").exists());
        assert!(!dir.path().join("lone@2x.png").exists());
    }

    #[test]
    fn write_into_missing_directory_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_artifact(dir.path(), IconFormat::Ico, "app", &variants(&[16])).unwrap_err();
        assert!(format!("{:#}", err).contains("app.ico"));
    }
}
