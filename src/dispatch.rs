use crate::artifacts::{self, IconFormat};
use crate::association::{self, Platform, ASSOCIATIONS_DIR};
use crate::config::Config;
use crate::images;
use anyhow::{Context, Result};
use image::RgbaImage;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

const APP_NAME: &str = "app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    App,
    Document(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub icon_sets: usize,
    pub descriptors: usize,
    /// Icon files left out because their required size was missing.
    pub skipped_files: usize,
}

/// Type codes for every `*.png` glyph in `dir`, sorted.
pub fn discover_types(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("unable to list {}", dir.display()))?;
    let mut list = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("unable to list {}", dir.display()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("png") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            list.push(stem.to_string());
        }
    }
    list.sort();
    Ok(list)
}

fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("unable to remove {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("unable to create {}", dir.display()))
}

/// Wipes and recreates every generated directory so no stale artifact
/// survives a run.
pub fn prepare_output(config: &Config) -> Result<()> {
    for format in IconFormat::all() {
        recreate_dir(&config.output_dir.join(format.dir_name()))?;
    }
    let associations = config.output_dir.join(ASSOCIATIONS_DIR);
    recreate_dir(&associations)?;
    for platform in Platform::all() {
        let dir = associations.join(platform.dir_name());
        fs::create_dir_all(&dir).with_context(|| format!("unable to create {}", dir.display()))?;
    }
    if let Some(resources) = &config.resources_dir {
        fs::create_dir_all(resources)
            .with_context(|| format!("unable to create {}", resources.display()))?;
    }
    Ok(())
}

fn process_app(config: &Config) -> Result<RunSummary> {
    let img = images::load_image(&config.app_image())?;
    let variants = images::create_variants(&img);
    let skipped_files = artifacts::write_icon_set(&config.output_dir, APP_NAME, &variants)?;
    if let Some(resources) = &config.resources_dir {
        artifacts::write_app_resources(resources, &variants)?;
    }
    Ok(RunSummary { icon_sets: 1, descriptors: 0, skipped_files })
}

fn process_document(config: &Config, code: &str, doc_frame: &RgbaImage) -> Result<RunSummary> {
    let glyph = images::load_image(&config.types_dir().join(format!("{}.png", code)))?;
    let variants = images::create_variants(&images::stack(&[doc_frame, &glyph]));
    let skipped_files = artifacts::write_icon_set(&config.output_dir, &format!("{}_doc", code), &variants)?;

    for &platform in Platform::all() {
        association::write_descriptor(&config.output_dir, code, platform, &config.vendor)?;
    }

    if let Some(resources) = &config.resources_dir {
        artifacts::write_resources(resources, &format!("{}_file", code), &variants, 16)?;
        let markers = images::VariantSet::new(images::scale_to(&glyph, &[(128, 128), (64, 64)]));
        artifacts::write_resources(resources, &format!("{}_marker", code), &markers, 64)?;
    }

    Ok(RunSummary {
        icon_sets: 1,
        descriptors: Platform::all().len(),
        skipped_files,
    })
}

fn run_job(config: &Config, job: &Job, doc_frame: Option<&RgbaImage>) -> Result<RunSummary> {
    match job {
        Job::App => process_app(config).context("application icon failed"),
        Job::Document(code) => {
            let frame = doc_frame.context("document frame was not loaded")?;
            process_document(config, code, frame)
                .with_context(|| format!("document type {} failed", code))
        }
    }
}

pub fn jobs(types: &[String]) -> Vec<Job> {
    let mut list = Vec::with_capacity(types.len() + 1);
    list.push(Job::App);
    list.extend(types.iter().cloned().map(Job::Document));
    list
}

/// Regenerates every artifact. Returns on the first failing job; whatever
/// was already written stays on disk until the next run wipes it.
pub fn run(config: &Config) -> Result<RunSummary> {
    let types = discover_types(&config.types_dir())?;
    log::info!("found {} document types in {}", types.len(), config.types_dir().display());
    let doc_frame = if types.is_empty() {
        None
    } else {
        Some(images::load_image(&config.doc_frame_image())?)
    };

    prepare_output(config)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("iconbake-{}", i))
        .build()
        .context("unable to start worker pool")?;

    let jobs = jobs(&types);
    let summaries = pool.install(|| {
        jobs.par_iter()
            .map(|job| run_job(config, job, doc_frame.as_ref()))
            .collect::<Result<Vec<_>>>()
    })?;

    let summary = summaries.into_iter().fold(RunSummary::default(), |acc, s| RunSummary {
        icon_sets: acc.icon_sets + s.icon_sets,
        descriptors: acc.descriptors + s.descriptors,
        skipped_files: acc.skipped_files + s.skipped_files,
    });
    log::info!(
        "wrote {} icon sets and {} association descriptors",
        summary.icon_sets,
        summary.descriptors
    );
    if summary.skipped_files > 0 {
        log::warn!("{} icon files skipped for missing sizes", summary.skipped_files);
    }
    Ok(summary)
}
