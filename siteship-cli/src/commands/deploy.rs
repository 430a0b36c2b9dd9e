//! `siteship` — reconcile the content directory with the bucket.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use siteship_core::config::{
    DEFAULT_BUCKET, DEFAULT_CONTENT_DIR, DEFAULT_REGION, DEFAULT_WEBSITE_ENDPOINT,
};
use siteship_core::{Credentials, DeployConfig};
use siteship_s3::S3Backend;
use siteship_sync::{synchronize_with, Progress, RunReport, StorageBackend};

/// Deploy settings; every field defaults to the published site.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Directory holding the compiled site.
    #[arg(long, default_value = DEFAULT_CONTENT_DIR)]
    pub content_dir: PathBuf,

    /// Target bucket.
    #[arg(long, default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Bucket region.
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Website endpoint host the bucket is served from.
    #[arg(long, default_value = DEFAULT_WEBSITE_ENDPOINT)]
    pub website_endpoint: String,

    /// API endpoint for S3-compatible stores.
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Print the run report as JSON in place of the closing summary line.
    #[arg(long)]
    pub json: bool,
}

impl DeployArgs {
    pub fn config(&self) -> DeployConfig {
        DeployConfig {
            content_dir: self.content_dir.clone(),
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            website_endpoint: self.website_endpoint.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }

    pub fn run(self) -> Result<()> {
        let config = self.config();
        let credentials = Credentials::from_lookup(|var| std::env::var(var).ok())
            .context("cannot authenticate with the bucket")?;
        let mut backend =
            S3Backend::new(&config, &credentials).context("failed to set up S3 client")?;

        let stdout = io::stdout();
        deploy(&config, &mut backend, self.json, &mut stdout.lock())?;
        Ok(())
    }
}

/// Reconcile `config.content_dir` into `backend`, writing operator output to `out`.
///
/// Phase banners and per-file lines stream as the run advances, so a failed
/// run has already reported everything it completed. The closing summary (or
/// the JSON report when `json` is set) is written only on success.
pub(crate) fn deploy<B, W>(
    config: &DeployConfig,
    backend: &mut B,
    json: bool,
    out: &mut W,
) -> Result<RunReport>
where
    B: StorageBackend + ?Sized,
    W: Write,
{
    let mut write_err: Option<io::Error> = None;
    let result = synchronize_with(&config.content_dir, backend, |progress| {
        if write_err.is_none() {
            if let Err(e) = print_progress(out, progress) {
                write_err = Some(e);
            }
        }
    });
    let report = result.with_context(|| {
        format!(
            "deploy of '{}' to bucket '{}' failed",
            config.content_dir.display(),
            config.bucket
        )
    })?;
    if let Some(e) = write_err {
        return Err(e).context("failed to write progress output");
    }

    if json {
        writeln!(out, "{}", report.to_json_pretty()?)?;
    } else {
        print_summary(out, config, &report)?;
    }
    Ok(report)
}

fn print_progress<W: Write>(out: &mut W, progress: Progress<'_>) -> io::Result<()> {
    match progress {
        Progress::PhaseStarted(phase) => writeln!(out, "{}", phase.banner()),
        Progress::Action(action) => writeln!(out, "{action}"),
    }
}

fn print_summary<W: Write>(
    out: &mut W,
    config: &DeployConfig,
    report: &RunReport,
) -> io::Result<()> {
    let counts = report.counts();
    if report.is_noop() {
        writeln!(
            out,
            "{} '{}' already up to date ({} unchanged)",
            "✓".green(),
            config.bucket,
            counts.unchanged
        )?;
    } else {
        writeln!(
            out,
            "{} '{}' synced ({} added, {} updated, {} unchanged, {} deleted)",
            "✓".green(),
            config.bucket,
            counts.added,
            counts.updated,
            counts.unchanged,
            counts.deleted
        )?;
    }
    writeln!(out, "  {}", config.site_url().dimmed())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use siteship_sync::{MemoryBackend, Operation};
    use tempfile::TempDir;

    use super::*;

    fn site_config(site: &TempDir) -> DeployConfig {
        DeployConfig {
            content_dir: site.path().to_path_buf(),
            ..DeployConfig::default()
        }
    }

    fn lines(out: &[u8]) -> Vec<String> {
        String::from_utf8(out.to_vec())
            .expect("utf8")
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn mixed_run_prints_banners_in_order_with_action_lines() {
        let site = TempDir::new().expect("site");
        fs::write(site.path().join("a.html"), "same").expect("write");
        fs::write(site.path().join("b.css"), "new").expect("write");
        let mut backend = MemoryBackend::new()
            .with_object("a.html", "same")
            .with_object("c.js", "gone");

        let mut out = Vec::new();
        deploy(&site_config(&site), &mut backend, false, &mut out).expect("deploy");
        let lines = lines(&out);

        assert_eq!(
            &lines[..6],
            &[
                "Add missing files",
                "Uploading new b.css",
                "Update changed files",
                "Unchanged a.html",
                "Delete removed files",
                "Deleting removed c.js",
            ]
        );
        assert!(lines[6].contains("1 added"), "summary: {}", lines[6]);
    }

    #[test]
    fn changed_file_line_shows_both_hashes() {
        let site = TempDir::new().expect("site");
        fs::write(site.path().join("a.html"), "v2").expect("write");
        let mut backend = MemoryBackend::new().with_object("a.html", "v1");

        let mut out = Vec::new();
        deploy(&site_config(&site), &mut backend, false, &mut out).expect("deploy");

        let expected = format!(
            "Uploading changed a.html ({} != {})",
            siteship_core::ContentHash::of(b"v1"),
            siteship_core::ContentHash::of(b"v2")
        );
        assert!(lines(&out).contains(&expected), "output: {:?}", lines(&out));
    }

    #[test]
    fn json_mode_keeps_progress_lines_and_replaces_summary() {
        let site = TempDir::new().expect("site");
        fs::write(site.path().join("a.html"), "a").expect("write");
        let mut backend = MemoryBackend::new();

        let mut out = Vec::new();
        deploy(&site_config(&site), &mut backend, true, &mut out).expect("deploy");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.starts_with("Add missing files\nUploading new a.html\n"));
        assert!(text.contains("Delete removed files"));
        assert!(text.contains("\"action\": \"added\""), "output: {text}");
        assert!(!text.contains("synced ("), "summary must be replaced by JSON");
    }

    #[test]
    fn failed_run_has_already_printed_completed_actions() {
        let site = TempDir::new().expect("site");
        fs::write(site.path().join("a.html"), "a").expect("write");
        fs::write(site.path().join("b.css"), "b").expect("write");
        let mut backend = MemoryBackend::new();
        backend.fail_on(Operation::Put, Some("b.css"));

        for json in [false, true] {
            let mut out = Vec::new();
            let mut run_backend = backend.clone();
            let err = deploy(&site_config(&site), &mut run_backend, json, &mut out).unwrap_err();
            assert!(format!("{err:#}").contains("b.css"), "error: {err:#}");
            assert_eq!(
                lines(&out),
                vec!["Add missing files", "Uploading new a.html"],
                "json={json}"
            );
        }
    }
}
