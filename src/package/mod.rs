// execdemo/src/package/mod.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Packaging of the web UI build into a publishable folder.
//!
//! Steps, each aborting the run on failure:
//! 1. verify `package/index.js` and `package/index.d.ts` exist;
//! 2. copy the `build/` tree over `package/`;
//! 3. write `package/package.json` holding only the whitelisted manifest fields.

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{ExecError, Result as ExecdemoResult};

pub const MANIFEST_FILE_NAME: &str = "package.json";
pub const ENTRY_JS: &str = "index.js";
pub const ENTRY_DTS: &str = "index.d.ts";
pub const HOMEPAGE: &str = "./";

/// Filesystem locations used by a packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    pub manifest_path: PathBuf,
    pub build_dir: PathBuf,
    pub package_dir: PathBuf,
}

impl PackageLayout {
    /// Standard layout under a project root: `package.json`, `build/`, `package/`.
    pub fn from_root(root: &Path) -> Self {
        Self {
            manifest_path: root.join(MANIFEST_FILE_NAME),
            build_dir: root.join("build"),
            package_dir: root.join("package"),
        }
    }

    pub fn entry_js(&self) -> PathBuf {
        self.package_dir.join(ENTRY_JS)
    }

    pub fn entry_dts(&self) -> PathBuf {
        self.package_dir.join(ENTRY_DTS)
    }

    pub fn output_manifest_path(&self) -> PathBuf {
        self.package_dir.join(MANIFEST_FILE_NAME)
    }
}

/// Published manifest. Field order is the order written to disk.
///
/// Source fields that are absent stay absent; `main`, `typings` and `homepage`
/// are always set.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<Value>,
    pub main: String,
    pub typings: String,
    pub homepage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_config: Option<Value>,
}

/// Outcome of a successful [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackageReport {
    pub files_copied: usize,
    pub manifest_path: PathBuf,
    pub manifest: PackageManifest,
}

/// Keeps the whitelisted fields of a source manifest and forces the entry points.
pub fn filter_manifest(source: &Value) -> ExecdemoResult<PackageManifest> {
    let object = source
        .as_object()
        .ok_or_else(|| ExecError::Manifest("package.json is not a JSON object".to_string()))?;
    let field = |key: &str| object.get(key).cloned();

    Ok(PackageManifest {
        name: field("name"),
        version: field("version"),
        description: field("description"),
        keywords: field("keywords"),
        author: field("author"),
        repository: field("repository"),
        license: field("license"),
        main: ENTRY_JS.to_string(),
        typings: ENTRY_DTS.to_string(),
        homepage: HOMEPAGE.to_string(),
        publish_config: field("publishConfig"),
    })
}

/// Fails with [`ExecError::MissingArtifact`] for the first absent build output.
///
/// Other metadata failures are reported as I/O errors, not as a missing artifact.
pub async fn verify_artifacts(layout: &PackageLayout) -> ExecdemoResult<()> {
    for artifact in [layout.entry_js(), layout.entry_dts()] {
        tracing::info!("Verifying {} exists", artifact.display());
        match fs::metadata(&artifact).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(ExecError::MissingArtifact(artifact)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExecError::MissingArtifact(artifact));
            }
            Err(e) => return Err(ExecError::io_with_path(artifact, e)),
        }
    }
    Ok(())
}

/// Recursively copies `from` into `to`, overwriting files. Returns the number of files copied.
///
/// A missing `from` is created empty first.
pub async fn copy_tree(from: &Path, to: &Path) -> ExecdemoResult<usize> {
    fs::create_dir_all(from)
        .await
        .map_err(|e| ExecError::io_with_path(from, e))?;

    let mut copied = 0;
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];

    while let Some((src_dir, dst_dir)) = pending.pop() {
        fs::create_dir_all(&dst_dir)
            .await
            .map_err(|e| ExecError::io_with_path(&dst_dir, e))?;

        let mut entries = fs::read_dir(&src_dir)
            .await
            .map_err(|e| ExecError::io_with_path(&src_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ExecError::io_with_path(&src_dir, e))?
        {
            let src = entry.path();
            let dst = dst_dir.join(entry.file_name());
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ExecError::io_with_path(&src, e))?;

            if file_type.is_dir() {
                pending.push((src, dst));
            } else {
                fs::copy(&src, &dst)
                    .await
                    .map_err(|e| ExecError::io_with_path(&src, e))?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}

pub async fn read_manifest(path: &Path) -> ExecdemoResult<Value> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|e| ExecError::io_with_path(path, e))?;
    serde_json::from_str(&contents)
        .map_err(|e| ExecError::Manifest(format!("{}: {}", path.display(), e)))
}

/// Writes the manifest as two-space indented JSON with a trailing newline.
pub async fn write_manifest(path: &Path, manifest: &PackageManifest) -> ExecdemoResult<()> {
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    fs::write(path, json)
        .await
        .map_err(|e| ExecError::io_with_path(path, e))
}

/// Runs the whole packaging sequence.
pub async fn run(layout: &PackageLayout) -> ExecdemoResult<PackageReport> {
    verify_artifacts(layout).await?;

    tracing::info!(
        "Copy: {} to {}",
        layout.build_dir.display(),
        layout.package_dir.display()
    );
    let files_copied = copy_tree(&layout.build_dir, &layout.package_dir).await?;

    tracing::info!("Reading package.json from: {}", layout.manifest_path.display());
    let source = read_manifest(&layout.manifest_path).await?;
    let manifest = filter_manifest(&source)?;
    tracing::info!(
        name = %display_field(&manifest.name),
        version = %display_field(&manifest.version),
        "Found manifest"
    );

    let manifest_path = layout.output_manifest_path();
    tracing::info!("Writing new package.json to {}", manifest_path.display());
    write_manifest(&manifest_path, &manifest).await?;

    Ok(PackageReport {
        files_copied,
        manifest_path,
        manifest,
    })
}

fn display_field(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    }
}
