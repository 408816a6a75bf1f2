//! Workspace bundles: a zip holding `manifest.json` and the SQLite file.
//!
//! Kept free of crate-internal imports so integration tests can mount it
//! with `#[path]`.

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/homework.sqlite3";
const DB_FILE: &str = "homework.sqlite3";
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

pub const BUNDLE_FORMAT_V1: &str = "homework-workspace-v1";
pub const RAW_SQLITE_FORMAT: &str = "raw-sqlite3";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    version: u32,
    #[serde(default)]
    app_version: String,
    #[serde(default)]
    exported_at: String,
    db_sha256: String,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
}

enum InputKind {
    Bundle,
    RawSqlite,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn export_workspace_bundle(
    workspace_path: &Path,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    let db_path = workspace_path.join(DB_FILE);
    let payload = std::fs::read(&db_path)
        .with_context(|| format!("workspace database unreadable: {}", db_path.display()))?;

    let manifest = Manifest {
        format: BUNDLE_FORMAT_V1.to_string(),
        version: 1,
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        db_sha256: sha256_hex(&payload),
    };
    let manifest_json =
        serde_json::to_vec_pretty(&manifest).context("failed to serialize manifest")?;

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let out_file = File::create(out_path)
        .with_context(|| format!("cannot create bundle {}", out_path.display()))?;

    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in [(MANIFEST_ENTRY, &manifest_json), (DB_ENTRY, &payload)] {
        zip.start_file(name, opts)
            .with_context(|| format!("cannot start bundle entry {}", name))?;
        zip.write_all(bytes)
            .with_context(|| format!("cannot write bundle entry {}", name))?;
    }
    zip.finish().context("cannot finalize bundle")?;

    Ok(ExportSummary {
        bundle_format: manifest.format,
        entry_count: 2,
        sha256: manifest.db_sha256,
    })
}

/// Restores a bundle, or a bare SQLite file, into `workspace_path`.
///
/// A bundle's payload must match the checksum in its manifest. The existing
/// database is only replaced once the new one is fully written.
pub fn import_workspace_bundle(
    in_path: &Path,
    workspace_path: &Path,
) -> anyhow::Result<ImportSummary> {
    let (payload, format) = match sniff(in_path)? {
        InputKind::RawSqlite => {
            let bytes = std::fs::read(in_path)
                .with_context(|| format!("cannot read {}", in_path.display()))?;
            (bytes, RAW_SQLITE_FORMAT)
        }
        InputKind::Bundle => (read_bundle_payload(in_path)?, BUNDLE_FORMAT_V1),
    };

    std::fs::create_dir_all(workspace_path)
        .with_context(|| format!("cannot create workspace {}", workspace_path.display()))?;
    replace_database(&workspace_path.join(DB_FILE), &payload)?;

    Ok(ImportSummary {
        bundle_format_detected: format.to_string(),
    })
}

fn sniff(path: &Path) -> anyhow::Result<InputKind> {
    let mut f = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut head = [0u8; 16];
    let mut filled = 0;
    while filled < head.len() {
        let n = f
            .read(&mut head[filled..])
            .with_context(|| format!("cannot read {}", path.display()))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled >= ZIP_MAGIC.len() && head[..ZIP_MAGIC.len()] == ZIP_MAGIC {
        return Ok(InputKind::Bundle);
    }
    if filled == SQLITE_MAGIC.len() && &head == SQLITE_MAGIC {
        return Ok(InputKind::RawSqlite);
    }
    bail!("{} is neither a workspace bundle nor a SQLite file", path.display())
}

fn read_bundle_payload(path: &Path) -> anyhow::Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut archive = ZipArchive::new(file).context("bundle is not a valid zip archive")?;

    let manifest: Manifest = {
        let entry = archive
            .by_name(MANIFEST_ENTRY)
            .context("bundle has no manifest.json")?;
        serde_json::from_reader(entry).context("manifest.json is malformed")?
    };
    if manifest.format != BUNDLE_FORMAT_V1 {
        bail!("unsupported bundle format: {}", manifest.format);
    }

    let mut payload = Vec::new();
    archive
        .by_name(DB_ENTRY)
        .with_context(|| format!("bundle has no {}", DB_ENTRY))?
        .read_to_end(&mut payload)
        .context("cannot extract database from bundle")?;

    let actual = sha256_hex(&payload);
    if actual != manifest.db_sha256 {
        return Err(anyhow!(
            "database checksum mismatch: manifest {}, payload {}",
            manifest.db_sha256,
            actual
        ));
    }
    Ok(payload)
}

fn replace_database(dst: &Path, payload: &[u8]) -> anyhow::Result<()> {
    let staging = dst.with_extension("sqlite3.importing");
    {
        let mut out = File::create(&staging)
            .with_context(|| format!("cannot create {}", staging.display()))?;
        out.write_all(payload)
            .and_then(|_| out.sync_all())
            .with_context(|| format!("cannot write {}", staging.display()))?;
    }
    if let Err(e) = std::fs::rename(&staging, dst) {
        let _ = std::fs::remove_file(&staging);
        return Err(e)
            .with_context(|| format!("cannot move restored database to {}", dst.display()));
    }
    Ok(())
}
