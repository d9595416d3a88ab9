//! Component B: content-addressed, compressed range bundles on disk.

use {
    chain_types::{range_bounds, BlockNumber, RangeNumber},
    state_diff::Bundle,
    std::path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Any decompress/parse failure, including an empty file, is reported as
    /// corrupt so the caller re-stages rather than propagating the error
    /// (spec §4.B).
    #[error("bundle artifact at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Persists and retrieves range bundles as `{firstBlock}_{lastBlock}.bundle`
/// files, zstd-compressed. Any number of concurrent readers; writes to a
/// given range are serialized by the caller (single producer, per spec
/// §4.B's concurrency note).
pub struct RangeStore {
    data_dir: PathBuf,
    /// Spec §6's `compression_enabled` option. Reads never depend on this —
    /// they sniff the zstd magic bytes — so toggling it never strands
    /// previously-written artifacts as unreadable.
    compress: bool,
}

impl RangeStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            compress: true,
        }
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn bundle_path(&self, range: RangeNumber, range_size: u64) -> PathBuf {
        let (first, last) = range_bounds(range, range_size);
        self.data_dir.join(format!("{first}_{last}.bundle"))
    }

    /// Legacy per-block artifact path, accepted on read (spec §4.B).
    pub fn legacy_block_path(&self, block: BlockNumber, compressed: bool) -> PathBuf {
        if compressed {
            self.data_dir.join(format!("{block}.json.zst"))
        } else {
            self.data_dir.join(format!("{block}.json"))
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub async fn exists(&self, range: RangeNumber, range_size: u64) -> bool {
        self.read(range, range_size).await.is_ok()
    }

    pub async fn read(&self, range: RangeNumber, range_size: u64) -> Result<Bundle, StoreError> {
        let path = self.bundle_path(range, range_size);
        read_bundle_file(&path).await
    }

    pub async fn write(
        &self,
        range: RangeNumber,
        range_size: u64,
        bundle: &Bundle,
    ) -> Result<(), StoreError> {
        let path = self.bundle_path(range, range_size);
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.data_dir.clone(),
                source,
            })?;
        let json = serde_json::to_vec(bundle).map_err(|err| StoreError::Corrupt {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        let compressed = if self.compress {
            let path = path.clone();
            tokio::task::spawn_blocking(move || zstd::encode_all(json.as_slice(), 0))
                .await
                .map_err(|err| StoreError::Corrupt {
                    path,
                    reason: err.to_string(),
                })?
                .map_err(|source| StoreError::Io {
                    path: self.data_dir.clone(),
                    source,
                })?
        } else {
            json
        };
        // Write to a temp file then rename so a crash mid-write never leaves
        // a partial bundle that `read` would have to treat as corrupt.
        let tmp_path = path.with_extension("bundle.tmp");
        tokio::fs::write(&tmp_path, &compressed)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|source| StoreError::Io { path, source })?;
        Ok(())
    }
}

/// Reads and decompresses a bundle file, accepting either the current
/// `.bundle` zstd framing or a legacy `{B}.json[.zst]` single-block
/// artifact (wrapped as a one-element bundle).
pub(crate) async fn read_bundle_file(path: &Path) -> Result<Bundle, StoreError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if bytes.is_empty() {
        return Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: "empty file".into(),
        });
    }

    // Sniff the zstd frame magic rather than trust the extension: a
    // `compression_enabled = false` artifact still carries the `.bundle`
    // extension, and this way toggling the option never strands files
    // written under the opposite setting (spec §6).
    const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];
    let is_compressed = bytes.starts_with(&ZSTD_MAGIC);
    let json = if is_compressed {
        let path_for_err = path.to_path_buf();
        tokio::task::spawn_blocking(move || zstd::decode_all(bytes.as_slice()))
            .await
            .map_err(|err| StoreError::Corrupt {
                path: path_for_err.clone(),
                reason: err.to_string(),
            })?
            .map_err(|err| StoreError::Corrupt {
                path: path_for_err,
                reason: err.to_string(),
            })?
    } else {
        bytes
    };

    // A legacy per-block artifact is a single `TransactionResult` array, not
    // a `Bundle`; both shapes parse as valid (possibly empty) JSON arrays,
    // so the filename — not a parse attempt — decides which one this is.
    // An empty legacy block (`[]`) would otherwise deserialize just fine as
    // an empty `Bundle` and never reach the wrapping step below.
    match legacy_block_number_from_path(path) {
        Some(block_num) => {
            let diffs: Vec<state_diff::TransactionResult> =
                serde_json::from_slice(&json).map_err(|err| StoreError::Corrupt {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                })?;
            Ok(vec![state_diff::BlockDiffs {
                block_num,
                diffs,
            }])
        }
        None => serde_json::from_slice::<Bundle>(&json).map_err(|err| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

fn legacy_block_number_from_path(path: &Path) -> Option<BlockNumber> {
    let stem = path.file_name()?.to_str()?;
    let stem = stem.strip_suffix(".json.zst").or_else(|| stem.strip_suffix(".json"))?;
    stem.parse().ok()
}
