use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct S3Config {
    /// The S3 bucket where auction instances should be uploaded.
    pub bucket: String,

    /// Prepended to the auction id to form the final instance filename on S3.
    /// Something like "staging/mainnet/"
    pub filename_prefix: String,
}

impl From<S3Config> for s3::Config {
    fn from(config: S3Config) -> Self {
        Self {
            bucket: config.bucket,
            filename_prefix: config.filename_prefix,
        }
    }
}
