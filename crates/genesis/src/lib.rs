//! One-shot genesis-allocation bootstrap (spec §4.G step 2, §8 "range 0 is
//! handled by the bootstrap path alone"). Grounded on `contracts`'s "load a
//! JSON artifact off disk" pattern: a canonical genesis file is read once
//! and fed into the same committer every other range goes through.

use {
    access_aggregate::RangeAggregate,
    chain_types::RangeNumber,
    expiry_store::ExpiryStore,
    serde::Deserialize,
    std::{collections::BTreeMap, path::Path},
};

#[derive(Debug, thiserror::Error)]
pub enum GenesisError {
    #[error("reading genesis file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing genesis file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] expiry_store::Error),
}

/// The subset of a canonical Ethereum genesis file this crate cares about:
/// the `alloc` map of pre-funded accounts. Each entry's presence alone is a
/// touch; `code` presence classifies it as a contract, matching the diff
/// decoder's rule for ordinary blocks (spec §4.D).
#[derive(Deserialize)]
struct GenesisFile {
    alloc: BTreeMap<String, GenesisAccount>,
}

#[derive(Deserialize, Default)]
struct GenesisAccount {
    #[serde(default)]
    code: Option<String>,
}

/// Parses a genesis file into a range-0 aggregate, every account touched
/// at block 0, classified EOA/contract by code presence.
pub async fn load(path: &Path) -> Result<RangeAggregate, GenesisError> {
    let path_str = path.display().to_string();
    let bytes = tokio::fs::read(path).await.map_err(|source| GenesisError::Io {
        path: path_str.clone(),
        source,
    })?;
    let genesis: GenesisFile =
        serde_json::from_slice(&bytes).map_err(|source| GenesisError::Parse {
            path: path_str,
            source,
        })?;

    let mut aggregate = RangeAggregate::new(RangeNumber::GENESIS, 1000);
    for (address_str, account) in &genesis.alloc {
        let Ok(address) = address_str.parse() else {
            tracing::warn!(address = %address_str, "skipping malformed genesis allocation address");
            continue;
        };
        let is_contract = account
            .code
            .as_deref()
            .is_some_and(|code| !code.is_empty() && code != "0x");
        aggregate.add_account(address, 0, is_contract);
    }
    Ok(aggregate)
}

/// Reads `path`, builds the range-0 aggregate, and force-commits it — the
/// one range a flush-threshold never gates (spec §4.G step 2).
pub async fn bootstrap(path: &Path, store: &ExpiryStore) -> Result<(), GenesisError> {
    let aggregate = load(path).await?;
    tracing::info!(accounts = aggregate.count(), "committing genesis allocation as range 0");
    store.commit(RangeNumber::GENESIS, &aggregate).await?;
    Ok(())
}
