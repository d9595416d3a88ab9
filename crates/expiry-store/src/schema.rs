//! Reference DDL for the analytical store (spec §4.F). Schema migration
//! tooling is an external collaborator (spec §1); these constants exist so
//! integration tests and operators can stand up a matching ClickHouse
//! instance, not because this crate applies them itself.

/// `account_events`: one append-only row per `(address, block, is_contract)`
/// touch. `PARTITION BY` and `ORDER BY` start with `block` so that "expired
/// before X" range scans are sequential (spec §4.F).
pub const ACCOUNT_EVENTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS account_events
(
    block       UInt64,
    address     FixedString(20),
    is_contract Bool
)
ENGINE = MergeTree
PARTITION BY intDiv(block, 1000000)
ORDER BY (block, address)
"#;

/// `storage_events`: one append-only row per `(address, slot, block)` touch.
pub const STORAGE_EVENTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS storage_events
(
    block   UInt64,
    address FixedString(20),
    slot    FixedString(32)
)
ENGINE = MergeTree
PARTITION BY intDiv(block, 1000000)
ORDER BY (block, address, slot)
"#;

/// `metadata`: append-only key/value log. ClickHouse's `MergeTree` has no
/// `UPDATE`/`UPSERT`, so the watermark is the most-recently-inserted row for
/// its key rather than a single mutable row (spec §3's "singleton" is
/// emulated, not literal — see `ExpiryStore::last_indexed_range`).
pub const METADATA_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS metadata
(
    key        String,
    value      String,
    updated_at DateTime64(3) DEFAULT now64(3)
)
ENGINE = MergeTree
ORDER BY (key, updated_at)
"#;

pub const ALL_TABLE_DDL: &[&str] = &[ACCOUNT_EVENTS_DDL, STORAGE_EVENTS_DDL, METADATA_DDL];
