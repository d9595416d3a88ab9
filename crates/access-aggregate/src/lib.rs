//! Component E: the per-range in-memory touch aggregate.
//!
//! Grounded on `autopilot::solvable_orders::SolvableOrdersCache`'s
//! accumulator-with-threshold-flush shape, generalized from "cache of
//! orders refreshed per block" to "set of touches accumulated until a
//! size threshold, then flushed and reset" (spec §3, §4.E).

use {
    chain_types::{range_bounds, Address, BlockNumber, RangeNumber, StorageSlot},
    state_diff::DecodedTouches,
    std::collections::{BTreeMap, BTreeSet, HashMap},
};

/// Holds all touches observed since the last flush. Confined to one
/// driver task; never observed concurrently (spec §5).
///
/// The driver's outer loop (spec §4.G step 4) can carry this aggregate
/// across several ranges before a flush — a commit only has to happen
/// once `should_flush` trips or the whole target batch is exhausted (step
/// 5's force-flush) — so `range` tracks the *highest* range whose blocks
/// have been fully fed in so far, not a single fixed range. `set_current_range`
/// advances that marker each time the driver finishes reading one range's
/// bundle, and `commit(range(), &aggregate)` is always safe at that point:
/// every block the aggregate holds is `<=` that range's last block, and
/// every range up to it has been completely read.
#[derive(Debug)]
pub struct RangeAggregate {
    range: RangeNumber,
    range_size: u64,
    accounts_by_block: BTreeMap<BlockNumber, BTreeSet<Address>>,
    account_type: HashMap<Address, bool>,
    storage_by_block: BTreeMap<BlockNumber, BTreeMap<Address, BTreeSet<StorageSlot>>>,
    count: u64,
}

impl RangeAggregate {
    pub fn new(range: RangeNumber, range_size: u64) -> Self {
        Self {
            range,
            range_size,
            accounts_by_block: BTreeMap::new(),
            account_type: HashMap::new(),
            storage_by_block: BTreeMap::new(),
            count: 0,
        }
    }

    /// The highest range whose blocks are fully represented so far —
    /// what a flush right now should commit as the new watermark.
    pub fn range(&self) -> RangeNumber {
        self.range
    }

    /// Advances the "fully represented up to" marker. Called once a
    /// range's bundle has been completely read and fed; never moves
    /// backwards.
    pub fn set_current_range(&mut self, range: RangeNumber) {
        debug_assert!(range >= self.range, "range must advance monotonically");
        self.range = range;
    }

    /// Sum of unique touch rows that will be inserted on flush (spec §3,
    /// invariant 3: decreases only on `reset`).
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Inserts an account touch. Promotes `account_type[address]` from
    /// false to true only — a later EOA observation never demotes a
    /// contract (spec §3's "monotone within an address's lifetime").
    pub fn add_account(&mut self, address: Address, block: BlockNumber, is_contract: bool) {
        debug_assert!(
            self.block_within_tracked_bound(block),
            "block {block} exceeds the upper bound of tracked range {}",
            self.range.get()
        );

        let newly_touched = self
            .accounts_by_block
            .entry(block)
            .or_default()
            .insert(address);

        self.account_type
            .entry(address)
            .and_modify(|known_contract| *known_contract = *known_contract || is_contract)
            .or_insert(is_contract);

        if newly_touched {
            self.count += 1;
        }
    }

    /// Inserts a storage touch. Increments `count` only for a newly-seen
    /// `(block, address, slot)` triple (spec §4.E).
    pub fn add_storage(&mut self, address: Address, slot: StorageSlot, block: BlockNumber) {
        debug_assert!(
            self.block_within_tracked_bound(block),
            "block {block} exceeds the upper bound of tracked range {}",
            self.range.get()
        );

        let newly_touched = self
            .storage_by_block
            .entry(block)
            .or_default()
            .entry(address)
            .or_default()
            .insert(slot);

        if newly_touched {
            self.count += 1;
        }
    }

    /// Feeds one block's decoded touches (component D's output) into the
    /// aggregate in one call.
    pub fn feed_block(&mut self, block: BlockNumber, touches: &DecodedTouches) {
        for account in &touches.accounts {
            self.add_account(account.address, block, account.is_contract);
        }
        for storage in &touches.storage {
            self.add_storage(storage.address, storage.slot, block);
        }
    }

    /// True once `count` reaches `threshold`. The driver additionally
    /// force-flushes at range boundaries regardless of this result (spec
    /// §4.E, §4.G step 5).
    pub fn should_flush(&self, threshold: u64) -> bool {
        self.count >= threshold
    }

    /// Account touches ready to commit: one row per `(address, block)` with
    /// the final (possibly promoted) contract classification.
    pub fn account_touches(&self) -> impl Iterator<Item = (Address, BlockNumber, bool)> + '_ {
        self.accounts_by_block.iter().flat_map(move |(&block, addresses)| {
            addresses
                .iter()
                .map(move |&address| (address, block, self.account_type[&address]))
        })
    }

    /// Storage touches ready to commit: one row per `(address, slot, block)`.
    pub fn storage_touches(&self) -> impl Iterator<Item = (Address, StorageSlot, BlockNumber)> + '_ {
        self.storage_by_block.iter().flat_map(|(&block, by_address)| {
            by_address.iter().flat_map(move |(&address, slots)| {
                slots.iter().map(move |&slot| (address, slot, block))
            })
        })
    }

    /// Drops all accumulated state after a successful commit. The "fully
    /// represented up to" marker is unchanged, since that's exactly what
    /// was just committed; later blocks fed in belong to later ranges and
    /// still satisfy the upper-bound check relative to the next
    /// `set_current_range` call.
    pub fn reset(&mut self) {
        self.accounts_by_block.clear();
        self.account_type.clear();
        self.storage_by_block.clear();
        self.count = 0;
    }

    fn block_within_tracked_bound(&self, block: BlockNumber) -> bool {
        let (_, last) = range_bounds(self.range, self.range_size);
        block <= last
    }
}
