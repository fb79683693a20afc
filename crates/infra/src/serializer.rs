//! Write path for items (per-item serialization of mutations).
//!
//! ```text
//! Command
//!   ↓
//! 1. Stateless validation (before any store access)
//!   ↓
//! 2. Acquire the item's lock (bounded wait)
//!   ↓
//! 3. Load current item, check caller's expected version
//!   ↓
//! 4. Handle + apply command on a copy (pure domain logic)
//!   ↓
//! 5. Compare-and-swap into the store; on a lost race reload and retry
//! ```
//!
//! Holding the per-item lock across load → decide → write means concurrent
//! deltas against one item compose instead of overwriting each other, and the
//! non-negative stock invariant is checked against the quantity each delta
//! actually lands on. The store-level compare-and-swap additionally guards
//! against writers that bypass this serializer. Different items never share a
//! lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use inventrack_core::{AggregateRoot, DomainError, ExpectedVersion, ItemId};
use inventrack_inventory::{InventoryCommand, InventoryItem, ItemPatch, NewItem};

use crate::config::InventoryConfig;
use crate::error::InventoryError;
use crate::store::{InventoryStore, StoreError};

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub struct MutationSerializer<S> {
    store: S,
    locks: Mutex<HashMap<ItemId, Arc<Mutex<()>>>>,
    max_retries: u32,
    lock_timeout: Duration,
}

impl<S> MutationSerializer<S>
where
    S: InventoryStore,
{
    pub fn new(store: S, config: &InventoryConfig) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            max_retries: config.max_mutation_retries,
            lock_timeout: config.lock_timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert a new item. SKU uniqueness and category/location references are
    /// checked by the store atomically with the write.
    pub fn insert(
        &self,
        new: NewItem,
        occurred_at: DateTime<Utc>,
    ) -> Result<InventoryItem, InventoryError> {
        new.validate()?;
        let item = InventoryItem::create(ItemId::new(), new, occurred_at)?;

        self.store.insert_item(item.clone()).inspect_err(|err| {
            tracing::info!(sku = %item.sku(), error = %err, "item insert rejected");
        })?;

        tracing::info!(item_id = %item.id_typed(), sku = %item.sku(), "item inserted");
        Ok(item)
    }

    /// Run a mutation command against one item.
    ///
    /// `expected_version` is the caller's view of the item; pass
    /// [`ExpectedVersion::Any`] to let the serializer compose the change onto
    /// whatever the current state is.
    pub fn execute(
        &self,
        command: InventoryCommand,
        expected_version: ExpectedVersion,
    ) -> Result<InventoryItem, InventoryError> {
        command.validate()?;

        let item_id = command.item_id();
        let lock = self.lock_for(item_id);
        let result = self
            .acquire(&lock, item_id)
            .and_then(|_guard| self.execute_locked(&command, expected_version));
        self.release(item_id, lock);
        result
    }

    /// Delete an item, serialized with any in-flight mutation of it.
    pub fn delete(&self, item_id: ItemId) -> Result<(), InventoryError> {
        let lock = self.lock_for(item_id);
        let result = self.acquire(&lock, item_id).and_then(|_guard| {
            if self.store.delete_item(item_id)? {
                Ok(())
            } else {
                Err(DomainError::not_found("item", item_id).into())
            }
        });
        self.release(item_id, lock);

        result?;
        tracing::info!(item_id = %item_id, "item deleted");
        Ok(())
    }

    fn execute_locked(
        &self,
        command: &InventoryCommand,
        expected_version: ExpectedVersion,
    ) -> Result<InventoryItem, InventoryError> {
        let item_id = command.item_id();
        let mut attempt = 0u32;
        loop {
            let current = self
                .store
                .get_item(item_id)?
                .ok_or_else(|| DomainError::not_found("item", item_id))?;
            expected_version.check(current.version())?;

            if let InventoryCommand::UpdateDetails(cmd) = command {
                self.ensure_references(&cmd.patch)?;
            }

            let mut next = current.clone();
            let events = next.execute(command)?;
            if events.is_empty() {
                tracing::debug!(item_id = %item_id, "mutation changed nothing");
                return Ok(current);
            }

            match self
                .store
                .replace_item(next.clone(), ExpectedVersion::Exact(current.version()))
            {
                Ok(()) => {
                    for event in &events {
                        tracing::info!(
                            item_id = %item_id,
                            event_type = event.event_type(),
                            version = next.version(),
                            quantity = next.quantity(),
                            "item mutated"
                        );
                    }
                    return Ok(next);
                }
                Err(StoreError::VersionMismatch { actual, .. }) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        item_id = %item_id,
                        attempt,
                        seen = current.version(),
                        actual,
                        "lost compare-and-swap race; retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn ensure_references(&self, patch: &ItemPatch) -> Result<(), InventoryError> {
        if let Some(Some(id)) = patch.category_id {
            if self.store.category(id)?.is_none() {
                return Err(DomainError::not_found("category", id).into());
            }
        }
        if let Some(Some(id)) = patch.location_id {
            if self.store.location(id)?.is_none() {
                return Err(DomainError::not_found("location", id).into());
            }
        }
        Ok(())
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<ItemId, Arc<Mutex<()>>>> {
        // The map holds no invariant a panicking holder could break.
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_for(&self, item_id: ItemId) -> Arc<Mutex<()>> {
        self.registry().entry(item_id).or_default().clone()
    }

    /// Drop the registry entry once the map and `lock` are its only holders,
    /// so the map only tracks items with a mutation in flight.
    fn release(&self, item_id: ItemId, lock: Arc<Mutex<()>>) {
        let mut registry = self.registry();
        let unshared = registry
            .get(&item_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, &lock) && Arc::strong_count(&lock) == 2);
        if unshared {
            registry.remove(&item_id);
        }
    }

    fn acquire<'a>(
        &self,
        lock: &'a Mutex<()>,
        item_id: ItemId,
    ) -> Result<MutexGuard<'a, ()>, InventoryError> {
        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match lock.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        tracing::warn!(item_id = %item_id, "timed out waiting for item lock");
                        return Err(DomainError::stale(format!(
                            "item {item_id} is busy; retry with fresh data"
                        ))
                        .into());
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventrack_core::{CategoryId, ConflictKind};
    use inventrack_inventory::{AdjustStock, SetQuantity, Sku, UpdateDetails};

    use crate::store::InMemoryInventoryStore;

    fn serializer() -> MutationSerializer<InMemoryInventoryStore> {
        MutationSerializer::new(InMemoryInventoryStore::new(), &InventoryConfig::default())
    }

    fn insert(s: &MutationSerializer<InMemoryInventoryStore>, sku: &str, qty: i64) -> InventoryItem {
        let mut new = NewItem::new("Widget", Sku::parse(sku).unwrap());
        new.quantity = qty;
        s.insert(new, Utc::now()).unwrap()
    }

    fn adjust(id: ItemId, delta: i64) -> InventoryCommand {
        InventoryCommand::AdjustStock(AdjustStock {
            item_id: id,
            delta,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn second_insert_with_same_sku_conflicts() {
        let s = serializer();
        insert(&s, "X-100", 1);

        let err = s
            .insert(NewItem::new("Other", Sku::parse("X-100").unwrap()), Utc::now())
            .unwrap_err();
        assert!(err.domain().unwrap().is_conflict(ConflictKind::DuplicateSku));
    }

    #[test]
    fn adjust_persists_and_bumps_version() {
        let s = serializer();
        let item = insert(&s, "A-1", 10);

        let updated = s.execute(adjust(item.id_typed(), -4), ExpectedVersion::Any).unwrap();
        assert_eq!(updated.quantity(), 6);
        assert_eq!(updated.version(), 2);
        assert_eq!(s.store().get_item(item.id_typed()).unwrap().unwrap(), updated);
    }

    #[test]
    fn overdraw_is_an_invariant_violation_and_leaves_store_unchanged() {
        let s = serializer();
        let item = insert(&s, "A-1", 2);

        let err = s.execute(adjust(item.id_typed(), -3), ExpectedVersion::Any).unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::InvariantViolation(_))));
        assert_eq!(s.store().get_item(item.id_typed()).unwrap().unwrap(), item);
    }

    #[test]
    fn stale_expected_version_conflicts() {
        let s = serializer();
        let item = insert(&s, "A-1", 5);
        s.execute(adjust(item.id_typed(), 1), ExpectedVersion::Any).unwrap();

        let err = s
            .execute(adjust(item.id_typed(), 1), ExpectedVersion::Exact(item.version()))
            .unwrap_err();
        assert!(err.domain().unwrap().is_conflict(ConflictKind::StaleVersion));
    }

    #[test]
    fn unknown_item_is_not_found() {
        let s = serializer();
        let err = s.execute(adjust(ItemId::new(), 1), ExpectedVersion::Any).unwrap_err();
        assert_eq!(err.domain().unwrap().code(), "not_found");
    }

    #[test]
    fn validation_happens_before_store_access() {
        let s = serializer();
        // The item does not exist, but the zero delta is rejected first.
        let err = s.execute(adjust(ItemId::new(), 0), ExpectedVersion::Any).unwrap_err();
        assert_eq!(
            err,
            InventoryError::from(DomainError::validation("delta", "cannot be zero"))
        );
    }

    #[test]
    fn patch_with_unknown_category_is_not_found() {
        let s = serializer();
        let item = insert(&s, "A-1", 5);
        let cmd = InventoryCommand::UpdateDetails(UpdateDetails {
            item_id: item.id_typed(),
            patch: ItemPatch {
                category_id: Some(Some(CategoryId::new())),
                ..ItemPatch::default()
            },
            occurred_at: Utc::now(),
        });

        let err = s.execute(cmd, ExpectedVersion::Any).unwrap_err();
        assert!(matches!(
            err.domain(),
            Some(DomainError::NotFound { entity: "category", .. })
        ));
    }

    #[test]
    fn no_op_set_quantity_does_not_write() {
        let s = serializer();
        let item = insert(&s, "A-1", 5);
        let cmd = InventoryCommand::SetQuantity(SetQuantity {
            item_id: item.id_typed(),
            quantity: 5,
            occurred_at: Utc::now(),
        });

        let same = s.execute(cmd, ExpectedVersion::Any).unwrap();
        assert_eq!(same, item);
    }

    #[test]
    fn delete_removes_item_and_reports_missing_ones() {
        let s = serializer();
        let item = insert(&s, "A-1", 5);

        s.delete(item.id_typed()).unwrap();
        assert!(s.store().get_item(item.id_typed()).unwrap().is_none());
        let err = s.delete(item.id_typed()).unwrap_err();
        assert_eq!(err.domain().unwrap().code(), "not_found");
    }

    #[test]
    fn busy_item_times_out_with_conflict() {
        let config = InventoryConfig {
            lock_timeout: Duration::from_millis(20),
            ..InventoryConfig::default()
        };
        let s = MutationSerializer::new(InMemoryInventoryStore::new(), &config);
        let item = insert(&s, "A-1", 5);

        let lock = s.lock_for(item.id_typed());
        let _held = lock.lock().unwrap();

        let err = s.execute(adjust(item.id_typed(), 1), ExpectedVersion::Any).unwrap_err();
        assert!(err.domain().unwrap().is_conflict(ConflictKind::StaleVersion));
    }

    #[test]
    fn commands_against_unknown_items_leave_no_lock_behind() {
        let s = serializer();
        for _ in 0..1000 {
            let err = s.execute(adjust(ItemId::new(), 1), ExpectedVersion::Any).unwrap_err();
            assert_eq!(err.domain().unwrap().code(), "not_found");
        }
        assert!(s.delete(ItemId::new()).is_err());

        assert_eq!(s.registry().len(), 0);
    }

    #[test]
    fn lock_entries_are_dropped_after_each_mutation() {
        let s = serializer();
        let items: Vec<_> = (0..20).map(|n| insert(&s, &format!("L-{n}"), 5)).collect();
        for item in &items {
            s.execute(adjust(item.id_typed(), 1), ExpectedVersion::Any).unwrap();
            let _ = s.execute(adjust(item.id_typed(), -100), ExpectedVersion::Any);
        }
        s.delete(items[0].id_typed()).unwrap();

        assert_eq!(s.registry().len(), 0);
    }

    #[test]
    fn lock_entry_survives_while_another_holder_waits() {
        let config = InventoryConfig {
            lock_timeout: Duration::from_millis(20),
            ..InventoryConfig::default()
        };
        let s = MutationSerializer::new(InMemoryInventoryStore::new(), &config);
        let item = insert(&s, "A-1", 5);

        let lock = s.lock_for(item.id_typed());
        {
            let _held = lock.lock().unwrap();
            assert!(s.execute(adjust(item.id_typed(), 1), ExpectedVersion::Any).is_err());
            assert!(Arc::ptr_eq(&s.lock_for(item.id_typed()), &lock));
        }
        s.release(item.id_typed(), Arc::clone(&lock));
        assert_eq!(s.registry().len(), 1);
        drop(lock);

        s.execute(adjust(item.id_typed(), 1), ExpectedVersion::Any).unwrap();
        assert_eq!(s.registry().len(), 0);
    }

    #[test]
    fn concurrent_mutations_end_with_an_empty_registry() {
        let s = Arc::new(serializer());
        let item = insert(&s, "A-1", 100);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = Arc::clone(&s);
                let id = item.id_typed();
                thread::spawn(move || {
                    for _ in 0..10 {
                        s.execute(adjust(id, -1), ExpectedVersion::Any).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(s.store().get_item(item.id_typed()).unwrap().unwrap().quantity(), 20);
        assert_eq!(s.registry().len(), 0);
    }

    #[test]
    fn price_above_signed_cents_is_rejected_before_the_store() {
        let s = serializer();
        let mut new = NewItem::new("Gold bar", Sku::parse("AU-1").unwrap());
        new.price = Some(inventrack_inventory::Money::from_cents(i64::MAX as u64 + 1));

        let err = s.insert(new, Utc::now()).unwrap_err();
        assert!(matches!(
            err.domain(),
            Some(DomainError::Validation { field: "price", .. })
        ));
        assert!(s.store().find_by_sku(&Sku::parse("AU-1").unwrap()).unwrap().is_none());
    }
}
