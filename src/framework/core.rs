//! # Core Registry Framework
//!
//! This module defines the generic building blocks for the order store.
//!
//! ## Key Types
//!
//! - [`Entity`]: The trait that all registered resource types must implement.
//! - [`ResourceRegistry`]: The generic concurrent store that issues keys and holds entities.
//! - [`RegistryError`]: Registration failures (capacity, key space, double registration).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any resource must implement to be stored in a [`ResourceRegistry`].
///
/// # Architecture Note
/// The registry is written *once* against this contract. It never looks inside an
/// entity beyond its identity: the key is issued by the registry and handed to the
/// entity exactly once through [`Entity::assign_id`].
///
/// Entities are shared as `Arc<T>` between the registry and whoever is driving
/// them, so any mutable state inside an entity must use interior mutability.
pub trait Entity: Send + Sync + 'static {
    /// The unique identifier for this entity (e.g., a newtype around the sequence number).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The identifier, if one has been assigned.
    fn id(&self) -> Option<&Self::Id>;

    /// Binds the identifier. Returns the rejected id if one was already bound.
    fn assign_id(&self, id: Self::Id) -> Result<(), Self::Id>;
}

// =============================================================================
// 2. ERRORS
// =============================================================================

/// Errors that can occur while registering an entity.
///
/// Every variant is fatal to the single registration that produced it and leaves
/// the registry untouched for everybody else.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registry is full ({0} entries)")]
    CapacityReached(usize),
    #[error("Key space exhausted")]
    KeySpaceExhausted,
    #[error("Already registered as {0}")]
    AlreadyRegistered(String),
    #[error("Duplicate key issued: {0}")]
    DuplicateKey(String),
}

// =============================================================================
// 3. THE GENERIC REGISTRY
// =============================================================================

/// A concurrent store that issues strictly increasing keys and holds entities under them.
///
/// **Concurrency Model**:
/// Key issuance is a single atomic `fetch_update` on the counter, so two concurrent
/// `register` calls can never observe the same sequence number. Entities live in a
/// sharded [`DashMap`], so a writer only locks the shard it touches and lookups of
/// other keys proceed in parallel. There is no lock spanning the whole registration.
pub struct ResourceRegistry<T: Entity> {
    store: DashMap<T::Id, Arc<T>>,
    counter: AtomicU64,
    reserved: AtomicUsize,
    capacity: Option<usize>,
    key_fn: Box<dyn Fn(u64) -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceRegistry<T> {
    /// Creates an unbounded registry.
    ///
    /// `key_fn` maps the issued sequence number (starting at 1) to a key and must be injective.
    pub fn new(key_fn: impl Fn(u64) -> T::Id + Send + Sync + 'static) -> Self {
        Self::with_capacity(None, key_fn)
    }

    /// Creates a registry that refuses registrations beyond `capacity` entries.
    pub fn with_capacity(
        capacity: Option<usize>,
        key_fn: impl Fn(u64) -> T::Id + Send + Sync + 'static,
    ) -> Self {
        Self {
            store: DashMap::new(),
            counter: AtomicU64::new(0),
            reserved: AtomicUsize::new(0),
            capacity,
            key_fn: Box::new(key_fn),
        }
    }

    /// Issues the next key, binds it to `item` and stores the item under it.
    ///
    /// The item is visible to [`get`](Self::get) and [`find`](Self::find) as soon as
    /// this returns. A sequence number, once issued, is never reused.
    pub fn register(&self, item: Arc<T>) -> Result<T::Id, RegistryError> {
        let entity_type = entity_type::<T>();

        if let Some(existing) = item.id() {
            warn!(entity_type, id = %existing, "Already registered");
            return Err(RegistryError::AlreadyRegistered(existing.to_string()));
        }

        // Reserve a slot first so a full registry does not burn sequence numbers.
        let capacity = self.capacity;
        if self
            .reserved
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match capacity {
                Some(max) if n >= max => None,
                _ => Some(n + 1),
            })
            .is_err()
        {
            let max = capacity.unwrap_or_default();
            warn!(entity_type, capacity = max, "Registry full");
            return Err(RegistryError::CapacityReached(max));
        }

        let seq = match self
            .counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
        {
            Ok(previous) => previous + 1,
            Err(_) => {
                self.release_slot();
                warn!(entity_type, "Key space exhausted");
                return Err(RegistryError::KeySpaceExhausted);
            }
        };

        let id = (self.key_fn)(seq);
        // The id is bound only once the slot is known to be free
        match self.store.entry(id.clone()) {
            Entry::Occupied(_) => {
                self.release_slot();
                warn!(entity_type, %id, seq, "Duplicate key");
                Err(RegistryError::DuplicateKey(id.to_string()))
            }
            Entry::Vacant(slot) => {
                if let Err(rejected) = item.assign_id(id.clone()) {
                    self.release_slot();
                    let bound = item.id().cloned().unwrap_or(rejected);
                    warn!(entity_type, id = %bound, seq, "Lost registration race");
                    return Err(RegistryError::AlreadyRegistered(bound.to_string()));
                }
                slot.insert(item);
                info!(entity_type, %id, seq, "Registered");
                Ok(id)
            }
        }
    }

    /// Looks up an entity by key.
    pub fn get(&self, id: &T::Id) -> Option<Arc<T>> {
        let item = self.store.get(id).map(|entry| Arc::clone(entry.value()));
        debug!(entity_type = entity_type::<T>(), %id, found = item.is_some(), "Get");
        item
    }

    /// Returns a snapshot of every stored entity matching `predicate`.
    ///
    /// Entities registered while the scan runs may or may not be included.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Vec<Arc<T>> {
        let matches: Vec<Arc<T>> = self
            .store
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        debug!(entity_type = entity_type::<T>(), matched = matches.len(), "Find");
        matches
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The last sequence number handed out (0 if none).
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    fn release_slot(&self) {
        self.reserved.fetch_sub(1, Ordering::SeqCst);
    }
}

// Extract just the type name (e.g., "Order" instead of "delivery_platform::model::order::Order")
fn entity_type<T>() -> &'static str {
    std::any::type_name::<T>()
        .split("::")
        .last()
        .unwrap_or("Unknown")
}

// =============================================================================
// 4. EXAMPLE USAGE (Test)
// =============================================================================
