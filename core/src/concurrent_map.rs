//! Sharded accumulator used while scoring in parallel.
//!
//! Each shard is a `parking_lot::Mutex` around an ordered map. A key always
//! lands in shard `unsigned(key) % shard_count`, so updates to keys in
//! different shards never contend and updates to the same key are serialized.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;

/// Integer keys that can pick a shard. Signed keys are reinterpreted as
/// unsigned before the modulo.
pub trait ShardKey: Copy + Ord {
    fn shard_hash(self) -> u64;
}

macro_rules! impl_shard_key {
    ($($signed:ty => $unsigned:ty),* $(,)?) => {
        $(impl ShardKey for $signed {
            #[inline]
            fn shard_hash(self) -> u64 { self as $unsigned as u64 }
        })*
    };
}

impl_shard_key!(i32 => u32, i64 => u64, u32 => u32, u64 => u64, usize => usize);

pub struct ConcurrentScoreMap<K, V> {
    shards: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V: Default> ConcurrentScoreMap<K, V> {
    /// `shard_count` of zero is treated as one.
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize { self.shards.len() }

    fn shard(&self, key: K) -> &Mutex<BTreeMap<K, V>> {
        let idx = (key.shard_hash() % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    /// Lock the key's shard and return its value, inserting the default on
    /// first touch. The shard stays locked while the guard lives.
    pub fn access(&self, key: K) -> MappedMutexGuard<'_, V> {
        MutexGuard::map(self.shard(key).lock(), |map| map.entry(key).or_default())
    }

    pub fn erase(&self, key: K) -> bool { self.shard(key).lock().remove(&key).is_some() }

    /// Merge all shards into one ordered map. Shards are locked one at a time,
    /// so this is only a consistent view once writers have finished.
    pub fn snapshot(&self) -> BTreeMap<K, V>
    where
        V: Clone,
    {
        let mut out = BTreeMap::new();
        for shard in &self.shards {
            let guard = shard.lock();
            out.extend(guard.iter().map(|(k, v)| (*k, v.clone())));
        }
        out
    }

    /// Consume the map and merge shards without cloning values.
    pub fn into_map(self) -> BTreeMap<K, V> {
        let mut out = BTreeMap::new();
        for shard in self.shards {
            out.extend(shard.into_inner());
        }
        out
    }
}
