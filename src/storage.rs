//! Persistence of the last commanded level per switching source.
//!
//! The record is a fixed 9-byte layout:
//!
//! | Offset | Size | Content                          |
//! |--------|------|----------------------------------|
//! | 0      | 1    | format version                   |
//! | 1      | 4    | external level, R G B W          |
//! | 5      | 4    | button level, R G B W            |
//!
//! A version mismatch on load is treated as uninitialized storage and resets
//! both levels to full brightness.

use crate::config::STORAGE_VERSION;
use crate::types::{ChannelGroup, Level, SwitchingSource};
use core::fmt::Debug;
use embedded_storage::Storage;

/// Encoded size of a [`PersistedRecord`].
pub const RECORD_SIZE: usize = 1 + 4 * SwitchingSource::COUNT;

/// Errors reported by the underlying storage driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError<E> {
    /// Reading the record failed.
    Read(E),
    /// Writing the record failed.
    Write(E),
}

impl<E: Debug> core::fmt::Display for StorageError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageError::Read(err) => write!(f, "storage read failed: {:?}", err),
            StorageError::Write(err) => write!(f, "storage write failed: {:?}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: Debug> std::error::Error for StorageError<E> {}

/// The version-tagged levels remembered for each switching source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistedRecord {
    pub version: u8,
    pub levels: [Level; SwitchingSource::COUNT],
}

impl PersistedRecord {
    /// Current version with every level off.
    pub const fn new() -> Self {
        Self {
            version: STORAGE_VERSION,
            levels: [Level::OFF; SwitchingSource::COUNT],
        }
    }

    /// Current version with every level at full brightness.
    pub const fn defaults() -> Self {
        Self {
            version: STORAGE_VERSION,
            levels: [Level::FULL; SwitchingSource::COUNT],
        }
    }

    pub fn level(&self, source: SwitchingSource) -> Level {
        self.levels[source.index()]
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[0] = self.version;
        for (chunk, level) in out[1..].chunks_exact_mut(4).zip(self.levels.iter()) {
            chunk.copy_from_slice(&level.to_array());
        }
        out
    }

    /// Decodes a record as stored. The version is not checked here.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        let mut levels = [Level::OFF; SwitchingSource::COUNT];
        for (level, chunk) in levels.iter_mut().zip(bytes[1..].chunks_exact(4)) {
            *level = Level::from_array([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self {
            version: bytes[0],
            levels,
        }
    }
}

impl Default for PersistedRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// RAM cache of the [`PersistedRecord`] backed by an `embedded-storage` device.
///
/// # Type Parameters
/// * `S` - EEPROM or flash driver
pub struct LevelStore<S: Storage> {
    storage: S,
    offset: u32,
    record: PersistedRecord,
    loaded: bool,
}

impl<S> LevelStore<S>
where
    S: Storage,
    S::Error: Debug,
{
    /// Creates a store with an all-off cache. Nothing is read until [`load`].
    ///
    /// [`load`]: LevelStore::load
    pub fn new(storage: S, offset: u32) -> Self {
        Self {
            storage,
            offset,
            record: PersistedRecord::new(),
            loaded: false,
        }
    }

    /// Reads the record into the cache.
    ///
    /// A record with a different version resets both levels to full
    /// brightness and adopts the current version tag. A read failure leaves
    /// the cache untouched.
    pub fn load(&mut self) -> Result<(), StorageError<S::Error>> {
        let mut bytes = [0u8; RECORD_SIZE];
        self.storage
            .read(self.offset, &mut bytes)
            .map_err(StorageError::Read)?;

        let record = PersistedRecord::decode(&bytes);
        if record.version == STORAGE_VERSION {
            self.record = record;
        } else {
            log::warn!(
                "Old data format (version {}) or uninitialized memory. Reset to default values",
                record.version
            );
            self.record = PersistedRecord::defaults();
        }
        self.loaded = true;

        let external = self.record.level(SwitchingSource::External);
        let button = self.record.level(SwitchingSource::Button);
        log::info!(
            "Restored values: external={{R={}, G={}, B={}, W={}}}, button={{R={}, G={}, B={}, W={}}}",
            external.r(),
            external.g(),
            external.b(),
            external.w(),
            button.r(),
            button.g(),
            button.b(),
            button.w()
        );
        Ok(())
    }

    /// Remembers `level` as `source`'s setting for `group` and writes the record.
    ///
    /// Only `group`'s components change; the cache is updated even if the
    /// write fails.
    ///
    /// A record that was never read successfully is loaded first. If that
    /// read fails, nothing is written and the cache is left as is.
    pub fn save(
        &mut self,
        group: ChannelGroup,
        source: SwitchingSource,
        level: Level,
    ) -> Result<(), StorageError<S::Error>> {
        if !self.loaded {
            self.load()?;
        }

        let slot = &mut self.record.levels[source.index()];
        *slot = slot.with_group(group, level);

        self.storage
            .write(self.offset, &self.record.encode())
            .map_err(StorageError::Write)
    }

    /// Returns the cached level for `source`.
    pub fn level(&self, source: SwitchingSource) -> Level {
        self.record.level(source)
    }

    /// Returns true if `source`'s cached level equals `level` on all four channels.
    pub fn is_stored_equal(&self, source: SwitchingSource, level: &Level) -> bool {
        self.record.level(source) == *level
    }

    /// Returns true once the record has been read from storage.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns the cached record.
    pub fn record(&self) -> &PersistedRecord {
        &self.record
    }
}
