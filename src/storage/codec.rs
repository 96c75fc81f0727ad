/// Versioned collection codec
///
/// Persisted format is `{"version": N, "rows": [...]}`. A bare JSON array is
/// the historical format and is read as version 1. Rows written by an older
/// version go through `Entity::migrate_row` before decoding.
use crate::{
    error::ClinicResult,
    models::Entity,
    storage::KeyValueStore,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Version assigned to the bare-array format
const LEGACY_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    rows: &'a [T],
}

/// Result of decoding a stored collection
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub rows: Vec<T>,
    /// Rows were upgraded from an older schema version
    pub migrated: bool,
    /// Rows (or the whole value) that could not be decoded and were dropped
    pub dropped: usize,
}

impl<T> Decoded<T> {
    fn empty(dropped: usize) -> Self {
        Self {
            rows: Vec::new(),
            migrated: false,
            dropped,
        }
    }
}

/// Serialize a full set in the current format
pub fn encode_rows<T: Entity>(rows: &[T]) -> ClinicResult<String> {
    let envelope = Envelope {
        version: T::SCHEMA_VERSION,
        rows,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode a stored value; malformed input yields an empty set, never an error
pub fn decode_rows<T: Entity>(raw: &str) -> Decoded<T> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Stored {} is not valid JSON, starting empty: {}", T::COLLECTION, e);
            return Decoded::empty(1);
        }
    };

    let (version, items) = match value {
        Value::Array(items) => (LEGACY_VERSION, items),
        Value::Object(mut obj) => {
            let version = obj
                .get("version")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok());
            match (version, obj.remove("rows")) {
                (Some(version), Some(Value::Array(items))) => (version, items),
                _ => {
                    warn!("Stored {} has an unknown shape, starting empty", T::COLLECTION);
                    return Decoded::empty(1);
                }
            }
        }
        _ => {
            warn!("Stored {} has an unknown shape, starting empty", T::COLLECTION);
            return Decoded::empty(1);
        }
    };

    if version > T::SCHEMA_VERSION {
        warn!(
            "Stored {} was written by a newer schema (v{} > v{}), decoding as current",
            T::COLLECTION,
            version,
            T::SCHEMA_VERSION
        );
    }

    let migrated = version < T::SCHEMA_VERSION;
    let mut rows = Vec::with_capacity(items.len());
    let mut dropped = 0;

    for item in items {
        let item = if migrated {
            T::migrate_row(version, item)
        } else {
            item
        };

        match serde_json::from_value::<T>(item) {
            Ok(row) => rows.push(row),
            Err(e) => {
                dropped += 1;
                warn!("Dropping undecodable {} row: {}", T::COLLECTION, e);
            }
        }
    }

    Decoded {
        rows,
        migrated,
        dropped,
    }
}

/// Load a collection from durable storage
///
/// Absent keys load as empty. Migrated sets are written back in the current
/// format so the upgrade runs once; a failed write-back only costs a rerun.
pub fn load_collection<T: Entity>(store: &dyn KeyValueStore, key: &str) -> ClinicResult<Vec<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };

    let decoded = decode_rows::<T>(&raw);

    if decoded.migrated {
        info!(
            "Migrated {} {} rows to schema v{}",
            decoded.rows.len(),
            T::COLLECTION,
            T::SCHEMA_VERSION
        );
        if let Err(e) = save_collection(store, key, &decoded.rows) {
            warn!("Failed to write back migrated {}: {}", T::COLLECTION, e);
        }
    }

    Ok(decoded.rows)
}

/// Write a full set through to durable storage
pub fn save_collection<T: Entity>(
    store: &dyn KeyValueStore,
    key: &str,
    rows: &[T],
) -> ClinicResult<()> {
    let encoded = encode_rows(rows)?;
    store.set(key, &encoded)
}
