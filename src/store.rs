use std::ops::Deref;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Config, Db, IVec, Tree};

use crate::constraint::Constraint;
use crate::encoding::{decode, encode, encode_key};
use crate::record::Record;
use crate::result::{DbResult, FitBaseError};

/// Name of the sled tree holding the records.
pub const RECORDS_TREE: &str = "fitness_records";

/// A durable, ordered collection of [`Record`]s keyed by id.
///
/// Handles are cheap to clone and share the same underlying engine.
pub struct RecordStore(Arc<StoreInner>);

impl Clone for RecordStore {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl Deref for RecordStore {
    type Target = Arc<StoreInner>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl RecordStore {
    /// Open the store at `path`, creating the database and the records tree if absent.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        log::info!("Opening record store at {}", path.as_ref().display());
        Self::from_config(&Config::new().path(path))
    }

    /// Open a store which is deleted once the last handle is dropped.
    pub fn temporary() -> DbResult<Self> {
        Self::from_config(&Config::new().temporary(true))
    }

    /// Open a store with a fully specified engine configuration.
    pub fn from_config(config: &Config) -> DbResult<Self> {
        let engine = config.open()?;
        let inner = StoreInner::new(&engine)?;
        log::debug!("Record store ready with {} records", inner.root.len());

        Ok(Self(Arc::new(inner)))
    }
}

pub struct StoreInner {
    engine: Db,
    root: Tree,
    constraints: RwLock<Vec<Constraint>>,
    /// Serializes writers so bulk replacement sees a stable key set.
    write_lock: Mutex<()>,
}

impl StoreInner {
    fn new(engine: &Db) -> DbResult<Self> {
        let root = engine.open_tree(RECORDS_TREE)?;

        Ok(Self {
            engine: engine.clone(),
            root,
            constraints: RwLock::new(vec![Constraint::full_name_not_empty()]),
            write_lock: Mutex::new(()),
        })
    }

    /// All records, ascending by id.
    pub fn get_all(&self) -> DbResult<Vec<Record>> {
        let records = self
            .root
            .iter()
            .values()
            .map(|value| decode(&value?))
            .collect::<DbResult<Vec<Record>>>()?;
        log::debug!("{} records fetched from the store", records.len());

        Ok(records)
    }

    /// Select a record by its id.
    ///
    /// # Returns
    ///
    /// An [`Option`] containing the record if it exists, or [`None`] otherwise.
    pub fn select(&self, id: i32) -> DbResult<Option<Record>> {
        match self.root.get(encode_key(id))? {
            Some(serialized) => Ok(Some(decode(&serialized)?)),
            None => Ok(None),
        }
    }

    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// [`FitBaseError::Exists`] if a record with the same id is already stored,
    /// [`FitBaseError::Condition`] if the record fails a check constraint.
    pub fn insert(&self, record: &Record) -> DbResult<()> {
        self.check(record)?;
        let value = encode(record)?;

        let _guard = self.lock_writes();
        let swapped = self
            .root
            .compare_and_swap(encode_key(record.id), None as Option<&[u8]>, Some(value))?;

        if swapped.is_err() {
            log::warn!("Rejected insert of duplicate id {}", record.id);
            return Err(FitBaseError::Exists { id: record.id });
        }

        self.flush()?;
        log::debug!("Inserted record {}", record.id);

        Ok(())
    }

    /// Replace every field of the stored record with the same id.
    ///
    /// # Errors
    ///
    /// [`FitBaseError::NotFound`] if no record has that id. Nothing is written.
    pub fn update(&self, record: &Record) -> DbResult<()> {
        self.check(record)?;
        let value = encode(record)?;

        let _guard = self.lock_writes();
        let updated = self.root.update_and_fetch(encode_key(record.id), |old| {
            old.map(|_| IVec::from(value.as_slice()))
        })?;

        if updated.is_none() {
            log::warn!("No record found with id {}", record.id);
            return Err(FitBaseError::NotFound { id: record.id });
        }

        self.flush()?;
        log::debug!("Updated record {}", record.id);

        Ok(())
    }

    /// Delete a record by its id.
    ///
    /// # Returns
    ///
    /// The removed record.
    pub fn delete(&self, id: i32) -> DbResult<Record> {
        let _guard = self.lock_writes();

        let Some(serialized) = self.root.remove(encode_key(id))? else {
            log::warn!("No record found with id {}", id);
            return Err(FitBaseError::NotFound { id });
        };

        self.flush()?;
        log::debug!("Deleted record {}", id);

        decode(&serialized)
    }

    /// Atomically replace the whole store with `records`.
    ///
    /// Either every existing record is removed and every given record inserted,
    /// or the store is left exactly as it was. The one exception is
    /// [`FitBaseError::Unflushed`]: the replacement is committed and visible,
    /// but may not have reached disk.
    pub fn save_all(&self, records: &[Record]) -> DbResult<()> {
        let rows = records
            .iter()
            .map(|record| -> DbResult<_> { Ok((record, encode_key(record.id), encode(record)?)) })
            .collect::<DbResult<Vec<_>>>()?;
        let constraints = self.constraints.read().unwrap().clone();

        let _guard = self.lock_writes();
        let existing = self
            .root
            .iter()
            .keys()
            .collect::<Result<Vec<IVec>, sled::Error>>()?;

        let result = self.root.transaction(|tx| {
            for key in &existing {
                tx.remove(key.clone())?;
            }

            for (record, key, value) in &rows {
                if let Some(constraint) = constraints.iter().find(|c| !c.accepts(record)) {
                    return Err(ConflictableTransactionError::Abort(
                        FitBaseError::Condition {
                            id: record.id,
                            constraint: constraint.name.clone(),
                        },
                    ));
                }

                if tx.insert(&key[..], value.as_slice())?.is_some() {
                    return Err(ConflictableTransactionError::Abort(FitBaseError::Exists {
                        id: record.id,
                    }));
                }
            }

            Ok(())
        });

        match result {
            Ok(()) => {}
            Err(TransactionError::Abort(err)) => {
                log::warn!("Bulk replacement rolled back: {}", err);
                return Err(err);
            }
            Err(TransactionError::Storage(err)) => return Err(err.into()),
        }

        self.flush()?;
        log::info!(
            "Replaced {} records with {} records",
            existing.len(),
            rows.len()
        );

        Ok(())
    }

    /// Mean of `steps_today` across all records, `0.0` when the store is empty.
    pub fn average_steps(&self) -> DbResult<f64> {
        let (count, total) = self.root.iter().values().try_fold(
            (0u64, 0i64),
            |(count, total), value| -> DbResult<(u64, i64)> {
                let record: Record = decode(&value?)?;
                Ok((count + 1, total + i64::from(record.steps_today)))
            },
        )?;

        if count == 0 {
            return Ok(0.0);
        }

        Ok(total as f64 / count as f64)
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Add a check constraint to the store.
    ///
    /// A constraint with the same name as one already registered is ignored.
    pub fn constraint(&self, constraint: Constraint) {
        let mut constraints = self.constraints.write().unwrap();

        if !constraints.iter().any(|c| c.name == constraint.name) {
            constraints.push(constraint);
        }
    }

    pub fn constraint_names(&self) -> Vec<String> {
        self.constraints
            .read()
            .unwrap()
            .iter()
            .map(|c| c.name().to_owned())
            .collect()
    }

    fn check(&self, record: &Record) -> DbResult<()> {
        for constraint in self.constraints.read().unwrap().iter() {
            if !constraint.accepts(record) {
                log::warn!(
                    "Record {} rejected by the {} check",
                    record.id,
                    constraint.name()
                );
                return Err(FitBaseError::Condition {
                    id: record.id,
                    constraint: constraint.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Flush a write that has already been applied to the tree.
    fn flush(&self) -> DbResult<()> {
        self.engine.flush().map_err(|err| {
            log::error!("Committed write could not be flushed: {}", err);
            FitBaseError::Unflushed(err)
        })?;

        Ok(())
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded value is (), so a poisoned lock carries no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
