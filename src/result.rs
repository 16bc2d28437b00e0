use thiserror::Error;

#[derive(Error, Debug)]
pub enum FitBaseError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The write was applied but could not be flushed to disk.
    #[error("write committed but not flushed: {0}")]
    Unflushed(#[source] sled::Error),
    #[error("serializer error")]
    Serializer(#[from] bincode::Error),
    #[error("line {line}: invalid {field} value {value:?}")]
    Parse {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("no record found with id {id}")]
    NotFound { id: i32 },
    #[error("a record with id {id} already exists")]
    Exists { id: i32 },
    #[error("record {id} failed the {constraint} check")]
    Condition { id: i32, constraint: String },
}

impl FitBaseError {
    /// Storage could not be reached or written.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Sled(_) | Self::Io(_) | Self::Unflushed(_))
    }

    /// The store already holds the new state, only durability is in doubt.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Unflushed(_))
    }

    /// The write was rejected by the primary key or a check constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Exists { .. } | Self::Condition { .. })
    }
}

pub type DbResult<T> = Result<T, FitBaseError>;
