//! A tiny fitness record store.
//!
//! Records can be kept in a transactional [`RecordStore`] backed by sled, or
//! in a plain text file through [`flatfile`]. The two backends are
//! independent of each other.
//!
//! # Example
//!
//! ```
//! use fitbase::{Record, RecordStore};
//!
//! # fn main() -> fitbase::DbResult<()> {
//! let store = RecordStore::temporary()?;
//! store.insert(&Record::new(2, "Jane Doe", 31, 142.0, 6000, 310.5))?;
//! store.insert(&Record::new(1, "Sam Lee", 40, 180.5, 8000, 512.0))?;
//!
//! assert_eq!(store.get_all()?[0].id, 1);
//! assert_eq!(store.average_steps()?, 7000.0);
//! # Ok(())
//! # }
//! ```

pub mod constraint;
pub use constraint::Constraint;

pub mod flatfile;

pub mod record;
pub use record::{HalfUp, Record};

pub mod result;
pub use result::{DbResult, FitBaseError};

pub mod store;
pub use store::RecordStore;

mod encoding;
