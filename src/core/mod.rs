pub mod merge;
pub mod migrant;
pub mod migrator;
pub mod outcome;

pub use crate::domain::model::{DataProduct, Dataset, DatasetKind, Domain};
pub use crate::domain::ports::CatalogClient;
pub use crate::utils::error::Result;
