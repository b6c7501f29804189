//! Types that represent the core data model, such as `Record` and `Category`.
mod amount;
mod category;
mod mapping;
mod record;

pub use amount::{Amount, AmountError, CURRENCY};
pub use category::Category;
pub use mapping::{Mapping, MappingError};
pub use record::{Record, RecordColumn, Records, DATE_FORMAT};
