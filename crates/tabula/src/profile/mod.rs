//! Column profiling: value parsing, type inference and role detection.

mod column;
mod date;
mod roles;
mod value;

pub use column::{
    ColumnKind, ColumnProfile, DateStats, NumericStats, TYPE_SAMPLE_SIZE, normalize_name,
    profile_column,
};
pub use date::{Granularity, ParsedDate, parse_date};
pub use roles::{ProfileMeta, profile};
pub use value::{ParsedNumber, parse_number};
