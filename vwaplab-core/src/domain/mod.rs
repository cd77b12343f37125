//! Domain types for VwapLab

pub mod bar;
pub mod feature;
pub mod record;
pub mod session;

pub use bar::Bar;
pub use feature::{feature_matrix, Feature, FeatureParseError};
pub use record::SessionRecord;
pub use session::{partition_sessions, Session};
