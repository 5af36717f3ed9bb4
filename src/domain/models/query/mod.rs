pub mod query_features;

pub use query_features::{combine_filters, FieldSelection, QueryFeatures};
