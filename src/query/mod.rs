//! Query processing: filters, sorting, key paths, aggregation, query ids and
//! pagination.

pub mod aggregate;
pub mod codec;
pub mod filter;
pub mod key_path;
pub mod paginate;
pub mod sort;

pub use aggregate::{aggregate, aggregate_documents, AggregationResult};
pub use codec::{decode, encode, AggregationKind, AggregationRequest};
pub use filter::{ComparisonOp, FilterDocument, FilterExpr};
pub use key_path::{resolve, resolve_present};
pub use paginate::{with_skip, PageLinks, Paginator};
pub use sort::{compare_values, SortDirection, SortSpec};
