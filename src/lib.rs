// Library exports for gradegraph
//
// Pipeline: raw table -> schema normalization -> filtered view ->
// {aggregation, distribution estimation} -> chart-ready specs. The crate is
// invoked as a library by an external layer that owns the interaction loop
// and the rendering; every call is a full, deterministic recomputation from
// the immutable dataset.

pub mod aggregate;
pub mod chart;
pub mod distribution;
pub mod filter;
pub mod pipeline;
pub mod schema;
pub mod table;

pub use filter::FilterCriteria;
pub use pipeline::{build_charts, ChartRequest, Kpis, SectionCharts};
pub use schema::{Dataset, Dimension, Metric, Record, SchemaError};
pub use table::RawTable;
