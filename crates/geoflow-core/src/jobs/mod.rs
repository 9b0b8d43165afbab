//! Jobs: the units of work the runner executes per task.
//!
//! - **Job**: object-safe trait, `execute` returns a `JobOutcome`
//! - **JobRegistry**: `TaskType` -> `Arc<dyn Job>`
//! - **PolygonAreaJob** (`polygonArea`): GeoJSON validation + geodesic area
//! - **ReportGenerationJob** (`reportGeneration`): aggregation over earlier steps

pub mod area;
pub mod geojson;
pub mod job;
pub mod registry;
pub mod report;

pub use self::area::PolygonAreaJob;
pub use self::geojson::{GeoJsonError, Geometry};
pub use self::job::{Job, JobRole};
pub use self::registry::{JobRegistry, RegistryError};
pub use self::report::ReportGenerationJob;
