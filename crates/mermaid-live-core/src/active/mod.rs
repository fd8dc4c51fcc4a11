//! Active diagram state machine.

mod model;
mod repository;

pub use model::{ActiveDiagram, RenderedDiagram};
pub use repository::{LastRendered, LastRenderedRepository};
