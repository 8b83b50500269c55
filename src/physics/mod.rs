//! Simulation collaborators feeding the renderer: point charges, the 1D
//! wave field, and tracer particles.

pub mod charges;
pub mod trajectory;
pub mod wave;

pub use charges::{ChargeSystem, PointCharge, Preset};
pub use trajectory::Tracer;
pub use wave::WaveField;
