pub mod envelope;
pub mod params;
pub mod resource;
pub mod sport;

pub use envelope::{ApiEnvelope, ApiErrors};
pub use params::QueryParams;
pub use resource::ResourceKind;
pub use sport::Sport;
