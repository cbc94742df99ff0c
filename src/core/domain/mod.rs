//! Domain types.

mod environment;
mod properties;
mod request;

pub use environment::{Environment, PropertySource};
pub use properties::Properties;
pub use request::ResolutionRequest;
