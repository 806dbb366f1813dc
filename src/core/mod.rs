pub mod config;
pub mod constants;
pub mod geo;
pub mod session;

pub use config::{ConfigModel, InitialView, ValidatedConfig};
pub use geo::{GeometryEnvelope, LngLat, ScreenPoint};
pub use session::{MapSession, PreparedMap};
