pub mod entity;
pub mod error;
pub mod plugins;
pub mod ports;
pub mod prelude;
pub mod settings;
pub mod state;
pub mod sv;

pub use error::{Error, Result};
pub use ports::Ports;
pub use settings::AffiliateSettings;
pub use state::Services;
