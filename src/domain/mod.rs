pub mod error;
pub mod forecast;
pub mod types;

pub use error::*;
pub use forecast::*;
pub use types::*;
