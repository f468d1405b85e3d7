pub mod errors;

pub use errors::{ArgumentError, CodecError, CodecResult, ConfigError, ResolveError};
