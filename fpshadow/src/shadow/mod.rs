mod location;
mod value;

pub use location::ShadowLocation;
pub use value::{ShadowValue, Stem};
