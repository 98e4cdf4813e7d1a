pub mod catalog;
pub mod resource;
pub mod trigger;

pub use catalog::*;
pub use resource::*;
pub use trigger::*;
