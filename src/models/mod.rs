pub mod administration;
pub mod enums;
pub mod medication;
pub mod member;

pub use administration::*;
pub use enums::*;
pub use medication::*;
pub use member::*;
