pub mod diabetes;
pub mod enums;
pub mod heart;
pub mod prediction;

pub use diabetes::DiabetesRawInput;
pub use enums::*;
pub use heart::HeartRawInput;
pub use prediction::*;
