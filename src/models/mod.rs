pub mod enums;
pub mod facility;
pub mod filters;
pub mod medication;
pub mod patient;
pub mod prescription;
pub mod source;

pub use facility::*;
pub use filters::*;
pub use medication::*;
pub use patient::*;
pub use prescription::*;
pub use source::*;
