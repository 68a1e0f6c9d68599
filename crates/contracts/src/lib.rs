pub mod domain;
pub mod enums;
pub mod errors;
pub mod shared;
