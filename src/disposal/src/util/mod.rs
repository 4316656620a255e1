pub mod any;
pub mod hash;
pub mod name;
