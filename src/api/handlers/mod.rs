pub mod errors;
pub mod items;
pub mod system;
