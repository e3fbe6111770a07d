pub mod common;
pub mod nbs;
pub mod supermarkets;
