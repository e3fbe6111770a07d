pub mod nbs;
pub mod news;
pub mod supermarkets;
