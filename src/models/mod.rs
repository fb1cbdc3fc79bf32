pub mod category;
pub mod interaction;
pub mod product;
pub mod shop;
pub mod user;
