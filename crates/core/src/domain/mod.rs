pub mod product;
pub mod purchase;
