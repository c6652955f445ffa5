mod cart;
mod product;
mod user;

pub use cart::*;
pub use product::*;
pub use user::*;
