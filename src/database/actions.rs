mod attributes;
mod recipes;
mod users;

pub use attributes::*;
pub use recipes::*;
pub use users::*;
