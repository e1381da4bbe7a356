mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    #[cfg(test)]
    pub mod memory;
    pub mod queryset;
    pub mod schema;
    pub mod store;
}
mod authentication {
    pub mod middleware;
    pub mod permissions;
    pub mod session;
}
mod views {
    pub mod attributes;
    pub mod recipes;
    pub mod rejection;
    pub mod routes;
    pub mod serializers;
    pub mod viewset;
}
mod config;
mod constants;


pub use authentication::*;
pub use config::*;
pub use constants::*;
pub use database::*;
pub use views::*;
