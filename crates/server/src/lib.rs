pub mod routes;
pub mod startup;
pub mod errors;
pub mod observability;
pub mod openapi;

pub use routes::{build_router, AppState, RouterOptions};
pub use startup::run;
