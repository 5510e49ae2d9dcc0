// app/src/web/mod.rs

pub mod caller;
pub mod handlers;
pub mod routes;

pub use caller::Caller;
pub use routes::configure_app_routes;
