// app/src/web/handlers/mod.rs

pub mod item_handlers;
pub mod order_handlers;
pub mod session_handlers;
