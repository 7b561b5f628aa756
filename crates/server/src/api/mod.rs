pub mod handlers;
pub mod middleware;
pub mod monitors;
pub mod routes;

pub use routes::create_router;
