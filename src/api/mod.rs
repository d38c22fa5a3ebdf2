pub mod fault;
pub mod handlers;
pub mod middleware;
pub mod routes;
