pub mod app;
pub mod deserializers;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod quiz;
mod routes;
