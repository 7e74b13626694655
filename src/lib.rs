pub mod error;
pub mod fetch;
pub mod index;
pub mod output;
pub mod parser;
pub mod predict;
pub mod query;
pub mod schema;
pub mod service;
