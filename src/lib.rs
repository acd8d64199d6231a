pub mod config;
pub mod error;
pub mod export;
pub mod matchups;
pub mod reference;
pub mod schema;
pub mod state;
pub mod store;
