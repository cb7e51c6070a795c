pub mod rows;
pub mod schema;
pub mod store;
