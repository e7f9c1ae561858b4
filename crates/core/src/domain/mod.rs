pub mod build;
pub mod component;
pub mod profile;
pub mod query;
