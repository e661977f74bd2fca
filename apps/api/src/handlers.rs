pub mod content_types;
pub mod health;
pub mod queries;
