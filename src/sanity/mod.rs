pub mod client;
pub mod image;
pub mod queries;
pub mod record;
