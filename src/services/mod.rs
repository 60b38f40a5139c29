pub mod auth;
pub mod error;
pub mod session;
pub mod store;
pub mod subtitles;
