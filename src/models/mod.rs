pub mod profile;
pub mod program;
pub mod settings;
pub mod user;
pub mod workout;
