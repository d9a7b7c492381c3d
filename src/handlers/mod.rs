pub mod auth;
pub mod health;
pub mod profiles;
pub mod programs;
pub mod settings;
pub mod workouts;
