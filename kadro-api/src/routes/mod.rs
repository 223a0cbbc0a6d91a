/// Request handlers, grouped per resource

pub mod assets;
pub mod auth;
pub mod health;
pub mod profile;
pub mod uploads;
