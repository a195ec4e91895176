pub mod remote;
pub mod services;
