pub mod account;
pub mod params;
