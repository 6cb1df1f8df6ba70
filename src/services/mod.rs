pub mod preferences;
pub mod ranking;
pub mod recommendations;
