pub mod automation;
pub mod chrome;
