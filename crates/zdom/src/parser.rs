//! XML parsing driver module

pub mod builder;
pub mod config;
pub mod driver;
pub mod event;

pub use builder::TreeBuilder;
pub use config::Config;
pub use driver::Parser;
pub use event::Event;
