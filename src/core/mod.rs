pub mod app;
pub mod completion;
pub mod config;
pub mod history;
pub mod markup;
pub mod message;
pub mod paths;
pub mod render;
