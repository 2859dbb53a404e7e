pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod fees;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod sheet;
