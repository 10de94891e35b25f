pub mod clock;
pub mod db;
pub mod demo;
pub mod domain;
pub mod error;
pub mod filter;
pub mod forms;
pub mod stats;
pub mod store;
pub mod transitions;
pub mod views;
pub mod workspace;
