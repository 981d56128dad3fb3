//! Cleaning, reshaping and merging of Gapminder-style wide tables.
//!
//! The viewer binary and the `preprocess` tool both sit on top of
//! [`data::pipeline::run`] and [`data::cache::DatasetCache`].

pub mod config;
pub mod data;
