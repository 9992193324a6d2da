pub mod api_connection;
pub mod cli;
pub mod config;
pub mod errors;
pub mod ingredient;
pub mod ingredient_builder;
pub mod label;
pub mod nutrient_keys;
pub mod recipe_aggregator;
pub mod recipe_parser;
pub mod service;
pub mod units;
