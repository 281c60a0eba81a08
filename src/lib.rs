pub mod benchmark;
pub mod config;
pub mod dataset_split;
pub mod errors;
pub mod kmeans;
pub mod knn;
pub mod metadata;
pub mod schema;
pub mod solstice;
pub mod split_summary;
pub mod strategies;
pub mod types;
