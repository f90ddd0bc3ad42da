pub mod data_path;
pub mod graphql;
pub mod suggest;
