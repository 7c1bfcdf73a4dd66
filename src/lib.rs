#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod html;
pub mod ingredient_parser;
pub mod logging;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod session;
pub mod shopping_list;
pub mod store;
pub mod suggest;
pub mod units;

pub use app::build_app;
pub use models::AppState;
