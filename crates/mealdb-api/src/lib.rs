pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod detail;
pub mod error;
pub mod meal;
pub mod tui;
pub mod view;

use std::sync::Arc;

pub use cli::{
    execute_search, execute_show, execute_suggest, run_search, run_suggest, SearchArgs, ShowArgs,
    SuggestArgs,
};
pub use client::{MealApi, MealDbClient};
pub use config::Config;
pub use controller::{QueryController, SearchState};
pub use detail::fetch_detail;
pub use error::{ApiError, DetailError, SearchError};
pub use meal::{detail_route, Ingredient, Meal};
pub use view::{MealDetailDisplay, ResultCard, SearchView};

/// HTTP client for `config.api_url`, shared by the workers
pub fn build_client(config: &Config) -> Result<Arc<dyn MealApi>, ApiError> {
    Ok(Arc::new(MealDbClient::new(config)?))
}
