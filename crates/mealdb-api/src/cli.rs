//! Non-interactive commands: `search`, `suggest`, `show`

use crate::client::MealApi;
use crate::config::Config;
use crate::controller::{FetchResponse, SearchState};
use crate::detail::fetch_detail;
use crate::error::SearchError;
use crate::meal::Meal;
use crate::view::{MealDetailDisplay, ResultCard};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use indicatif::ProgressBar;
use std::time::Duration;

#[derive(Args, Debug)]
#[command(about = "Search meals by name")]
pub struct SearchArgs {
    /// Meal name (or part of it)
    pub term: String,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Show only the first match, as a recipe
    #[arg(long)]
    pub first: bool,
}

#[derive(Args, Debug)]
#[command(about = "Show the suggestions offered while typing")]
pub struct SuggestArgs {
    pub text: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
#[command(about = "Show the full recipe for a meal id")]
pub struct ShowArgs {
    /// TheMealDB meal id, e.g. 52771
    pub id: String,

    #[arg(long)]
    pub json: bool,
}

fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    let result = f();
    spinner.finish_and_clear();
    result
}

/// Run a committed search through the same state machine the TUI uses
pub fn run_search(api: &dyn MealApi, term: &str) -> Result<Vec<Meal>, SearchError> {
    let mut state = SearchState::default();
    let request = state.begin_search(Some(term))?;
    let result = api.search(&request.term);

    match state.apply_search(FetchResponse {
        id: request.id,
        result,
    }) {
        Some(Err(e)) => Err(e),
        _ => Ok(state.results),
    }
}

/// Suggestion names for `text`, empty when it is too short to look up
pub fn run_suggest(api: &dyn MealApi, text: &str, config: &Config) -> Vec<String> {
    let mut state = SearchState::default();
    let Some(request) = state.change_query(text, config.min_suggestion_chars) else {
        return Vec::new();
    };

    let result = api.search(&request.term);
    state.apply_suggestions(
        FetchResponse {
            id: request.id,
            result,
        },
        config.suggestion_limit,
    );
    state.suggestions.into_iter().map(|m| m.name).collect()
}

pub fn search_json(meals: &[Meal]) -> Result<String> {
    let json_results: Vec<serde_json::Value> = meals
        .iter()
        .map(|m| {
            serde_json::json!({
                "id": m.id,
                "name": m.name,
                "category": m.category,
                "area": m.area,
                "thumbnail": m.thumbnail,
                "route": m.detail_route(),
            })
        })
        .collect();

    Ok(serde_json::to_string_pretty(&json_results)?)
}

pub fn execute_search(args: SearchArgs, api: &dyn MealApi) -> Result<()> {
    let outcome = with_spinner(&format!("Searching for {}...", args.term), || {
        run_search(api, &args.term)
    });

    let meals = match outcome {
        Ok(meals) => meals,
        Err(SearchError::NotFound) if args.json => {
            println!("[]");
            return Ok(());
        }
        Err(SearchError::NotFound) => {
            println!("{}", SearchError::NotFound.to_string().yellow());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if args.first {
        let meal = &meals[0];
        if args.json {
            println!("{}", serde_json::to_string_pretty(meal)?);
        } else {
            for line in MealDetailDisplay::from_meal(meal).to_cli_lines(false) {
                println!("{}", line);
            }
        }
        return Ok(());
    }

    if args.json {
        println!("{}", search_json(&meals)?);
        return Ok(());
    }

    for (i, meal) in meals.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in ResultCard::from_meal(meal).to_cli_lines() {
            println!("{}", line);
        }
    }
    println!();
    println!(
        "{}",
        format!(
            "{} {}",
            meals.len(),
            if meals.len() == 1 { "meal" } else { "meals" }
        )
        .dimmed()
    );

    Ok(())
}

pub fn execute_suggest(args: SuggestArgs, api: &dyn MealApi, config: &Config) -> Result<()> {
    let names = with_spinner("Fetching suggestions...", || {
        run_suggest(api, &args.text, config)
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

pub fn execute_show(args: ShowArgs, api: &dyn MealApi) -> Result<()> {
    let meal = with_spinner(&format!("Fetching meal {}...", args.id), || {
        fetch_detail(api, &args.id)
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&meal)?);
    } else {
        for line in MealDetailDisplay::from_meal(&meal).to_cli_lines(true) {
            println!("{}", line);
        }
    }
    Ok(())
}
