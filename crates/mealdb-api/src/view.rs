//! Rendering of controller state (shared between TUI and CLI)

use crate::controller::SearchState;
use crate::meal::{detail_route, Meal};
use colored::Colorize;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// What to show for a given [`SearchState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    pub loading: bool,
    pub error: Option<String>,
    pub suggestions: Vec<String>,
    pub results: Vec<ResultCard>,
}

impl SearchView {
    pub fn from_state(state: &SearchState) -> Self {
        Self {
            loading: state.loading,
            error: state.error.clone(),
            suggestions: state.suggestions.iter().map(|m| m.name.clone()).collect(),
            results: state.results.iter().map(ResultCard::from_meal).collect(),
        }
    }

    pub fn show_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub fn show_results(&self) -> bool {
        !self.results.is_empty()
    }
}

/// A search result as a card: enough to display it and to route to its detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
}

impl ResultCard {
    pub fn from_meal(meal: &Meal) -> Self {
        Self {
            id: meal.id.clone(),
            name: meal.name.clone(),
            thumbnail: meal.thumbnail.clone(),
            category: meal.category.clone(),
            area: meal.area.clone(),
        }
    }

    pub fn route(&self) -> String {
        detail_route(&self.id)
    }

    /// "Category · Area", skipping whatever the API left out
    pub fn subtitle(&self) -> String {
        [self.category.as_deref(), self.area.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ")
    }

    /// Render to CLI output using colored crate
    pub fn to_cli_lines(&self) -> Vec<String> {
        let mut lines = vec![self.name.green().bold().to_string()];
        let subtitle = self.subtitle();
        if !subtitle.is_empty() {
            lines.push(format!("  {}", subtitle.dimmed()));
        }
        lines.push(format!("  {}", self.route().cyan()));
        lines
    }

    /// Render to ratatui Lines for TUI
    pub fn to_tui_lines(
        &self,
        is_selected: bool,
        base_style: Style,
        prefix_style: Style,
    ) -> Vec<Line<'static>> {
        let prefix = if is_selected { "▌" } else { " " };

        let name_style = if is_selected {
            base_style.fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            base_style.fg(Color::Green)
        };

        vec![
            Line::from(vec![
                Span::styled(prefix.to_string(), prefix_style),
                Span::styled(" ".to_string(), base_style),
                Span::styled(self.name.clone(), name_style),
            ]),
            Line::from(vec![
                Span::styled(prefix.to_string(), prefix_style),
                Span::styled("   ".to_string(), base_style),
                Span::styled(self.subtitle(), base_style.fg(Color::DarkGray)),
            ]),
        ]
    }
}

/// Full recipe layout for the detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealDetailDisplay {
    pub name: String,
    pub category: Option<String>,
    pub area: Option<String>,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub thumbnail: Option<String>,
    pub youtube: Option<String>,
    pub source: Option<String>,
}

impl MealDetailDisplay {
    pub fn from_meal(meal: &Meal) -> Self {
        let ingredients = meal
            .ingredients
            .iter()
            .map(|i| match i.measure.as_deref() {
                Some(measure) => format!("{} - {}", i.name, measure),
                None => i.name.clone(),
            })
            .collect();

        Self {
            name: meal.name.clone(),
            category: meal.category.clone(),
            area: meal.area.clone(),
            tags: meal.tags.clone(),
            ingredients,
            steps: meal
                .instruction_steps()
                .into_iter()
                .map(String::from)
                .collect(),
            thumbnail: meal.thumbnail.clone(),
            youtube: meal.youtube.clone(),
            source: meal.source.clone(),
        }
    }

    /// Labelled header fields, in display order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(ref category) = self.category {
            fields.push(("Category", category.clone()));
        }
        if let Some(ref area) = self.area {
            fields.push(("Area", area.clone()));
        }
        if !self.tags.is_empty() {
            fields.push(("Tags", self.tags.join(", ")));
        }
        if let Some(ref url) = self.thumbnail {
            fields.push(("Image", url.clone()));
        }
        if let Some(ref url) = self.youtube {
            fields.push(("Video", url.clone()));
        }
        if let Some(ref url) = self.source {
            fields.push(("Source", url.clone()));
        }
        fields
    }

    /// `with_ingredients` is false for the compact single-result view
    pub fn to_cli_lines(&self, with_ingredients: bool) -> Vec<String> {
        let mut lines = vec![self.name.bold().to_string()];

        for (label, value) in self.fields() {
            lines.push(format!("{} {}", format!("{label}:").cyan(), value));
        }

        if with_ingredients && !self.ingredients.is_empty() {
            lines.push(String::new());
            lines.push("Ingredients".bold().to_string());
            for ingredient in &self.ingredients {
                lines.push(format!("  • {}", ingredient));
            }
        }

        if !self.steps.is_empty() {
            lines.push(String::new());
            lines.push("Instructions".bold().to_string());
            for (i, step) in self.steps.iter().enumerate() {
                lines.push(format!("  {}. {}", i + 1, step));
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::FetchResponse;
    use crate::meal::tests::arrabiata;

    #[test]
    fn test_view_of_empty_state() {
        let view = SearchView::from_state(&SearchState::default());
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert!(!view.show_suggestions());
        assert!(!view.show_results());
    }

    #[test]
    fn test_view_while_loading() {
        let mut state = SearchState::default();
        state.begin_search(Some("Arrabiata")).unwrap();
        let view = SearchView::from_state(&state);
        assert!(view.loading);
        assert!(!view.show_results());
    }

    #[test]
    fn test_view_after_commit_hides_suggestions() {
        let mut state = SearchState::default();
        let s = state.change_query("arr", 2).unwrap();
        state.apply_suggestions(
            FetchResponse {
                id: s.id,
                result: Ok(vec![arrabiata()]),
            },
            5,
        );
        let view = SearchView::from_state(&state);
        assert_eq!(view.suggestions, vec!["Spicy Arrabiata Penne"]);
        assert!(!view.show_results());

        let req = state.begin_search(Some(view.suggestions[0].as_str())).unwrap();
        state.apply_search(FetchResponse {
            id: req.id,
            result: Ok(vec![arrabiata()]),
        });
        let view = SearchView::from_state(&state);
        assert!(!view.show_suggestions());
        assert_eq!(view.results.len(), 1);
        assert_eq!(view.results[0].route(), "/recipe-details/52771");
    }

    #[test]
    fn test_result_card_cli_lines() {
        colored::control::set_override(false);
        let card = ResultCard::from_meal(&arrabiata());
        insta::assert_snapshot!(card.to_cli_lines().join("\n"), @r"
Spicy Arrabiata Penne
  Vegetarian · Italian
  /recipe-details/52771
");
    }

    #[test]
    fn test_subtitle_skips_missing_parts() {
        let mut card = ResultCard::from_meal(&arrabiata());
        card.category = None;
        assert_eq!(card.subtitle(), "Italian");
        card.area = None;
        assert_eq!(card.subtitle(), "");
    }

    #[test]
    fn test_detail_cli_lines() {
        colored::control::set_override(false);
        let mut meal = arrabiata();
        meal.thumbnail = None;
        meal.youtube = None;
        let detail = MealDetailDisplay::from_meal(&meal);
        insta::assert_snapshot!(detail.to_cli_lines(true).join("\n"), @r"
Spicy Arrabiata Penne
Category: Vegetarian
Area: Italian
Tags: Pasta, Curry

Ingredients
  • penne rigate - 1 pound
  • olive oil - 1/4 cup
  • basil

Instructions
  1. Bring a large pot of water to a boil.
  2. Add the penne.
  3. Serve.
");
    }

    #[test]
    fn test_compact_detail_omits_ingredients() {
        colored::control::set_override(false);
        let detail = MealDetailDisplay::from_meal(&arrabiata());
        let lines = detail.to_cli_lines(false);
        assert!(!lines.iter().any(|l| l == "Ingredients"));
        assert!(lines.iter().any(|l| l == "Instructions"));
    }
}
