//! UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, StatefulWidget, Wrap},
    Frame,
};

use super::app::{App, DetailPane, Focus};
use crate::view::{MealDetailDisplay, SearchView};

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let view = app.view();

    // Main horizontal split: left (search + results) and right (recipe)
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(frame.area());

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Search input
            Constraint::Length(1), // Loading / error / result count
            Constraint::Min(4),    // Suggestions or results
            Constraint::Length(1), // Shortcuts, or the current toast
        ])
        .split(main_chunks[0]);

    render_search_input(frame, app, left_chunks[0]);
    render_status_line(frame, app, &view, left_chunks[1]);
    if view.show_suggestions() {
        render_suggestions(frame, app, &view, left_chunks[2]);
    } else {
        render_results(frame, app, &view, left_chunks[2]);
    }
    render_status_bar(frame, app, left_chunks[3]);

    render_detail_panel(frame, app, main_chunks[1]);
}

/// Search input; the terminal cursor sits at the edit position
fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let prompt = Span::styled(
        "› ",
        Style::default().fg(if app.focus == Focus::Input {
            Color::Yellow
        } else {
            Color::DarkGray
        }),
    );

    let line = if app.input.text.is_empty() {
        Line::from(vec![
            prompt,
            Span::styled("Search for a meal...", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![prompt, Span::raw(app.input.text.as_str())])
    };
    frame.render_widget(Paragraph::new(line), area);

    if app.focus == Focus::Input {
        let offset = Span::raw(&app.input.text[..app.input.cursor]).width() as u16;
        let x = (area.x + 2 + offset).min(area.right().saturating_sub(1));
        frame.set_cursor_position((x, area.y));
    }
}

/// Loading indicator, error message, or result count
fn render_status_line(frame: &mut Frame, app: &App, view: &SearchView, area: Rect) {
    let line = if view.loading {
        Line::from(Span::styled(
            format!("  {} Searching...", app.spinner()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::DIM),
        ))
    } else if let Some(ref error) = view.error {
        Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(Color::Red),
        ))
    } else if view.show_results() {
        let count = view.results.len();
        Line::from(Span::styled(
            format!("  {} {}", count, if count == 1 { "result" } else { "results" }),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::default()
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_suggestions(frame: &mut Frame, app: &mut App, view: &SearchView, area: Rect) {
    let selected_index = if app.focus == Focus::Suggestions {
        app.suggestion_list.selected()
    } else {
        None
    };

    let items: Vec<ListItem> = view
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let style = if selected_index == Some(i) {
                Style::default()
                    .fg(Color::Yellow)
                    .bg(Color::Rgb(38, 38, 38))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled("  ", Style::default()),
                Span::styled(name.clone(), style),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Suggestions ");

    let list = List::new(items).block(block);
    StatefulWidget::render(list, area, frame.buffer_mut(), &mut app.suggestion_list);
}

fn render_results(frame: &mut Frame, app: &mut App, view: &SearchView, area: Rect) {
    let selection_bg = Color::Rgb(38, 38, 38);
    let selected_index = app.result_list.selected();
    let focused = app.focus == Focus::Results;

    let items: Vec<ListItem> = view
        .results
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let is_selected = focused && selected_index == Some(i);

            let base_style = if is_selected {
                Style::default().bg(selection_bg)
            } else {
                Style::default()
            };

            let prefix_style = if is_selected {
                Style::default().fg(Color::LightRed).bg(selection_bg)
            } else {
                Style::default()
            };

            let item = ListItem::new(card.to_tui_lines(is_selected, base_style, prefix_style));
            if is_selected {
                item.style(Style::default().bg(selection_bg))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items);
    StatefulWidget::render(list, area, frame.buffer_mut(), &mut app.result_list);
}

fn render_detail_panel(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_color = if app.focus == Focus::Detail {
        Color::Yellow
    } else {
        Color::Gray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(border_color).add_modifier(Modifier::DIM))
        .title(" Recipe ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Add 2 char left padding
    let padded = Rect {
        x: inner.x + 2,
        y: inner.y,
        width: inner.width.saturating_sub(2),
        height: inner.height,
    };

    // We keep showing old details while new ones load to avoid flicker
    match app.detail {
        DetailPane::Loaded(ref meal) => {
            let lines = detail_lines(&MealDetailDisplay::from_meal(meal));
            let last_line = lines.len().saturating_sub(1) as u16;
            app.detail_scroll = app.detail_scroll.min(last_line);
            let para = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((app.detail_scroll, 0));
            frame.render_widget(para, padded);
        }
        DetailPane::Failed(ref message) => {
            let para = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center);
            frame.render_widget(para, inner);
        }
        DetailPane::Empty => {
            let text = if app.is_loading_details() {
                "Loading..."
            } else {
                "No meal selected"
            };
            let para = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(para, inner);
        }
    }
}

fn detail_lines(display: &MealDetailDisplay) -> Vec<Line<'static>> {
    let label_style = Style::default().fg(Color::Cyan);
    let dim_style = Style::default().fg(Color::DarkGray);
    let heading_style = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled(
            display.name.clone(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    for (label, value) in display.fields() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", label), label_style),
            Span::raw(value),
        ]));
    }

    if !display.ingredients.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Ingredients", heading_style)));
        for ingredient in &display.ingredients {
            lines.push(Line::from(vec![
                Span::styled("• ", dim_style),
                Span::raw(ingredient.clone()),
            ]));
        }
    }

    if !display.steps.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Instructions", heading_style)));
        for (i, step) in display.steps.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), dim_style),
                Span::raw(step.clone()),
            ]));
        }
    }

    lines
}

/// Shortcuts for the focused pane; a live toast takes the line over
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);

    if let Some(ref toast) = app.toast {
        let color = if toast.is_error { Color::Red } else { Color::Blue };
        let line = Line::from(vec![
            Span::styled("  ", dim),
            Span::styled(toast.message.as_str(), Style::default().fg(color)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let hints: &[&str] = match app.focus {
        Focus::Input => &["⏎ search", "↓ browse", "esc quit"],
        Focus::Suggestions => &["⏎ search", "↑↓ move", "esc back"],
        Focus::Results => &["⏎ recipe", "↑↓ move", "^o source", "^y video", "^l copy"],
        Focus::Detail => &["↑↓ scroll", "^o source", "^y video", "^l copy", "esc back"],
    };

    let text = format!("  {}", hints.join(" · "));
    frame.render_widget(Paragraph::new(Span::styled(text, dim)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::FixtureApi;
    use crate::config::Config;
    use crate::tui::Toast;
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::Duration;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn settle(app: &mut App) {
        app.tick();
        assert!(app.controller.wait_until_settled(Duration::from_secs(5)));
        app.tick();
    }

    fn draw(app: &mut App) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buf = terminal.backend().buffer();
        buf.content
            .chunks(buf.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        App::new(Arc::new(FixtureApi), &Config::default())
    }

    #[test]
    fn test_empty_submit_shows_validation_error() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        app.tick();
        let screen = draw(&mut app);
        assert!(screen.contains("Enter a valid meal name."));
        assert!(screen.contains("No meal selected"));
    }

    #[test]
    fn test_suggestions_then_results() {
        let mut app = app();
        type_text(&mut app, "Arr");
        settle(&mut app);
        let screen = draw(&mut app);
        assert!(screen.contains("Suggestions"));
        assert!(screen.contains("Spicy Arrabiata Penne"));

        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus, Focus::Suggestions);
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        let screen = draw(&mut app);
        assert!(!screen.contains("Suggestions"));
        assert!(screen.contains("1 result"));
        assert!(screen.contains("Vegetarian · Italian"));
    }

    #[test]
    fn test_not_found_message() {
        let mut app = app();
        type_text(&mut app, "zzz");
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        let screen = draw(&mut app);
        assert!(screen.contains("No meals found with that name."));
    }

    #[test]
    fn test_enter_on_result_scrolls_recipe_instead_of_searching() {
        let mut app = app();
        type_text(&mut app, "arrabiata");
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !matches!(app.detail, DetailPane::Loaded(_)) {
            assert!(std::time::Instant::now() < deadline, "recipe never loaded");
            std::thread::sleep(Duration::from_millis(5));
            app.tick();
        }

        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus, Focus::Results);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focus, Focus::Detail);
        assert!(app.controller.is_settled());
        assert!(!app.controller.state().loading);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.detail_scroll, 2);
        assert!(draw(&mut app).contains("Serve."));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::Results);
    }

    #[test]
    fn test_toast_replaces_shortcuts() {
        let mut app = app();
        let screen = draw(&mut app);
        assert!(screen.contains("⏎ search"));

        app.toast = Some(Toast::error(
            "No video for this meal".to_string(),
            Duration::from_secs(5),
        ));
        let screen = draw(&mut app);
        assert!(screen.contains("No video for this meal"));
        assert!(!screen.contains("⏎ search"));
    }
}
