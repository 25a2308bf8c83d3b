use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketGrid, BracketView};
use crate::state::app_state::NotificationKind;
use crate::state::worker::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use bracket_engine::{Bracket, Round, Slot};

static TABS: &[&str; 2] = &["Bracket", "Saved"];

const CHAMPION_PANEL_WIDTH: u16 = 28;
const LOG_PANE_HEIGHT: u16 = 10;

const HELP_TEXT: &str = "\
Tabs        1 bracket   2 saved   ? help   Esc back   \" logs   f full screen   q quit

Bracket     n new bracket          e toggle edit/view mode
            h/l  ←/→ round         j/k  ↑/↓ matchup
            a / b  assign home / away team (type to filter, Enter pick, Del clear)
            A / B  home / away wins the series
            + / -  home score      ] / [  away score
            c clear winner         s save        x export JSON

Saved       j/k move   Enter load   d delete   r refresh";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        let mut main = layout.main;
        if app.state.show_logs && main.height > LOG_PANE_HEIGHT * 2 {
            let [top, logs] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(LOG_PANE_HEIGHT)]).areas(main);
            draw_logs(f, logs);
            main = top;
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, main, app),
            MenuItem::Saved => draw_saved(f, main, app),
            MenuItem::Help => draw_placeholder(f, main, HELP_TEXT),
        }

        draw_status(f, layout.status, app);
        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Bracket => 0,
        MenuItem::Saved => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &mut App) {
    let Some(bracket) = app.state.editor.bracket.as_ref() else {
        draw_placeholder(f, area, "No bracket open.\n\nPress n to start one, or 2 to load a saved bracket.");
        return;
    };

    let dirty = if app.state.editor.dirty { " *" } else { "" };
    let block = default_border(Color::White).title(format!(" {} ({}){dirty} ", bracket.name, bracket.year));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, content] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    let mode = if app.state.edit_mode {
        Span::styled("EDIT", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("VIEW", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            mode,
            Span::raw(format!(
                "  {} | {}/15 series decided",
                app.state.editor.view_round.label(),
                bracket.decided_count()
            )),
        ])),
        header,
    );

    let mut bracket_area = content;
    if content.width >= 4 * 12 + CHAMPION_PANEL_WIDTH {
        let [left, right] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(CHAMPION_PANEL_WIDTH)]).areas(content);
        draw_champion_panel(f, right, bracket);
        bracket_area = left;
    }

    let grid = BracketGrid::compute(bracket_area.width);
    let editor = &app.state.editor;
    let scroll_offset = grid.scroll_to(
        editor.view_round,
        editor.selected,
        editor.scroll_offset,
        bracket_area.height,
    );
    let rounds = Round::ALL.map(|round| bracket.matchups_in_round(round));
    f.render_widget(
        BracketView {
            rounds,
            grid: &grid,
            selected_round: editor.view_round,
            selected_position: editor.selected,
            scroll_offset,
        },
        bracket_area,
    );
    app.state.editor.scroll_offset = scroll_offset;

    if app.state.picker.open {
        draw_team_picker(f, area, app);
    }
}

fn draw_champion_panel(f: &mut Frame, area: Rect, bracket: &Bracket) {
    let block = default_border(Color::DarkGray).title(" Champion ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = Vec::new();
    match &bracket.champion {
        Some(team) => {
            lines.push(Line::from(Span::styled(
                team.name.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(format!("{} | {}", team.abbreviation, team.conference.label())));
        }
        None => lines.push(Line::from(Span::styled("TBD", Style::default().fg(Color::DarkGray)))),
    }
    lines.push(Line::from(""));

    if let Some(finals) = bracket.finals() {
        lines.push(Line::from(Span::styled("Finals", Style::default().fg(Color::Gray))));
        for slot in [Slot::Home, Slot::Away] {
            let name = finals.team(slot).map_or("TBD", |t| t.abbreviation.as_str());
            let score = finals.score(slot).map_or("-".to_string(), |s| s.to_string());
            lines.push(Line::from(format!("  {name:<4} {score}")));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Updated {}", bracket.updated_at.format("%Y-%m-%d %H:%M")),
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_team_picker(f: &mut Frame, area: Rect, app: &App) {
    let Some(roster) = app.state.roster.as_ref() else {
        return;
    };
    let picker = &app.state.picker;
    let side = match picker.slot {
        Slot::Home => "home",
        Slot::Away => "away",
    };

    let popup = popup_area(area, 44, 22);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Yellow).title(format!(" Assign {side} team "));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let [search, list_area, hint] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    f.render_widget(Paragraph::new(format!("Search: {}_", picker.query)), search);

    let candidates = picker.candidates(roster);
    if candidates.is_empty() {
        f.render_widget(
            Paragraph::new("No teams match")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            list_area,
        );
    } else {
        let items: Vec<ListItem> = candidates
            .iter()
            .map(|t| {
                let seed = t.seed.map_or("-".to_string(), |s| s.to_string());
                ListItem::new(format!("{:>2} {:<4} {}", seed, t.abbreviation, t.name))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(picker.cursor));
        f.render_stateful_widget(list, list_area, &mut state);
    }

    f.render_widget(
        Paragraph::new("Enter pick  Del clear  Esc close").style(Style::default().fg(Color::DarkGray)),
        hint,
    );
}

fn draw_saved(f: &mut Frame, area: Rect, app: &App) {
    let saved = &app.state.saved;
    if saved.brackets.is_empty() {
        draw_placeholder(f, area, "No saved brackets yet.\n\nPress s on the Bracket tab to save one.");
        return;
    }

    let block = default_border(Color::White).title(format!(" Saved brackets ({}) ", saved.brackets.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let items: Vec<ListItem> = saved
        .brackets
        .iter()
        .map(|b| {
            let champion = b.champion.as_deref().unwrap_or("TBD");
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<32} {} ", b.name, b.year)),
                Span::styled(format!("{:>2}/15  ", b.decided), Style::default().fg(Color::Gray)),
                Span::styled(format!("{champion:<4} "), Style::default().fg(Color::Green)),
                Span::styled(
                    b.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(saved.selected));
    f.render_stateful_widget(list, inner, &mut state);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.state.notification {
        Some(note) => {
            let color = match note.kind {
                NotificationKind::Info => Color::Gray,
                NotificationKind::Success => Color::Green,
                NotificationKind::Error => Color::Red,
            };
            Paragraph::new(note.message.as_str()).style(Style::default().fg(color))
        }
        None => {
            let hints = match app.state.active_tab {
                MenuItem::Bracket if app.state.picker.open => "type to filter  ↑/↓ move  Enter pick  Esc close",
                MenuItem::Bracket => "h/l round  j/k matchup  a/b team  A/B winner  +/- ]/[ score  s save  ?=help",
                MenuItem::Saved => "j/k move  Enter load  d delete  r refresh",
                MenuItem::Help => "Esc back",
            };
            Paragraph::new(hints).style(Style::default().fg(Color::DarkGray))
        }
    };
    f.render_widget(line, area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

/// Centered rectangle no larger than `area`.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered_and_clamped() {
        let area = Rect::new(0, 3, 100, 30);
        assert_eq!(popup_area(area, 40, 10), Rect::new(30, 13, 40, 10));
        assert_eq!(popup_area(Rect::new(0, 0, 20, 8), 40, 10), Rect::new(0, 0, 20, 8));
    }
}
