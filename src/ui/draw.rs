//! Frame drawing for the three screens.

use super::app::{App, IntakeFocus, PreviewButton};
use super::field_renderer::{button_width, draw_field, field_height, render_button, BUTTON_HEIGHT};
use crate::prompts::EXAMPLE_DESCRIPTIONS;
use crate::render::{RenderedForm, WidgetKind};
use crate::session::{PreviewView, Stage};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};

/// Draw the whole UI for the current stage.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(Span::styled(
        " Create a form with AI ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(header, chunks[0]);

    if app.showing_splash() {
        draw_splash(frame, chunks[1]);
    } else if app.is_working() {
        draw_working(frame, chunks[1]);
    } else {
        match app.stage() {
            Stage::Intake => draw_intake(frame, chunks[1], app),
            Stage::Preview => draw_preview(frame, chunks[1], app),
            Stage::Fill => draw_fill(frame, chunks[1], app),
        }
    }

    draw_status(frame, chunks[2], app);
}

fn draw_splash(frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Min(0),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "Nextgen Forms",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[1]);

    let tagline = Paragraph::new("AI powered forms for all").alignment(Alignment::Center);
    frame.render_widget(tagline, chunks[2]);

    let label = "Let's get started";
    let width = button_width(label).min(chunks[3].width);
    let button_area = Rect {
        x: chunks[3].x + (chunks[3].width - width) / 2,
        width,
        ..chunks[3]
    };
    render_button(frame, button_area, label, true, true);
}

fn draw_working(frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    let text = Paragraph::new("Working…")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, chunks[1]);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.status() {
        Some(status) => {
            let color = if status.is_error { Color::Red } else { Color::Green };
            Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(help_text(app), Style::default().fg(Color::DarkGray))),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn help_text(app: &App) -> &'static str {
    if app.is_working() {
        return "Ctrl+C: quit";
    }
    if app.showing_splash() {
        return "Enter: start  Esc: quit";
    }
    match app.stage() {
        Stage::Intake => "Tab: next  Enter: generate / copy / continue  Esc: quit",
        Stage::Preview => "Tab: switch button  Enter: press  Esc: try again",
        Stage::Fill => "Tab: next field  Enter: next / submit  Ctrl+C: quit",
    }
}

// ── Intake ───────────────────────────────────────────────────────────────

fn draw_intake(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                       // Image path
            Constraint::Length(6),                                       // Description
            Constraint::Length(EXAMPLE_DESCRIPTIONS.len() as u16 * 3 + 3), // Examples
            Constraint::Length(BUTTON_HEIGHT),                           // Continue
            Constraint::Min(0),
        ])
        .margin(1)
        .split(area);

    let focus = app.intake.focus;

    draw_field(
        frame,
        chunks[0],
        "Upload an image (path or URL to png, jpg, jpeg)",
        &app.intake.image_path,
        WidgetKind::SingleLine,
        focus == IntakeFocus::ImagePath,
        false,
    );

    let count = app.intake.description.chars().count();
    draw_field(
        frame,
        chunks[1],
        &format!(
            "Describe your form in words ({}/{})",
            count,
            app.max_description_chars()
        ),
        &app.intake.description,
        WidgetKind::MultiLine,
        focus == IntakeFocus::Description,
        false,
    );

    draw_examples(frame, chunks[2], app);

    let continue_area = Rect {
        width: button_width("Continue").min(chunks[3].width),
        ..chunks[3]
    };
    render_button(
        frame,
        continue_area,
        "Continue",
        focus == IntakeFocus::Continue,
        app.can_continue(),
    );
}

fn draw_examples(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.intake.focus == IntakeFocus::Examples;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let mut lines = vec![Line::from(Span::styled(
        "Or copy one of the examples below (Enter copies).",
        Style::default().fg(Color::DarkGray),
    ))];
    for (i, example) in EXAMPLE_DESCRIPTIONS.iter().enumerate() {
        let selected = focused && i == app.intake.selected_example;
        let style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let marker = if selected { "▸ " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(*example, style),
        ]));
    }

    let block = Block::default()
        .title(" Examples ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

// ── Preview ──────────────────────────────────────────────────────────────

fn draw_preview(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(BUTTON_HEIGHT)])
        .margin(1)
        .split(area);

    let has_form = match app.preview() {
        Ok(PreviewView::Form(form)) => {
            draw_form_preview(frame, chunks[0], &form);
            true
        }
        Ok(PreviewView::Refusal { message, .. }) => {
            draw_warning(frame, chunks[0], message);
            false
        }
        Ok(PreviewView::Empty) => {
            draw_warning(frame, chunks[0], "Nothing has been generated yet.");
            false
        }
        Err(e) => {
            draw_warning(frame, chunks[0], &e.to_string());
            false
        }
    };

    let selected = if has_form {
        app.preview_button()
    } else {
        PreviewButton::TryAgain
    };
    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(button_width("Try Again")),
            Constraint::Length(1),
            Constraint::Length(button_width("Fill Form")),
            Constraint::Min(0),
        ])
        .split(chunks[1]);
    render_button(
        frame,
        buttons[0],
        "Try Again",
        selected == PreviewButton::TryAgain,
        true,
    );
    if has_form {
        render_button(
            frame,
            buttons[2],
            "Fill Form",
            selected == PreviewButton::FillForm,
            true,
        );
    }
}

fn draw_warning(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let text = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(text, area);
}

fn draw_form_preview(frame: &mut Frame, area: Rect, form: &RenderedForm) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);
    let intro = Paragraph::new(
        "Here is a preview of a form built based on your input. \
         If you want to fill out this form then choose Fill Form below.",
    )
    .style(Style::default().fg(Color::DarkGray))
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, chunks[0]);

    let values = vec![String::new(); form.widgets.len()];
    draw_form_body(frame, chunks[1], form, &values, None);
}

/// Title, description and widgets inside a bordered block.
fn draw_form_body(frame: &mut Frame, area: Rect, form: &RenderedForm, values: &[String], active: Option<usize>) {
    let block = Block::default()
        .title(format!(" {} ", form.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(form.description.clone()).style(Style::default().fg(Color::Gray)),
        chunks[0],
    );

    // Scroll so the active widget stays visible.
    let mut first = 0;
    if let Some(active) = active {
        let budget = chunks[1].height;
        while first < active {
            let used: u16 = form.widgets[first..=active]
                .iter()
                .map(|w| field_height(w.kind))
                .sum();
            if used <= budget {
                break;
            }
            first += 1;
        }
    }

    let mut y = chunks[1].y;
    let bottom = chunks[1].y + chunks[1].height;
    for (i, widget) in form.widgets.iter().enumerate().skip(first) {
        let height = field_height(widget.kind);
        if y + height > bottom {
            break;
        }
        let field_area = Rect {
            x: chunks[1].x,
            y,
            width: chunks[1].width,
            height,
        };
        draw_field(
            frame,
            field_area,
            &widget.label,
            values.get(i).map(String::as_str).unwrap_or(""),
            widget.kind,
            active == Some(i),
            widget.disabled,
        );
        y += height;
    }
}

// ── Fill ─────────────────────────────────────────────────────────────────

fn draw_fill(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(submission) = app.submission() {
        draw_submission(frame, area, submission);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(BUTTON_HEIGHT),
        ])
        .margin(1)
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Fill out the Form",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );

    if let Some(live) = app.live_form() {
        let values: Vec<String> = (0..live.widgets().len())
            .map(|i| live.value_at(i).unwrap_or_default().to_string())
            .collect();
        let active = (!app.submit_focused()).then(|| live.active());
        draw_form_body(frame, chunks[1], live.form(), &values, active);
    }

    let submit_area = Rect {
        width: button_width("Submit").min(chunks[2].width),
        ..chunks[2]
    };
    render_button(frame, submit_area, "Submit", app.submit_focused(), true);
}

fn draw_submission(frame: &mut Frame, area: Rect, submission: &crate::schema::FormSubmission) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(BUTTON_HEIGHT),
        ])
        .margin(1)
        .split(area);

    let info = Paragraph::new(vec![
        Line::from(Span::styled(
            "Thank you for your response.",
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled("Your response", Style::default().fg(Color::Green))),
    ]);
    frame.render_widget(info, chunks[0]);

    let rows: Vec<Row> = submission
        .iter()
        .map(|(label, value)| Row::new(vec![label.to_string(), value.to_string()]))
        .collect();
    let table = Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)])
        .header(
            Row::new(vec!["Field", "Value"]).style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, chunks[1]);

    let start_area = Rect {
        width: button_width("Start Over").min(chunks[2].width),
        ..chunks[2]
    };
    render_button(frame, start_area, "Start Over", true, true);
}
