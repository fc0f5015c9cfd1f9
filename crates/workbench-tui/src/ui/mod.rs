use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use workbench_client::QueryState;
use workbench_core::format::{format_date_time, interaction_message, truncate, PLACEHOLDER};
use workbench_core::time::format_local_datetime;
use workbench_core::{Interaction, InteractionQuery};

use crate::app::{App, CreateDialog, FilterDialog, Focus, Mode, UploadDialog, LIST_EMPTY};

const MESSAGE_WIDTH: usize = 120;

pub fn draw(frame: &mut Frame<'_>, app: &App, state: &QueryState) {
    let size = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(5),
        ])
        .split(size);

    render_header(frame, chunks[0], state);

    match &app.mode {
        Mode::Detail => render_detail(frame, chunks[1], app, state),
        _ => render_table(frame, chunks[1], app, state),
    }

    render_footer(frame, chunks[2], app, state);

    if app.show_help {
        render_help(frame, size);
    }

    match &app.mode {
        Mode::ModalFilters(dialog) => render_filter_dialog(frame, size, dialog),
        Mode::ModalCreate(dialog) => render_create_dialog(frame, size, dialog),
        Mode::ModalUpload(dialog) => render_upload_dialog(frame, size, dialog),
        _ => {}
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &QueryState) {
    let mut spans = vec![Span::raw(format!(
        "filters: {}",
        describe_filters(&state.query)
    ))];
    if state.loading {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "loading...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Customer Interactions");
    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn describe_filters(query: &InteractionQuery) -> String {
    let mut parts = Vec::new();
    if let Some(id) = query.customer_id {
        parts.push(format!("customer {}", id));
    }
    if let Some(id) = query.product_id {
        parts.push(format!("product {}", id));
    }
    if let Some(kind) = query.interaction_type {
        parts.push(format!("type {}", kind.label()));
    }
    if let Some(start) = query.start_date {
        parts.push(format!("from {}", format_local_datetime(start)));
    }
    if let Some(end) = query.end_date {
        parts.push(format!("to {}", format_local_datetime(end)));
    }
    if parts.is_empty() {
        "(none)".to_string()
    } else {
        parts.join(", ")
    }
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App, state: &QueryState) {
    let hint = match app.mode {
        Mode::List => "j/k move  enter detail  n/p page  / filter  c reset  a add  u upload  r refresh  ? help",
        Mode::Detail => "esc back  j/k move  ? help",
        Mode::ModalCreate(_) => "tab next  shift+tab prev  enter select  ctrl+n set now  esc cancel",
        _ => "tab next  shift+tab prev  enter select  esc cancel",
    };

    let data = &state.data;
    let mut first = vec![
        Span::styled(hint, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(
            format!(
                "Page {} of {} ({} total)",
                data.display_number(),
                data.total_pages,
                data.total_elements
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(status) = &app.status {
        first.push(Span::raw("  "));
        first.push(Span::styled(
            status.clone(),
            Style::default().fg(Color::Green),
        ));
    }

    let mut lines = vec![Line::from(first)];
    if let Some(err) = &state.error {
        lines.push(Line::from(Span::styled(
            format!("load failed: {}", err),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(err) = &app.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_table(frame: &mut Frame<'_>, area: Rect, app: &App, state: &QueryState) {
    let block = Block::default().borders(Borders::ALL).title("Interactions");
    if state.data.content.is_empty() {
        let text = if state.loading { "Loading..." } else { LIST_EMPTY };
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(["When", "Customer", "Product", "Type", "Rating", "Message"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = state.data.content.iter().map(interaction_row).collect();
    let widths = [
        Constraint::Length(17),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Min(20),
    ];

    let mut table_state = TableState::default().with_selected(Some(app.selected));
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");

    frame.render_stateful_widget(table, area, &mut table_state);
}

fn interaction_row(interaction: &Interaction) -> Row<'static> {
    let rating = interaction
        .customer_rating
        .map(|rating| rating.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    Row::new(vec![
        Cell::from(format_date_time(Some(&interaction.interaction_date))),
        Cell::from(interaction.customer_id.to_string()),
        Cell::from(interaction.product_id.to_string()),
        Cell::from(interaction.interaction_type.label()),
        Cell::from(rating),
        Cell::from(truncate(
            Some(interaction_message(interaction)),
            MESSAGE_WIDTH,
        )),
    ])
}

fn render_detail(frame: &mut Frame<'_>, area: Rect, app: &App, state: &QueryState) {
    let block = Block::default().borders(Borders::ALL).title("Interaction");
    let Some(interaction) = state.data.content.get(app.selected) else {
        let paragraph = Paragraph::new(LIST_EMPTY).block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let text_or_placeholder =
        |value: Option<&str>| value.unwrap_or(PLACEHOLDER).to_string();
    let lines = vec![
        Line::from(Span::styled(
            format!(
                "#{}  {}",
                interaction
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                interaction.interaction_type.label()
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "When: {}",
            format_date_time(Some(&interaction.interaction_date))
        )),
        Line::from(format!("Customer: {}", interaction.customer_id)),
        Line::from(format!("Product: {}", interaction.product_id)),
        Line::from(format!(
            "Rating: {}",
            interaction
                .customer_rating
                .map(|rating| rating.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Feedback",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(text_or_placeholder(interaction.feedback.as_deref())),
        Line::from(""),
        Line::from(Span::styled(
            "Support response",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(text_or_placeholder(
            interaction.responses_from_customer_support.as_deref(),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_filter_dialog(frame: &mut Frame<'_>, area: Rect, dialog: &FilterDialog) {
    let modal = centered_rect(70, 60, area);
    frame.render_widget(Clear, modal);

    let form = &dialog.form;
    let focus = dialog.focus;
    let mut lines = vec![
        field_line("Customer ID", &form.customer_id, focus.is_field(0)),
        field_line("Product ID", &form.product_id, focus.is_field(1)),
        field_line(
            "Type (CHAT|EMAIL|TICKET|FORM)",
            &form.interaction_type,
            focus.is_field(2),
        ),
        field_line("From (YYYY-MM-DD HH:MM)", &form.start_date, focus.is_field(3)),
        field_line("To (YYYY-MM-DD HH:MM)", &form.end_date, focus.is_field(4)),
        Line::from(Span::styled(
            "Leave a field empty to drop that filter.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    lines.push(buttons("[Apply]", focus));

    let block = Block::default().borders(Borders::ALL).title("Filters");
    frame.render_widget(Paragraph::new(lines).block(block), modal);
}

fn render_create_dialog(frame: &mut Frame<'_>, area: Rect, dialog: &CreateDialog) {
    let modal = centered_rect(70, 70, area);
    frame.render_widget(Clear, modal);

    let form = &dialog.form;
    let focus = dialog.focus;
    let mut lines = vec![
        field_line("Product ID", &form.product_id, focus.is_field(0)),
        field_line("Customer ID", &form.customer_id, focus.is_field(1)),
        field_line(
            "Type (CHAT|EMAIL|TICKET|FORM)",
            &form.interaction_type,
            focus.is_field(2),
        ),
        field_line("Rating", &form.customer_rating, focus.is_field(3)),
        field_line("Feedback", &form.feedback, focus.is_field(4)),
        field_line(
            "When (YYYY-MM-DD HH:MM)",
            &form.interaction_date,
            focus.is_field(5),
        ),
        Line::from(Span::styled(
            "Blank means now. Ctrl+N sets to now.",
            Style::default().fg(Color::DarkGray),
        )),
        field_line("Support response", &form.response, focus.is_field(6)),
        Line::from(""),
    ];
    lines.push(buttons("[Save]", focus));

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Add Interaction");
    frame.render_widget(Paragraph::new(lines).block(block), modal);
}

fn render_upload_dialog(frame: &mut Frame<'_>, area: Rect, dialog: &UploadDialog) {
    let modal = centered_rect(70, 40, area);
    frame.render_widget(Clear, modal);

    let lines = vec![
        field_line("File", &dialog.path, dialog.focus.is_field(0)),
        Line::from(Span::styled(
            ".csv is ingested by the server; .json holds one record or an array.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        buttons("[Upload]", dialog.focus),
    ];

    let block = Block::default().borders(Borders::ALL).title("Upload");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, modal);
}

fn buttons(submit: &'static str, focus: Focus) -> Line<'static> {
    let submit_style = if focus.is_save() {
        Style::default().fg(Color::Black).bg(Color::LightGreen)
    } else {
        Style::default().fg(Color::Green)
    };
    let cancel_style = if focus.is_cancel() {
        Style::default().fg(Color::Black).bg(Color::LightRed)
    } else {
        Style::default().fg(Color::Red)
    };
    Line::from(vec![
        Span::styled(submit, submit_style),
        Span::raw("  "),
        Span::styled("[Cancel]", cancel_style),
    ])
}

fn render_help(frame: &mut Frame<'_>, area: Rect) {
    let modal = centered_rect(70, 60, area);
    frame.render_widget(Clear, modal);

    let text = vec![
        Line::from("Global: q quit, Ctrl+C quit, ? help"),
        Line::from("List: j/k move, g/G first/last row, enter detail, n/p next/previous page"),
        Line::from("      / filter, c reset filters, a add, u upload, r refresh"),
        Line::from("Detail: esc back, j/k move"),
        Line::from("Dialogs: tab/shift+tab move, enter activate, esc cancel"),
        Line::from("Editing: Ctrl+U clear field, Ctrl+W delete word, Ctrl+N now (add)"),
        Line::from(""),
        Line::from("Dates are local time: YYYY-MM-DD or YYYY-MM-DD HH:MM"),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, modal);
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(value.to_string(), style),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, rect: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(rect);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
