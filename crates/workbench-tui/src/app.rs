use std::collections::VecDeque;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use workbench_client::QueryState;
use workbench_core::time::{format_local_input, now_utc};
use workbench_core::{FilterForm, InteractionForm, InteractionQuery, QueryPatch};

use crate::actions::Action;

pub const LIST_EMPTY: &str = "No interactions. Press 'a' to add one or 'u' to upload a file.";

#[derive(Debug, Clone)]
pub enum Mode {
    List,
    Detail,
    ModalFilters(FilterDialog),
    ModalCreate(CreateDialog),
    ModalUpload(UploadDialog),
}

/// Paging facts from the last settled load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCursor {
    pub number: u32,
    pub rows: usize,
    pub previous: Option<u32>,
    pub next: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct App {
    pub mode: Mode,
    pub show_help: bool,
    pub should_quit: bool,
    pub selected: usize,
    pub status: Option<String>,
    pub error: Option<String>,
    pub page: PageCursor,
    pub query: InteractionQuery,
    actions: VecDeque<Action>,
}

impl App {
    pub fn new(query: InteractionQuery) -> Self {
        let mut app = Self {
            mode: Mode::List,
            show_help: false,
            should_quit: false,
            selected: 0,
            status: None,
            error: None,
            page: PageCursor::default(),
            query,
            actions: VecDeque::new(),
        };
        app.enqueue(Action::Refresh);
        app
    }

    pub fn enqueue(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    pub fn next_action(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// A failed mutation replaces any progress message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = None;
        self.set_error(message);
    }

    /// Mirrors the view after a load settles.
    pub fn sync(&mut self, state: &QueryState) {
        let data = &state.data;
        if data.number != self.page.number {
            self.selected = 0;
        }
        self.page = PageCursor {
            number: data.number,
            rows: data.content.len(),
            previous: data.previous_number(),
            next: data.next_number(),
        };
        self.query = state.query.clone();
        if self.selected >= self.page.rows {
            self.selected = self.page.rows.saturating_sub(1);
        }
        if self.page.rows == 0 && matches!(self.mode, Mode::Detail) {
            self.mode = Mode::List;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let mut mode = std::mem::replace(&mut self.mode, Mode::List);
        let next = match &mut mode {
            Mode::List => self.handle_list_key(key),
            Mode::Detail => self.handle_detail_key(key),
            Mode::ModalFilters(dialog) => self.handle_filter_key(dialog, key),
            Mode::ModalCreate(dialog) => self.handle_create_key(dialog, key),
            Mode::ModalUpload(dialog) => self.handle_upload_key(dialog, key),
        };
        self.mode = next.unwrap_or(mode);
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.page.rows.saturating_sub(1);
            }
            KeyCode::Enter => {
                if self.page.rows > 0 {
                    return Some(Mode::Detail);
                }
            }
            KeyCode::Right | KeyCode::Char('n') => match self.page.next {
                Some(page) => self.enqueue(Action::SetPage(page)),
                None => self.set_status("Already on the last page"),
            },
            KeyCode::Left | KeyCode::Char('p') => match self.page.previous {
                Some(page) => self.enqueue(Action::SetPage(page)),
                None => self.set_status("Already on the first page"),
            },
            KeyCode::Char('/') => {
                return Some(Mode::ModalFilters(FilterDialog::from_query(&self.query)));
            }
            KeyCode::Char('c') => {
                self.set_status("Filters cleared");
                self.enqueue(Action::Search(QueryPatch::clear_filters()));
            }
            KeyCode::Char('a') => return Some(Mode::ModalCreate(CreateDialog::new())),
            KeyCode::Char('u') => return Some(Mode::ModalUpload(UploadDialog::new())),
            KeyCode::Char('r') => self.enqueue(Action::Refresh),
            _ => {}
        }
        None
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Enter => return Some(Mode::List),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            _ => {}
        }
        None
    }

    fn handle_filter_key(&mut self, dialog: &mut FilterDialog, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Esc => return Some(Mode::List),
            KeyCode::Tab => dialog.focus.next(),
            KeyCode::BackTab => dialog.focus.prev(),
            KeyCode::Enter => {
                if dialog.focus.is_save() {
                    match dialog.form.to_patch() {
                        Ok(patch) => {
                            self.clear_error();
                            self.enqueue(Action::Search(patch));
                            return Some(Mode::List);
                        }
                        Err(err) => self.set_error(err.to_string()),
                    }
                } else if dialog.focus.is_cancel() {
                    return Some(Mode::List);
                } else {
                    dialog.focus.next();
                }
            }
            _ => {
                if let Some(target) = dialog.active_field_mut() {
                    apply_text_input(target, key);
                }
            }
        }
        None
    }

    fn handle_create_key(&mut self, dialog: &mut CreateDialog, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Esc => return Some(Mode::List),
            KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if dialog.is_timestamp_focus() {
                    dialog.form.interaction_date = format_local_input(now_utc());
                }
            }
            KeyCode::Tab => dialog.focus.next(),
            KeyCode::BackTab => dialog.focus.prev(),
            KeyCode::Enter => {
                if dialog.focus.is_save() {
                    match dialog.form.to_new_interaction(now_utc()) {
                        Ok(record) => {
                            self.clear_error();
                            self.enqueue(Action::Create(record));
                            return Some(Mode::List);
                        }
                        Err(err) => self.set_error(err.to_string()),
                    }
                } else if dialog.focus.is_cancel() {
                    return Some(Mode::List);
                } else {
                    dialog.focus.next();
                }
            }
            _ => {
                if let Some(target) = dialog.active_field_mut() {
                    apply_text_input(target, key);
                }
            }
        }
        None
    }

    fn handle_upload_key(&mut self, dialog: &mut UploadDialog, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Esc => return Some(Mode::List),
            KeyCode::Tab => dialog.focus.next(),
            KeyCode::BackTab => dialog.focus.prev(),
            KeyCode::Enter => {
                if dialog.focus.is_cancel() {
                    return Some(Mode::List);
                }
                match dialog.to_action() {
                    Ok(action) => {
                        self.clear_error();
                        self.enqueue(action);
                        return Some(Mode::List);
                    }
                    Err(err) => self.set_error(err),
                }
            }
            _ => {
                if dialog.focus.index == 0 {
                    apply_text_input(&mut dialog.path, key);
                }
            }
        }
        None
    }

    fn move_selection(&mut self, delta: i32) {
        if self.page.rows == 0 {
            self.selected = 0;
            return;
        }
        let last = self.page.rows as i32 - 1;
        self.selected = (self.selected as i32 + delta).clamp(0, last) as usize;
    }
}

fn apply_text_input(target: &mut String, key: KeyEvent) {
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            target.clear();
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            delete_last_word(target);
        }
        KeyCode::Char(ch) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL) {
                target.push(ch);
            }
        }
        KeyCode::Backspace => {
            target.pop();
        }
        _ => {}
    }
}

fn delete_last_word(value: &mut String) {
    while value.ends_with(char::is_whitespace) {
        value.pop();
    }
    while value.ends_with(|ch: char| !ch.is_whitespace()) {
        value.pop();
    }
}

/// Focus ring over a dialog's fields followed by its two buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub index: usize,
    fields: usize,
}

impl Focus {
    fn new(fields: usize) -> Self {
        Self { index: 0, fields }
    }

    fn total(self) -> usize {
        self.fields + 2
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.total();
    }

    pub fn prev(&mut self) {
        self.index = (self.index + self.total() - 1) % self.total();
    }

    pub fn is_field(self, field: usize) -> bool {
        self.index == field
    }

    pub fn is_save(self) -> bool {
        self.index == self.fields
    }

    pub fn is_cancel(self) -> bool {
        self.index == self.fields + 1
    }
}

#[derive(Debug, Clone)]
pub struct FilterDialog {
    pub focus: Focus,
    pub form: FilterForm,
}

impl FilterDialog {
    pub fn from_query(query: &InteractionQuery) -> Self {
        Self {
            focus: Focus::new(5),
            form: FilterForm::from_query(query),
        }
    }

    fn active_field_mut(&mut self) -> Option<&mut String> {
        match self.focus.index {
            0 => Some(&mut self.form.customer_id),
            1 => Some(&mut self.form.product_id),
            2 => Some(&mut self.form.interaction_type),
            3 => Some(&mut self.form.start_date),
            4 => Some(&mut self.form.end_date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateDialog {
    pub focus: Focus,
    pub form: InteractionForm,
}

impl CreateDialog {
    const TIMESTAMP_FIELD: usize = 5;

    pub fn new() -> Self {
        Self {
            focus: Focus::new(7),
            form: InteractionForm::default(),
        }
    }

    pub fn is_timestamp_focus(&self) -> bool {
        self.focus.is_field(Self::TIMESTAMP_FIELD)
    }

    fn active_field_mut(&mut self) -> Option<&mut String> {
        match self.focus.index {
            0 => Some(&mut self.form.product_id),
            1 => Some(&mut self.form.customer_id),
            2 => Some(&mut self.form.interaction_type),
            3 => Some(&mut self.form.customer_rating),
            4 => Some(&mut self.form.feedback),
            Self::TIMESTAMP_FIELD => Some(&mut self.form.interaction_date),
            6 => Some(&mut self.form.response),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadDialog {
    pub focus: Focus,
    pub path: String,
}

impl UploadDialog {
    pub fn new() -> Self {
        Self {
            focus: Focus::new(1),
            path: String::new(),
        }
    }

    /// `.csv` goes to the server as-is; `.json` is decoded and created here.
    pub fn to_action(&self) -> Result<Action, String> {
        let raw = self.path.trim();
        if raw.is_empty() {
            return Err("file path is required".to_string());
        }
        let path = PathBuf::from(raw);
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") => Ok(Action::UploadCsv(path)),
            Some("json") => Ok(Action::ImportJson(path)),
            _ => Err("expected a .csv or .json file".to_string()),
        }
    }
}
