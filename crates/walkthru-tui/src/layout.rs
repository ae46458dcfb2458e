//! Pane geometry of the editor scene, shared by rendering and anchor lookup.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const SIDEBAR_WIDTH: u16 = 32;
const CHAT_WIDTH_PERCENT: u16 = 36;
const CHAT_INPUT_HEIGHT: u16 = 3;
const INSERT_BUTTON_WIDTH: u16 = 18;
const PROOFBAR_HEIGHT: u16 = 3;

/// Anchor names the tour can point at.
pub const ANCHORS: &[&str] = &[
    "editor-area",
    "editor-paragraph",
    "toolbar-proofread",
    "proofbar",
    "chat-messages",
    "chat-input",
    "chat-insert-btn",
    "sidebar",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Panes {
    pub header: Rect,
    pub sidebar: Option<Rect>,
    pub editor: Rect,
    pub toolbar: Rect,
    pub proofread_button: Rect,
    pub paragraph: Rect,
    pub proofbar: Rect,
    pub chat: Rect,
    pub chat_messages: Rect,
    pub chat_input: Rect,
    pub insert_button: Rect,
    pub footer: Rect,
}

impl Panes {
    /// Splits `area` into the editor scene. `chrome` reserves the header
    /// and footer lines.
    pub fn compute(area: Rect, sidebar_open: bool, chrome: bool) -> Self {
        let bar = u16::from(chrome);
        let [header, body, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(bar),
                Constraint::Min(0),
                Constraint::Length(bar),
            ])
            .areas(area);

        let sidebar_width = if sidebar_open { SIDEBAR_WIDTH } else { 0 };
        let [sidebar, editor, chat] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(sidebar_width),
                Constraint::Min(20),
                Constraint::Percentage(CHAT_WIDTH_PERCENT),
            ])
            .areas(body);

        let editor_inner = inner(editor);
        let [toolbar, _, paragraph, proofbar] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(PROOFBAR_HEIGHT),
            ])
            .areas(editor_inner);
        let proofread_width = 11.min(toolbar.width);
        let proofread_button = Rect {
            x: toolbar.right().saturating_sub(proofread_width),
            width: proofread_width,
            ..toolbar
        };

        let [chat_messages, chat_input] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(CHAT_INPUT_HEIGHT)])
            .areas(inner(chat));
        let insert_button = Rect {
            x: chat_messages.x,
            y: chat_messages.bottom().saturating_sub(1),
            width: INSERT_BUTTON_WIDTH.min(chat_messages.width),
            height: chat_messages.height.min(1),
        };

        Self {
            header,
            sidebar: sidebar_open.then_some(sidebar),
            editor,
            toolbar,
            proofread_button,
            paragraph,
            proofbar,
            chat,
            chat_messages,
            chat_input,
            insert_button,
            footer,
        }
    }

    /// Screen rect of a named tour anchor.
    pub fn anchor(&self, name: &str) -> Option<Rect> {
        let rect = match name {
            "editor-area" => self.editor,
            "editor-paragraph" => self.paragraph,
            "toolbar-proofread" => self.proofread_button,
            "proofbar" => self.proofbar,
            "chat-messages" => self.chat_messages,
            "chat-input" => self.chat_input,
            "chat-insert-btn" => self.insert_button,
            "sidebar" => self.sidebar?,
            _ => return None,
        };
        (!rect.is_empty()).then_some(rect)
    }
}

/// Area inside a one-cell border.
fn inner(rect: Rect) -> Rect {
    Rect {
        x: rect.x.saturating_add(1),
        y: rect.y.saturating_add(1),
        width: rect.width.saturating_sub(2),
        height: rect.height.saturating_sub(2),
    }
}
