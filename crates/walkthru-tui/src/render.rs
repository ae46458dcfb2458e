//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame and never
//! mutate state or return effects.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};
use walkthru_core::camera::{CANVAS_HEIGHT, CANVAS_WIDTH, SHOTS};
use walkthru_core::host::Host;
use walkthru_core::script::TourStep;
use walkthru_core::tooltip::{self, Size, Spacing};
use walkthru_core::{PlaybackMode, Walkthrough};

use crate::layout::Panes;
use crate::palette::Palette;
use crate::scene::{Scene, spinner};
use crate::state::{AppState, CAPTION_ROWS, CELL_HEIGHT_PX, CELL_WIDTH_PX, View};
use crate::text::wrap;

/// Offscreen canvas the camera films, in cells.
const CANVAS_COLS: u16 = (CANVAS_WIDTH / CELL_WIDTH_PX) as u16;
const CANVAS_ROWS: u16 = (CANVAS_HEIGHT / CELL_HEIGHT_PX) as u16;

/// Outer width of the tour tooltip, borders included.
const TOOLTIP_WIDTH: u16 = 44;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let palette = Palette::for_theme(app.theme);
    let buf = frame.buffer_mut();
    buf.set_style(area, palette.base());

    match app.view() {
        View::Editor => render_editor_view(app, &palette, buf),
        View::Camera => render_camera_view(app, &palette, area, buf),
    }
}

// ============================================================================
// Editor view
// ============================================================================

fn render_editor_view(app: &AppState, palette: &Palette, buf: &mut Buffer) {
    let panes = app.host.panes();
    Scene {
        walkthrough: &app.walkthrough,
        palette: *palette,
        spinner_frame: app.spinner_frame,
    }
    .draw(&panes, buf);
    render_footer(app, palette, panes.footer, buf);
    render_tooltip(app, palette, buf);
}

fn render_footer(app: &AppState, palette: &Palette, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
        return;
    }
    let mode = match app.walkthrough.mode() {
        PlaybackMode::Guided => " GUIDED ",
        PlaybackMode::Auto => " AUTO ",
    };
    let mut spans = vec![
        Span::styled(mode, palette.button()),
        Span::styled(format!(" {:.2}\u{d7}", app.clock.speed), palette.muted()),
    ];
    if app.clock.paused {
        spans.push(Span::styled("  PAUSED", palette.accent()));
    }
    spans.push(Span::raw("  "));
    match &app.notice {
        Some(notice) => spans.push(Span::styled(notice.clone(), palette.accent())),
        None => spans.push(Span::styled(key_hints(app.walkthrough.mode()), palette.muted())),
    }
    buf.set_line(area.x, area.y, &Line::from(spans), area.width);
}

fn key_hints(mode: PlaybackMode) -> &'static str {
    match mode {
        PlaybackMode::Guided => {
            "\u{23ce} next  1-3 act  a accept  i insert  s sidebar  r replay  c camera  t theme  space pause  q quit"
        }
        PlaybackMode::Auto => {
            "1-3 act  s sidebar  r replay  c camera  t theme  +/- speed  space pause  q quit"
        }
    }
}

/// The current tour step, floated next to its anchor.
fn render_tooltip(app: &AppState, palette: &Palette, buf: &mut Buffer) {
    let Some(tour) = app.walkthrough.tour() else {
        return;
    };
    let Some(step) = tour.current() else {
        return;
    };
    if step.hidden {
        return;
    }

    let area = app.host.area();
    let width = TOOLTIP_WIDTH.min(area.width.saturating_sub(2));
    if width < 8 {
        return;
    }
    let body = wrap(step.text, usize::from(width - 4));
    let height = (body.len() as u16 + 4).min(area.height);

    let layout = tooltip::place(
        step.target,
        step.placement,
        Size::new(f64::from(width), f64::from(height)),
        Size::new(f64::from(area.width), f64::from(area.height)),
        Spacing::CELLS,
        |name| app.host.resolve_anchor(name),
    );

    if let Some(ring) = layout.highlight {
        buf.set_style(area.intersection(to_cells(ring)), Style::default().bg(palette.highlight));
    }

    let rect = area.intersection(Rect::new(
        to_cell(layout.x),
        to_cell(layout.y),
        width,
        height,
    ));
    let mut lines: Vec<Line> = body
        .into_iter()
        .map(|row| Line::styled(row, Style::default().fg(palette.text)))
        .collect();
    lines.push(Line::raw(""));
    lines.push(action_line(app, step, palette));

    Clear.render(rect, buf);
    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_style(Style::default().fg(palette.accent))
                .title(Span::styled(
                    format!(" {}/{} ", tour.index() + 1, tour.len()),
                    palette.muted(),
                )),
        )
        .style(Style::default().bg(palette.surface))
        .render(rect, buf);
}

fn action_line(app: &AppState, step: &TourStep, palette: &Palette) -> Line<'static> {
    let Some(cta) = step.cta else {
        return Line::styled(
            format!("{} watching\u{2026}", spinner(app.spinner_frame)),
            palette.muted(),
        );
    };
    let mut spans = vec![
        Span::styled("\u{23ce} ", palette.muted()),
        Span::styled(cta, palette.accent()),
    ];
    if step.show_replay {
        spans.push(Span::styled("  \u{b7}  r Replay", palette.muted()));
    }
    Line::from(spans)
}

fn to_cell(value: f64) -> u16 {
    value.round().clamp(0.0, f64::from(u16::MAX)) as u16
}

fn to_cells(rect: tooltip::Rect) -> Rect {
    Rect::new(
        to_cell(rect.x),
        to_cell(rect.y),
        to_cell(rect.width),
        to_cell(rect.height),
    )
}

// ============================================================================
// Camera view
// ============================================================================

/// The mirrored walkthrough drawn on a fixed canvas and filmed through the
/// camera transform, with the caption card underneath.
fn render_camera_view(app: &AppState, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let [stage, caption] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(CAPTION_ROWS)]).areas(area);

    let canvas = draw_canvas(app.mirror.walkthrough(), palette, app.spinner_frame);
    let camera = app.live_camera();
    for y in stage.top()..stage.bottom() {
        for x in stage.left()..stage.right() {
            let px = (f64::from(x - stage.x) + 0.5) * CELL_WIDTH_PX;
            let py = (f64::from(y - stage.y) + 0.5) * CELL_HEIGHT_PX;
            let (cx, cy) = camera.unapply(px, py);
            let col = (cx / CELL_WIDTH_PX).floor();
            let row = (cy / CELL_HEIGHT_PX).floor();
            if col < 0.0 || row < 0.0 || col >= f64::from(CANVAS_COLS) || row >= f64::from(CANVAS_ROWS)
            {
                continue;
            }
            buf[(x, y)] = canvas[(col as u16, row as u16)].clone();
        }
    }

    render_caption(app, palette, caption, buf);
}

fn draw_canvas(walkthrough: &Walkthrough, palette: &Palette, spinner_frame: usize) -> Buffer {
    let area = Rect::new(0, 0, CANVAS_COLS, CANVAS_ROWS);
    let mut canvas = Buffer::empty(area);
    canvas.set_style(area, palette.base());
    let panes = Panes::compute(area, walkthrough.snapshot().sidebar_open, false);
    Scene {
        walkthrough,
        palette: *palette,
        spinner_frame,
    }
    .draw(&panes, &mut canvas);
    canvas
}

fn render_caption(app: &AppState, palette: &Palette, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
        return;
    }
    let director = app.mirror.director();
    let shot = director.shot();

    let caption = Line::styled(
        shot.caption,
        Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
    )
    .centered();
    let detail = match shot.caption_link {
        Some(url) => Line::from(vec![
            Span::styled("\u{23ce} ", palette.muted()),
            Span::styled(url, palette.accent().add_modifier(Modifier::UNDERLINED)),
        ]),
        None => Line::styled(
            format!("{} \u{b7} {}/{}", shot.id, director.shot_index() + 1, SHOTS.len()),
            palette.muted(),
        ),
    }
    .centered();

    Paragraph::new(vec![caption, detail])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(palette.border()),
        )
        .style(Style::default().bg(palette.surface))
        .render(area, buf);
}
