//! The simulated editor: header, sidebar, document and chat panel.
//!
//! Drawn straight into a `Buffer` so the same scene can fill the terminal
//! or an offscreen canvas for the camera.

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use walkthru_core::diff_reveal::{DiffPhase, SegmentKind};
use walkthru_core::morph::MorphPhase;
use walkthru_core::script::{
    ACT1, ACT2, ACT3, DOC_PROJECT, DOC_TITLE, SIDEBAR_DOCUMENTS, SIDEBAR_PROJECT, SidebarIcon,
};
use walkthru_core::word_diff::MorphMotion;
use walkthru_core::{Act, ResearchPhase, Walkthrough, WalkthroughState};

use crate::layout::Panes;
use crate::palette::Palette;
use crate::text::{truncate_with_ellipsis, wrap};

/// Spinner frames for in-progress indicators.
const SPINNER_FRAMES: &[&str] = &["\u{25d0}", "\u{25d3}", "\u{25d1}", "\u{25d2}"];

/// Ticks per spinner frame.
const SPINNER_SLOWDOWN: usize = 4;

/// Spinner glyph for the given tick counter.
pub fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[(frame / SPINNER_SLOWDOWN) % SPINNER_FRAMES.len()]
}

pub struct Scene<'a> {
    pub walkthrough: &'a Walkthrough,
    pub palette: Palette,
    pub spinner_frame: usize,
}

impl Scene<'_> {
    pub fn draw(&self, panes: &Panes, buf: &mut Buffer) {
        self.header(panes.header, buf);
        if let Some(sidebar) = panes.sidebar {
            self.sidebar(sidebar, buf);
        }
        self.editor(panes, buf);
        self.chat(panes, buf);
    }

    fn spinner(&self) -> &'static str {
        spinner(self.spinner_frame)
    }

    // ------------------------------------------------------------------------
    // Header and step indicator
    // ------------------------------------------------------------------------

    fn header(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let p = &self.palette;
        let title = Line::from(vec![
            Span::styled(" Inkstone ", p.accent()),
            Span::styled(format!("{DOC_PROJECT} / "), p.muted()),
            Span::raw(DOC_TITLE),
        ]);
        buf.set_line(area.x, area.y, &title, area.width);

        let steps = self.step_indicator();
        let width = steps.width() as u16;
        if width + 1 < area.width {
            buf.set_line(area.right() - width - 1, area.y, &steps, width);
        }
    }

    fn step_indicator(&self) -> Line<'static> {
        let p = &self.palette;
        let state = self.walkthrough.state();
        let mut spans = Vec::new();
        for (index, act) in Act::all().iter().enumerate() {
            if index > 0 {
                spans.push(Span::styled(" \u{2500} ", p.muted()));
            }
            let done = state.completed_acts().contains(act);
            let label = if done {
                format!("\u{2713} {}", act.label())
            } else {
                format!("{} {}", index + 1, act.label())
            };
            let style = if state.current_act() == *act {
                p.accent()
            } else if done {
                Style::default().fg(p.insert)
            } else {
                p.muted()
            };
            spans.push(Span::styled(label, style));
        }
        Line::from(spans)
    }

    // ------------------------------------------------------------------------
    // Sidebar
    // ------------------------------------------------------------------------

    fn sidebar(&self, area: Rect, buf: &mut Buffer) {
        let p = &self.palette;
        let block = Block::bordered()
            .title(Span::styled(format!(" {SIDEBAR_PROJECT} "), p.accent()))
            .border_style(p.border());
        let inner = block.inner(area);
        block.render(area, buf);

        let width = usize::from(inner.width).saturating_sub(4);
        let lines: Vec<Line> = SIDEBAR_DOCUMENTS
            .iter()
            .map(|entry| {
                let icon = match entry.icon {
                    SidebarIcon::File => "\u{25a4}",
                    SidebarIcon::Search => "\u{2315}",
                    SidebarIcon::Research => "\u{25ce}",
                };
                let style = if entry.active {
                    Style::default().fg(p.text).bg(p.highlight)
                } else {
                    Style::default().fg(p.text)
                };
                Line::from(vec![
                    Span::styled(format!(" {icon} "), p.muted()),
                    Span::styled(truncate_with_ellipsis(entry.name, width), style),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }

    // ------------------------------------------------------------------------
    // Editor
    // ------------------------------------------------------------------------

    fn editor(&self, panes: &Panes, buf: &mut Buffer) {
        let p = &self.palette;
        Block::bordered()
            .title(Span::styled(
                format!(" {DOC_TITLE} "),
                Style::default().fg(p.text).add_modifier(Modifier::BOLD),
            ))
            .border_style(p.border())
            .render(panes.editor, buf);

        let tools = Line::styled(" B  I  U \u{2502} H  \u{2261}  \u{275d}", p.muted());
        buf.set_line(panes.toolbar.x, panes.toolbar.y, &tools, panes.toolbar.width);
        let button_style = if self.walkthrough.state() == WalkthroughState::Act2 {
            p.button()
        } else {
            Style::default().fg(p.text).bg(p.surface)
        };
        let button = panes.proofread_button;
        buf.set_stringn(
            button.x,
            button.y,
            " Proofread ",
            usize::from(button.width),
            button_style,
        );

        Paragraph::new(self.document())
            .wrap(Wrap { trim: false })
            .render(panes.paragraph, buf);

        if let Some(status) = self.proofbar() {
            let block = Block::bordered().border_style(Style::default().fg(p.accent));
            let inner = block.inner(panes.proofbar);
            block.render(panes.proofbar, buf);
            buf.set_line(inner.x, inner.y, &status, inner.width);
        }
    }

    fn document(&self) -> Vec<Line<'static>> {
        let w = self.walkthrough;
        let mut lines = match w.state() {
            WalkthroughState::Idle => vec![Line::raw(ACT1.rough_draft)],
            WalkthroughState::Act1 => self.rewrite(),
            WalkthroughState::Act1Complete => vec![Line::raw(ACT1.polished_draft)],
            WalkthroughState::Act2 => vec![self.proofread()],
            WalkthroughState::Act2Complete
            | WalkthroughState::Act3
            | WalkthroughState::Act3Complete => vec![Line::raw(ACT2.clean_text)],
        };
        lines.extend(self.research_insert());
        lines
    }

    fn rewrite(&self) -> Vec<Line<'static>> {
        let p = &self.palette;
        let morph = self.walkthrough.morph();
        match morph.phase() {
            MorphPhase::Before => vec![Line::raw(ACT1.rough_draft)],
            MorphPhase::Thinking => vec![
                Line::styled(ACT1.rough_draft, p.muted()),
                Line::raw(""),
                Line::styled(format!("{} Rewriting\u{2026}", self.spinner()), p.accent()),
            ],
            MorphPhase::Animating => {
                let elapsed = morph
                    .progress(self.walkthrough.now())
                    .unwrap_or(Duration::ZERO);
                vec![self.morph_line(elapsed)]
            }
            MorphPhase::After => vec![Line::raw(ACT1.polished_draft)],
        }
    }

    /// Old words strike out and new ones fade in while the words move, then
    /// everything settles into plain text.
    fn morph_line(&self, elapsed: Duration) -> Line<'static> {
        let p = &self.palette;
        let plan = self.walkthrough.morph().plan();
        let moving = elapsed < plan.morph;
        let mut spans = Vec::new();
        for (token, motion) in plan.tokens.iter().zip(&plan.motions) {
            let style = match motion {
                MorphMotion::FadeOut if moving => p.deletion(),
                MorphMotion::FadeOut => continue,
                MorphMotion::FadeIn { delay } if elapsed < *delay => continue,
                MorphMotion::FadeIn { .. } if moving => p.insertion(),
                MorphMotion::Slide { .. } if moving => Style::default().fg(p.accent),
                _ => Style::default(),
            };
            if !spans.is_empty() {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(token.text().to_string(), style));
        }
        Line::from(spans)
    }

    fn proofread(&self) -> Line<'static> {
        let p = &self.palette;
        let spans: Vec<Span> = self
            .walkthrough
            .diffs()
            .segments()
            .into_iter()
            .map(|segment| {
                let style = match segment.kind {
                    SegmentKind::Plain => Style::default(),
                    SegmentKind::Deletion { resolved: false } => p.deletion(),
                    SegmentKind::Deletion { resolved: true } => {
                        p.muted().add_modifier(Modifier::CROSSED_OUT)
                    }
                    SegmentKind::Insertion => p.insertion(),
                };
                Span::styled(segment.text, style)
            })
            .collect();
        Line::from(spans)
    }

    /// Status of the floating proofreading bar, while it is up.
    fn proofbar(&self) -> Option<Line<'static>> {
        if self.walkthrough.state() != WalkthroughState::Act2 {
            return None;
        }
        let p = &self.palette;
        let diffs = self.walkthrough.diffs();
        let line = match diffs.phase() {
            DiffPhase::Idle | DiffPhase::Clean => return None,
            DiffPhase::Scanning => Line::styled(
                format!(" {} Proofreading your document\u{2026}", self.spinner()),
                p.accent(),
            ),
            DiffPhase::ShowingDiffs => Line::from(vec![
                Span::styled(" Reject All ", p.muted()),
                Span::styled(" Accept All (a) ", p.button()),
                Span::styled(
                    format!("  \u{2039} 1/{} \u{203a}  ", diffs.total()),
                    p.muted(),
                ),
                Span::styled("Reject  Accept  \u{2715}", p.muted()),
            ]),
            DiffPhase::Accepting => Line::styled(
                format!(" \u{2713} Applying {} fixes\u{2026}", diffs.total()),
                Style::default().fg(p.insert),
            ),
        };
        Some(line)
    }

    fn research_insert(&self) -> Vec<Line<'static>> {
        let p = &self.palette;
        let style = match self.walkthrough.snapshot().research_phase {
            ResearchPhase::Inserting => Style::default().fg(p.insert),
            ResearchPhase::Inserted => Style::default(),
            ResearchPhase::Idle | ResearchPhase::Loading | ResearchPhase::ResponseVisible => {
                return Vec::new();
            }
        };
        let mut lines = vec![
            Line::raw(""),
            Line::styled(ACT3.response, style),
            Line::styled("\u{2500}\u{2500}\u{2500}", p.muted()),
        ];
        lines.extend(
            ACT3.citations
                .iter()
                .map(|c| Line::styled(format!("[{}] {}", c.id, c.title), p.muted())),
        );
        lines
    }

    // ------------------------------------------------------------------------
    // Chat panel
    // ------------------------------------------------------------------------

    fn chat(&self, panes: &Panes, buf: &mut Buffer) {
        let p = &self.palette;
        Block::bordered()
            .title(Line::from(vec![
                Span::styled(
                    " AI Assistant ",
                    Style::default().fg(p.text).add_modifier(Modifier::BOLD),
                ),
                Span::styled("\u{25cf} Online ", Style::default().fg(p.insert)),
            ]))
            .border_style(p.border())
            .render(panes.chat, buf);

        let area = panes.chat_messages;
        let button = self.walkthrough.state() == WalkthroughState::Act3
            && self.walkthrough.snapshot().research_phase == ResearchPhase::ResponseVisible;
        let rows = usize::from(area.height.saturating_sub(u16::from(button)));
        let lines = self.messages(usize::from(area.width));
        // Bottom-anchored like a chat log.
        let skip = lines.len().saturating_sub(rows);
        Paragraph::new(lines[skip..].to_vec()).render(
            Rect {
                height: rows as u16,
                ..area
            },
            buf,
        );
        if button {
            let at = panes.insert_button;
            buf.set_stringn(
                at.x,
                at.y,
                " Insert to Doc (i) ",
                usize::from(at.width),
                p.button(),
            );
        }

        self.chat_input(panes.chat_input, buf);
    }

    fn messages(&self, width: usize) -> Vec<Line<'static>> {
        let p = &self.palette;
        let snapshot = self.walkthrough.snapshot();
        let state = snapshot.state;
        let mut lines = Vec::new();

        let rewrite_sent = match state {
            WalkthroughState::Idle => false,
            WalkthroughState::Act1 => snapshot.chat_typing_done,
            _ => true,
        };
        if rewrite_sent {
            bubble(&mut lines, "You", ACT1.chat_prompt, width, p);
        }

        let research_sent = match state {
            WalkthroughState::Act3 => snapshot.chat_typing_done,
            WalkthroughState::Act3Complete => true,
            _ => false,
        };
        if !research_sent {
            return lines;
        }
        bubble(&mut lines, "You", ACT3.chat_prompt, width, p);

        match snapshot.research_phase {
            ResearchPhase::Idle => {}
            ResearchPhase::Loading => {
                lines.push(Line::styled("AI", p.accent()));
                lines.push(Line::styled(
                    format!("  {} Searching the web\u{2026}", self.spinner()),
                    p.muted(),
                ));
                for fraction in [0.9, 0.7, 0.45] {
                    let bar = (width as f64 * fraction) as usize;
                    lines.push(Line::styled(
                        format!("  {}", "\u{2582}".repeat(bar.saturating_sub(2))),
                        Style::default().fg(p.surface),
                    ));
                }
            }
            ResearchPhase::ResponseVisible | ResearchPhase::Inserting | ResearchPhase::Inserted => {
                bubble(&mut lines, "AI", ACT3.response, width, p);
                for citation in ACT3.citations {
                    let text = format!("  [{}] {}", citation.id, citation.title);
                    lines.push(Line::styled(
                        truncate_with_ellipsis(&text, width),
                        p.muted(),
                    ));
                }
            }
        }
        lines
    }

    fn chat_input(&self, area: Rect, buf: &mut Buffer) {
        let p = &self.palette;
        let w = self.walkthrough;
        let typing = w.typing();
        let composing = matches!(w.state(), WalkthroughState::Act1 | WalkthroughState::Act3)
            && !w.snapshot().chat_typing_done
            && typing.visible_len() > 0;

        let border = if composing {
            Style::default().fg(p.accent)
        } else {
            p.border()
        };
        let block = Block::bordered().border_style(border);
        let inner = block.inner(area);
        block.render(area, buf);

        let line = if composing {
            let width = usize::from(inner.width).saturating_sub(1);
            let last = wrap(typing.visible(), width).pop().unwrap_or_default();
            Line::from(vec![
                Span::raw(last),
                Span::styled("\u{258f}", Style::default().fg(p.accent)),
            ])
        } else {
            Line::styled("Ask your AI buddy\u{2026}", p.muted())
        };
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}

/// Appends a labelled, wrapped chat message followed by a blank line.
fn bubble(
    lines: &mut Vec<Line<'static>>,
    who: &'static str,
    text: &str,
    width: usize,
    palette: &Palette,
) {
    let label = if who == "You" {
        palette.muted()
    } else {
        palette.accent()
    };
    lines.push(Line::styled(who, label));
    for row in wrap(text, width.saturating_sub(2)) {
        lines.push(Line::styled(format!("  {row}"), Style::default().fg(palette.text)));
    }
    lines.push(Line::raw(""));
}

#[cfg(test)]
mod tests {
    use walkthru_core::host::Theme;
    use walkthru_core::{PlaybackMode, WalkthroughOptions};

    use super::*;

    fn text_of(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn scene(walkthrough: &Walkthrough) -> Scene<'_> {
        Scene {
            walkthrough,
            palette: Palette::for_theme(Theme::Dark),
            spinner_frame: 0,
        }
    }

    fn guided() -> Walkthrough {
        let mut options = WalkthroughOptions::new(PlaybackMode::Guided);
        options.wait_for_accept = Some(true);
        Walkthrough::new(options)
    }

    #[test]
    fn test_document_follows_the_acts() {
        let mut w = guided();
        assert_eq!(text_of(&scene(&w).document()), ACT1.rough_draft);

        w.select_act(Act::Rewrite);
        w.complete_act(Act::Rewrite);
        assert_eq!(text_of(&scene(&w).document()), ACT1.polished_draft);

        w.select_act(Act::Research);
        assert_eq!(text_of(&scene(&w).document()), ACT2.clean_text);
    }

    #[test]
    fn test_morph_settles_on_polished_words() {
        let mut w = guided();
        w.select_act(Act::Rewrite);
        let scene = scene(&w);
        let plan = w.morph().plan();
        let settled = scene.morph_line(plan.total());
        let words: Vec<&str> = ACT1.polished_draft.split_whitespace().collect();
        assert_eq!(text_of(&[settled]), words.join(" "));
    }

    #[test]
    fn test_proofread_shows_diffs_then_bar() {
        let mut w = guided();
        w.select_act(Act::Proofread);
        w.advance_by(Duration::from_secs(10));
        let scene = scene(&w);
        assert_eq!(w.diffs().phase(), DiffPhase::ShowingDiffs);

        let line = scene.proofread();
        assert!(
            line.spans
                .iter()
                .any(|span| span.style.add_modifier.contains(Modifier::CROSSED_OUT))
        );
        let bar = text_of(&[scene.proofbar().unwrap()]);
        assert!(bar.contains("Accept All"));
    }

    #[test]
    fn test_chat_shows_prompts_once_typed() {
        let mut w = guided();
        assert!(scene(&w).messages(40).is_empty());

        w.select_act(Act::Research);
        w.advance_by(Duration::from_secs(30));
        let text = text_of(&scene(&w).messages(200));
        assert!(text.contains(ACT1.chat_prompt));
        assert!(text.contains(ACT3.chat_prompt));
        assert!(text.contains("[1]"));
    }
}
