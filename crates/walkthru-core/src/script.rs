//! Walkthrough script: every word, diff, tour step, and timing value.
//!
//! Content is based on the article "The Craftsman Table and the IKEA Desk".
//! All tables are process-wide immutable data shared by every walkthrough
//! instance.

use std::time::Duration;

use serde::Serialize;

use crate::model::{Act, ResearchPhase};
use crate::tooltip::Placement;

// ============================================================================
// Document context
// ============================================================================

pub const DOC_TITLE: &str = "The Craftsman Table and the IKEA Desk";
pub const DOC_PROJECT: &str = "Substack Articles";

/// Icon shown next to a sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarIcon {
    File,
    Search,
    Research,
}

/// One document in the project tree revealed by the sidebar.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SidebarEntry {
    pub name: &'static str,
    pub active: bool,
    pub icon: SidebarIcon,
}

pub const SIDEBAR_PROJECT: &str = "Substack Articles";

pub const SIDEBAR_DOCUMENTS: &[SidebarEntry] = &[
    SidebarEntry {
        name: "The Craftsman Table and the IKEA Desk",
        active: true,
        icon: SidebarIcon::File,
    },
    SidebarEntry {
        name: "Web Search: Jevons Paradox origin",
        active: false,
        icon: SidebarIcon::Search,
    },
    SidebarEntry {
        name: "Deep Research: AI writing tools landscape",
        active: false,
        icon: SidebarIcon::Research,
    },
    SidebarEntry {
        name: "Notes: Ben Goertzel jagged edge quotes",
        active: false,
        icon: SidebarIcon::File,
    },
    SidebarEntry {
        name: "Draft: Future of Knowledge Work",
        active: false,
        icon: SidebarIcon::File,
    },
];

// ============================================================================
// Act 1: the rewrite
// ============================================================================

/// Rough notes morphing into polished prose.
#[derive(Debug, Clone, Copy)]
pub struct RewriteScript {
    pub rough_draft: &'static str,
    pub polished_draft: &'static str,
    pub chat_prompt: &'static str,
    /// Per character of the chat prompt.
    pub typing_speed: Duration,
    /// "Thinking" shimmer between the sent prompt and the morph.
    pub thinking_delay: Duration,
    pub morph_duration: Duration,
}

pub const ACT1: RewriteScript = RewriteScript {
    rough_draft: "AI is like the difference between an IKEA table and a handmade one. Before IKEA you had to make tables by hand or pay a lot. After IKEA everyone gets a table. Not amazing but functional. But the craftsman tables didn\u{2019}t go away. We just ended up with more tables everywhere. Kitchen table, dining room, side tables, office desk. That\u{2019}s called Jevons Paradox I think. When something gets cheap we want more of it not less.",
    polished_draft: "When it comes to writing and AI, think about it like a hand-crafted table versus an IKEA table. Before IKEA, every table was handcrafted and that meant only a small number of people could afford them. After IKEA everyone can have a good, solid table. Maybe not a craftsman level table, but a table that works and does what a table should do. But IKEA didn\u{2019}t make the craftsman tables disappear. We just got more tables. That\u{2019}s Jevons Paradox in action. Once something gets cheaper and more ubiquitous, we want more of it.",
    chat_prompt: "Tighten this up and make it flow better. Keep my voice.",
    typing_speed: Duration::from_millis(50),
    thinking_delay: Duration::from_millis(800),
    morph_duration: Duration::from_millis(2500),
};

// ============================================================================
// Act 2: the proofread
// ============================================================================

/// A pre-authored correction applied against the proofread paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScriptedDiff {
    /// Replace a misspelled word.
    Replace {
        original: &'static str,
        corrected: &'static str,
        description: &'static str,
    },
    /// Insert a missing word after an anchor word.
    Insert {
        before: &'static str,
        inserted: &'static str,
        description: &'static str,
    },
}

impl ScriptedDiff {
    pub fn description(&self) -> &'static str {
        match self {
            ScriptedDiff::Replace { description, .. } | ScriptedDiff::Insert { description, .. } => {
                description
            }
        }
    }
}

/// Proofreading pass over the polished draft.
#[derive(Debug, Clone, Copy)]
pub struct ProofreadScript {
    pub text_with_errors: &'static str,
    pub clean_text: &'static str,
    pub diffs: &'static [ScriptedDiff],
    pub timing: ProofreadTiming,
}

/// Timing of the diff reveal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofreadTiming {
    pub scanning_delay: Duration,
    pub diff_stagger_delay: Duration,
    /// Pause between the last reveal and the "all diffs visible" signal.
    pub diffs_visible_grace: Duration,
    pub accept_all_delay: Duration,
    pub resolve_animation_duration: Duration,
}

pub const ACT2: ProofreadScript = ProofreadScript {
    text_with_errors: "When it comes to writing and AI, think about it like a hand-crafted table versus an IKEA table. Before IKEA, every table was handcrafed and that meant only a small number of people could them. After IKEA everyone can have a good, solid table. Maybe not a craftsman level table, but a table that works and does what a table should do. But IKEA didn\u{2019}t make the craftsman tables disappear. We just got more tables. That\u{2019}s Jevons Paradox in action. Once something gets cheaper and more ubiquitous, we want more of it.",
    clean_text: "When it comes to writing and AI, think about it like a hand-crafted table versus an IKEA table. Before IKEA, every table was handcrafted and that meant only a small number of people could afford them. After IKEA everyone can have a good, solid table. Maybe not a craftsman level table, but a table that works and does what a table should do. But IKEA didn\u{2019}t make the craftsman tables disappear. We just got more tables. That\u{2019}s Jevons Paradox in action. Once something gets cheaper and more ubiquitous, we want more of it.",
    diffs: &[
        ScriptedDiff::Replace {
            original: "handcrafed",
            corrected: "handcrafted",
            description: "Spelling: missing 't'",
        },
        ScriptedDiff::Insert {
            before: "could",
            inserted: "afford",
            description: "Missing word: 'afford'",
        },
    ],
    timing: ProofreadTiming {
        scanning_delay: Duration::from_millis(1200),
        diff_stagger_delay: Duration::from_millis(400),
        diffs_visible_grace: Duration::from_millis(300),
        accept_all_delay: Duration::from_millis(1500),
        resolve_animation_duration: Duration::from_millis(600),
    },
};

// ============================================================================
// Act 3: the research
// ============================================================================

/// A source cited by the research response.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Citation {
    pub id: u8,
    pub title: &'static str,
    pub url: &'static str,
}

/// Research question, synthesized answer, and insert timing.
#[derive(Debug, Clone, Copy)]
pub struct ResearchScript {
    pub chat_prompt: &'static str,
    pub response: &'static str,
    pub citations: &'static [Citation],
    pub typing_speed: Duration,
    pub timing: ResearchTiming,
}

/// Timing of the research phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchTiming {
    pub loading_shimmer_duration: Duration,
    pub insert_to_doc_delay: Duration,
    pub insert_animation_duration: Duration,
}

pub const ACT3: ResearchScript = ResearchScript {
    chat_prompt: "What is Jevons Paradox and who first described it?",
    response: "Jevons Paradox was first described by English economist William Stanley Jevons in his 1865 book The Coal Question [1]. He observed that as coal use became more efficient, total consumption increased rather than decreased [2]. The principle has since been applied broadly \u{2014} when a resource becomes cheaper or more efficient to use, total consumption often rises because demand grows faster than efficiency gains [3].",
    citations: &[
        Citation {
            id: 1,
            title: "Jevons, W.S. \u{2014} The Coal Question (1865)",
            url: "#",
        },
        Citation {
            id: 2,
            title: "Alcott, B. \u{2014} Jevons\u{2019} Paradox, Ecological Economics (2005)",
            url: "#",
        },
        Citation {
            id: 3,
            title: "Sorrell, S. \u{2014} The Rebound Effect, UK Energy Research Centre",
            url: "#",
        },
    ],
    typing_speed: Duration::from_millis(45),
    timing: ResearchTiming {
        loading_shimmer_duration: Duration::from_millis(1800),
        insert_to_doc_delay: Duration::from_millis(1200),
        insert_animation_duration: Duration::from_millis(800),
    },
};

// ============================================================================
// Guided tour
// ============================================================================

/// A signal a tour step waits for before advancing on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum AwaitCondition {
    TypingDone,
    ActComplete(Act),
    DiffsVisible,
    ResearchPhase(ResearchPhase),
    SidebarOpen,
}

/// Auto-advance watcher attached to a tour step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoAdvance {
    pub condition: AwaitCondition,
    pub grace: Duration,
}

/// Sub-machine signal sent when the viewer confirms a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CtaSignal {
    AcceptDiffs,
    InsertResearch,
}

/// One guided-tour tooltip.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TourStep {
    pub id: &'static str,
    /// Anchor name resolved by the presentation layer.
    pub target: &'static str,
    pub text: &'static str,
    pub cta: Option<&'static str>,
    pub cta_link: Option<&'static str>,
    pub placement: Placement,
    pub triggers_act: Option<Act>,
    pub auto_advance: Option<AutoAdvance>,
    pub opens_sidebar: bool,
    pub show_replay: bool,
    pub hidden: bool,
    pub cta_signal: Option<CtaSignal>,
}

impl TourStep {
    /// A plain step: text on an anchor, no call to action.
    pub const fn new(
        id: &'static str,
        target: &'static str,
        text: &'static str,
        placement: Placement,
    ) -> Self {
        Self {
            id,
            target,
            text,
            cta: None,
            cta_link: None,
            placement,
            triggers_act: None,
            auto_advance: None,
            opens_sidebar: false,
            show_replay: false,
            hidden: false,
            cta_signal: None,
        }
    }

    pub const fn cta(mut self, label: &'static str) -> Self {
        self.cta = Some(label);
        self
    }

    pub const fn cta_link(mut self, link: &'static str) -> Self {
        self.cta_link = Some(link);
        self
    }

    pub const fn triggers(mut self, act: Act) -> Self {
        self.triggers_act = Some(act);
        self
    }

    pub const fn auto_advance(mut self, condition: AwaitCondition, grace_ms: u64) -> Self {
        self.auto_advance = Some(AutoAdvance {
            condition,
            grace: Duration::from_millis(grace_ms),
        });
        self
    }

    pub const fn opens_sidebar(mut self) -> Self {
        self.opens_sidebar = true;
        self
    }

    pub const fn show_replay(mut self) -> Self {
        self.show_replay = true;
        self
    }

    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub const fn signal(mut self, signal: CtaSignal) -> Self {
        self.cta_signal = Some(signal);
        self
    }
}

pub const SIGN_UP_URL: &str = "https://accounts.inkstone.pro/sign-up";

pub const TOUR_STEPS: &[TourStep] = &[
    TourStep::new(
        "intro",
        "editor-area",
        "You write. Your AI buddy handles the research, editing, fact-checking, and proofreading. Let\u{2019}s see how it works.",
        Placement::Center,
    )
    .cta("Start \u{2192}"),
    TourStep::new(
        "rough-draft",
        "editor-paragraph",
        "Every great piece starts rough. Notes, half-baked ideas, fragments. That\u{2019}s fine \u{2014} you\u{2019}re the idea machine.",
        Placement::Bottom,
    )
    .cta("Next \u{2192}"),
    TourStep::new(
        "ask-rewrite",
        "chat-input",
        "Just talk to your AI buddy. It\u{2019}s not replacing you \u{2014} it\u{2019}s helping you skip a draft or two.",
        Placement::Left,
    )
    .cta("Rewrite \u{2192}")
    .triggers(Act::Rewrite),
    TourStep::new(
        "watch-morph",
        "editor-paragraph",
        "Watch \u{2014} the AI moves words around like magic. Right in your document.",
        Placement::Top,
    )
    .auto_advance(AwaitCondition::ActComplete(Act::Rewrite), 600),
    TourStep::new(
        "rewrite-done",
        "editor-paragraph",
        "Rough notes \u{2192} polished prose. No copy-pasting between apps. No switching tabs.",
        Placement::Bottom,
    )
    .cta("Next: Proofreading \u{2192}"),
    TourStep::new(
        "click-proofread",
        "toolbar-proofread",
        "Now hand off the tedious stuff. One click and your AI proofreader gets to work.",
        Placement::Bottom,
    )
    .cta("Proofread \u{2192}")
    .triggers(Act::Proofread),
    TourStep::new(
        "scanning",
        "editor-paragraph",
        "Your AI team is scanning the document...",
        Placement::Top,
    )
    .auto_advance(AwaitCondition::DiffsVisible, 300),
    TourStep::new(
        "see-diffs",
        "editor-paragraph",
        "Not just spell-check. It caught a missing word too. Red = delete. Green = insert.",
        Placement::Bottom,
    )
    .cta("Accept All \u{2192}")
    .signal(CtaSignal::AcceptDiffs),
    TourStep::new(
        "diffs-resolved",
        "editor-paragraph",
        "All fixed. One click. That\u{2019}s your proofreader, fact-checker, and editor on call 24/7.",
        Placement::Bottom,
    )
    .cta("Next: Research \u{2192}"),
    TourStep::new(
        "ask-research",
        "chat-input",
        "Need to look something up? No more opening 20 tabs. Just ask.",
        Placement::Left,
    )
    .cta("Search \u{2192}")
    .triggers(Act::Research),
    TourStep::new(
        "searching",
        "chat-messages",
        "Your AI research assistant is searching the web and synthesizing an answer with sources...",
        Placement::Left,
    )
    .auto_advance(
        AwaitCondition::ResearchPhase(ResearchPhase::ResponseVisible),
        400,
    ),
    TourStep::new(
        "insert-to-doc",
        "chat-insert-btn",
        "Research done. Citations included. One click to add it to your doc.",
        Placement::Left,
    )
    .cta("Insert to Doc \u{2192}")
    .signal(CtaSignal::InsertResearch),
    TourStep::new(
        "sidebar-reveal",
        "sidebar",
        "Drafts, research, web searches \u{2014} everything lives in your project. Nothing gets lost. No more juggling.",
        Placement::Right,
    )
    .opens_sidebar()
    .auto_advance(AwaitCondition::SidebarOpen, 1600),
    TourStep::new(
        "finale",
        "center",
        "Think. Brainstorm. Write. Research. Edit. Iterate.\nOne app. One place. You\u{2019}re the boss.",
        Placement::Center,
    )
    .cta("Try for FREE \u{2192}")
    .cta_link(SIGN_UP_URL)
    .show_replay(),
];

// ============================================================================
// Global timing
// ============================================================================

/// Timing shared across acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Delay between acts when auto-playing.
    pub inter_act_delay: Duration,
    /// Delay before auto mode leaves `idle`.
    pub auto_start_delay: Duration,
    /// Delay before a chat prompt starts typing.
    pub typing_start_delay: Duration,
    /// Delay after the finale before auto mode replays.
    pub auto_replay_delay: Duration,
}

pub const TIMING: Timing = Timing {
    inter_act_delay: Duration::from_millis(1000),
    auto_start_delay: Duration::from_millis(500),
    typing_start_delay: Duration::from_millis(300),
    auto_replay_delay: Duration::from_millis(6000),
};
