//! Word-level LCS diff and the text-morph plan built on top of it.
//!
//! `diff` is pure and cheap enough to call on every render. The backtrack
//! tie-break decides the visual order of additions and removals, so it must
//! stay exactly as written.

use std::time::Duration;

use serde::Serialize;

/// One token of a word diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DiffToken {
    Keep {
        text: String,
        old_index: usize,
        new_index: usize,
    },
    Add {
        text: String,
        new_index: usize,
    },
    Remove {
        text: String,
        old_index: usize,
    },
}

impl DiffToken {
    pub fn text(&self) -> &str {
        match self {
            DiffToken::Keep { text, .. } | DiffToken::Add { text, .. } | DiffToken::Remove { text, .. } => {
                text
            }
        }
    }

    pub fn is_add(&self) -> bool {
        matches!(self, DiffToken::Add { .. })
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, DiffToken::Remove { .. })
    }
}

/// Diffs two strings word by word.
///
/// Both inputs are split on whitespace runs; words compare by exact,
/// case-sensitive equality.
pub fn diff(old_text: &str, new_text: &str) -> Vec<DiffToken> {
    let old_words: Vec<&str> = old_text.split_whitespace().collect();
    let new_words: Vec<&str> = new_text.split_whitespace().collect();
    let m = old_words.len();
    let n = new_words.len();

    // dp[i][j] = LCS length of old_words[..i] and new_words[..j]
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if old_words[i - 1] == new_words[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut tokens = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old_words[i - 1] == new_words[j - 1] {
            tokens.push(DiffToken::Keep {
                text: new_words[j - 1].to_string(),
                old_index: i - 1,
                new_index: j - 1,
            });
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
            tokens.push(DiffToken::Add {
                text: new_words[j - 1].to_string(),
                new_index: j - 1,
            });
            j -= 1;
        } else {
            tokens.push(DiffToken::Remove {
                text: old_words[i - 1].to_string(),
                old_index: i - 1,
            });
            i -= 1;
        }
    }

    tokens.reverse();
    tokens
}

/// Rebuilds the whitespace-normalized source text from a token list.
pub fn source_text(tokens: &[DiffToken]) -> String {
    join_where(tokens, |t| !t.is_add())
}

/// Rebuilds the whitespace-normalized target text from a token list.
pub fn target_text(tokens: &[DiffToken]) -> String {
    join_where(tokens, |t| !t.is_remove())
}

fn join_where(tokens: &[DiffToken], keep: impl Fn(&DiffToken) -> bool) -> String {
    tokens
        .iter()
        .filter(|t| keep(t))
        .map(DiffToken::text)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Text morph plan
// ============================================================================

/// Delay between successive added words fading in.
pub const ADD_STAGGER: Duration = Duration::from_millis(60);

/// How a single token animates during the morph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MorphMotion {
    /// Kept word whose position changed.
    Slide { from: usize, to: usize },
    /// Kept word that stays put.
    Hold,
    /// New word fading in after `delay`.
    FadeIn { delay: Duration },
    /// Dropped word fading out.
    FadeOut,
}

/// Choreography for morphing one text into another.
#[derive(Debug, Clone, Serialize)]
pub struct MorphPlan {
    pub tokens: Vec<DiffToken>,
    pub motions: Vec<MorphMotion>,
    /// Movement portion of the morph (70 %).
    pub morph: Duration,
    /// Settle portion after movement (30 %).
    pub settle: Duration,
}

impl MorphPlan {
    pub fn new(from: &str, to: &str, duration: Duration) -> Self {
        let tokens = diff(from, to);
        let mut add_rank = 0u32;
        let motions = tokens
            .iter()
            .map(|token| match token {
                DiffToken::Keep {
                    old_index,
                    new_index,
                    ..
                } if old_index != new_index => MorphMotion::Slide {
                    from: *old_index,
                    to: *new_index,
                },
                DiffToken::Keep { .. } => MorphMotion::Hold,
                DiffToken::Add { .. } => {
                    let delay = ADD_STAGGER * add_rank;
                    add_rank += 1;
                    MorphMotion::FadeIn { delay }
                }
                DiffToken::Remove { .. } => MorphMotion::FadeOut,
            })
            .collect();

        let morph = duration * 7 / 10;
        Self {
            tokens,
            motions,
            morph,
            settle: duration.saturating_sub(morph),
        }
    }

    /// Words of the new layout that are visible `elapsed` into the morph.
    ///
    /// Kept words are always present; added words appear once their stagger
    /// delay has passed.
    pub fn visible_words(&self, elapsed: Duration) -> Vec<&str> {
        self.tokens
            .iter()
            .zip(&self.motions)
            .filter_map(|(token, motion)| match motion {
                MorphMotion::FadeOut => None,
                MorphMotion::FadeIn { delay } if elapsed < *delay => None,
                _ => Some(token.text()),
            })
            .collect()
    }

    pub fn total(&self) -> Duration {
        self.morph + self.settle
    }
}
