//! Sparse lookup tables with ordered fallback
//!
//! A [`TableResolver`] tries its match steps in order (exact first, then
//! progressively relaxed) and reports which step produced the hit, so callers
//! can disclose when a rate came from a fallback rather than an exact entry.

use serde::{Deserialize, Serialize};

type Predicate<'q, T> = Box<dyn Fn(&T) -> bool + 'q>;
type Rank<'q, T> = Box<dyn Fn(&T) -> i64 + 'q>;

struct MatchStep<'q, T> {
    label: &'static str,
    fallback: bool,
    matches: Predicate<'q, T>,
    /// Among several matches the highest rank wins; first match if absent
    rank: Option<Rank<'q, T>>,
}

/// Table entry chosen by a resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'t, T> {
    pub entry: &'t T,
    /// Label of the step that matched
    pub step: &'static str,
    pub was_fallback: bool,
}

pub struct TableResolver<'q, T> {
    steps: Vec<MatchStep<'q, T>>,
}

impl<'q, T> TableResolver<'q, T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// A step whose hit is a direct answer
    pub fn exact(mut self, label: &'static str, matches: impl Fn(&T) -> bool + 'q) -> Self {
        self.steps.push(MatchStep {
            label,
            fallback: false,
            matches: Box::new(matches),
            rank: None,
        });
        self
    }

    /// A relaxed step; hits are flagged as fallbacks
    pub fn fallback(
        mut self,
        label: &'static str,
        matches: impl Fn(&T) -> bool + 'q,
        rank: impl Fn(&T) -> i64 + 'q,
    ) -> Self {
        self.steps.push(MatchStep {
            label,
            fallback: true,
            matches: Box::new(matches),
            rank: Some(Box::new(rank)),
        });
        self
    }

    /// First hit across the steps, `None` when every step is exhausted
    pub fn resolve<'t>(&self, table: &'t [T]) -> Option<Resolved<'t, T>> {
        for step in &self.steps {
            let mut candidates = table.iter().filter(|entry| (step.matches)(entry));
            let hit = match &step.rank {
                None => candidates.next(),
                Some(rank) => candidates.fold(None, |best: Option<&'t T>, entry| match best {
                    Some(current) if rank(current) >= rank(entry) => Some(current),
                    _ => Some(entry),
                }),
            };

            if let Some(entry) = hit {
                if step.fallback {
                    log::debug!("table lookup resolved by fallback step '{}'", step.label);
                }
                return Some(Resolved {
                    entry,
                    step: step.label,
                    was_fallback: step.fallback,
                });
            }
        }
        None
    }
}

impl<'q, T> Default for TableResolver<'q, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A rate together with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRate {
    pub rate: f64,
    pub rationale: String,
    pub was_fallback: bool,
}

impl ResolvedRate {
    pub fn direct(rate: f64, rationale: impl Into<String>) -> Self {
        Self {
            rate,
            rationale: rationale.into(),
            was_fallback: false,
        }
    }

    pub fn none() -> Self {
        Self::direct(0.0, "not applicable")
    }
}

/// Scale a fractional value into an integer rank
pub fn rank_of(value: f64) -> i64 {
    (value * 1_000_000.0).round() as i64
}
