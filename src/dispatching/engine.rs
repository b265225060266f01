//! Rule engine for process selection.
//!
//! Chains dispatching rules: the primary rule decides, later rules only
//! break its ties. Whatever ties remain go to the process encountered
//! first, i.e. the one nearest the queue head.

use std::cmp::Ordering;
use std::sync::Arc;

use super::DispatchingRule;
use crate::models::Process;

/// A composable rule engine for ready-queue selection.
///
/// # Example
/// ```
/// use u_procsim::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Priority)
///     .with_rule(rules::Sjf);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
}

impl RuleEngine {
    /// Creates an empty rule engine. With no rules, every process ties.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule. The first rule added is the primary one.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Returns the position of the process to dispatch next.
    ///
    /// Single left-to-right pass keeping a running best; a candidate
    /// replaces it only when strictly better.
    pub fn select_best<'a, I>(&self, candidates: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a Process>,
    {
        let mut best: Option<(usize, &Process)> = None;
        for (index, process) in candidates.into_iter().enumerate() {
            let better = match best {
                None => true,
                Some((_, current)) => self.compare(process, current) == Ordering::Less,
            };
            if better {
                best = Some((index, process));
            }
        }
        best.map(|(index, _)| index)
    }

    fn compare(&self, a: &Process, b: &Process) -> Ordering {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(a).cmp(&rule.evaluate(b)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
