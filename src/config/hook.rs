use crate::config::model::{Config, Rule};

/// Pure override applied to every sampled combination before deduplication.
///
/// Receives the sampled item indices in component order and returns either a replacement of
/// identical length or `None` to keep the sample.
pub trait OverrideHook {
    /// Return a replacement index sequence, or `None` to keep `current`.
    fn override_parts(&self, current: &[usize]) -> Option<Vec<usize>>;
}

impl<F> OverrideHook for F
where
    F: Fn(&[usize]) -> Option<Vec<usize>>,
{
    fn override_parts(&self, current: &[usize]) -> Option<Vec<usize>> {
        self(current)
    }
}

/// [`OverrideHook`] driven by the config's `rules`.
///
/// Rules are evaluated in order against the progressively updated sequence, so a later rule
/// sees the assignments of an earlier one.
#[derive(Clone, Debug, Default)]
pub struct RuleHook {
    rules: Vec<Rule>,
}

impl RuleHook {
    /// Build from a prepared config. Returns `None` when the config has no rules.
    pub fn from_config(config: &Config) -> Option<Self> {
        if config.rules.is_empty() {
            return None;
        }
        Some(Self {
            rules: config.rules.clone(),
        })
    }
}

impl OverrideHook for RuleHook {
    fn override_parts(&self, current: &[usize]) -> Option<Vec<usize>> {
        let mut parts = current.to_vec();
        let mut fired = false;
        for rule in &self.rules {
            let matches = rule
                .when
                .iter()
                .all(|s| parts.get(s.component) == Some(&s.index));
            if !matches {
                continue;
            }
            for s in &rule.then {
                if let Some(slot) = parts.get_mut(s.component) {
                    *slot = s.index;
                }
            }
            fired = true;
        }
        fired.then_some(parts)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/hook.rs"]
mod tests;
