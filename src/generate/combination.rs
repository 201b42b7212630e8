use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::{
    config::hook::OverrideHook,
    config::model::{Component, Item},
    foundation::error::{DollError, DollResult},
    generate::sampler::pick_weighted_index,
    metadata::record::Metadata,
};

/// Sampling attempts before the generator reports that no novel combination is available.
pub const MAX_ATTEMPTS: usize = 20;

/// Candidates the exhaustive fallback inspects per call before giving up.
///
/// The scan resumes where the previous call stopped, so the limit bounds the work of one
/// call, not the size of the space that can be filled.
pub const FALLBACK_SCAN_LIMIT: u64 = 1_000_000;

/// One selected item index per component, in component order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Combination {
    parts: Vec<usize>,
}

impl Combination {
    /// Wrap an index sequence without validating it.
    pub fn new(parts: Vec<usize>) -> Self {
        Self { parts }
    }

    /// Validate `parts` against `components` (same length, every index in range).
    pub fn from_parts(components: &[Component], parts: Vec<usize>) -> DollResult<Self> {
        if parts.len() != components.len() {
            return Err(DollError::config(format!(
                "combination has {} parts but there are {} components",
                parts.len(),
                components.len()
            )));
        }
        for (c, &i) in components.iter().zip(&parts) {
            if i >= c.items.len() {
                return Err(DollError::config(format!(
                    "item index {i} out of range for component '{}' ({} items)",
                    c.folder,
                    c.items.len()
                )));
            }
        }
        Ok(Self { parts })
    }

    /// Selected item indices.
    pub fn parts(&self) -> &[usize] {
        &self.parts
    }

    /// Deduplication identity: indices joined with `|`.
    pub fn key(&self) -> String {
        let parts: Vec<String> = self.parts.iter().map(usize::to_string).collect();
        parts.join("|")
    }

    /// Selected item of component `component`.
    ///
    /// Panics if the combination was not built against `components`.
    pub fn item<'a>(&self, components: &'a [Component], component: usize) -> &'a Item {
        &components[component].items[self.parts[component]]
    }
}

/// Identity keys of every combination emitted during one run.
///
/// Also holds the position of the exhaustive scan, which only ever moves forward: every
/// candidate behind it is already in the set.
#[derive(Clone, Debug, Default)]
pub struct GeneratedSet {
    keys: HashSet<String>,
    scan: ScanCursor,
}

#[derive(Clone, Debug, Default)]
struct ScanCursor {
    digits: Vec<usize>,
    exhausted: bool,
}

impl GeneratedSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `combination` was already emitted.
    pub fn contains(&self, combination: &Combination) -> bool {
        self.keys.contains(&combination.key())
    }

    /// Record `combination`; returns `false` if it was already present.
    pub fn insert(&mut self, combination: &Combination) -> bool {
        self.keys.insert(combination.key())
    }

    /// Number of recorded combinations.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Rejection-sampling generator of novel combinations.
#[derive(Clone, Copy, Debug)]
pub struct CombinationGenerator {
    /// Sampling attempts per call.
    pub max_attempts: usize,
    /// After the attempts are spent, scan the combination space for an unused entry.
    pub exhaustive_fallback: bool,
}

impl Default for CombinationGenerator {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            exhaustive_fallback: false,
        }
    }
}

impl CombinationGenerator {
    /// Produce a combination absent from `generated` and record it there.
    ///
    /// Each attempt samples one item per component, lets `hook` replace the sample, and
    /// rejects it if its key is already in `generated`. `Ok(None)` means no novel
    /// combination was found; that is the caller's signal to stop or report a shortfall.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        components: &[Component],
        generated: &mut GeneratedSet,
        hook: Option<&dyn OverrideHook>,
        rng: &mut R,
    ) -> DollResult<Option<Combination>> {
        for attempt in 0..self.max_attempts {
            let mut parts = Vec::with_capacity(components.len());
            for c in components {
                let i = pick_weighted_index(&c.items, rng).ok_or_else(|| {
                    DollError::config(format!("component '{}' has no items", c.folder))
                })?;
                parts.push(i);
            }

            let combination = apply_hook(components, parts, hook)?;
            if generated.insert(&combination) {
                return Ok(Some(combination));
            }
            debug!(attempt, key = %combination.key(), "duplicate combination");
        }

        if self.exhaustive_fallback {
            return scan_unused(components, generated, hook);
        }
        Ok(None)
    }
}

/// Combination for 0-based request `index`: item `index mod item_count` per component.
pub fn sequential_combination(components: &[Component], index: u64) -> Combination {
    let parts = components
        .iter()
        .map(|c| (index % (c.items.len().max(1) as u64)) as usize)
        .collect();
    Combination::new(parts)
}

/// The first `count` sequential combinations.
pub fn sequential_combinations(components: &[Component], count: u64) -> Vec<Combination> {
    (0..count)
        .map(|i| sequential_combination(components, i))
        .collect()
}

/// Rebuild combinations from previously saved records.
pub fn replay_combinations(
    components: &[Component],
    records: &[Metadata],
) -> DollResult<Vec<Combination>> {
    records
        .iter()
        .enumerate()
        .map(|(n, record)| {
            let parts = record
                .parts
                .clone()
                .ok_or_else(|| DollError::config(format!("metadata record {n} has no parts")))?;
            Combination::from_parts(components, parts)
        })
        .collect()
}

fn apply_hook(
    components: &[Component],
    sampled: Vec<usize>,
    hook: Option<&dyn OverrideHook>,
) -> DollResult<Combination> {
    let Some(hook) = hook else {
        return Ok(Combination::new(sampled));
    };
    match hook.override_parts(&sampled) {
        Some(replacement) => Combination::from_parts(components, replacement)
            .map_err(|e| DollError::config(format!("override hook: {e}"))),
        None => Ok(Combination::new(sampled)),
    }
}

/// Odometer scan over positive-weight items, in index order, resuming at the cursor kept in
/// `generated`.
fn scan_unused(
    components: &[Component],
    generated: &mut GeneratedSet,
    hook: Option<&dyn OverrideHook>,
) -> DollResult<Option<Combination>> {
    let candidates: Vec<Vec<usize>> = components
        .iter()
        .map(|c| {
            let positive: Vec<usize> = c
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.weight > 0)
                .map(|(i, _)| i)
                .collect();
            if positive.is_empty() {
                (0..c.items.len()).collect()
            } else {
                positive
            }
        })
        .collect();
    if candidates.iter().any(Vec::is_empty) {
        return Ok(None);
    }

    let GeneratedSet { keys, scan } = generated;
    if scan.digits.len() != candidates.len() {
        *scan = ScanCursor {
            digits: vec![0; candidates.len()],
            exhausted: false,
        };
    }

    for _ in 0..FALLBACK_SCAN_LIMIT {
        if scan.exhausted {
            return Ok(None);
        }
        let parts = scan
            .digits
            .iter()
            .zip(&candidates)
            .map(|(&d, pool)| pool[d])
            .collect();
        let combination = apply_hook(components, parts, hook)?;
        scan.exhausted = !advance(&mut scan.digits, &candidates);
        if keys.insert(combination.key()) {
            return Ok(Some(combination));
        }
    }
    debug!(limit = FALLBACK_SCAN_LIMIT, "exhaustive scan paused");
    Ok(None)
}

/// Step the odometer; `false` once it wraps past the last candidate.
fn advance(digits: &mut [usize], candidates: &[Vec<usize>]) -> bool {
    for d in (0..digits.len()).rev() {
        digits[d] += 1;
        if digits[d] < candidates[d].len() {
            return true;
        }
        digits[d] = 0;
    }
    false
}

#[cfg(test)]
#[path = "../../tests/unit/generate/combination.rs"]
mod tests;
