use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::Rng;
use tracing::{info, warn};

use crate::{
    assets::cache::ImageCache,
    config::hook::OverrideHook,
    config::model::{Component, Config},
    foundation::error::DollResult,
    generate::combination::{
        Combination, CombinationGenerator, GeneratedSet, sequential_combination,
    },
    metadata::record::{Metadata, build_metadata},
    render::pipeline::{RenderContext, render_item},
};

/// Where the combination for each requested id comes from.
#[derive(Clone, Debug, Default)]
pub enum PartsSource {
    /// Weighted sampling with deduplication.
    #[default]
    Random,
    /// `index mod item_count` per component.
    Sequential,
    /// Precomputed combinations (e.g. replayed metadata); ids past the end fall back to
    /// sampling.
    Replay(Vec<Combination>),
}

/// Per-run knobs, usually straight from the CLI.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// 1-based id to start at.
    pub offset: Option<u64>,
    /// Number of ids to generate from `offset`.
    pub count: Option<u64>,
    /// Skip compositing; only metadata and statistics are produced.
    pub skip_images: bool,
    /// Scan the combination space once sampling stops finding novel combinations.
    ///
    /// The scan resumes across ids and inspects at most
    /// [`FALLBACK_SCAN_LIMIT`](crate::FALLBACK_SCAN_LIMIT) candidates per id.
    pub exhaustive: bool,
}

/// How often each item of each component was emitted: `counts[component][item]`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OccurrenceTable {
    counts: Vec<Vec<u64>>,
}

impl OccurrenceTable {
    /// All-zero table shaped like `components`.
    pub fn new(components: &[Component]) -> Self {
        Self {
            counts: components.iter().map(|c| vec![0; c.items.len()]).collect(),
        }
    }

    /// Count one emitted combination.
    pub fn record(&mut self, combination: &Combination) {
        for (row, &i) in self.counts.iter_mut().zip(combination.parts()) {
            if let Some(slot) = row.get_mut(i) {
                *slot += 1;
            }
        }
    }

    /// Raw counts.
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }
}

/// Result of one run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Ids the run was asked for.
    pub requested: u64,
    /// Ids actually generated.
    pub generated: u64,
    /// PNG files written.
    pub files_written: u64,
    /// Per-item records (empty without a metadata template).
    pub metadata: Vec<Metadata>,
    /// Occurrence statistics.
    pub statistics: OccurrenceTable,
}

/// State of one generation run: the generated-combination set, the decode cache and the
/// running statistics, all scoped to this value.
pub struct RunSession<'a> {
    config: &'a Config,
    data_dir: PathBuf,
    out_dir: PathBuf,
    hook: Option<&'a dyn OverrideHook>,
    cache: ImageCache,
    generated: GeneratedSet,
}

impl<'a> RunSession<'a> {
    /// New session over a prepared `config`.
    pub fn new(
        config: &'a Config,
        data_dir: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            data_dir: data_dir.into(),
            out_dir: out_dir.into(),
            hook: None,
            cache: ImageCache::new(),
            generated: GeneratedSet::new(),
        }
    }

    /// Install an override hook for sampled combinations.
    pub fn with_hook(mut self, hook: &'a dyn OverrideHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Output root.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Combinations emitted so far by sampling.
    pub fn generated(&self) -> &GeneratedSet {
        &self.generated
    }

    /// Decode cache shared by every render of this session.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Generate ids in ascending order until the requested range is covered or sampling runs
    /// out of novel combinations.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        source: &PartsSource,
        options: &RunOptions,
        rng: &mut R,
    ) -> DollResult<RunReport> {
        let config = self.config;
        let start = options.offset.map(|o| o.saturating_sub(1)).unwrap_or(0);
        let end = match (options.count, source) {
            (Some(count), _) => start.saturating_add(count),
            (None, PartsSource::Replay(parts)) if !parts.is_empty() => parts.len() as u64,
            (None, _) => config.count,
        };

        if !options.skip_images {
            std::fs::create_dir_all(&self.out_dir)
                .with_context(|| format!("create output dir '{}'", self.out_dir.display()))?;
        }

        let generator = CombinationGenerator {
            exhaustive_fallback: options.exhaustive,
            ..CombinationGenerator::default()
        };
        let mut report = RunReport {
            requested: end.saturating_sub(start),
            generated: 0,
            files_written: 0,
            metadata: vec![],
            statistics: OccurrenceTable::new(&config.components),
        };

        for i in start..end {
            let id = i + 1;
            info!("generating #{id}");

            let replayed = match source {
                PartsSource::Replay(parts) => parts.get(i as usize).cloned(),
                PartsSource::Sequential => Some(sequential_combination(&config.components, i)),
                PartsSource::Random => None,
            };
            let combination = match replayed {
                Some(c) => c,
                None => {
                    let sampled = generator.generate(
                        &config.components,
                        &mut self.generated,
                        self.hook,
                        rng,
                    )?;
                    let Some(c) = sampled else {
                        warn!(
                            "no novel combination at #{id}; generated {} of {} requested",
                            report.generated, report.requested
                        );
                        break;
                    };
                    c
                }
            };

            if !options.skip_images {
                let ctx = RenderContext {
                    config,
                    data_dir: &self.data_dir,
                    out_dir: &self.out_dir,
                    cache: &self.cache,
                };
                report.files_written += render_item(&ctx, id, &combination)?.files_written;
            }
            if let Some(template) = &config.metadata {
                report
                    .metadata
                    .push(build_metadata(template, &config.components, id, &combination));
            }
            report.statistics.record(&combination);
            report.generated += 1;
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/run.rs"]
mod tests;
