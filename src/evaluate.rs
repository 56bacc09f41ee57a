//! Evaluation runner: measures whether each feed meets the design criteria
//! across seeded simulated sessions.

use crate::config::{Config, TargetsConfig};
use crate::dataset::{shuffled, Video};
use crate::engine::presets::{mode_settings, Preset};
use crate::engine::ranker::{build_prototype_feed, rank_baseline};
use crate::engine::scoring::add_engagement;
use crate::engine::FeedEntry;
use crate::metrics::{diversity_at_k, max_creator_streak, max_topic_streak, prosocial_ratio};
use std::collections::BTreeMap;
use std::time::Instant;

pub const SEEDS: [u64; 5] = [0, 1, 2, 3, 4];

/// Metrics plus per-criterion pass flags for one feed.
#[derive(Debug, Clone)]
pub struct FeedReport {
    pub diversity_at_10: usize,
    pub max_topic_streak: usize,
    pub max_creator_streak: usize,
    pub prosocial_ratio: f64,
    pub pass_diversity: bool,
    pub pass_streaks: bool,
    pub pass_prosocial: bool,
}

pub fn evaluate_feed(feed: &[FeedEntry], targets: &TargetsConfig) -> FeedReport {
    let d10 = diversity_at_k(feed, 10);
    let topic_streak = max_topic_streak(feed);
    let creator_streak = max_creator_streak(feed);
    let p_ratio = prosocial_ratio(feed);

    FeedReport {
        diversity_at_10: d10,
        max_topic_streak: topic_streak,
        max_creator_streak: creator_streak,
        prosocial_ratio: p_ratio,
        pass_diversity: d10 >= targets.diversity_at_10,
        pass_streaks: topic_streak <= targets.max_streak && creator_streak <= targets.max_streak,
        pass_prosocial: p_ratio >= targets.prosocial_ratio,
    }
}

/// Scale runtime to "seconds per 100 posts" so k=15 and k=100 compare fairly.
pub fn runtime_per_100(runtime_sec: f64, k: usize) -> f64 {
    if k == 0 {
        return f64::INFINITY;
    }
    runtime_sec * (100.0 / k as f64)
}

/// One evaluated case: (preset, night mode) on one seeded session.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub model: &'static str,
    pub preset: String,
    pub mode: &'static str,
    pub night_mode: bool,
    pub seed: u64,
    pub k: usize,
    pub recent_window: usize,
    pub report: FeedReport,
    pub runtime_sec: f64,
    pub runtime_sec_per_100: f64,
    pub pass_runtime: bool,
}

impl CaseResult {
    pub fn pass_all(&self) -> bool {
        self.report.pass_diversity
            && self.report.pass_streaks
            && self.report.pass_prosocial
            && self.pass_runtime
    }
}

/// Run one case on an already-shuffled session.
/// Baseline ignores night mode and always runs at the default k.
pub fn run_case(session: &[Video], preset: Preset, night_mode: bool, config: &Config) -> CaseResult {
    let (candidates, _) = add_engagement(session.to_vec());

    let (feed, k, runtime_sec, model, preset_name, mode) = if preset == Preset::Baseline {
        let k = config.feed.k_default;
        let start = Instant::now();
        let feed = rank_baseline(&candidates, k);
        let elapsed = start.elapsed().as_secs_f64();
        (feed, k, elapsed, "baseline", "engagement_only".to_string(), "normal")
    } else {
        let weights = config
            .presets
            .weights(preset)
            .unwrap_or_else(|| unreachable!("prototype preset always has weights"));
        let (weights, k) = mode_settings(
            weights,
            night_mode,
            config.feed.k_default,
            config.feed.night_k_cap,
            config.feed.night_risk_boost,
        );
        let start = Instant::now();
        let feed = build_prototype_feed(&candidates, &weights, k, config.feed.recent_window);
        let elapsed = start.elapsed().as_secs_f64();
        let mode = if night_mode { "night" } else { "normal" };
        (feed, k, elapsed, "prototype", preset.to_string(), mode)
    };

    let report = evaluate_feed(&feed, &config.targets);
    let per_100 = runtime_per_100(runtime_sec, k);

    CaseResult {
        model,
        preset: preset_name,
        mode,
        night_mode,
        seed: 0,
        k,
        recent_window: config.feed.recent_window,
        report,
        runtime_sec,
        runtime_sec_per_100: per_100,
        pass_runtime: per_100 <= config.targets.runtime_sec_per_100,
    }
}

/// Full evaluation sweep: seeds x presets x night mode.
/// Baseline is run once per seed (it does not change with night mode).
pub fn run(videos: &[Video], config: &Config) -> Vec<CaseResult> {
    let mut results = Vec::new();

    for &seed in &SEEDS {
        let session = shuffled(videos, seed);

        for preset in Preset::ALL {
            for night_mode in [false, true] {
                if preset == Preset::Baseline && night_mode {
                    continue;
                }
                let mut result = run_case(&session, preset, night_mode, config);
                result.seed = seed;
                results.push(result);
            }
        }
    }

    results
}

/// Print the per-case table, grouped pass counts, and failed cases.
pub fn print_report(results: &[CaseResult]) {
    println!("\nEvaluation Results Summary\n");
    print_case_header();
    for r in results {
        print_case_row(r);
    }

    // Grouped pass counts per (model, preset, mode)
    let mut groups: BTreeMap<(String, String, String), (usize, usize)> = BTreeMap::new();
    for r in results {
        let key = (r.model.to_string(), r.preset.clone(), r.mode.to_string());
        let entry = groups.entry(key).or_insert((0, 0));
        entry.0 += 1;
        if r.pass_all() {
            entry.1 += 1;
        }
    }

    println!("\nPass Count Summary\n");
    println!("{:<10} {:<16} {:<7} {:>5} {:>7}", "model", "preset", "mode", "runs", "passes");
    for ((model, preset, mode), (runs, passes)) in &groups {
        println!("{:<10} {:<16} {:<7} {:>5} {:>7}", model, preset, mode, runs, passes);
    }

    let fails: Vec<&CaseResult> = results.iter().filter(|r| !r.pass_all()).collect();
    if !fails.is_empty() {
        println!("\nFailed Cases\n");
        print_case_header();
        for r in fails {
            print_case_row(r);
        }
    }
}

fn print_case_header() {
    println!(
        "{:<10} {:<16} {:<7} {:>4} {:>4} {:>6} {:>8} {:>8} {:>10} {:>12} {:>8}",
        "model", "preset", "mode", "seed", "k", "div@10", "t_streak", "c_streak", "prosocial", "sec_per_100", "pass_all",
    );
}

fn print_case_row(r: &CaseResult) {
    println!(
        "{:<10} {:<16} {:<7} {:>4} {:>4} {:>6} {:>8} {:>8} {:>10.3} {:>12.4} {:>8}",
        r.model,
        r.preset,
        r.mode,
        r.seed,
        r.k,
        r.report.diversity_at_10,
        r.report.max_topic_streak,
        r.report.max_creator_streak,
        r.report.prosocial_ratio,
        r.runtime_sec_per_100,
        r.pass_all(),
    );
}
