//! Multi-session experiment runner: prototype vs engagement-only baseline,
//! with raw and summarized results written to CSV.

use crate::config::Config;
use crate::dataset::{shuffled, Video};
use crate::engine::presets::{mode_settings, Preset};
use crate::engine::ranker::{build_prototype_feed, rank_baseline};
use crate::engine::scoring::add_engagement;
use crate::engine::feed_ids;
use crate::evaluate::{evaluate_feed, runtime_per_100};
use crate::metrics::overlap_ratio;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct ExperimentOptions {
    pub n_sessions: u64,
    pub recent_window: usize,
    pub overlap_topn: usize,
}

impl Default for ExperimentOptions {
    fn default() -> Self {
        Self { n_sessions: 10, recent_window: 10, overlap_topn: 10 }
    }
}

/// One raw result row (prototype or its paired baseline).
#[derive(Debug, Clone, Serialize)]
pub struct TrialRow {
    pub preset: String,
    pub night_mode: bool,
    pub seed: u64,
    pub k: usize,
    pub diversity_at_10: usize,
    pub max_topic_streak: usize,
    pub max_creator_streak: usize,
    pub prosocial_ratio: f64,
    pub runtime_sec: f64,
    pub runtime_sec_per_100: f64,
    pub pass_diversity: bool,
    pub pass_topic_streak: bool,
    pub pass_creator_streak: bool,
    pub pass_prosocial: bool,
    pub pass_runtime: bool,
    pub overall_pass: bool,
    pub overlap_ratio_top10: f64,
    pub overlap_ratio_topk: f64,
}

/// One trial: build the prototype feed plus an engagement-only baseline at
/// the SAME k (for a fair overlap comparison), measure both.
pub fn run_one(
    session: &[Video],
    preset: Preset,
    night_mode: bool,
    seed: u64,
    config: &Config,
    opts: &ExperimentOptions,
) -> Vec<TrialRow> {
    let (candidates, _) = add_engagement(session.to_vec());

    let weights = config
        .presets
        .weights(preset)
        .unwrap_or(config.presets.entertainment);
    let (weights, k) = mode_settings(
        weights,
        night_mode,
        config.feed.k_default,
        config.feed.night_k_cap,
        config.feed.night_risk_boost,
    );

    let start = Instant::now();
    let proto_feed = build_prototype_feed(&candidates, &weights, k, opts.recent_window);
    let proto_sec = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let base_feed = rank_baseline(&candidates, k);
    let base_sec = start.elapsed().as_secs_f64();

    let proto_ids = feed_ids(&proto_feed);
    let base_ids = feed_ids(&base_feed);

    let overlap10 = overlap_ratio(&proto_ids, &base_ids, opts.overlap_topn);
    let overlapk = overlap_ratio(
        &proto_ids,
        &base_ids,
        k.min(proto_ids.len()).min(base_ids.len()),
    );

    let mut rows = Vec::with_capacity(2);
    for (name, feed, runtime_sec, o10, ok) in [
        (preset.to_string(), &proto_feed, proto_sec, overlap10, overlapk),
        (
            "baseline".to_string(),
            &base_feed,
            base_sec,
            // Baseline vs itself is always fully overlapping; kept as an
            // explicit sanity column in the raw output.
            overlap_ratio(&base_ids, &base_ids, opts.overlap_topn),
            overlap_ratio(&base_ids, &base_ids, k.min(base_ids.len())),
        ),
    ] {
        let report = evaluate_feed(feed, &config.targets);
        let per_100 = runtime_per_100(runtime_sec, k);
        let pass_topic = report.max_topic_streak <= config.targets.max_streak;
        let pass_creator = report.max_creator_streak <= config.targets.max_streak;
        let pass_runtime = per_100 <= config.targets.runtime_sec_per_100;
        let overall = report.pass_diversity
            && pass_topic
            && pass_creator
            && report.pass_prosocial
            && pass_runtime;

        rows.push(TrialRow {
            preset: name,
            night_mode,
            seed,
            k,
            diversity_at_10: report.diversity_at_10,
            max_topic_streak: report.max_topic_streak,
            max_creator_streak: report.max_creator_streak,
            prosocial_ratio: report.prosocial_ratio,
            runtime_sec,
            runtime_sec_per_100: per_100,
            pass_diversity: report.pass_diversity,
            pass_topic_streak: pass_topic,
            pass_creator_streak: pass_creator,
            pass_prosocial: report.pass_prosocial,
            pass_runtime,
            overall_pass: overall,
            overlap_ratio_top10: o10,
            overlap_ratio_topk: ok,
        });
    }

    rows
}

/// Run the full grid: seeds 0..n_sessions x prototype presets x night mode.
pub fn run(videos: &[Video], config: &Config, opts: &ExperimentOptions) -> Vec<TrialRow> {
    let mut rows = Vec::new();

    for seed in 0..opts.n_sessions {
        let session = shuffled(videos, seed);

        for preset in Preset::PROTOTYPES {
            for night_mode in [false, true] {
                rows.extend(run_one(&session, preset, night_mode, seed, config, opts));
            }
        }
    }

    rows
}

const SUMMARY_METRICS: [&str; 7] = [
    "diversity_at_10",
    "max_topic_streak",
    "max_creator_streak",
    "prosocial_ratio",
    "runtime_sec_per_100",
    "overlap_ratio_top10",
    "overlap_ratio_topk",
];

/// Grouped summary stats for one (preset, night_mode, k) cell.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub preset: String,
    pub night_mode: bool,
    pub k: usize,
    /// mean/std/min/max per metric, in SUMMARY_METRICS order.
    pub stats: Vec<MetricStats>,
    /// Mean of overall_pass (true=1).
    pub pass_rate: f64,
}

#[derive(Debug, Clone)]
pub struct MetricStats {
    pub mean: f64,
    /// Sample std; None when the group has a single row.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

fn metric_value(row: &TrialRow, metric: &str) -> f64 {
    match metric {
        "diversity_at_10" => row.diversity_at_10 as f64,
        "max_topic_streak" => row.max_topic_streak as f64,
        "max_creator_streak" => row.max_creator_streak as f64,
        "prosocial_ratio" => row.prosocial_ratio,
        "runtime_sec_per_100" => row.runtime_sec_per_100,
        "overlap_ratio_top10" => row.overlap_ratio_top10,
        "overlap_ratio_topk" => row.overlap_ratio_topk,
        _ => 0.0,
    }
}

fn stats_of(values: &[f64]) -> MetricStats {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(var.sqrt())
    } else {
        None
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    MetricStats { mean, std, min, max }
}

/// Group raw rows by (preset, night_mode, k) and aggregate.
pub fn summarize(rows: &[TrialRow]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(String, bool, usize), Vec<&TrialRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.preset.clone(), row.night_mode, row.k))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|((preset, night_mode, k), group)| {
            let stats = SUMMARY_METRICS
                .iter()
                .map(|metric| {
                    let values: Vec<f64> =
                        group.iter().map(|r| metric_value(r, metric)).collect();
                    stats_of(&values)
                })
                .collect();
            let pass_rate = group.iter().filter(|r| r.overall_pass).count() as f64
                / group.len() as f64;
            SummaryRow { preset, night_mode, k, stats, pass_rate }
        })
        .collect()
}

pub fn write_raw_csv(path: &Path, rows: &[TrialRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create raw results file: {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("Failed to write raw result row")?;
    }
    writer.flush().context("Failed to flush raw results")?;
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn write_summary_csv(path: &Path, rows: &[SummaryRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create summary file: {}", path.display()))?;

    let mut header = vec!["preset".to_string(), "night_mode".to_string(), "k".to_string()];
    for metric in SUMMARY_METRICS {
        for stat in ["mean", "std", "min", "max"] {
            header.push(format!("{}_{}", metric, stat));
        }
    }
    header.push("pass_rate".to_string());
    writer.write_record(&header).context("Failed to write summary header")?;

    for row in rows {
        let mut record = vec![
            row.preset.clone(),
            row.night_mode.to_string(),
            row.k.to_string(),
        ];
        for stats in &row.stats {
            record.push(stats.mean.to_string());
            record.push(fmt_opt(stats.std));
            record.push(stats.min.to_string());
            record.push(stats.max.to_string());
        }
        record.push(row.pass_rate.to_string());
        writer.write_record(&record).context("Failed to write summary row")?;
    }

    writer.flush().context("Failed to flush summary")?;
    Ok(())
}

/// Run the experiment grid and write raw + summary CSVs into `outdir`.
pub fn run_and_save(
    videos: &[Video],
    config: &Config,
    opts: &ExperimentOptions,
    outdir: &Path,
) -> Result<(Vec<TrialRow>, Vec<SummaryRow>)> {
    std::fs::create_dir_all(outdir)
        .with_context(|| format!("Failed to create output directory: {}", outdir.display()))?;

    let rows = run(videos, config, opts);
    let summary = summarize(&rows);

    let raw_path = outdir.join("experiment_raw.csv");
    let sum_path = outdir.join("experiment_summary.csv");
    write_raw_csv(&raw_path, &rows)?;
    write_summary_csv(&sum_path, &summary)?;

    tracing::info!(raw = %raw_path.display(), summary = %sum_path.display(), "experiment results saved");

    println!("\nSaved:");
    println!(" - {}", raw_path.display());
    println!(" - {}", sum_path.display());

    println!("\nPass rates:");
    println!("{:<16} {:<10} {:>4} {:>10}", "preset", "night_mode", "k", "pass_rate");
    for row in &summary {
        println!(
            "{:<16} {:<10} {:>4} {:>10.2}",
            row.preset, row.night_mode, row.k, row.pass_rate,
        );
    }

    Ok((rows, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_video;

    fn pool() -> Vec<Video> {
        let topics = ["comedy", "music", "science", "sports", "cooking"];
        (0..40)
            .map(|i| {
                sample_video(
                    &format!("v{}", i),
                    &format!("chan{}", i % 8),
                    topics[i % topics.len()],
                    500 + (i as u64 * 53) % 700,
                    u8::from(i % 3 == 0),
                    u8::from(i % 11 == 0),
                )
            })
            .collect()
    }

    #[test]
    fn test_run_one_produces_paired_rows() {
        let config = Config::default();
        let opts = ExperimentOptions::default();
        let rows = run_one(&pool(), Preset::Entertainment, false, 0, &config, &opts);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].preset, "entertainment");
        assert_eq!(rows[1].preset, "baseline");
        assert_eq!(rows[0].k, rows[1].k);
        // baseline vs itself fully overlaps
        assert!((rows[1].overlap_ratio_top10 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_row_count() {
        let config = Config::default();
        let opts = ExperimentOptions { n_sessions: 3, ..Default::default() };
        let rows = run(&pool(), &config, &opts);
        // 3 seeds x 3 presets x 2 modes x 2 rows (proto + baseline)
        assert_eq!(rows.len(), 3 * 3 * 2 * 2);
    }

    #[test]
    fn test_summarize_groups_and_pass_rate() {
        let config = Config::default();
        let opts = ExperimentOptions { n_sessions: 4, ..Default::default() };
        let rows = run(&pool(), &config, &opts);
        let summary = summarize(&rows);

        // baseline + 3 presets, each in normal and night k
        assert!(summary.iter().any(|s| s.preset == "baseline"));
        assert!(summary.iter().any(|s| s.preset == "learning" && s.night_mode));
        for s in &summary {
            assert!((0.0..=1.0).contains(&s.pass_rate));
            assert_eq!(s.stats.len(), SUMMARY_METRICS.len());
        }
    }

    #[test]
    fn test_stats_of_single_row_has_no_std() {
        let stats = stats_of(&[3.0]);
        assert!((stats.mean - 3.0).abs() < 1e-9);
        assert!(stats.std.is_none());
        assert!((stats.min - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_csv_outputs() {
        let config = Config::default();
        let opts = ExperimentOptions { n_sessions: 2, ..Default::default() };
        let dir = tempfile::tempdir().unwrap();
        let (rows, summary) = run_and_save(&pool(), &config, &opts, dir.path()).unwrap();
        assert!(!rows.is_empty());
        assert!(!summary.is_empty());

        let raw = std::fs::read_to_string(dir.path().join("experiment_raw.csv")).unwrap();
        assert!(raw.lines().next().unwrap().contains("overlap_ratio_top10"));
        let sum = std::fs::read_to_string(dir.path().join("experiment_summary.csv")).unwrap();
        assert!(sum.lines().next().unwrap().contains("prosocial_ratio_mean"));
        assert!(sum.lines().next().unwrap().ends_with("pass_rate"));
    }
}
