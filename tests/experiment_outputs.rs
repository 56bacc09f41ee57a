// Integration tests for the experiment runner's CSV outputs.

#[cfg(test)]
mod tests {
    use healthy_feed::config::Config;
    use healthy_feed::dataset::Video;
    use healthy_feed::experiment::{self, ExperimentOptions};

    fn video(id: &str, channel: &str, topic: &str, views: u64, prosocial: u8, risk: u8) -> Video {
        Video {
            video_id: id.to_string(),
            title: format!("video {}", id),
            channel: channel.to_string(),
            published_at: "2026-02-01T12:00:00Z".to_string(),
            view_count: views,
            duration_sec: 42.0,
            topic: topic.to_string(),
            prosocial,
            risk,
        }
    }

    fn pool() -> Vec<Video> {
        let topics = ["comedy", "music", "science", "sports", "cooking", "news"];
        (0..50usize)
            .map(|i| {
                video(
                    &format!("v{}", i),
                    &format!("chan{}", i % 10),
                    topics[i % topics.len()],
                    1_000 + (i as u64 * 97) % 9_000,
                    u8::from(i % 3 == 0),
                    u8::from(i % 13 == 0),
                )
            })
            .collect()
    }

    #[test]
    fn raw_and_summary_files_are_written() {
        let config = Config::default();
        let opts = ExperimentOptions { n_sessions: 3, ..Default::default() };
        let dir = tempfile::tempdir().unwrap();

        let (rows, summary) =
            experiment::run_and_save(&pool(), &config, &opts, dir.path()).unwrap();

        // 3 seeds x 3 presets x 2 modes x (prototype + paired baseline)
        assert_eq!(rows.len(), 36);
        assert!(dir.path().join("experiment_raw.csv").exists());
        assert!(dir.path().join("experiment_summary.csv").exists());

        // Summary covers baseline and every prototype preset
        for preset in ["baseline", "entertainment", "inspiration", "learning"] {
            assert!(summary.iter().any(|s| s.preset == preset), "missing {}", preset);
        }
    }

    #[test]
    fn raw_csv_reloads_with_expected_columns() {
        let config = Config::default();
        let opts = ExperimentOptions { n_sessions: 2, ..Default::default() };
        let dir = tempfile::tempdir().unwrap();

        experiment::run_and_save(&pool(), &config, &opts, dir.path()).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("experiment_raw.csv")).unwrap();
        let headers = reader.headers().unwrap().clone();
        for col in [
            "preset",
            "night_mode",
            "seed",
            "k",
            "diversity_at_10",
            "prosocial_ratio",
            "overall_pass",
            "overlap_ratio_top10",
        ] {
            assert!(headers.iter().any(|h| h == col), "missing column {}", col);
        }
        assert_eq!(reader.records().count(), 24);
    }

    #[test]
    fn night_mode_rows_use_capped_k() {
        let config = Config::default();
        let opts = ExperimentOptions { n_sessions: 2, ..Default::default() };
        let rows = experiment::run(&pool(), &config, &opts);

        for row in &rows {
            if row.night_mode {
                assert_eq!(row.k, config.feed.night_k_cap);
            } else {
                assert_eq!(row.k, config.feed.k_default);
            }
        }
    }

    #[test]
    fn overlap_is_computed_against_same_k_baseline() {
        let config = Config::default();
        let opts = ExperimentOptions { n_sessions: 1, ..Default::default() };
        let rows = experiment::run(&pool(), &config, &opts);

        for pair in rows.chunks(2) {
            let proto = &pair[0];
            let baseline = &pair[1];
            assert_ne!(proto.preset, "baseline");
            assert_eq!(baseline.preset, "baseline");
            assert_eq!(proto.k, baseline.k);
            assert!((0.0..=1.0).contains(&proto.overlap_ratio_top10));
            assert!((baseline.overlap_ratio_topk - 1.0).abs() < 1e-9);
        }
    }
}
