use std::fs;

use ddhearts_eval::config::StatsConfig;
use ddhearts_eval::runner::{run_stats, run_to_csv};
use tempfile::tempdir;

fn load_config(output_dir: &std::path::Path) -> StatsConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
seed: 4242
hands: 7
samples_per_hand: 6
workers: 3
channel_capacity: 1
output: "{output}"
logging:
  tracing_level: "warn"
"#,
        output = output_dir.join("{run_id}").join("hands.csv").display()
    );

    let mut cfg: StatsConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

#[test]
fn stats_run_writes_one_row_per_hand() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path());

    let (summary, path) = run_to_csv(&config).expect("run completes");
    assert_eq!(path, dir.path().join("test_smoke").join("hands.csv"));
    assert_eq!(summary.hands_requested, 7);
    assert_eq!(summary.hands_written, 7);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.seed, 4242);

    let mut reader = csv::Reader::from_path(&path).expect("csv readable");
    let headers = reader.headers().expect("header row").clone();
    assert_eq!(headers.len(), 12);
    assert_eq!(&headers[0], "Card01");
    assert_eq!(&headers[9], "Card10");
    assert_eq!(&headers[10], "Avg");
    assert_eq!(&headers[11], "Stddev");

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("rows decode");
    assert_eq!(rows.len(), 7);
    for row in &rows {
        let mean: f64 = row[10].parse().expect("numeric mean");
        let stddev: f64 = row[11].parse().expect("numeric stddev");
        assert!((-52.0..=52.0).contains(&mean));
        assert!(stddev >= 0.0);
    }
}

#[test]
fn csv_rows_match_in_memory_run() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path());

    let (_, path) = run_to_csv(&config).expect("csv run");
    let mut from_csv: Vec<(String, String)> = fs::read_to_string(&path)
        .expect("csv text")
        .lines()
        .skip(1)
        .map(|line| {
            let (cards, stats) = line.split_at(30);
            (cards.to_string(), stats.to_string())
        })
        .collect();
    from_csv.sort();

    let mut from_memory: Vec<(String, String)> = run_stats(&config)
        .expect("in-memory run")
        .into_iter()
        .map(|mut stats| {
            stats.hand.sort_by(|a, b| b.cmp(a));
            let cards: String = stats.hand.iter().map(|card| format!("{card},")).collect();
            (cards, format!("{},{}", stats.mean, stats.stddev))
        })
        .collect();
    from_memory.sort();

    assert_eq!(from_csv, from_memory);
}
