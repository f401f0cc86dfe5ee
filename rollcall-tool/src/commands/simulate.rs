//! Drive the real roster store against a config file and tally picks.

use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use rollcall_core::{MemoryStorage, RosterStore};

use crate::host::{FileFetcher, TokioDelay};
use crate::output::OutputTarget;

#[derive(Debug, Clone, Default)]
pub struct SimulateOptions {
    pub picks: usize,
    pub seed: Option<u64>,
    pub allow_repeats: bool,
    pub passphrase: Option<String>,
    pub group: Option<String>,
    pub realtime: bool,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub title: String,
    pub picks: usize,
    /// Times every eligible entry had been picked and history was cleared.
    pub rounds: usize,
    pub entries: Vec<EntryTally>,
}

#[derive(Debug, Serialize)]
pub struct EntryTally {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub weight: f64,
    pub expected: f64,
    pub count: usize,
    pub observed: f64,
}

pub async fn run(
    config: &Path,
    options: &SimulateOptions,
    report: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let summary = simulate(config, options).await?;
    let mut target = OutputTarget::new(output)?;
    if report == "json" {
        serde_json::to_writer_pretty(&mut target, &summary)?;
        writeln!(target)?;
    } else {
        write_console_report(&mut target, &summary)?;
    }
    target.flush()?;
    Ok(())
}

pub async fn simulate(config: &Path, options: &SimulateOptions) -> Result<SimulationReport> {
    let delay = TokioDelay {
        enabled: options.realtime,
    };
    let mut store = RosterStore::restore(MemoryStorage::default(), FileFetcher, delay);
    if let Some(seed) = options.seed {
        store = store.with_seed(seed);
    }

    let url = config.to_string_lossy();
    if !store
        .load_from_url(&url, options.passphrase.as_deref())
        .await
    {
        bail!(
            "{}",
            store.state().error.clone().unwrap_or_default()
        );
    }
    store.set_exclude_picked(!options.allow_repeats);
    if let Some(group) = &options.group {
        store.set_group_filter(Some(group.clone()));
        if store.state().group_filter.is_none() {
            bail!("no entries belong to group `{group}`");
        }
    }

    let pool: Vec<_> = store.available_entries().into_iter().cloned().collect();
    if pool.is_empty() {
        bail!("the roster has no entries to pick from");
    }
    let pool_weight: f64 = pool.iter().map(|entry| entry.weight).sum();

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut rounds = 0;
    for _ in 0..options.picks {
        let picked = match store.perform_pick().await {
            Some(entry) => entry,
            None => {
                // Exclusion exhausted the pool: start a new round.
                store.clear_history();
                rounds += 1;
                match store.perform_pick().await {
                    Some(entry) => entry,
                    None => bail!("{}", store.state().error.clone().unwrap_or_default()),
                }
            }
        };
        *counts.entry(picked.id).or_default() += 1;
    }
    log::info!("simulated {} picks over {} rounds", options.picks, rounds + 1);

    let entries = pool
        .into_iter()
        .map(|entry| {
            let count = counts.get(&entry.id).copied().unwrap_or_default();
            EntryTally {
                expected: entry.weight / pool_weight,
                observed: share(count, options.picks),
                count,
                id: entry.id,
                name: entry.name,
                group: entry.group,
                weight: entry.weight,
            }
        })
        .collect();

    Ok(SimulationReport {
        title: store.state().title.clone(),
        picks: options.picks,
        rounds,
        entries,
    })
}

#[allow(clippy::cast_precision_loss)]
fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn write_console_report(out: &mut impl Write, report: &SimulationReport) -> Result<()> {
    writeln!(out, "{} ({} picks)", report.title.bold(), report.picks)?;
    writeln!(
        out,
        "{:<24} {:>8} {:>10} {:>8} {:>10}",
        "entry", "weight", "expected", "count", "observed"
    )?;
    for tally in &report.entries {
        let drift = (tally.observed - tally.expected).abs();
        let observed = format!("{:>9.1}%", tally.observed * 100.0);
        let observed = if drift > 0.05 {
            observed.yellow()
        } else {
            observed.green()
        };
        writeln!(
            out,
            "{:<24} {:>8.2} {:>9.1}% {:>8} {}",
            tally.name,
            tally.weight,
            tally.expected * 100.0,
            tally.count,
            observed
        )?;
    }
    if report.rounds > 0 {
        writeln!(out, "🔁 History cleared {} times", report.rounds)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(label: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "rollcall-simulate-{label}-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, body).expect("write config");
        path
    }

    const CONFIG: &str = r#"{
        "title": "Lab",
        "groups": [
            {"name": "Red", "entries": [{"id": "a", "name": "Ann", "weight": 1}]},
            {"name": "Blue", "entries": [{"id": "b", "name": "Ben", "weight": 3}]}
        ]
    }"#;

    #[tokio::test]
    async fn repeats_follow_weights() {
        let path = write_config("repeats", CONFIG);
        let options = SimulateOptions {
            picks: 4000,
            seed: Some(7),
            allow_repeats: true,
            ..SimulateOptions::default()
        };
        let report = simulate(&path, &options).await.expect("simulate");
        assert_eq!(report.title, "Lab");
        assert_eq!(report.rounds, 0);
        let ben = report.entries.iter().find(|t| t.id == "b").expect("ben");
        assert!((ben.expected - 0.75).abs() < f64::EPSILON);
        assert!((ben.observed - 0.75).abs() < 0.03, "observed {}", ben.observed);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn exclusion_cycles_through_everyone() {
        let path = write_config("rounds", CONFIG);
        let options = SimulateOptions {
            picks: 10,
            seed: Some(1),
            ..SimulateOptions::default()
        };
        let report = simulate(&path, &options).await.expect("simulate");
        assert_eq!(report.rounds, 4);
        assert!(report.entries.iter().all(|t| t.count == 5));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn group_filter_narrows_the_pool() {
        let path = write_config("group", CONFIG);
        let options = SimulateOptions {
            picks: 3,
            allow_repeats: true,
            group: Some("Red".to_string()),
            ..SimulateOptions::default()
        };
        let report = simulate(&path, &options).await.expect("simulate");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].count, 3);

        let missing = SimulateOptions {
            group: Some("Green".to_string()),
            ..options
        };
        assert!(simulate(&path, &missing).await.is_err());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn load_failures_surface_the_store_message() {
        let path = std::env::temp_dir().join("rollcall-simulate-absent.json");
        let err = simulate(&path, &SimulateOptions::default())
            .await
            .expect_err("missing file");
        assert_eq!(
            err.to_string(),
            "failed to load configuration: network error: HTTP status 404"
        );
    }
}
