use std::fs;
use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use mfccprep::io::{read_matrix, write_matrix};
use ndarray::Array2;
use predicates::prelude::*;
use tempfile::TempDir;

fn mfccprep() -> Result<Command> {
    Ok(Command::cargo_bin("mfccprep")?)
}

fn seed_corpus(dir: &Path) -> Result<()> {
    for (name, frames, offset) in [("a_1.csv", 3, 0.0), ("a_2.csv", 5, 1.0), ("b_1.csv", 4, -1.0)] {
        let matrix = Array2::from_shape_fn((2, frames), |(r, c)| offset + (r * 3 + c) as f64);
        write_matrix(&dir.join(name), &matrix)?;
    }
    Ok(())
}

#[test]
fn pad_aggregate_combine_from_the_command_line() -> Result<()> {
    let tmp = TempDir::new()?;
    let root = tmp.path();
    seed_corpus(&root.join("raw"))?;

    mfccprep()?
        .arg("pad")
        .arg(root.join("raw"))
        .arg(root.join("padded"))
        .assert()
        .success();
    assert_eq!(read_matrix(&root.join("padded/padded_a_1.csv"))?.dim(), (2, 5));

    mfccprep()?
        .arg("aggregate")
        .arg(root.join("padded"))
        .arg(root.join("aggregated"))
        .arg("--sequential")
        .assert()
        .success();

    let combined = root.join("combined.csv");
    mfccprep()?
        .arg("combine")
        .arg(root.join("aggregated"))
        .arg("--output")
        .arg(&combined)
        .args(["--label", "artistA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Combined data saved to:"));

    let text = fs::read_to_string(&combined)?;
    assert_eq!(text.lines().count(), 3);
    for line in text.lines() {
        assert_eq!(line.split(',').count(), 23);
        assert!(line.ends_with(",artistA"));
    }
    Ok(())
}

#[test]
fn prepare_reports_split_sizes() -> Result<()> {
    let tmp = TempDir::new()?;
    let input = tmp.path().join("combined.csv");
    let rows: String = (0..10)
        .map(|i| format!("{},{},{}\n", i, i * i, if i % 2 == 0 { "x" } else { "y" }))
        .collect();
    fs::write(&input, rows)?;

    mfccprep()?
        .arg("prepare")
        .arg(&input)
        .arg(tmp.path().join("dataset"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Training set size: 8 samples"))
        .stdout(predicate::str::contains("Test set size: 2 samples"));
    assert!(tmp.path().join("dataset/dataset.json").exists());
    Ok(())
}

#[test]
fn missing_folder_fails_with_context() -> Result<()> {
    let tmp = TempDir::new()?;
    mfccprep()?
        .arg("pad")
        .arg(tmp.path().join("nope"))
        .arg(tmp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to pad MFCC files"));
    Ok(())
}

#[test]
fn run_rejects_unknown_sections() -> Result<()> {
    let tmp = TempDir::new()?;
    let config = tmp.path().join("pipeline.toml");
    fs::write(&config, "[train]\nepochs = 3\n")?;
    mfccprep()?
        .args(["run", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load pipeline config"));
    Ok(())
}
