//! Training reports.
use anyhow::Result;
use csv::WriterBuilder;
use qlearn_core::TrainingSummary;
use serde::Serialize;
use std::{fs::File, path::Path};

#[derive(Debug, Serialize)]
struct ScoreRecord {
    episode: usize,
    score: f32,
    loss: Option<f32>,
}

/// Writes the score and mean loss of every episode as CSV.
///
/// Episodes without learning updates have an empty loss field.
pub fn write_scores(path: impl AsRef<Path>, summary: &TrainingSummary) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(File::create(path)?);
    for (i, (score, loss)) in summary.scores.iter().zip(summary.losses.iter()).enumerate() {
        wtr.serialize(ScoreRecord {
            episode: i + 1,
            score: *score,
            loss: *loss,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
