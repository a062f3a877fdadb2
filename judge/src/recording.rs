use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Writes one JSON file per game with every request and response.
pub struct Recorder {
    num: usize,
    directory: PathBuf,
    requests: Vec<RequestToPlayer>,
}

impl Recorder {
    pub fn new(directory: PathBuf) -> anyhow::Result<Self> {
        if !directory.is_dir() {
            anyhow::bail!("Directory '{}' does not exist", directory.display());
        }
        Ok(Self {
            num: 1,
            directory,
            requests: Vec::new(),
        })
    }

    /// Stores one exchange. Both strings must be JSON; they are embedded as
    /// values, not as escaped strings.
    pub fn store_request(&mut self, player: &str, request: &str, response: &str) -> anyhow::Result<()> {
        self.requests.push(RequestToPlayer {
            player: String::from(player),
            request: serde_json::from_str(request)?,
            response: serde_json::from_str(response)?,
        });
        Ok(())
    }

    /// Writes the stored exchanges to `game_<num>.json` and starts a new recording.
    pub fn write_game_recording(&mut self, result: &str) -> anyhow::Result<PathBuf> {
        let filepath = self.directory.join(format!("game_{:0>6}.json", self.num));
        let recording = GameRecording {
            result: String::from(result),
            requests: std::mem::take(&mut self.requests),
        };
        let mut writer = BufWriter::new(File::create(&filepath)?);
        serde_json::to_writer_pretty(&mut writer, &recording)?;
        writer.flush()?;
        self.num += 1;
        Ok(filepath)
    }
}

#[derive(Serialize, Deserialize)]
pub struct GameRecording {
    pub result: String,
    pub requests: Vec<RequestToPlayer>,
}

#[derive(Serialize, Deserialize)]
pub struct RequestToPlayer {
    pub player: String,
    pub request: Value,
    pub response: Value,
}
