use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use anyhow::Context;
use chili::Request;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::recording::Recorder;

/// How to start a bot, loaded from a JSON file like
/// `{ "nick": "minimax", "cmd": ["./target/release/minimax_bot", "--depth", "4"] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub nick: String,
    /// The program, followed by its arguments.
    pub cmd: Vec<String>,
}

impl PlayerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Could not open player config '{}'", path.display()))?;
        let config: PlayerConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid player config '{}'", path.display()))?;
        if config.cmd.is_empty() {
            anyhow::bail!("Player config '{}' has an empty cmd", path.display());
        }
        Ok(config)
    }
}

pub struct Player {
    pub name: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    // A re-usable buffer for IO.
    // Should always be empty before and after perform_request().
    buf: String,
}

impl Player {
    pub fn from_config(config: &PlayerConfig) -> anyhow::Result<Self> {
        let (program, args) = config
            .cmd
            .split_first()
            .context("Player config has an empty cmd")?;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("Could not start player '{}'", config.nick))?;

        let stdin = child.stdin.take().context("Could not access stdin")?;
        let stdout = child.stdout.take().context("Could not access stdout")?;
        Ok(Self {
            name: config.nick.clone(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
            buf: String::new(),
        })
    }

    pub fn perform_request<T: serde::de::DeserializeOwned + std::fmt::Debug>(
        &mut self,
        recorder: &mut Option<Recorder>,
        req: &Request,
    ) -> anyhow::Result<T> {
        let mut req_json = serde_json::to_string(req)?;
        trace!(player = &self.name, request = %req_json, "Sending request");
        req_json.push('\n');
        self.stdin.write_all(req_json.as_bytes())?;
        self.stdin.flush()?;
        self.buf.clear();
        let num_bytes_read = self.stdout.read_line(&mut self.buf)?;
        if num_bytes_read == 0 {
            anyhow::bail!("Player '{}' closed its output", self.name);
        }
        let serialized_response = self.buf.trim_end();
        let response = serde_json::from_str::<T>(serialized_response).with_context(|| {
            format!(
                "Could not parse response {:?} of player '{}'",
                serialized_response, self.name
            )
        })?;
        trace!(player = &self.name, response = %serialized_response, "Received response");

        if let Some(recorder) = recorder {
            recorder.store_request(&self.name, req_json.trim_end(), serialized_response)?;
        }
        self.buf.clear();
        Ok(response)
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        // The bot may already be gone, so errors are only logged.
        let bye = serde_json::to_string(&Request::Bye).map(|mut s| {
            s.push('\n');
            s
        });
        if let Ok(bye) = bye {
            if let Err(err) = self.stdin.write_all(bye.as_bytes()) {
                debug!(player = &self.name, %err, "Could not say bye");
            }
        }
        if let Err(err) = self.child.wait() {
            debug!(player = &self.name, %err, "Could not wait for player to exit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_format() {
        let config: PlayerConfig =
            serde_json::from_str(r#"{"nick":"random","cmd":["random_bot","--seed","1"]}"#)
                .unwrap();
        assert_eq!(config.nick, "random");
        assert_eq!(config.cmd, vec!["random_bot", "--seed", "1"]);
    }

    #[test]
    fn empty_cmd_is_rejected() {
        let dir = std::env::temp_dir().join(format!("judge_config_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("empty.json");
        std::fs::write(&path, r#"{"nick":"nobody","cmd":[]}"#).unwrap();
        assert!(PlayerConfig::load(&path).is_err());
        assert!(PlayerConfig::load(&dir.join("missing.json")).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
