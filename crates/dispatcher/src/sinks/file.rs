//! FileSink - appends readings to a JSON-lines file

use contracts::{ContractError, RangeReading, RangeSink};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file
    pub path: PathBuf,
    /// Append instead of truncating
    pub append: bool,
}

impl FileSinkConfig {
    /// Create config from params map
    ///
    /// `path` is required; `append` accepts `true` / `false`.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .ok_or_else(|| "missing 'path' parameter".to_string())?;

        let append = match params.get("append").map(String::as_str) {
            Some("true") => true,
            Some("false") | None => false,
            Some(other) => return Err(format!("invalid 'append' value '{other}'")),
        };

        Ok(Self { path, append })
    }
}

/// Sink that writes one JSON object per line
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// Create a new FileSink, creating parent directories as needed
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(config.append)
            .truncate(!config.append)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            path: config.path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = FileSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_write(&name, e))?;
        Self::new(name.clone(), config).map_err(|e| ContractError::sink_write(&name, e.to_string()))
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, ContractError> {
        self.writer
            .as_mut()
            .ok_or_else(|| ContractError::sink_write(&self.name, "file already closed"))
    }

    fn append_line(&mut self, reading: &RangeReading) -> Result<(), ContractError> {
        let name = self.name.clone();
        let writer = self.writer()?;
        serde_json::to_writer(&mut *writer, reading)
            .map_err(|e| ContractError::sink_write(&name, e.to_string()))?;
        writer
            .write_all(b"\n")
            .map_err(|e| ContractError::sink_write(&name, e.to_string()))
    }
}

impl RangeSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, reading: &RangeReading) -> Result<(), ContractError> {
        self.append_line(reading)
    }

    #[instrument(name = "file_sink_flush", skip(self), fields(sink = %self.name))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        let name = self.name.clone();
        match self.writer.as_mut() {
            Some(writer) => writer
                .flush()
                .map_err(|e| ContractError::sink_write(name, e.to_string())),
            None => Ok(()),
        }
    }

    #[instrument(name = "file_sink_close", skip(self), fields(sink = %self.name))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }
        debug!(sink = %self.name, path = %self.path.display(), "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Header, RadiationType, Time};
    use tempfile::tempdir;

    fn reading(range: f32) -> RangeReading {
        RangeReading {
            header: Header {
                frame_id: "base_down".to_string(),
                stamp: Time::new(5, 0),
            },
            radiation_type: RadiationType::Infrared,
            field_of_view: 0.47,
            min_range: 0.14,
            max_range: 3.0,
            range,
        }
    }

    #[tokio::test]
    async fn test_file_sink_writes_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("ranges.jsonl");
        let config = FileSinkConfig {
            path: path.clone(),
            append: false,
        };

        let mut sink = FileSink::new("test_file", config).unwrap();
        sink.write(&reading(0.5)).await.unwrap();
        sink.write(&reading(1.5)).await.unwrap();
        sink.close().await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<RangeReading> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines, vec![reading(0.5), reading(1.5)]);
    }

    #[tokio::test]
    async fn test_write_after_close_fails() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            path: dir.path().join("ranges.jsonl"),
            append: false,
        };

        let mut sink = FileSink::new("closed", config).unwrap();
        sink.close().await.unwrap();
        assert!(sink.write(&reading(1.0)).await.is_err());
    }

    #[test]
    fn test_config_requires_path() {
        assert!(FileSinkConfig::from_params(&HashMap::new()).is_err());

        let params = HashMap::from([
            ("path".to_string(), "out.jsonl".to_string()),
            ("append".to_string(), "true".to_string()),
        ]);
        let config = FileSinkConfig::from_params(&params).unwrap();
        assert!(config.append);
    }
}
