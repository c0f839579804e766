use crate::drain::{Drain, DrainResult};
use async_trait::async_trait;
use source::TestResults;
use std::io::Write;
use std::sync::Mutex;
use tracing::debug;

/// Writes test results as pretty-printed JSON, e.g. to standard output.
pub struct JsonDrain<W> {
    writer: Mutex<W>,
}

impl JsonDrain<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonDrain<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> Drain for JsonDrain<W> {
    type Output = String;

    async fn write_test_results(&self, results: &TestResults) -> DrainResult<String> {
        let json = serde_json::to_string_pretty(results)?;
        debug!("Writing {} bytes of test results JSON", json.len());

        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        Ok(json)
    }

    fn drain_name(&self) -> &'static str {
        "json"
    }
}
