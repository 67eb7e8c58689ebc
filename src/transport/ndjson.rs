// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::Mutex;

use crate::dispatch::{TransformedItem, WorkItem};
use crate::errors::TransportError;
use crate::observability::messages::dispatch::MalformedWorkItem;
use crate::observability::messages::StructuredLog;
use crate::traits::Downstream;

/// Reads one work item per line. Blank lines are skipped; lines that do not
/// decode are logged and skipped.
pub struct NdjsonSource<R> {
    lines: Lines<R>,
    line_number: usize,
    malformed: usize,
}

impl<R: AsyncBufRead + Unpin> NdjsonSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            malformed: 0,
        }
    }

    /// Next decodable work item, or `None` at end of input.
    pub async fn next_item(&mut self) -> Result<Option<WorkItem>, TransportError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<WorkItem>(&line) {
                Ok(item) => return Ok(Some(item)),
                Err(e) => {
                    self.malformed += 1;
                    let error = TransportError::Serialization(e);
                    MalformedWorkItem {
                        line: self.line_number,
                        error: &error,
                    }
                    .log();
                }
            }
        }
        Ok(None)
    }

    pub fn malformed(&self) -> usize {
        self.malformed
    }
}

/// Writes forwarded and passed items as one JSON document per line.
pub struct NdjsonSink<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> NdjsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    async fn write_line<T: Serialize>(&self, item: &T) -> Result<(), TransportError> {
        let mut line = serde_json::to_vec(item)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Downstream for NdjsonSink<W> {
    async fn forward(&self, item: TransformedItem) -> Result<(), TransportError> {
        self.write_line(&item).await
    }

    async fn pass(&self, item: WorkItem) -> Result<(), TransportError> {
        self.write_line(&item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_source_skips_blank_and_malformed_lines() {
        let input = concat!(
            "{\"runId\":\"a\",\"payload\":\"{}\"}\n",
            "\n",
            "not json\n",
            "   \n",
            "{\"runId\":\"b\",\"dataInfo\":{\"content\":\"metadata\"}}\n",
        );
        let mut source = NdjsonSource::new(BufReader::new(input.as_bytes()));

        let first = source.next_item().await.unwrap().unwrap();
        let second = source.next_item().await.unwrap().unwrap();

        assert_eq!(first.run_id, "a");
        assert_eq!(second.run_id, "b");
        assert!(source.next_item().await.unwrap().is_none());
        assert_eq!(source.malformed(), 1);
    }

    #[tokio::test]
    async fn test_sink_writes_one_line_per_item() {
        let sink = NdjsonSink::new(Vec::new());

        sink.forward(TransformedItem {
            run_id: "r".to_string(),
            payload: "{\"a\":1}".to_string(),
            mime_type: "application/ld+json".to_string(),
            data_info: None,
            extra: Map::from_iter([("pipe".to_string(), json!({"segments": ["next"]}))]),
        })
        .await
        .unwrap();
        let passed: WorkItem =
            serde_json::from_str(r#"{"runId":"r","dataInfo":{"content":"x"},"payload":"p"}"#)
                .unwrap();
        sink.pass(passed).await.unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["mimeType"], json!("application/ld+json"));
        assert_eq!(lines[0]["pipe"], json!({"segments": ["next"]}));
        assert_eq!(lines[1]["dataInfo"], json!({"content": "x"}));
    }
}
