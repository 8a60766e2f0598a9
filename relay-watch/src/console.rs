//! Console stream reader
//!
//! Follows a build's console log incrementally. Text is written to the sink
//! as soon as it arrives so the log stays visible while the build runs.

use relay_client::BuildServer;
use relay_core::domain::build::BuildHandle;
use relay_core::domain::console::OutputCursor;
use relay_core::domain::retry::RetryBudget;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::{Result, WatchError};
use crate::retry::retry;

const OPERATION: &str = "get console output";

/// Incremental reader over one build's console stream
#[derive(Debug, Clone)]
pub struct ConsoleReader {
    cursor: OutputCursor,
    budget: RetryBudget,
}

impl ConsoleReader {
    pub fn new(budget: RetryBudget) -> Self {
        Self {
            cursor: OutputCursor::new(),
            budget,
        }
    }

    pub fn cursor(&self) -> OutputCursor {
        self.cursor
    }

    /// Fetch everything currently available and write it to `sink`
    ///
    /// Returns once the server reports no more text for now; the next call
    /// resumes from where this one stopped.
    pub async fn drain<S, W>(
        &mut self,
        server: &S,
        build: &BuildHandle,
        sink: &mut W,
    ) -> Result<()>
    where
        S: BuildServer + ?Sized,
        W: AsyncWrite + Unpin + ?Sized,
    {
        loop {
            let offset = self.cursor.offset();
            let chunk = retry(self.budget, OPERATION, move || {
                server.get_console_output(build, offset)
            })
            .await
            .map_err(|source| WatchError::RetriesExhausted {
                operation: OPERATION,
                attempts: self.budget.max_retries.saturating_add(1),
                source,
            })?;

            if chunk.next_offset <= offset {
                // Nothing past the cursor; pick up again on the next tick
                if chunk.has_more {
                    debug!(
                        "Console of build {} reported more data without advancing",
                        build.number
                    );
                }
                self.cursor.advance(&chunk);
                return Ok(());
            }

            if !chunk.text.is_empty() {
                sink.write_all(chunk.text.as_bytes()).await?;
                sink.flush().await?;
            }

            self.cursor.advance(&chunk);

            if !self.cursor.has_more() {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn reader() -> ConsoleReader {
        ConsoleReader::new(RetryBudget::immediate(5))
    }

    #[tokio::test]
    async fn test_drains_until_no_more_text() {
        let server = ScriptedServer::new();
        server
            .push_console(Ok(chunk("Started by user admin\n", 22, true)))
            .push_console(Ok(chunk("Building...\n", 34, true)))
            .push_console(Ok(chunk("", 34, false)));
        let build = build_handle(&job("folder/myjob"), 7);
        let mut out = Vec::new();
        let mut reader = reader();

        reader.drain(&server, &build, &mut out).await.unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Started by user admin\nBuilding...\n"
        );
        assert_eq!(server.console_offsets(), vec![0, 22, 34]);
        assert_eq!(reader.cursor().offset(), 34);
        assert!(!reader.cursor().has_more());
    }

    #[tokio::test]
    async fn test_resumes_from_last_cursor() {
        let server = ScriptedServer::new();
        server
            .push_console(Ok(chunk("one\n", 4, false)))
            .push_console(Ok(chunk("two\n", 8, false)));
        let build = build_handle(&job("myjob"), 1);
        let mut out = Vec::new();
        let mut reader = reader();

        reader.drain(&server, &build, &mut out).await.unwrap();
        reader.drain(&server, &build, &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "one\ntwo\n");
        assert_eq!(server.console_offsets(), vec![0, 4]);
    }

    #[tokio::test]
    async fn test_offsets_never_decrease() {
        let server = ScriptedServer::new();
        server
            .push_console(Ok(chunk("abc", 3, true)))
            .push_console(Ok(chunk("", 1, true)))
            .push_console(Ok(chunk("def", 6, false)));
        let build = build_handle(&job("myjob"), 1);
        let mut out = Vec::new();
        let mut reader = reader();

        reader.drain(&server, &build, &mut out).await.unwrap();
        reader.drain(&server, &build, &mut out).await.unwrap();

        let offsets = server.console_offsets();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "{:?}", offsets);
        assert_eq!(offsets, vec![0, 3, 3]);
        assert_eq!(String::from_utf8(out).unwrap(), "abcdef");
    }

    #[tokio::test]
    async fn test_stalled_offset_with_text_stops_drain() {
        let server = ScriptedServer::new();
        server
            .push_console(Ok(chunk("abc", 3, true)))
            .push_console(Ok(chunk("abc", 3, true)))
            .push_console(Ok(chunk("abc", 3, true)));
        let build = build_handle(&job("myjob"), 1);
        let mut out = Vec::new();
        let mut reader = reader();

        reader.drain(&server, &build, &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "abc");
        assert_eq!(server.console_offsets(), vec![0, 3]);
        assert_eq!(reader.cursor().offset(), 3);
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let server = ScriptedServer::new();
        server
            .push_console(Err(server_error()))
            .push_console(Err(server_error()))
            .push_console(Ok(chunk("done\n", 5, false)));
        let build = build_handle(&job("myjob"), 1);
        let mut out = Vec::new();

        reader().drain(&server, &build, &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "done\n");
        assert_eq!(server.console_offsets(), vec![0, 0, 0]);
    }

    #[tokio::test]
    async fn test_exhausted_retries_abort() {
        let server = ScriptedServer::new();
        for _ in 0..6 {
            server.push_console(Err(server_error()));
        }
        let build = build_handle(&job("myjob"), 1);
        let mut out = Vec::new();

        let err = reader().drain(&server, &build, &mut out).await.unwrap_err();

        assert!(matches!(err, WatchError::RetriesExhausted { attempts: 6, .. }));
        assert_eq!(server.console_offsets().len(), 6);
    }
}
