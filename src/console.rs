//! Line-oriented terminal front-end.
//!
//! Input lines come from any async reader; transcript lines go to any
//! writer behind a mutex.

use std::future::Future;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::chat::{SessionAction, SyncEngine, Transcript};
use crate::Result;

/// Transcript written to a terminal (or any writer).
pub struct ConsoleTranscript<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleTranscript<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Transcript for ConsoleTranscript<W> {
    fn append_line(&self, line: &str) {
        self.write_line(line);
    }

    fn set_presence_list(&self, names: &[String]) {
        if names.is_empty() {
            self.write_line("present: (nobody)");
        } else {
            self.write_line(&format!("present: {}", names.join(", ")));
        }
    }
}

/// Ask a yes/no question; an empty answer means yes.
pub async fn confirm<R, W>(prompt: &str, input: &mut R, out: &mut W) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{prompt} [Y/n] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer).await?;
    let answer = answer.trim().to_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}

/// Drive a session from an input stream until `/quit`, end of input or Ctrl-C.
///
/// End of input, a read failure and Ctrl-C all leave the room as `/quit`
/// would.
pub async fn run_session<R>(engine: Arc<SyncEngine>, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    run_session_until(engine, input, interrupt).await
}

/// Drive a session until `/quit`, end of input or `shutdown` completes.
pub async fn run_session_until<R, S>(
    engine: Arc<SyncEngine>,
    input: R,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    engine.join().await;
    let timer = engine.start_timer();

    tokio::pin!(shutdown);
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Interrupted, leaving room {}", engine.room_id());
                "/quit".to_string()
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                Ok(None) => "/quit".to_string(),
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    "/quit".to_string()
                }
            },
        };
        if engine.handle_input(&line).await.action == SessionAction::Quit {
            break;
        }
    }

    if let Err(e) = timer.await {
        warn!("Poll timer ended abnormally: {}", e);
    }
    Ok(())
}
