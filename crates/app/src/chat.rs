//! Terminal transport: each input line is one inbound message.

use anyhow::Result;
use quiz_core::model::SenderId;
use services::SessionEngine;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::state::FAILURE_REPLY;

/// Feed lines from `reader` to the engine as `sender` until EOF, writing each
/// reply to `writer`.
pub async fn run_chat<R, W>(
    engine: &SessionEngine,
    sender: &SenderId,
    reader: R,
    mut writer: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let reply = match engine.advance(sender, &line).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(sender = %sender, error = %err, "quiz turn failed");
                FAILURE_REPLY.to_string()
            }
        };
        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
