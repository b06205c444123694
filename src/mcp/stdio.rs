//! Line-delimited JSON-RPC transport: one request per input line, one
//! response per output line. Notifications get no output line.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use crate::{
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
    },
    AppState,
};

async fn answer(line: &str, state: &AppState) -> Option<Response> {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_mcp_request(request, state.clone()).await,
        Err(parse_error) => {
            error!("JSON parse error: {}", parse_error);
            Some(Response::error(
                Value::Null,
                error_codes::PARSE_ERROR,
                format!("Parse error: {}", parse_error),
            ))
        }
    }
}

/// Serves requests from `reader` until end of input.
pub async fn serve<R, W>(reader: R, mut writer: W, state: AppState) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("Received: {}", line);

        let Some(response) = answer(line, &state).await else {
            continue;
        };
        match serde_json::to_string(&response) {
            Ok(mut encoded) => {
                debug!("Sending: {}", encoded);
                encoded.push('\n');
                writer.write_all(encoded.as_bytes()).await?;
                writer.flush().await?;
            }
            Err(e) => error!("Failed to encode response: {}", e),
        }
    }
    info!("End of input, tool server stopping");
    Ok(())
}
