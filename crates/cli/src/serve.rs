//! `nvp serve`: JSON-lines request loop for long-lived hosts.

use {
    nvp_protocol::{ErrorShape, MAX_REQUEST_BYTES, RequestFrame, ResponseFrame, error_codes},
    tokio::io::{
        AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
    },
    tracing::{info, warn},
};

use crate::orchestrator::Orchestrator;

/// Serve requests from stdin until it closes.
pub async fn run(orchestrator: &mut Orchestrator) -> anyhow::Result<()> {
    info!(pid = std::process::id(), "serving requests on stdin");
    let mut stdout = tokio::io::stdout();
    let handled = serve(orchestrator, BufReader::new(tokio::io::stdin()), &mut stdout).await?;
    info!(handled, "stdin closed, shutting down");
    Ok(())
}

/// Answer one response line per non-blank request line. Returns the number
/// of requests answered.
///
/// Lines are read as raw bytes and never buffered past `MAX_REQUEST_BYTES`,
/// so a bad line costs one error frame and the loop keeps going.
pub async fn serve<R, W>(
    orchestrator: &mut Orchestrator,
    mut reader: R,
    writer: &mut W,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let limit = MAX_REQUEST_BYTES as u64 + 1;
    let mut buf = Vec::new();
    let mut handled = 0usize;
    loop {
        buf.clear();
        if (&mut reader).take(limit).read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let response = if buf.len() > MAX_REQUEST_BYTES && !buf.ends_with(b"\n") {
            let skipped = skip_line(&mut reader).await?;
            warn!(
                bytes = buf.len() + skipped,
                limit = MAX_REQUEST_BYTES,
                "request too large"
            );
            invalid(format!("request exceeds {MAX_REQUEST_BYTES} bytes"))
        } else {
            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }
            respond(orchestrator, line).await
        };
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
        handled += 1;
    }
    Ok(handled)
}

/// Discard input up to and including the next newline. Returns the number of
/// bytes dropped.
async fn skip_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<usize> {
    let mut skipped = 0usize;
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(skipped);
        }
        match chunk.iter().position(|b| *b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(skipped + end + 1);
            },
            None => {
                let len = chunk.len();
                reader.consume(len);
                skipped += len;
            },
        }
    }
}

async fn respond(orchestrator: &mut Orchestrator, line: &[u8]) -> ResponseFrame {
    match serde_json::from_slice::<RequestFrame>(line) {
        Ok(frame) => orchestrator.handle(frame).await,
        Err(e) => {
            warn!(error = %e, bytes = line.len(), "malformed request frame");
            invalid(format!("malformed request: {e}"))
        },
    }
}

fn invalid(message: String) -> ResponseFrame {
    ResponseFrame::err("", ErrorShape::new(error_codes::INVALID_REQUEST, message))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, nvp_config::NvpConfig, serde_json::Value};

    async fn exchange(orchestrator: &mut Orchestrator, input: &[u8]) -> Vec<Value> {
        let mut out = Vec::new();
        serve(orchestrator, input, &mut out).await.unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn project_stays_active_across_requests() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().display().to_string();
        let mut orch = Orchestrator::new(NvpConfig::default(), dir.path().to_path_buf());

        let input = format!(
            "{}\n\n{}\n{}\n",
            serde_json::json!({"id": "a", "method": "new-project", "params": {"root": root, "name": "p"}}),
            serde_json::json!({"id": "b", "method": "get-root"}),
            serde_json::json!({"id": "c", "method": "list-paths", "params": null}),
        );
        let responses = exchange(&mut orch, input.as_bytes()).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], "a");
        assert_eq!(responses[0]["ok"], true);
        assert_eq!(responses[1]["payload"]["root"], root);
        assert_eq!(responses[2]["payload"]["paths"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn malformed_line_gets_error_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = Orchestrator::new(NvpConfig::default(), dir.path().to_path_buf());

        let responses = exchange(&mut orch, b"{not json\n{\"id\":\"2\",\"method\":\"version\"}\n").await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["ok"], false);
        assert_eq!(responses[0]["error"]["code"], "INVALID_REQUEST");
        assert_eq!(responses[1]["ok"], true);
    }

    #[tokio::test]
    async fn non_utf8_line_does_not_end_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = Orchestrator::new(NvpConfig::default(), dir.path().to_path_buf());

        let mut input = b"{\"id\":\"1\",\"method\":\"version\"}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe{\"id\":\"bad\"}\r\n");
        input.extend_from_slice(b"{\"id\":\"3\",\"method\":\"version\"}\n");
        let responses = exchange(&mut orch, &input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["ok"], true);
        assert_eq!(responses[1]["ok"], false);
        assert_eq!(responses[1]["error"]["code"], "INVALID_REQUEST");
        assert_eq!(responses[2]["id"], "3");
        assert_eq!(responses[2]["ok"], true);
    }

    #[tokio::test]
    async fn oversize_line_is_skipped_without_buffering() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = Orchestrator::new(NvpConfig::default(), dir.path().to_path_buf());

        let mut input = vec![b'x'; MAX_REQUEST_BYTES + 4096];
        input.push(b'\n');
        input.extend_from_slice(b"{\"id\":\"after\",\"method\":\"version\"}\n");
        let responses = exchange(&mut orch, &input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], "INVALID_REQUEST");
        assert!(
            responses[0]["error"]["message"]
                .as_str()
                .unwrap()
                .contains("exceeds")
        );
        assert_eq!(responses[1]["id"], "after");
        assert_eq!(responses[1]["ok"], true);
    }

    #[tokio::test]
    async fn request_at_the_size_limit_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = Orchestrator::new(NvpConfig::default(), dir.path().to_path_buf());

        let frame = b"{\"id\":\"edge\",\"method\":\"version\"}";
        let mut input = frame.to_vec();
        input.resize(MAX_REQUEST_BYTES, b' ');
        input.push(b'\n');
        let responses = exchange(&mut orch, &input).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], "edge");
        assert_eq!(responses[0]["ok"], true);
    }
}
