//! Serial host bridge.
//!
//! Reads frames from stdin and writes batched replies to stdout, as the
//! serial side of a radio bridge would. Logs go to stderr.
//!
//! ```text
//! cargo run --example bridge [config.json]
//! printf '<3=90><E hi><LI100><?>' | RUST_LOG=radiolink=debug cargo run --example bridge
//! ```
//!
//! Commands:
//! - `<0=..>`..`<9=..>` set a joint angle
//! - `<E...>` echo the frame back
//! - `<L..>` link/radio configuration (`<LI250>`, `<LM1>`, `<LS9>`, ...)
//! - `<?>` report radio settings as JSON
//! - `<F>` flush held output now
//!
//! Raw frames (opcodes 0x11..=0x14) are acknowledged immediately.

use radiolink::control::{handle_config_frame, RadioSettings};
use radiolink::handler::{Command, Router};
use radiolink::transport::{SystemClock, DEFAULT_MAX_PACKET_LEN};
use radiolink::writer::{spawn_writer_task, Outbound, WriterConfig, WriterHandle};
use radiolink::{run_stream, Link, LinkConfig, LinkError};
use tracing_subscriber::EnvFilter;

const JOINTS: usize = 10;

#[derive(Debug, Default)]
struct Bridge {
    radio: RadioSettings,
    joints: [i32; JOINTS],
    raw_frames: u64,
}

fn on_joint(bridge: &mut Bridge, frame: &[u8], out: &mut dyn Outbound) {
    let Some(joint) = frame.iter().position(u8::is_ascii_digit).map(|i| usize::from(frame[i] - b'0')) else {
        return;
    };
    let value = frame
        .get(3..frame.len().saturating_sub(1))
        .and_then(|v| std::str::from_utf8(v).ok())
        .and_then(|v| v.parse().ok());
    match value {
        Some(angle) => {
            bridge.joints[joint] = angle;
            out.append_str(&format!("<{joint}={angle}>"));
        }
        None => tracing::debug!(joint, "joint command without a value"),
    }
}

fn on_echo(_bridge: &mut Bridge, frame: &[u8], out: &mut dyn Outbound) {
    out.append(frame);
}

fn on_config(bridge: &mut Bridge, frame: &[u8], out: &mut dyn Outbound) {
    handle_config_frame(frame, &mut bridge.radio, out);
}

fn on_status(bridge: &mut Bridge, _frame: &[u8], out: &mut dyn Outbound) {
    match serde_json::to_string(&bridge.radio) {
        Ok(json) => out.append_str(&format!("<S{json}>")),
        Err(e) => tracing::warn!(error = %e, "cannot encode status"),
    }
}

fn on_flush(_bridge: &mut Bridge, _frame: &[u8], out: &mut dyn Outbound) {
    if let Err(e) = out.flush() {
        tracing::warn!(error = %e, "flush on request failed");
    }
}

fn on_raw(bridge: &mut Bridge, frame: &[u8], out: &mut dyn Outbound) {
    bridge.raw_frames += 1;
    tracing::info!(opcode = frame[1], len = frame.len(), "raw frame");
    if let Err(e) = out.send_now(&[b'<', b'R', frame[1], b'>']) {
        tracing::warn!(error = %e, "raw ack failed");
    }
}

const COMMANDS: &[Command<Bridge>] = &[
    Command::new(b'E', on_echo),
    Command::new(b'L', on_config),
    Command::new(b'?', on_status),
    Command::new(b'F', on_flush),
    Command::new(b'#', on_joint),
];

#[tokio::main]
async fn main() -> radiolink::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("radiolink=info,bridge=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => LinkConfig::load(path)?,
        None => LinkConfig::default(),
    };
    tracing::info!(?config, "starting bridge");

    let (writer, writer_task) = spawn_writer_task(
        tokio::io::stdout(),
        WriterConfig {
            max_packet_len: DEFAULT_MAX_PACKET_LEN,
            ..WriterConfig::default()
        },
    );
    let mut link: Link<WriterHandle, SystemClock> = Link::new(&config, writer, SystemClock::new())?;
    let mut router = Router::new(config.command_table(COMMANDS), Bridge::default()).on_raw(on_raw);

    run_stream(tokio::io::stdin(), &mut link, &mut router, config.tick_period()).await?;

    let bridge = router.into_ctx();
    tracing::info!(
        raw_frames = bridge.raw_frames,
        batches = link.batcher().flush_count(),
        joints = ?bridge.joints,
        "input closed"
    );

    // closing the last handle lets the writer task drain and exit
    drop(link);
    writer_task
        .await
        .map_err(|e| LinkError::Transport(format!("writer task panicked: {e}")))?
}
