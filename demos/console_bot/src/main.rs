//! A console agent: every stdin line is a message activity, replies go to
//! stdout. Logs go to stderr unless `parley.toml` or `PARLEY_LOGGING__OUTPUT`
//! says otherwise.
//!
//! ```text
//! cargo run -p console-bot
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parley::prelude::*;
use parley::runtime::config::{ConfigLoader, LogOutput, LoggingConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

const CHANNEL_ID: &str = "console";

/// Writes outbound activities to stdout.
#[derive(Default)]
struct ConsoleAdapter {
    next_id: AtomicU64,
}

#[async_trait]
impl ChannelAdapter for ConsoleAdapter {
    fn name(&self) -> &str {
        CHANNEL_ID
    }

    async fn send_activities(
        &self,
        _turn: &TurnContext,
        activities: &[Activity],
    ) -> AdapterResult<Vec<ResourceResponse>> {
        let mut responses = Vec::with_capacity(activities.len());
        for activity in activities {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if activity.is_trace() {
                debug!(name = ?activity.name, "Trace activity");
            } else if let Some(text) = &activity.text {
                let speaker = activity
                    .from
                    .as_ref()
                    .map(ChannelAccount::display_name)
                    .unwrap_or("bot");
                println!("{speaker}> {text}");
            }
            responses.push(ResourceResponse::new(format!("console-{id}")));
        }
        Ok(responses)
    }
}

/// Welcomes people and echoes what they say.
struct Greeter;

#[async_trait]
impl ActivityHandler for Greeter {
    async fn on_message_activity(&self, turn: TypedTurn<'_, Message>) -> TurnResult {
        let text = turn.activity().text().trim();
        if text.is_empty() {
            return Ok(());
        }
        turn.send_text(format!("You said: {text}")).await?;
        Ok(())
    }

    async fn on_member_added(&self, member: &ChannelAccount, turn: &TurnContext) -> TurnResult {
        turn.send_text(format!(
            "Hello {}! Type anything and I will repeat it. Ctrl+D quits.",
            member.display_name()
        ))
        .await?;
        Ok(())
    }
}

fn user() -> ChannelAccount {
    let name = std::env::var("USER").unwrap_or_else(|_| "you".to_string());
    ChannelAccount::new("console-user").with_name(name)
}

fn bot() -> ChannelAccount {
    ChannelAccount::new("console-bot").with_name("parley")
}

fn inbound(activity: Activity, seq: u64) -> Activity {
    activity
        .with_id(format!("in-{seq}"))
        .with_channel_id(CHANNEL_ID)
        .with_from(user())
        .with_recipient(bot())
        .with_conversation(ConversationAccount::new("console"))
}

/// Feeds stdin into the runtime until EOF.
async fn read_stdin(tx: mpsc::Sender<Activity>) -> anyhow::Result<()> {
    let joined =
        Activity::of(ActivityType::ConversationUpdate).with_members_added(vec![bot(), user()]);
    tx.send(inbound(joined, 0)).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut seq = 1;
    while let Some(line) = lines.next_line().await? {
        tx.send(inbound(Activity::message(line), seq)).await?;
        seq += 1;
    }

    info!("stdin closed");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let defaults = ParleyConfig {
        logging: LoggingConfig {
            output: LogOutput::Stderr,
            ..Default::default()
        },
        ..Default::default()
    };
    let config = ConfigLoader::new().merge(defaults).load()?;

    let runtime = ParleyRuntime::builder()
        .adapter(ConsoleAdapter::default())
        .handler(Greeter)
        .config(config)
        .build()?;

    let (tx, rx) = runtime.inbound_channel();
    let reader = tokio::spawn(read_stdin(tx));

    runtime.run_until_signal(rx).await?;

    if reader.is_finished() {
        reader.await??;
    } else {
        reader.abort();
    }
    Ok(())
}
