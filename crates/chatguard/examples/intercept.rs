//! Console chat with send interception.
//!
//! Type a message and press Enter. A message that looks like it carries
//! PII is held, and the next line picks what happens to it: `r` redacts,
//! `s` sends it as is, anything else cancels. An empty line presses Enter
//! again on whatever the input holds, which is how a redacted message goes
//! out.
//!
//! Names and organizations need the reference classifier
//! (`cargo run -p chatguard-classifier`); without it only the structural
//! patterns apply.
//!
//! Run with: `cargo run --example intercept`

use std::sync::{Mutex, MutexGuard, PoisonError};

use chatguard::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Default)]
struct ConsoleInput {
    text: Mutex<String>,
}

impl ConsoleInput {
    fn lock(&self) -> MutexGuard<'_, String> {
        self.text.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, text: String) {
        *self.lock() = text;
    }
}

impl InputSurface for ConsoleInput {
    fn text(&self) -> Result<Option<String>> {
        Ok(Some(self.lock().clone()))
    }

    fn replace_text(&self, text: &str) -> Result<()> {
        text.clone_into(&mut self.lock());
        Ok(())
    }

    fn replace_selection(&self, text: &str) -> Result<()> {
        self.replace_text(text)
    }

    fn dispatch_send(&self) -> Result<()> {
        let text = std::mem::take(&mut *self.lock());
        println!("  >>> sent: {text}");
        Ok(())
    }
}

struct ConsoleDecisions;

impl DecisionSurface for ConsoleDecisions {
    fn present(&self, id: SessionId, original: &str) {
        println!("  held #{id}: {original:?}");
        println!("  [r]edact, [s]end as is, or cancel?");
    }

    fn dismiss(&self, _id: SessionId) {}

    fn report_status(&self, status: ProtectionStatus) {
        println!("  protection: {status}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GuardConfig::load()?;
    chatguard::logging::init(&config.logging)?;

    let hub = config.settings_hub();
    hub.initialize()?;

    match HttpClassifier::from_config(&config.classifier) {
        Ok(classifier) => run(classifier, &config, &hub).await,
        Err(e) => {
            tracing::warn!(error = %e, "running with structural patterns only");
            run(NoClassifier, &config, &hub).await
        }
    }
}

async fn run<C: Classifier>(classifier: C, config: &GuardConfig, hub: &SettingsHub) -> Result<()> {
    let mut monitor = ProtectionMonitor::default();
    println!("chatguard console (protection: {})", monitor.check(&classifier).await);
    println!("type a message, Ctrl-D to quit\n");

    let guard = Interceptor::new(classifier, ConsoleInput::default(), ConsoleDecisions, hub.subscribe())
        .with_analyze_timeout(config.classifier.timeouts().analyze);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<SessionId> = None;

    while let Some(line) = lines.next_line().await? {
        if let Some(id) = pending.take() {
            let decision = match line.trim() {
                "r" => Decision::Redact,
                "s" => Decision::SendAsIs,
                _ => Decision::Cancel,
            };
            match guard.decide(id, decision).await? {
                DecisionOutcome::Redacted { text, augmentation } => {
                    println!("  input now: {text} (classifier: {augmentation})");
                }
                DecisionOutcome::Cancelled => println!("  cancelled, input kept"),
                DecisionOutcome::SentAsIs | DecisionOutcome::Superseded => {}
            }
            continue;
        }

        if !line.is_empty() {
            guard.input().set(line);
        }
        match guard.on_trigger(TriggerEvent::enter())? {
            TriggerOutcome::PassThrough => guard.input().dispatch_send()?,
            TriggerOutcome::Suppressed(id) => pending = Some(id),
        }
    }

    let snapshot = guard.metrics().snapshot();
    println!(
        "\n{} sends, {} held, {} redacted",
        snapshot.triggers, snapshot.intercepted, snapshot.redacted
    );
    Ok(())
}
