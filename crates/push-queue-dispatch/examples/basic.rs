//! End-to-end walkthrough of the push queue: enqueue a few messages,
//! subscribe a handler that fails once before Acking, subscribe a second
//! handler that always Nacks and lands in its own DLQ, then replay it.
//!
//! ```bash
//! RUST_LOG=info cargo run -p push-queue-dispatch --example basic
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use push_queue_dispatch::{
    CancelSignal, DeliveryResult, Envelope, FailureBehavior, HandlerError, Queue, QueueConfig,
    Subscriber,
};
use uuid::Uuid;

/// Acks everything immediately; just prints what it received.
struct PrintingSubscriber {
    name: &'static str,
}

impl Subscriber for PrintingSubscriber {
    async fn on_message_receive(
        &self,
        envelope: &Envelope,
        _subscriber_id: Uuid,
        _cancel: &CancelSignal,
    ) -> Result<DeliveryResult, HandlerError> {
        println!("[{}] received: {}", self.name, envelope.payload());
        Ok(DeliveryResult::Ack)
    }

    async fn on_message_failed(
        &self,
        envelope: &Envelope,
        _subscriber_id: Uuid,
        _error: Option<&HandlerError>,
        _cancel: &CancelSignal,
    ) -> Result<FailureBehavior, HandlerError> {
        println!("[{}] giving up on: {}", self.name, envelope.payload());
        Ok(FailureBehavior::Commit)
    }
}

/// Nacks the first `flaky_for` attempts at each envelope, then Acks.
struct FlakySubscriber {
    flaky_for: u32,
    attempts: AtomicU32,
}

impl Subscriber for FlakySubscriber {
    async fn on_message_receive(
        &self,
        envelope: &Envelope,
        _subscriber_id: Uuid,
        _cancel: &CancelSignal,
    ) -> Result<DeliveryResult, HandlerError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.flaky_for {
            println!("flaky: nacking {} (attempt {attempt})", envelope.payload());
            Ok(DeliveryResult::Nack)
        } else {
            println!("flaky: acking {}", envelope.payload());
            Ok(DeliveryResult::Ack)
        }
    }

    async fn on_message_failed(
        &self,
        envelope: &Envelope,
        _subscriber_id: Uuid,
        _error: Option<&HandlerError>,
        _cancel: &CancelSignal,
    ) -> Result<FailureBehavior, HandlerError> {
        println!("flaky: quarantining {}", envelope.payload());
        Ok(FailureBehavior::AddToDlq)
    }
}

/// Always Nacks; every envelope ends up in the DLQ.
struct StuckSubscriber;

impl Subscriber for StuckSubscriber {
    async fn on_message_receive(
        &self,
        _envelope: &Envelope,
        _subscriber_id: Uuid,
        _cancel: &CancelSignal,
    ) -> Result<DeliveryResult, HandlerError> {
        Ok(DeliveryResult::Nack)
    }

    async fn on_message_failed(
        &self,
        _envelope: &Envelope,
        _subscriber_id: Uuid,
        _error: Option<&HandlerError>,
        _cancel: &CancelSignal,
    ) -> Result<FailureBehavior, HandlerError> {
        Ok(FailureBehavior::AddToDlq)
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = QueueConfig::new(Duration::from_secs(30), 2, Duration::from_millis(20))
        .expect("default-shaped config is valid");
    let queue = Queue::new(config).expect("valid config constructs a queue");

    queue.enqueue("order.created");
    queue.enqueue("order.shipped");
    queue.enqueue("order.delivered");

    let _printer = queue.subscribe(PrintingSubscriber { name: "printer" });
    let _flaky = queue.subscribe(FlakySubscriber {
        flaky_for: 1,
        attempts: AtomicU32::new(0),
    });
    let stuck = queue.subscribe(StuckSubscriber);

    tokio::time::sleep(Duration::from_millis(200)).await;

    let state = queue.get_state();
    println!(
        "buffer has {} envelope(s); {} subscriber(s)",
        state.buffer.len(),
        state.cursors.len()
    );
    for cursor in &state.cursors {
        println!(
            "  subscriber {} index={} committed={} dlq_len={}",
            cursor.subscriber_id, cursor.index, cursor.committed, cursor.dlq_len
        );
    }

    println!("replaying stuck subscriber's dead letters...");
    queue.replay_all_dlq_messages(stuck).await;

    queue.dispose();
}
