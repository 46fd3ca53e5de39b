// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Notification sinks for generated samples.
//!
//! The sink is where samples leave the engine: in a server it updates node
//! state, in tests it records what arrived. Sinks are called from the tick
//! task, never from the thread that registered the monitored item.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{SimResult, SinkError};
use crate::types::Sample;

// =============================================================================
// NotificationSink Trait
// =============================================================================

/// Receives samples produced by the sampling scheduler.
///
/// A sink may call back into the scheduler (start or stop monitoring);
/// the scheduler never holds its registry lock while a sink runs.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Called once per monitored variable per tick.
    async fn on_sample(&self, sample: Sample) -> SimResult<()>;

    /// Returns the name of this sink for logging.
    fn name(&self) -> &str {
        "sink"
    }
}

// =============================================================================
// TracingSink
// =============================================================================

/// A sink that only logs samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    /// Creates a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for TracingSink {
    async fn on_sample(&self, sample: Sample) -> SimResult<()> {
        debug!(
            variable = %sample.variable,
            value = %sample.value,
            status = %sample.status,
            "Sample generated"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

// =============================================================================
// ChannelSink
// =============================================================================

/// A channel-based sink implementation.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Sample>,
}

impl ChannelSink {
    /// Creates a new channel sink.
    pub fn new(sender: mpsc::Sender<Sample>) -> Self {
        Self { sender }
    }

    /// Creates a new channel sink with its receiver.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_channel(capacity: usize) -> (Self, mpsc::Receiver<Sample>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn on_sample(&self, sample: Sample) -> SimResult<()> {
        trace!(variable = %sample.variable, "Forwarding sample to channel");
        self.sender
            .send(sample)
            .await
            .map_err(|_| SinkError::ChannelClosed.into())
    }

    fn name(&self) -> &str {
        "channel"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::types::{Value, VariableId};

    #[tokio::test]
    async fn test_channel_sink_forwards() {
        let (sink, mut rx) = ChannelSink::with_channel(4);

        sink.on_sample(Sample::good(VariableId::new("ns=2;s=A"), Value::Int32(1)))
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.variable.as_str(), "ns=2;s=A");
        assert_eq!(received.value, Value::Int32(1));
    }

    #[tokio::test]
    async fn test_channel_sink_zero_capacity() {
        let (sink, mut rx) = ChannelSink::with_channel(0);

        sink.on_sample(Sample::good(VariableId::new("ns=2;s=Z"), Value::Int32(7)))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().value, Value::Int32(7));
    }

    #[tokio::test]
    async fn test_channel_sink_closed() {
        let (sink, rx) = ChannelSink::with_channel(1);
        drop(rx);

        let result = sink
            .on_sample(Sample::good(VariableId::new("ns=2;s=A"), Value::Null))
            .await;
        assert!(matches!(result, Err(SimError::Sink(SinkError::ChannelClosed))));
    }

    #[tokio::test]
    async fn test_tracing_sink_accepts() {
        let sink = TracingSink::new();
        assert_eq!(sink.name(), "tracing");
        sink.on_sample(Sample::good(VariableId::new("x"), Value::Boolean(true)))
            .await
            .unwrap();
    }
}
