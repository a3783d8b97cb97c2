use tokio::sync::mpsc;

use rsvp_fanout::fanout::{ConnectionHandle, ConnectionRegistry, GroupId};

// ============================================================================
// Test Clients
// ============================================================================

/// A decoded server-to-client frame
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    pub message_type: String,
    pub payload: serde_json::Value,
}

/// A registered connection whose inbox the test reads directly
pub struct TestClient {
    pub handle: ConnectionHandle,
    inbox: mpsc::UnboundedReceiver<String>,
}

#[allow(dead_code)]
impl TestClient {
    pub fn connect(registry: &ConnectionRegistry) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        Self {
            handle: registry.register(sender),
            inbox,
        }
    }

    pub fn join(&self, registry: &ConnectionRegistry, event_id: &str) {
        registry.join(&self.handle, GroupId::from(event_id));
    }

    pub fn leave(&self, registry: &ConnectionRegistry, event_id: &str) {
        registry.leave(&self.handle, &GroupId::from(event_id));
    }

    pub fn disconnect(&self, registry: &ConnectionRegistry) {
        registry.unregister(&self.handle);
    }

    /// Closes the receiving side while leaving the connection registered,
    /// so later sends to this client fail
    pub fn close_inbox(&mut self) {
        self.inbox.close();
    }

    /// Takes every frame received so far
    pub fn drain(&mut self) -> Vec<ReceivedFrame> {
        let mut frames = Vec::new();
        while let Ok(raw) = self.inbox.try_recv() {
            let json: serde_json::Value =
                serde_json::from_str(&raw).expect("server frames are JSON");
            frames.push(ReceivedFrame {
                message_type: json["type"].as_str().unwrap_or_default().to_string(),
                payload: json["payload"].clone(),
            });
        }
        frames
    }

    /// Sorted message types of every frame received so far
    pub fn drain_types(&mut self) -> Vec<String> {
        let mut types: Vec<String> = self.drain().into_iter().map(|f| f.message_type).collect();
        types.sort();
        types
    }
}
