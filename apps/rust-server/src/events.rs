// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed in-process event bus.
//!
//! Handlers publish [`PlatformEvent`]s after a successful write or view;
//! subscribers (the analytics logger, tests) receive them over a
//! `tokio::sync::broadcast` channel. Publishing never blocks and never
//! fails the request: with no subscribers the event is dropped, and a slow
//! subscriber lags instead of applying back-pressure.

use serde::Serialize;
use tokio::sync::broadcast;

/// Events buffered per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 256;

/// Fixed schema of every cross-component notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlatformEvent {
    ArticleViewed {
        slug: String,
    },
    CommentPosted {
        article_slug: String,
        comment_id: String,
        author_id: String,
    },
    CommentRemoved {
        article_slug: String,
        comment_id: String,
        moderator_id: String,
    },
    SupporterAdded {
        supporter_id: String,
    },
}

impl PlatformEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PlatformEvent::ArticleViewed { .. } => "article_viewed",
            PlatformEvent::CommentPosted { .. } => "comment_posted",
            PlatformEvent::CommentRemoved { .. } => "comment_removed",
            PlatformEvent::SupporterAdded { .. } => "supporter_added",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, event: PlatformEvent) {
        // Err only means nobody is listening.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Log every event until the bus is dropped.
pub async fn run_analytics_logger(mut rx: broadcast::Receiver<PlatformEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                let payload = serde_json::to_string(&event).unwrap_or_default();
                tracing::info!(target: "analytics", kind = event.kind(), %payload, "Platform event");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(target: "analytics", skipped, "Analytics logger lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!(target: "analytics", "Event bus closed, analytics logger stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(PlatformEvent::SupporterAdded {
            supporter_id: "s1".into(),
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            PlatformEvent::SupporterAdded {
                supporter_id: "s1".into()
            }
        );
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(PlatformEvent::ArticleViewed {
            slug: "welcome".into(),
        });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlatformEvent::CommentPosted {
            article_slug: "welcome".into(),
            comment_id: "c1".into(),
            author_id: "u1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "comment_posted");
        assert_eq!(json["article_slug"], "welcome");
        assert_eq!(event.kind(), "comment_posted");
    }

    #[tokio::test]
    async fn analytics_logger_stops_when_bus_dropped() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let task = tokio::spawn(run_analytics_logger(rx));

        bus.publish(PlatformEvent::ArticleViewed {
            slug: "welcome".into(),
        });
        drop(bus);

        task.await.unwrap();
    }
}
