// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notification dispatch.
//
// Editor callbacks arrive on recognition threads. They are pushed onto an
// unbounded channel and consumed in order by a single task that owns the
// controller, so the controller itself never needs locking.

use inkguide_bridge::EditorBridge;
use inkguide_core::ListenerVersion;
use inkguide_core::error::{GuideError, Result};
use inkguide_core::notice::{Notice, notice_for};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::controller::{DisplayCommand, GuideController};

/// Editor listener notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    PartChanged,
    ContentChanged(Vec<String>),
    SelectionChanged(Vec<String>),
    ActiveBlockChanged(String),
    TransformChanged,
    Error { block_id: String, message: String },
}

impl EditorEvent {
    /// Oldest listener revision that carries this notification.
    pub fn min_version(&self) -> ListenerVersion {
        match self {
            Self::SelectionChanged(_) | Self::ActiveBlockChanged(_) => ListenerVersion::V2,
            _ => ListenerVersion::V1,
        }
    }
}

#[derive(Debug)]
enum Inbound {
    Editor(EditorEvent),
    Substitute { index: usize, label: String },
    SetEnabled(bool),
}

/// Where the dispatcher sends display commands and notices.
pub trait GuideSurface {
    fn apply(&mut self, command: &DisplayCommand);
    fn notify(&mut self, notice: &Notice);
}

/// Cloneable, thread-safe handle for pushing notifications.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Inbound>,
}

impl EventSender {
    fn push(&self, inbound: Inbound) -> Result<()> {
        self.tx.send(inbound).map_err(|_| GuideError::DispatchClosed)
    }

    pub fn send(&self, event: EditorEvent) -> Result<()> {
        self.push(Inbound::Editor(event))
    }

    pub fn part_changed(&self) -> Result<()> {
        self.send(EditorEvent::PartChanged)
    }

    pub fn content_changed(&self, block_ids: Vec<String>) -> Result<()> {
        self.send(EditorEvent::ContentChanged(block_ids))
    }

    pub fn selection_changed(&self, block_ids: Vec<String>) -> Result<()> {
        self.send(EditorEvent::SelectionChanged(block_ids))
    }

    pub fn active_block_changed(&self, block_id: impl Into<String>) -> Result<()> {
        self.send(EditorEvent::ActiveBlockChanged(block_id.into()))
    }

    pub fn transform_changed(&self) -> Result<()> {
        self.send(EditorEvent::TransformChanged)
    }

    /// A candidate picked from the strip's menu.
    pub fn substitute(&self, index: usize, label: impl Into<String>) -> Result<()> {
        self.push(Inbound::Substitute {
            index,
            label: label.into(),
        })
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.push(Inbound::SetEnabled(enabled))
    }
}

/// Owns the controller and drains the notification channel.
pub struct Dispatcher<E> {
    controller: GuideController<E>,
    rx: mpsc::UnboundedReceiver<Inbound>,
    version: ListenerVersion,
}

impl<E: EditorBridge> Dispatcher<E> {
    /// Create a dispatcher and the sender that feeds it.
    pub fn new(controller: GuideController<E>, version: ListenerVersion) -> (EventSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            EventSender { tx },
            Self {
                controller,
                rx,
                version,
            },
        )
    }

    pub fn controller(&self) -> &GuideController<E> {
        &self.controller
    }

    /// Process notifications and timers until every sender is dropped.
    /// Returns the controller for inspection.
    pub async fn run<S: GuideSurface>(mut self, surface: &mut S) -> GuideController<E> {
        info!(version = ?self.version, "smart guide dispatcher running");
        loop {
            let inbound = match self.controller.next_deadline() {
                Some(deadline) => {
                    let sleep = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline));
                    tokio::select! {
                        biased;
                        _ = sleep => {
                            self.fire_timers(surface);
                            continue;
                        }
                        inbound = self.rx.recv() => inbound,
                    }
                }
                None => self.rx.recv().await,
            };

            match inbound {
                Some(inbound) => self.handle(inbound, surface),
                None => break,
            }
        }
        info!("smart guide dispatcher stopped");
        self.controller
    }

    fn fire_timers<S: GuideSurface>(&mut self, surface: &mut S) {
        for command in self.controller.poll_timers() {
            emit(surface, &command);
        }
    }

    fn handle<S: GuideSurface>(&mut self, inbound: Inbound, surface: &mut S) {
        let command = match inbound {
            Inbound::Editor(event) => {
                if event.min_version() > self.version {
                    debug!(?event, version = ?self.version, "notification not part of listener version");
                    return;
                }
                self.handle_event(event, surface)
            }
            Inbound::Substitute { index, label } => {
                match self.controller.substitute(index, &label) {
                    // The engine follows up with a content change; redraw
                    // now so the strip does not lag behind the click.
                    Ok(()) => self.controller.redraw(),
                    Err(e) => {
                        if let Some(notice) = notice_for(&e) {
                            surface.notify(&notice);
                        }
                        return;
                    }
                }
            }
            Inbound::SetEnabled(enabled) => self.controller.set_enabled(enabled),
        };
        emit(surface, &command);
    }

    fn handle_event<S: GuideSurface>(&mut self, event: EditorEvent, surface: &mut S) -> DisplayCommand {
        match event {
            EditorEvent::PartChanged => self.controller.on_part_changed(),
            EditorEvent::ContentChanged(ids) => self.controller.on_content_changed(&ids),
            EditorEvent::SelectionChanged(ids) => self.controller.on_selection_changed(&ids),
            EditorEvent::ActiveBlockChanged(id) => self.controller.on_active_block_changed(&id),
            EditorEvent::TransformChanged => self.controller.on_transform_changed(),
            EditorEvent::Error { block_id, message } => {
                surface.notify(&Notice::from_editor_error(&block_id, &message));
                DisplayCommand::Unchanged
            }
        }
    }
}

fn emit<S: GuideSurface>(surface: &mut S, command: &DisplayCommand) {
    if *command != DisplayCommand::Unchanged {
        surface.apply(command);
    }
}
