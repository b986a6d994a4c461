// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dispatcher behaviour on a paused tokio clock.

use std::time::Duration;

use inkguide_bridge::MemoryEditor;
use inkguide_core::error::GuideError;
use inkguide_core::notice::{Notice, Severity};
use inkguide_core::{BlockKind, GuideConfig, ListenerVersion, Rect, Word};
use inkguide_engine::{DisplayCommand, Dispatcher, EditorEvent, GuideController, GuideSurface, TokioClock};
use tokio::time::{Instant, sleep};

struct Recorder {
    start: Instant,
    commands: Vec<(Duration, DisplayCommand)>,
    notices: Vec<Notice>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            commands: Vec::new(),
            notices: Vec::new(),
        }
    }

    fn flags(&self, n: usize) -> Vec<bool> {
        match &self.commands[n].1 {
            DisplayCommand::Show(update) => update.words.iter().map(|w| w.changed).collect(),
            other => panic!("command {n} is {other:?}"),
        }
    }

    fn at_ms(&self, n: usize) -> u128 {
        self.commands[n].0.as_millis()
    }
}

impl GuideSurface for Recorder {
    fn apply(&mut self, command: &DisplayCommand) {
        self.commands.push((self.start.elapsed(), command.clone()));
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

fn words(labels: &[&str]) -> Vec<Word> {
    labels.iter().map(|l| Word::new(*l)).collect()
}

fn dispatcher(
    editor: &MemoryEditor,
    version: ListenerVersion,
) -> (inkguide_engine::EventSender, Dispatcher<MemoryEditor>) {
    let guide = GuideController::with_config(
        editor.clone(),
        GuideConfig::default(),
        Box::new(TokioClock),
    );
    Dispatcher::new(guide, version)
}

#[tokio::test(start_paused = true)]
async fn diagram_write_highlights_then_hides() {
    let editor = MemoryEditor::new();
    editor.add_block("diagram/0", BlockKind::Text, Rect::new(0.0, 40.0, 100.0, 10.0), "");
    editor.set_words("diagram/0", &words(&["one"]));
    let (sender, dispatcher) = dispatcher(&editor, ListenerVersion::V2);

    let script_editor = editor.clone();
    let driver = tokio::spawn(async move {
        sender.active_block_changed("diagram/0").unwrap();
        sleep(Duration::from_millis(100)).await;
        script_editor.set_words("diagram/0", &words(&["one", "two"]));
        sender.content_changed(vec!["diagram/0".into()]).unwrap();
        sleep(Duration::from_secs(5)).await;
    });

    let mut surface = Recorder::new();
    let guide = dispatcher.run(&mut surface).await;
    driver.await.unwrap();

    assert_eq!(surface.commands.len(), 4, "{:?}", surface.commands);
    assert_eq!(surface.flags(0), [true]);
    assert_eq!(surface.flags(1), [false, true]);
    assert!((100..110).contains(&surface.at_ms(1)));

    // Highlight removal 2 s after the write, auto-hide 3 s after it.
    assert_eq!(surface.flags(2), [false, false]);
    assert!((2100..2110).contains(&surface.at_ms(2)));
    assert_eq!(surface.commands[3].1, DisplayCommand::Hide);
    assert!((3100..3110).contains(&surface.at_ms(3)));

    assert_eq!(guide.current_block_id(), None);
    assert!(surface.notices.is_empty());
}

#[tokio::test(start_paused = true)]
async fn engine_configured_controller_follows_tokio_time() {
    let editor = MemoryEditor::new();
    editor.set_number("smart-guide.fade-out-delay.write-in-diagram", 1000.0);
    editor.add_block("diagram/0", BlockKind::Text, Rect::default(), "");
    editor.set_words("diagram/0", &words(&["one"]));
    let guide = GuideController::new(editor.clone(), Box::new(TokioClock));
    let (sender, dispatcher) = Dispatcher::new(guide, ListenerVersion::V2);

    let script_editor = editor.clone();
    let driver = tokio::spawn(async move {
        sender.active_block_changed("diagram/0").unwrap();
        sleep(Duration::from_millis(100)).await;
        script_editor.set_words("diagram/0", &words(&["two"]));
        sender.content_changed(vec!["diagram/0".into()]).unwrap();
        sleep(Duration::from_secs(3)).await;
    });

    let mut surface = Recorder::new();
    dispatcher.run(&mut surface).await;
    driver.await.unwrap();

    let last = surface.commands.len() - 1;
    assert_eq!(surface.commands[last].1, DisplayCommand::Hide);
    assert!((1100..1110).contains(&surface.at_ms(last)));
}

#[tokio::test(start_paused = true)]
async fn first_listener_revision_drops_selection() {
    let editor = MemoryEditor::new();
    editor.add_text_block("text/0", &words(&["hi"]));
    let (sender, dispatcher) = dispatcher(&editor, ListenerVersion::V1);

    sender.selection_changed(vec!["text/0".into()]).unwrap();
    sender.active_block_changed("text/0").unwrap();
    sender.content_changed(vec!["text/0".into()]).unwrap();
    sender.part_changed().unwrap();
    drop(sender);

    let mut surface = Recorder::new();
    let guide = dispatcher.run(&mut surface).await;

    let commands: Vec<_> = surface.commands.into_iter().map(|(_, c)| c).collect();
    assert_eq!(commands, [DisplayCommand::Hide]);
    assert_eq!(guide.selected_block_id(), None);
    assert_eq!(editor.outstanding_handles("text/0"), 0);
}

#[tokio::test(start_paused = true)]
async fn editor_errors_become_notices() {
    let editor = MemoryEditor::new();
    let (sender, dispatcher) = dispatcher(&editor, ListenerVersion::V2);

    sender
        .send(EditorEvent::Error {
            block_id: "text/3".into(),
            message: "recognition failed".into(),
        })
        .unwrap();
    drop(sender);

    let mut surface = Recorder::new();
    dispatcher.run(&mut surface).await;

    assert!(surface.commands.is_empty());
    assert_eq!(surface.notices.len(), 1);
    assert_eq!(surface.notices[0].severity, Severity::Error);
    assert!(surface.notices[0].dismissible);
}

#[tokio::test(start_paused = true)]
async fn substitution_redraws_or_notifies() {
    let editor = MemoryEditor::new();
    editor.add_text_block("text/0", &[Word::new("cat").with_candidates(["cat", "dog", "cot"])]);
    let (sender, dispatcher) = dispatcher(&editor, ListenerVersion::V2);

    let script_editor = editor.clone();
    let driver = tokio::spawn(async move {
        sender.active_block_changed("text/0").unwrap();
        sleep(Duration::from_millis(10)).await;
        sender.substitute(0, "dog").unwrap();
        sleep(Duration::from_millis(10)).await;
        script_editor.reject_imports(true);
        sender.substitute(0, "cot").unwrap();
        sender.substitute(0, "cow").unwrap();
    });

    let mut surface = Recorder::new();
    let guide = dispatcher.run(&mut surface).await;
    driver.await.unwrap();

    let labels: Vec<Vec<String>> = surface
        .commands
        .iter()
        .filter_map(|(_, c)| match c {
            DisplayCommand::Show(update) => {
                Some(update.words.iter().map(|w| w.text.clone()).collect())
            }
            _ => None,
        })
        .collect();
    assert_eq!(labels[0], ["cat"]);
    assert_eq!(labels[1], ["dog"]);
    assert_eq!(guide.words()[0].label, "dog");

    // Rejected import, then a label that was never offered.
    assert_eq!(surface.notices.len(), 2);
    assert!(surface.notices.iter().all(|n| n.severity == Severity::Warning));
    assert_eq!(editor.imports().len(), 1);
}

#[test]
fn sending_after_shutdown_fails() {
    let editor = MemoryEditor::new();
    let (sender, dispatcher) = dispatcher(&editor, ListenerVersion::V2);
    drop(dispatcher);

    assert!(matches!(sender.part_changed(), Err(GuideError::DispatchClosed)));
    assert!(matches!(sender.set_enabled(false), Err(GuideError::DispatchClosed)));
}
