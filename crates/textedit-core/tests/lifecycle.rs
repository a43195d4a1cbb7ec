//! End-to-end window scenarios driven through a scripted prompter.

use std::path::Path;

use tempfile::tempdir;
use textedit_core::{
    Answer, Config, EditorEvent, HeadlessPrompter, SaveChoice, WindowController,
    event::drain,
};

fn config() -> Config {
    let mut config = Config::default();
    config.files.watch_files = false;
    config
}

fn current_title(controller: &WindowController<HeadlessPrompter>) -> &str {
    controller.tabs().current().unwrap().title()
}

#[test]
fn untitled_save_as_and_close() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("a.txt");
    let prompter = HeadlessPrompter::with_answers([Answer::Path(Some(target.clone()))]);
    let mut controller = WindowController::new(config(), dir.path(), prompter);
    let mut events = controller.bus().subscribe();

    assert_eq!(controller.tabs().len(), 1);
    assert_eq!(current_title(&controller), "Untitled");
    assert!(!controller.tabs().current().unwrap().is_modified());

    let id = controller.tabs().current().unwrap().id();
    controller.sync_editor(id, "hello").unwrap();
    assert_eq!(current_title(&controller), "Untitled *");

    assert!(controller.save_as().unwrap());
    assert_eq!(current_title(&controller), "a.txt");
    assert!(!controller.tabs().current().unwrap().is_modified());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
    assert!(controller.window_title().ends_with("a.txt"));

    assert!(controller.close_current_tab());
    assert_eq!(controller.tabs().len(), 1);
    assert_eq!(current_title(&controller), "Untitled");
    assert_ne!(controller.tabs().current().unwrap().id(), id);
    assert!(controller.prompter().prompts.is_empty());

    let events = drain(&mut events);
    assert!(events.iter().any(|e| matches!(e, EditorEvent::TabSaved { id: saved, .. } if *saved == id)));
    assert!(events.contains(&EditorEvent::TabClosed(id)));
}

#[test]
fn deleting_the_last_tab_file_leaves_untitled() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.md");
    std::fs::write(&file, "# notes").unwrap();

    let prompter = HeadlessPrompter::with_answers([Answer::YesNo(true)]);
    let mut controller = WindowController::new(config(), dir.path(), prompter);
    controller.open_path(&file).unwrap();
    controller.close_tab(0);
    assert_eq!(controller.tabs().len(), 1);

    let row = controller
        .tree()
        .rows()
        .iter()
        .position(|node| node.name == "notes.md")
        .unwrap();
    assert!(controller.delete_row(row).unwrap());

    assert!(!file.exists());
    assert_eq!(controller.tabs().len(), 1);
    assert_eq!(current_title(&controller), "Untitled");
    assert!(controller.tree().rows().is_empty());
}

#[test]
fn exit_save_aborts_when_picker_is_cancelled() {
    let dir = tempdir().unwrap();
    let prompter = HeadlessPrompter::with_answers([
        Answer::Save(SaveChoice::Save),
        Answer::Path(None),
    ]);
    let mut controller = WindowController::new(config(), dir.path(), prompter);
    let id = controller.tabs().current().unwrap().id();
    controller.sync_editor(id, "draft").unwrap();

    assert!(!controller.request_exit());
    assert_eq!(current_title(&controller), "Untitled *");
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn read_only_tabs_ignore_edits() {
    let dir = tempdir().unwrap();
    let mut config = config();
    config.editor.read_only = true;
    let mut controller = WindowController::new(config, dir.path(), HeadlessPrompter::new());

    let id = controller.tabs().current().unwrap().id();
    controller.sync_editor(id, "typed").unwrap();
    let viewport = controller.tabs().current_editor().unwrap();
    assert_eq!(viewport.content(), "");
    assert!(viewport.current_line_highlight().is_none());
    assert!(!controller.tabs().current().unwrap().is_modified());
    assert_eq!(controller.tree().root(), textedit_core::normalize_path(Path::new(dir.path())));
}
