use super::*;

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_to_none() {
    let input = InputAdapter::new();
    assert_eq!(input.modifiers(), Modifiers::default());
}

#[test]
fn shift_ctrl_and_meta_each_enable_multi_select() {
    for key in ["Shift", "Control", "Meta"] {
        let mut input = InputAdapter::new();
        assert!(input.key_down(key));
        assert!(input.modifiers().multi_select, "{key}");
        assert!(input.key_up(key));
        assert!(!input.modifiers().multi_select, "{key}");
    }
}

#[test]
fn multi_select_holds_while_any_key_is_down() {
    let mut input = InputAdapter::new();
    input.key_down("Shift");
    assert!(!input.key_down("Control"));
    assert!(!input.key_up("Shift"));
    assert!(input.modifiers().multi_select);
}

#[test]
fn alt_hides_handles() {
    let mut input = InputAdapter::new();
    input.key_down("Alt");
    assert_eq!(input.modifiers(), Modifiers { multi_select: false, hide_handles: true });
}

#[test]
fn other_keys_do_not_change_modifiers() {
    let mut input = InputAdapter::new();
    assert!(!input.key_down("a"));
    assert!(!input.key_down("Delete"));
    assert_eq!(input.modifiers(), Modifiers::default());
}

#[test]
fn sync_and_release_all() {
    let mut input = InputAdapter::new();
    input.sync(false, true, true, false);
    assert_eq!(input.modifiers(), Modifiers { multi_select: true, hide_handles: true });
    input.release_all();
    assert_eq!(input.modifiers(), Modifiers::default());
}

// =============================================================
// Synthetic mouse suppression
// =============================================================

#[test]
fn mouse_accepted_without_touch() {
    assert!(InputAdapter::new().accept_mouse(0.0));
}

#[test]
fn mouse_suppressed_right_after_touch() {
    let mut input = InputAdapter::new();
    input.note_touch(1_000.0);
    assert!(!input.accept_mouse(1_010.0));
    assert!(!input.accept_mouse(1_000.0 + SYNTHETIC_MOUSE_WINDOW_MS));
    assert!(input.accept_mouse(1_001.0 + SYNTHETIC_MOUSE_WINDOW_MS));
}

// =============================================================
// State and cursor
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert_eq!(InputState::default(), InputState::Idle);
}

#[test]
fn cursor_for_handles() {
    assert_eq!(Cursor::for_handle(Handle::TopLeft), Cursor::ResizeNwse);
    assert_eq!(Cursor::for_handle(Handle::BottomRight), Cursor::ResizeNwse);
    assert_eq!(Cursor::for_handle(Handle::TopRight), Cursor::ResizeNesw);
    assert_eq!(Cursor::for_handle(Handle::BottomLeft), Cursor::ResizeNesw);
    assert_eq!(Cursor::for_handle(Handle::Rotate), Cursor::Grab);
}

#[test]
fn cursor_css_names() {
    assert_eq!(Cursor::Default.as_css(), "default");
    assert_eq!(Cursor::Move.as_css(), "move");
    assert_eq!(Cursor::ResizeNwse.as_css(), "nwse-resize");
    assert_eq!(Cursor::ResizeNesw.as_css(), "nesw-resize");
    assert_eq!(Cursor::Grab.as_css(), "grab");
}
