use rfd::{MessageButtons, MessageDialog, MessageLevel};

/// Shows a blocking message box and returns once the operator dismisses it.
pub fn popup(title: &str, message: &str) {
    let _ = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}
