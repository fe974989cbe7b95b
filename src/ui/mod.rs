//! User-facing dialog surface
//!
//! The launcher has no window of its own; fatal conditions, the 32-bit
//! confirmation and the child startup-failure report all go through native
//! modal message dialogs.

use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tracing::error;

/// Show a modal error dialog and wait for it to be dismissed.
pub fn error_dialog(title: &str, message: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Ask a yes/no question; returns `true` on confirmation.
pub fn confirm_dialog(title: &str, message: &str) -> bool {
    let result = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::YesNo)
        .show();
    result == MessageDialogResult::Yes
}

/// Install the process-wide panic hook. Panics are logged and surfaced in
/// a dialog so a windowed build never dies silently.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!("Unexpected error: {}", info);
        error_dialog(
            crate::APP_NAME,
            &format!("Unexpected error:\n\n{info}"),
        );
        default_hook(info);
    }));
}
