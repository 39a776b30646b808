//! UI collaborator traits implemented by the hosting page

use crate::chat::ChatRole;
use crate::error::Result;

/// Append-only chat log
pub trait ChatView {
    /// Handle to a rendered message whose text can be replaced later
    type Node;

    /// Create and attach a role-tagged message, scrolled into view
    fn append(&self, role: ChatRole, text: &str) -> Result<Self::Node>;

    /// Replace the text of a previously appended message
    fn set_text(&self, node: &Self::Node, text: &str);

    /// Keep the newest content visible
    fn scroll_to_latest(&self);
}

/// Human-readable status line
pub trait StatusSink {
    fn set_status(&self, text: &str);
}

/// Text input that can be resized to fit its content
pub trait GrowableInput {
    fn reset_height(&self);
    fn scroll_height(&self) -> i32;
    fn set_height_px(&self, px: i32);
}

/// Blocking yes/no confirmation
pub trait UserPrompt {
    fn confirm(&self, message: &str) -> bool;
}

/// Grow (or shrink) `input` to its content's natural height
pub fn auto_size<I: GrowableInput + ?Sized>(input: &I) {
    // Height must be reset first or scroll height never shrinks
    input.reset_height();
    let height = input.scroll_height();
    input.set_height_px(height);
}
