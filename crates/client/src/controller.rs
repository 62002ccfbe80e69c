/// Buttons and inputs of the chat form.
pub trait Controls {
    fn set_connect_enabled(&mut self, enabled: bool);
    fn set_send_enabled(&mut self, enabled: bool);
    /// Show the disconnect button (and hide connect) when `connected`,
    /// the reverse otherwise.
    fn show_connected(&mut self, connected: bool);
    fn clear_message_input(&mut self);
}

/// Form state plus validation rules.
///
/// Field values are kept trimmed; the enabled flags mirror what was last
/// pushed to [`Controls`].
pub struct Controller {
    controls: Box<dyn Controls>,
    username: String,
    message: String,
    connect_enabled: bool,
    send_enabled: bool,
    connected_shown: bool,
}

impl Controller {
    /// Starts in the disconnected layout with both actions disabled.
    pub fn new(controls: Box<dyn Controls>) -> Self {
        let mut c = Self {
            controls,
            username: String::new(),
            message: String::new(),
            connect_enabled: false,
            send_enabled: false,
            connected_shown: false,
        };
        c.update_button_visibility(false);
        c.controls.set_connect_enabled(false);
        c.controls.set_send_enabled(false);
        c
    }

    pub fn username_edited(&mut self, raw: &str) {
        self.username = raw.trim().to_string();
        self.connect_enabled = !self.username.is_empty();
        self.controls.set_connect_enabled(self.connect_enabled);
    }

    pub fn message_edited(&mut self, raw: &str) {
        self.message = raw.trim().to_string();
        self.set_send_enabled(!self.message.is_empty());
    }

    pub fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
        self.controls.set_send_enabled(enabled);
    }

    pub fn update_button_visibility(&mut self, connected: bool) {
        self.connected_shown = connected;
        self.controls.show_connected(connected);
    }

    /// Empties the message field; the send button goes with it.
    pub fn clear_message(&mut self) {
        self.message.clear();
        self.controls.clear_message_input();
        self.set_send_enabled(false);
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn connect_enabled(&self) -> bool {
        self.connect_enabled
    }

    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    pub fn connected_shown(&self) -> bool {
        self.connected_shown
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("username", &self.username)
            .field("message", &self.message)
            .field("connect_enabled", &self.connect_enabled)
            .field("send_enabled", &self.send_enabled)
            .field("connected_shown", &self.connected_shown)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::Controller;
    use crate::testing::RecordingControls;

    #[test]
    fn starts_disconnected_and_disabled() {
        let rec = RecordingControls::default();
        let c = Controller::new(Box::new(rec.clone()));
        let s = rec.state();
        assert!(!s.connect_enabled);
        assert!(!s.send_enabled);
        assert!(!s.disconnect_visible);
        assert!(!c.connected_shown());
    }

    #[test]
    fn connect_enabled_only_for_non_blank_username() {
        let rec = RecordingControls::default();
        let mut c = Controller::new(Box::new(rec.clone()));
        c.username_edited("   ");
        assert!(!rec.state().connect_enabled);
        c.username_edited("  alice ");
        assert!(rec.state().connect_enabled);
        assert_eq!(c.username(), "alice");
        c.username_edited("");
        assert!(!c.connect_enabled());
    }

    #[test]
    fn send_enabled_tracks_message_and_clear() {
        let rec = RecordingControls::default();
        let mut c = Controller::new(Box::new(rec.clone()));
        c.message_edited("hi");
        assert!(rec.state().send_enabled);
        c.clear_message();
        let s = rec.state();
        assert!(!s.send_enabled);
        assert_eq!(s.message_cleared, 1);
        assert_eq!(c.message(), "");
    }

    #[test]
    fn visibility_toggles() {
        let rec = RecordingControls::default();
        let mut c = Controller::new(Box::new(rec.clone()));
        c.update_button_visibility(true);
        assert!(rec.state().disconnect_visible);
        c.update_button_visibility(false);
        assert!(!rec.state().disconnect_visible);
    }
}
