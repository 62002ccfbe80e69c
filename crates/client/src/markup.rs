//! Log-line content.
//!
//! Lines are inserted into the page as HTML, so anything that came off the
//! wire goes through [`escape_html`] before it is composed with the fixed
//! `<span>` fragments below. A [`Markup`] can only be built from escaped text
//! and those fragments.

/// Escape text for inclusion in element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML fragment plus its plain-text rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    html: String,
    text: String,
}

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Untrusted text, escaped.
    pub fn text(text: &str) -> Self {
        let mut m = Self::new();
        m.push_text(text);
        m
    }

    pub fn push_text(&mut self, text: &str) -> &mut Self {
        self.html.push_str(&escape_html(text));
        self.text.push_str(text);
        self
    }

    /// `<span class="{class}">text</span>`; `class` is a compile-time constant.
    pub fn push_span(&mut self, class: &'static str, text: &str) -> &mut Self {
        self.html.push_str("<span class=\"");
        self.html.push_str(class);
        self.html.push_str("\">");
        self.html.push_str(&escape_html(text));
        self.html.push_str("</span>");
        self.text.push_str(text);
        self
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn plain(&self) -> &str {
        &self.text
    }

    /// Someone else's message: `<username> message <time>`.
    pub fn user_message(username: &str, message: &str, time: &str) -> Self {
        let mut m = Self::new();
        m.push_span("username", username)
            .push_text(" ")
            .push_text(message)
            .push_text(" ")
            .push_span("time", time);
        m
    }

    /// Our own message as echoed locally: `message <time>`.
    pub fn own_message(message: &str, time: &str) -> Self {
        let mut m = Self::new();
        m.push_text(message).push_text(" ").push_span("time", time);
        m
    }

    /// Join notice for an announcement frame.
    pub fn join_notice(username: &str) -> Self {
        let mut m = Self::text(username);
        m.push_text(" telah bergabung!");
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escapes_markup_significant_chars() {
        assert_eq!(
            escape_html(r#"<img src=x onerror="alert('x')">&"#),
            "&lt;img src=x onerror=&quot;alert(&#39;x&#39;)&quot;&gt;&amp;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn user_message_layout() {
        let m = Markup::user_message("bob", "hi", "10:00:00");
        assert_eq!(
            m.html(),
            r#"<span class="username">bob</span> hi <span class="time">10:00:00</span>"#
        );
        assert_eq!(m.plain(), "bob hi 10:00:00");
    }

    #[test]
    fn remote_text_cannot_inject_elements() {
        let m = Markup::user_message("<b>eve</b>", "<script>x()</script>", "1");
        assert!(!m.html().contains("<b>"));
        assert!(!m.html().contains("<script>"));
        assert!(m.plain().contains("<b>eve</b>"));
    }

    #[test]
    fn own_message_and_join_notice() {
        assert_eq!(
            Markup::own_message("hey", "09:15:00").html(),
            r#"hey <span class="time">09:15:00</span>"#
        );
        assert_eq!(Markup::join_notice("alice").plain(), "alice telah bergabung!");
    }
}
