use crate::markup::Markup;

/// Classification of a log line; drives its CSS class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineKind {
    Info,
    Error,
    User,
    #[default]
    Own,
}

impl LineKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            LineKind::Info => "info-message",
            LineKind::Error => "error-message",
            LineKind::User => "user-message",
            LineKind::Own => "my-message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LineKind,
    pub content: Markup,
}

/// The scrolling container lines end up in.
///
/// Implementations append the line as the last child and leave the container
/// scrolled to the bottom.
pub trait LogSurface {
    fn append_line(&mut self, line: &LogLine);
}

pub struct ChatLog {
    surface: Box<dyn LogSurface>,
    appended: u64,
}

impl ChatLog {
    pub fn new(surface: Box<dyn LogSurface>) -> Self {
        Self {
            surface,
            appended: 0,
        }
    }

    pub fn append(&mut self, content: Markup, kind: LineKind) {
        let line = LogLine { kind, content };
        self.surface.append_line(&line);
        self.appended += 1;
    }

    pub fn info(&mut self, text: &str) {
        self.append(Markup::text(text), LineKind::Info);
    }

    pub fn error(&mut self, text: &str) {
        self.append(Markup::text(text), LineKind::Error);
    }

    /// Lines appended since construction.
    pub fn len(&self) -> u64 {
        self.appended
    }

    pub fn is_empty(&self) -> bool {
        self.appended == 0
    }
}

impl std::fmt::Debug for ChatLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatLog")
            .field("appended", &self.appended)
            .finish_non_exhaustive()
    }
}
