#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StatusLevel {
    Ok,
    Warn,
    Error,
}

impl StatusLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Receives the human-readable milestone lines of an app command.
pub trait StatusSink {
    fn status(&mut self, level: StatusLevel, message: &str);

    fn ok(&mut self, message: &str) {
        self.status(StatusLevel::Ok, message);
    }

    fn warn(&mut self, message: &str) {
        self.status(StatusLevel::Warn, message);
    }

    fn error(&mut self, message: &str) {
        self.status(StatusLevel::Error, message);
    }
}
