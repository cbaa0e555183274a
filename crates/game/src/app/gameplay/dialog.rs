/// Holds at most one visible dialog. A new push supersedes the current one.
#[derive(Debug, Clone, PartialEq)]
struct DialogQueue {
    current: Option<ActiveDialog>,
    default_duration_seconds: f32,
}

impl DialogQueue {
    fn new(default_duration_seconds: f32) -> Self {
        Self {
            current: None,
            default_duration_seconds,
        }
    }

    fn push(&mut self, text: impl Into<String>, duration_seconds: Option<f32>) {
        let text = text.into();
        if let Some(previous) = self.current.as_ref() {
            debug!(previous = %previous.text, next = %text, "dialog_superseded");
        }
        info!(text = %text, "dialog_shown");
        self.current = Some(ActiveDialog {
            text,
            remaining_seconds: duration_seconds.unwrap_or(self.default_duration_seconds),
        });
    }

    /// Counts down in tick time and drops the dialog once it expires.
    fn tick(&mut self, dt_seconds: f32) {
        let Some(dialog) = self.current.as_mut() else {
            return;
        };
        dialog.remaining_seconds -= dt_seconds;
        if dialog.remaining_seconds <= 0.0 {
            debug!(text = %dialog.text, "dialog_expired");
            self.current = None;
        }
    }

    fn clear(&mut self) {
        self.current = None;
    }

    fn directive(&self) -> Option<DialogDirective> {
        self.current.as_ref().map(|dialog| DialogDirective {
            text: dialog.text.clone(),
            remaining_seconds: dialog.remaining_seconds,
        })
    }
}
