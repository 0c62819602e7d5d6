//! Typed interaction events and their mapping onto the generic record shape.

/// Generic event parameters accepted by [`Tracker::record`](super::Tracker::record).
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    pub event_type: String,
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    pub value: Option<f64>,
    pub content_id: Option<String>,
}

impl EventDescriptor {
    pub fn new(
        event_type: impl Into<String>,
        category: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            category: category.into(),
            action: action.into(),
            label: None,
            value: None,
            content_id: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    fn maybe_value(mut self, value: Option<f64>) -> Self {
        self.value = value;
        self
    }

    fn maybe_content(mut self, content_id: Option<String>) -> Self {
        self.content_id = content_id;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAloudAction {
    Start,
    Pause,
    Complete,
}

/// Interactions the site reports.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackedEvent {
    Click {
        element: String,
        location: Option<String>,
    },
    Download {
        file_name: String,
        content_id: Option<String>,
    },
    Share {
        method: String,
        content_id: Option<String>,
    },
    GamePlay {
        game: String,
        score: Option<f64>,
        content_id: Option<String>,
    },
    GameComplete {
        game: String,
        score: Option<f64>,
        content_id: Option<String>,
    },
    Favorite {
        action: FavoriteAction,
        content_id: Option<String>,
    },
    ReadAloud {
        action: ReadAloudAction,
        content_id: Option<String>,
    },
    FormSubmit {
        form_type: String,
        success: bool,
    },
    Search {
        query: String,
        results: u32,
    },
}

impl From<TrackedEvent> for EventDescriptor {
    fn from(event: TrackedEvent) -> Self {
        match event {
            TrackedEvent::Click { element, location } => {
                let label = match location {
                    Some(loc) => format!("{element} - {loc}"),
                    None => element,
                };
                EventDescriptor::new("click", "engagement", "click").label(label)
            }
            TrackedEvent::Download {
                file_name,
                content_id,
            } => EventDescriptor::new("download", "conversion", "download")
                .label(file_name)
                .maybe_content(content_id),
            TrackedEvent::Share { method, content_id } => {
                EventDescriptor::new("share", "engagement", "share")
                    .label(method)
                    .maybe_content(content_id)
            }
            TrackedEvent::GamePlay {
                game,
                score,
                content_id,
            } => EventDescriptor::new("game", "engagement", "play")
                .label(game)
                .maybe_value(score)
                .maybe_content(content_id),
            TrackedEvent::GameComplete {
                game,
                score,
                content_id,
            } => EventDescriptor::new("game", "engagement", "complete")
                .label(game)
                .maybe_value(score)
                .maybe_content(content_id),
            TrackedEvent::Favorite { action, content_id } => {
                let action = match action {
                    FavoriteAction::Add => "add",
                    FavoriteAction::Remove => "remove",
                };
                EventDescriptor::new("favorite", "engagement", action)
                    .label("devotional")
                    .maybe_content(content_id)
            }
            TrackedEvent::ReadAloud { action, content_id } => {
                let action = match action {
                    ReadAloudAction::Start => "start",
                    ReadAloudAction::Pause => "pause",
                    ReadAloudAction::Complete => "complete",
                };
                EventDescriptor::new("audio", "engagement", action)
                    .label("read-aloud")
                    .maybe_content(content_id)
            }
            TrackedEvent::FormSubmit { form_type, success } => {
                EventDescriptor::new("form", "conversion", "submit")
                    .label(form_type)
                    .value(if success { 1.0 } else { 0.0 })
            }
            TrackedEvent::Search { query, results } => {
                EventDescriptor::new("search", "engagement", "search")
                    .label(query)
                    .value(f64::from(results))
            }
        }
    }
}
