use phenomap_protocol::{Detail, HeaderKey};

/// The `(genotype, annotation type)` pair a popup describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PopupToken {
    pub gid: HeaderKey,
    pub kind: HeaderKey,
}

impl PopupToken {
    pub fn new(gid: impl Into<HeaderKey>, kind: impl Into<HeaderKey>) -> Self {
        Self {
            gid: gid.into(),
            kind: kind.into(),
        }
    }
}

/// Handle for one detail fetch. Its completion is applied only while the
/// session id is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    pub session: u64,
    pub token: PopupToken,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    Loading,
    Details(Vec<Detail>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The user moved to another cell; the result was dropped.
    Stale,
}

/// Detail popup coordinator with cancellation by supersession.
#[derive(Debug, Default)]
pub struct PopupSession {
    session: u64,
    active: Option<PopupToken>,
    content: Option<PopupContent>,
}

impl PopupSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `token`. Returns `None` when `token` is already
    /// active, so re-hovering a cell does not refetch.
    pub fn open(&mut self, token: PopupToken) -> Option<DetailTicket> {
        if self.active.as_ref() == Some(&token) {
            return None;
        }
        self.session += 1;
        tracing::debug!(session = self.session, gid = %token.gid, kind = %token.kind, "popup opened");
        self.active = Some(token.clone());
        self.content = Some(PopupContent::Loading);
        Some(DetailTicket {
            session: self.session,
            token,
        })
    }

    fn is_current(&self, ticket: &DetailTicket) -> bool {
        ticket.session == self.session && self.active.as_ref() == Some(&ticket.token)
    }

    pub fn on_fetch_complete(&mut self, ticket: &DetailTicket, details: Vec<Detail>) -> Applied {
        self.complete(ticket, PopupContent::Details(details))
    }

    pub fn on_fetch_failed(&mut self, ticket: &DetailTicket, message: impl Into<String>) -> Applied {
        self.complete(ticket, PopupContent::Failed(message.into()))
    }

    fn complete(&mut self, ticket: &DetailTicket, content: PopupContent) -> Applied {
        if !self.is_current(ticket) {
            tracing::debug!(session = ticket.session, current = self.session, "stale detail response discarded");
            return Applied::Stale;
        }
        self.content = Some(content);
        Applied::Applied
    }

    pub fn close(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!(session = self.session, "popup closed");
        }
        self.content = None;
    }

    pub fn token(&self) -> Option<&PopupToken> {
        self.active.as_ref()
    }

    pub fn content(&self) -> Option<&PopupContent> {
        self.content.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }
}
