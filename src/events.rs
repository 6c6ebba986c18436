//! Change notifications for whatever renders session state.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Registered { username: String },
    LoggedIn { username: String },
    LoggedOut { username: String },
    FavoritesChanged { username: String, count: usize },
    AccountDeleted { username: String },
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct Listeners {
    next: u64,
    entries: Vec<(SubscriptionId, Box<dyn FnMut(&SessionEvent)>)>,
}

impl Listeners {
    pub fn subscribe<F: FnMut(&SessionEvent) + 'static>(&mut self, listener: F) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(i, _)| *i != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, event: &SessionEvent) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
