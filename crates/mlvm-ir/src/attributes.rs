use rustc_hash::FxHashSet;

/// An insertion-ordered set of short string tags. The backend reads these
/// but assigns no fixed semantics of its own; extensions define meaning
/// (`in`, `out`, `no_alias`, ...).
#[derive(Debug, Clone, Default)]
pub struct AttributeSet {
    order: Vec<String>,
    seen: FxHashSet<String>,
}

impl AttributeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tag`, returning `true` if it was newly added.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.seen.insert(tag.clone()) {
            self.order.push(tag);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.seen.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }
}

impl FromIterator<String> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::default();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}
