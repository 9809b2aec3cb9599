//! What the reader shows, derived from the archive and the user's interaction.
//!
//! The selection is mirrored in the URL fragment through a [`Navigator`], so
//! a selected entry can be linked to and restored with back navigation.

use tracing::debug;
use url::Url;

use crate::article::{Article, ArticleId};

/// Viewport width, in logical pixels, below which the layout is narrow.
pub const DEFAULT_BREAKPOINT: u32 = 768;

/// How many related entries are offered below an article.
pub const RELATED_LIMIT: usize = 2;

/// Arrangement of the list and the reading pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// List and reading pane side by side.
    Wide,
    /// Only one of list or reading pane at a time.
    Narrow,
}

impl Layout {
    /// Layout for a viewport of `width` logical pixels.
    #[must_use]
    pub const fn from_width(width: u32, breakpoint: u32) -> Self {
        if width < breakpoint {
            Self::Narrow
        } else {
            Self::Wide
        }
    }
}

/// Which panes are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panes {
    /// The archive list.
    pub list: bool,
    /// The reading pane.
    pub detail: bool,
}

/// Access to the navigable URL fragment.
pub trait Navigator {
    /// Current fragment without the leading `#`, `None` when empty.
    fn fragment(&self) -> Option<String>;

    /// Move to a new history entry with the given fragment.
    fn navigate(&mut self, fragment: Option<&str>);
}

/// In-process history with back and forward movement.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Option<String>>,
    cursor: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self {
            entries: vec![None],
            cursor: 0,
        }
    }
}

impl MemoryHistory {
    /// History with a single entry carrying `fragment`.
    #[must_use]
    pub fn new(fragment: Option<&str>) -> Self {
        Self {
            entries: vec![normalize_fragment(fragment)],
            cursor: 0,
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty. It never is.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Step back, returning the fragment of the entry moved to.
    ///
    /// Returns `None` when already at the first entry.
    pub fn back(&mut self) -> Option<Option<String>> {
        self.cursor = self.cursor.checked_sub(1)?;
        Some(self.entries[self.cursor].clone())
    }

    /// Step forward, returning the fragment of the entry moved to.
    pub fn forward(&mut self) -> Option<Option<String>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }
}

impl Navigator for MemoryHistory {
    fn fragment(&self) -> Option<String> {
        self.entries[self.cursor].clone()
    }

    fn navigate(&mut self, fragment: Option<&str>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(normalize_fragment(fragment));
        self.cursor += 1;
    }
}

fn normalize_fragment(fragment: Option<&str>) -> Option<String> {
    fragment
        .map(|fragment| fragment.trim_start_matches('#'))
        .filter(|fragment| !fragment.is_empty())
        .map(String::from)
}

/// Articles whose title, description or a category contains `term`,
/// ignoring case. Order is kept.
#[must_use]
pub fn filter_articles<'a>(articles: &'a [Article], term: &str) -> Vec<&'a Article> {
    let term = term.to_lowercase();
    articles
        .iter()
        .filter(|article| {
            article.title.to_lowercase().contains(&term)
                || article.description.to_lowercase().contains(&term)
                || article
                    .category
                    .iter()
                    .any(|category| category.to_lowercase().contains(&term))
        })
        .collect()
}

/// The first few articles other than `selected`, in list order.
#[must_use]
pub fn related_articles<'a>(articles: &'a [Article], selected: &ArticleId) -> Vec<&'a Article> {
    articles
        .iter()
        .filter(|article| article.id != *selected)
        .take(RELATED_LIMIT)
        .collect()
}

/// The article to select automatically, if any: the first one, on a wide
/// layout, when nothing is selected yet.
#[must_use]
pub fn derive_default_selection(
    articles: &[Article],
    current: Option<&ArticleId>,
    layout: Layout,
) -> Option<ArticleId> {
    if layout != Layout::Wide || current.is_some() {
        return None;
    }
    articles.first().map(|article| article.id.clone())
}

/// Link to `id` under `base`, carried in the fragment.
#[must_use]
pub fn share_link(base: &Url, id: &ArticleId) -> Url {
    let mut url = base.clone();
    url.set_fragment(Some(&id.as_text()));
    url
}

/// Selection, search and layout state of the reader.
#[derive(Debug, Clone)]
pub struct ViewState {
    selected: Option<ArticleId>,
    search_term: String,
    breakpoint: u32,
    layout: Layout,
    bookmarked: bool,
    scroll_progress: f64,
    auto_select_armed: bool,
}

impl ViewState {
    /// State for a viewport of `width` pixels with the given breakpoint.
    #[must_use]
    pub const fn new(width: u32, breakpoint: u32) -> Self {
        Self {
            selected: None,
            search_term: String::new(),
            breakpoint,
            layout: Layout::from_width(width, breakpoint),
            bookmarked: false,
            scroll_progress: 0.0,
            auto_select_armed: true,
        }
    }

    /// Currently selected article.
    #[must_use]
    pub const fn selected(&self) -> Option<&ArticleId> {
        self.selected.as_ref()
    }

    /// Current search text.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Current layout.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Whether the current article is bookmarked.
    #[must_use]
    pub const fn is_bookmarked(&self) -> bool {
        self.bookmarked
    }

    /// Reading progress through the current article, from 0 to 1.
    #[must_use]
    pub const fn scroll_progress(&self) -> f64 {
        self.scroll_progress
    }

    /// Visible panes for the current layout and selection.
    #[must_use]
    pub const fn panes(&self) -> Panes {
        match self.layout {
            Layout::Wide => Panes {
                list: true,
                detail: true,
            },
            Layout::Narrow => Panes {
                list: self.selected.is_none(),
                detail: self.selected.is_some(),
            },
        }
    }

    /// Replace the search text.
    pub fn search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Articles matching the search text.
    #[must_use]
    pub fn filtered<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        filter_articles(articles, &self.search_term)
    }

    /// Articles offered next to the selected one.
    #[must_use]
    pub fn related<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        self.selected
            .as_ref()
            .map(|selected| related_articles(articles, selected))
            .unwrap_or_default()
    }

    /// Recompute the layout after the viewport changed.
    pub const fn resize(&mut self, width: u32) {
        self.layout = Layout::from_width(width, self.breakpoint);
    }

    /// Flip the bookmark of the current article, returning the new value.
    pub const fn toggle_bookmark(&mut self) -> bool {
        self.bookmarked = !self.bookmarked;
        self.bookmarked
    }

    /// Record a scroll position of the reading pane.
    pub fn record_scroll(&mut self, top: f64, content_height: f64, viewport_height: f64) {
        let scrollable = content_height - viewport_height;
        self.scroll_progress = if scrollable > 0.0 {
            (top / scrollable).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Select `id` and mirror it in the fragment.
    pub fn select(&mut self, id: ArticleId, navigator: &mut impl Navigator) {
        self.set_selection(Some(id));
        self.sync_fragment(navigator);
    }

    /// Clear the selection and the fragment. Automatic selection will not
    /// pick an article again afterwards.
    pub fn deselect(&mut self, navigator: &mut impl Navigator) {
        self.auto_select_armed = false;
        self.set_selection(None);
        self.sync_fragment(navigator);
    }

    /// Adopt the selection carried by the fragment, after load or external navigation.
    ///
    /// Clearing an existing selection this way counts as a manual deselection.
    pub fn follow_fragment(&mut self, fragment: Option<&str>) {
        let id = normalize_fragment(fragment).map(ArticleId::from);
        if id.is_none() && self.selected.is_some() {
            self.auto_select_armed = false;
        }
        self.set_selection(id);
    }

    /// Select the first article if the default policy calls for it.
    ///
    /// Fires at most once, and never after a manual deselection. Returns the
    /// id selected, if any.
    pub fn apply_default_selection(
        &mut self,
        articles: &[Article],
        navigator: &mut impl Navigator,
    ) -> Option<ArticleId> {
        if !self.auto_select_armed {
            return None;
        }
        let id = derive_default_selection(articles, self.selected.as_ref(), self.layout)?;
        debug!("Selecting {id} by default");
        self.auto_select_armed = false;
        self.select(id.clone(), navigator);
        Some(id)
    }

    fn set_selection(&mut self, id: Option<ArticleId>) {
        if self.selected == id {
            return;
        }
        self.selected = id;
        self.bookmarked = false;
        self.scroll_progress = 0.0;
    }

    fn sync_fragment(&self, navigator: &mut impl Navigator) {
        let wanted = self.selected.as_ref().map(ArticleId::to_string);
        if navigator.fragment() != wanted {
            navigator.navigate(wanted.as_deref());
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_BREAKPOINT, DEFAULT_BREAKPOINT)
    }
}
