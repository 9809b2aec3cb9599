//! A reading session: the archive list, the open article and the user's
//! intents, tied to a [`Gateway`] and a [`Navigator`].

use tracing::{debug, info};
use url::Url;

use crate::{
    article::{Article, ArticleId, Draft},
    gateway::{FailToGetArticle, Gateway},
    view::{MemoryHistory, Navigator, Panes, ViewState, related_articles, share_link},
};

/// Progress of a data request as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState<T> {
    data: Option<T>,
    is_loading: bool,
    is_error: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_error: false,
        }
    }
}

impl<T> QueryState<T> {
    /// Last successful result.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether the last request failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }

    const fn start(&mut self) {
        self.is_loading = true;
        self.is_error = false;
    }

    fn succeed(&mut self, data: T) {
        self.data = Some(data);
        self.is_loading = false;
        self.is_error = false;
    }

    fn fail(&mut self) {
        self.data = None;
        self.is_loading = false;
        self.is_error = true;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What the list pane renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<'a> {
    /// Articles matching the search, in archive order.
    pub articles: Vec<&'a Article>,
    /// Whether the archive is being fetched.
    pub is_loading: bool,
    /// Whether fetching the archive failed.
    pub is_error: bool,
}

/// What the reading pane renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView<'a> {
    /// The open article.
    pub article: Option<&'a Article>,
    /// Whether the article is being fetched.
    pub is_loading: bool,
    /// Whether the article could not be found.
    pub is_error: bool,
}

/// A reading session.
#[derive(Debug)]
pub struct Reader<N = MemoryHistory> {
    gateway: Gateway,
    view: ViewState,
    navigator: N,
    share_base: Url,
    list: QueryState<Vec<Article>>,
    detail_key: Option<ArticleId>,
    detail: QueryState<Article>,
}

impl<N: Navigator> Reader<N> {
    /// Start a session. A fragment already present in `navigator` selects its article.
    pub fn new(gateway: Gateway, mut view: ViewState, navigator: N, share_base: Url) -> Self {
        view.follow_fragment(navigator.fragment().as_deref());
        Self {
            gateway,
            view,
            navigator,
            share_base,
            list: QueryState::default(),
            detail_key: None,
            detail: QueryState::default(),
        }
    }

    /// The gateway requests go through.
    #[must_use]
    pub const fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Selection, search and layout state.
    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    /// The fragment/history binding.
    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    /// State of the archive list request.
    #[must_use]
    pub const fn list(&self) -> &QueryState<Vec<Article>> {
        &self.list
    }

    /// State of the open article request.
    #[must_use]
    pub const fn detail(&self) -> &QueryState<Article> {
        &self.detail
    }

    /// Fetch the archive, apply the default selection and open the selected article.
    pub async fn refresh(&mut self) {
        self.list.start();
        let articles = self.gateway.list_articles().await;
        debug!("Archive holds {} entries", articles.len());
        self.list.succeed(articles);

        if let Some(articles) = self.list.data.as_deref() {
            self.view.apply_default_selection(articles, &mut self.navigator);
        }
        self.load_detail().await;
    }

    /// Open `id`.
    pub async fn select(&mut self, id: ArticleId) {
        self.view.select(id, &mut self.navigator);
        self.load_detail().await;
    }

    /// Close the open article.
    pub fn deselect(&mut self) {
        self.view.deselect(&mut self.navigator);
        self.detail_key = None;
        self.detail.reset();
    }

    /// React to the fragment changing outside the session.
    pub async fn follow_fragment(&mut self, fragment: Option<&str>) {
        self.view.follow_fragment(fragment);
        self.load_detail().await;
    }

    /// Replace the search text.
    pub fn search(&mut self, term: impl Into<String>) {
        self.view.search(term);
    }

    /// Recompute the layout for a new viewport width, then re-derive the
    /// default selection against the loaded archive.
    pub async fn resize(&mut self, width: u32) {
        self.view.resize(width);
        let Some(articles) = self.list.data.as_deref() else {
            return;
        };
        if self
            .view
            .apply_default_selection(articles, &mut self.navigator)
            .is_some()
        {
            self.load_detail().await;
        }
    }

    /// Record a scroll position of the reading pane.
    pub fn record_scroll(&mut self, top: f64, content_height: f64, viewport_height: f64) {
        self.view.record_scroll(top, content_height, viewport_height);
    }

    /// Flip the bookmark of the open article, returning the new value.
    pub const fn toggle_bookmark(&mut self) -> bool {
        self.view.toggle_bookmark()
    }

    /// Publish `draft` and refetch the archive.
    pub async fn create(&mut self, draft: Draft) -> Article {
        let article = self.gateway.create_article(draft).await;
        info!("Recorded entry {}", article.id);
        self.refresh().await;
        article
    }

    /// Mark the open article as loading and return the id to fetch.
    ///
    /// Returns `None` when nothing is selected, clearing the reading pane.
    pub fn detail_request(&mut self) -> Option<ArticleId> {
        let Some(id) = self.view.selected().cloned() else {
            self.detail_key = None;
            self.detail.reset();
            return None;
        };
        self.detail_key = Some(id.clone());
        self.detail.start();
        Some(id)
    }

    /// Store the outcome of fetching `id`.
    ///
    /// Results for an article that is no longer the open one are dropped;
    /// returns whether the result was kept.
    pub fn resolve_detail(
        &mut self,
        id: &ArticleId,
        result: Result<Article, FailToGetArticle>,
    ) -> bool {
        if self.detail_key.as_ref() != Some(id) {
            debug!("Dropping stale result for {id}");
            return false;
        }
        match result {
            Ok(article) => self.detail.succeed(article),
            Err(err) => {
                info!("{err}");
                self.detail.fail();
            }
        }
        true
    }

    async fn load_detail(&mut self) {
        let Some(id) = self.detail_request() else {
            return;
        };
        let result = self.gateway.get_article(&id).await;
        self.resolve_detail(&id, result);
    }

    /// Articles for the list pane.
    #[must_use]
    pub fn list_view(&self) -> ListView<'_> {
        ListView {
            articles: self
                .list
                .data()
                .map(|articles| self.view.filtered(articles))
                .unwrap_or_default(),
            is_loading: self.list.is_loading(),
            is_error: self.list.is_error(),
        }
    }

    /// Article for the reading pane.
    #[must_use]
    pub const fn detail_view(&self) -> DetailView<'_> {
        DetailView {
            article: self.detail.data(),
            is_loading: self.detail.is_loading(),
            is_error: self.detail.is_error(),
        }
    }

    /// Entries offered below the open article.
    #[must_use]
    pub fn related(&self) -> Vec<&Article> {
        match (self.list.data(), self.detail.data()) {
            (Some(articles), Some(article)) => related_articles(articles, &article.id),
            _ => Vec::new(),
        }
    }

    /// Visible panes.
    #[must_use]
    pub const fn panes(&self) -> Panes {
        self.view.panes()
    }

    /// Link to the open article.
    #[must_use]
    pub fn share_link(&self) -> Option<Url> {
        self.detail
            .data()
            .map(|article| share_link(&self.share_base, &article.id))
    }

    /// Plain-text archival copy of the open article.
    #[must_use]
    pub fn export(&self) -> Option<String> {
        self.detail.data().map(archival_text)
    }
}

impl Reader<MemoryHistory> {
    /// Go back one history entry. Returns `false` at the start of history.
    pub async fn back(&mut self) -> bool {
        let Some(fragment) = self.navigator.back() else {
            return false;
        };
        self.follow_fragment(fragment.as_deref()).await;
        true
    }

    /// Go forward one history entry. Returns `false` at the end of history.
    pub async fn forward(&mut self) -> bool {
        let Some(fragment) = self.navigator.forward() else {
            return false;
        };
        self.follow_fragment(fragment.as_deref()).await;
        true
    }
}

/// Render an article as a self-contained plain-text record.
#[must_use]
pub fn archival_text(article: &Article) -> String {
    let mut text = format!(
        "{}\n{} | {} min read | {}\n\n{}\n\n{}\n",
        article.title,
        article.primary_category().unwrap_or("UNCLASSIFIED"),
        article.minutes_to_read(),
        article.recorded_label(),
        article.description,
        article.content.trim_end()
    );
    if let Some(tags) = article.tags.as_ref().filter(|tags| !tags.is_empty()) {
        text.push_str(&format!("\nTags: {}\n", tags.join(", ")));
    }
    text.push_str(&format!("\nEntry {}\n", article.id));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{seed::seed_articles, store::FallbackStore};

    fn reader() -> Reader {
        let gateway = Gateway::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            FallbackStore::in_memory(),
        );
        Reader::new(
            gateway,
            ViewState::default(),
            MemoryHistory::default(),
            Url::parse("http://localhost:3000/").unwrap(),
        )
    }

    #[test]
    fn stale_detail_results_are_dropped() {
        let mut reader = reader();
        let [first, second]: [Article; 2] = seed_articles().try_into().unwrap();

        reader.view.select(first.id.clone(), &mut reader.navigator);
        let pending = reader.detail_request().unwrap();
        reader.view.select(second.id.clone(), &mut reader.navigator);
        let current = reader.detail_request().unwrap();

        assert!(reader.resolve_detail(&current, Ok(second.clone())));
        assert!(!reader.resolve_detail(&pending, Ok(first)));
        assert_eq!(reader.detail_view().article, Some(&second));
    }

    #[test]
    fn not_found_marks_the_detail_as_failed() {
        let mut reader = reader();
        let id = ArticleId::from("404");
        reader.view.select(id.clone(), &mut reader.navigator);
        let pending = reader.detail_request().unwrap();
        assert!(reader.detail_view().is_loading);

        reader.resolve_detail(&pending, Err(FailToGetArticle::NotFound(id)));
        let detail = reader.detail_view();
        assert!(detail.is_error);
        assert!(!detail.is_loading);
        assert_eq!(detail.article, None);
    }

    #[test]
    fn archival_text_lists_metadata() {
        let article = &seed_articles()[0];
        let text = archival_text(article);
        assert!(text.starts_with("The Silent Geometry of Brutalism\n"));
        assert!(text.contains("ARCHITECTURE | 4 min read | 15 Feb 2026"));
        assert!(text.contains("Tags: Brutalism, Concrete, Urbanism"));
        assert!(text.ends_with("Entry 1\n"));
    }
}
