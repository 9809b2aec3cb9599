mod common;

use common::{MockArchive, gateway, unreachable_base};
use curator::{
    ArticleId, Draft, FallbackStore, Reader,
    seed::seed_articles,
    view::{Layout, MemoryHistory, Navigator, ViewState},
};
use url::Url;

const WIDE: u32 = 1280;
const NARROW: u32 = 390;

async fn offline_reader(width: u32, history: MemoryHistory) -> Reader {
    Reader::new(
        gateway(unreachable_base().await, FallbackStore::in_memory()),
        ViewState::new(width, 768),
        history,
        Url::parse("http://localhost:3000/").unwrap(),
    )
}

#[tokio::test]
async fn wide_layout_opens_the_first_entry_once() {
    let mut reader = offline_reader(WIDE, MemoryHistory::default()).await;
    reader.refresh().await;

    let first = ArticleId::from("1");
    assert_eq!(reader.view().selected(), Some(&first));
    assert_eq!(reader.navigator().fragment().as_deref(), Some("1"));
    assert_eq!(reader.detail_view().article.map(|a| &a.id), Some(&first));
    assert_eq!(reader.related().len(), 1);

    reader.deselect();
    reader.refresh().await;
    assert_eq!(reader.view().selected(), None);
    assert_eq!(reader.detail_view().article, None);
}

#[tokio::test]
async fn narrow_layout_waits_for_a_choice() {
    let mut reader = offline_reader(NARROW, MemoryHistory::default()).await;
    reader.refresh().await;

    assert_eq!(reader.view().layout(), Layout::Narrow);
    assert_eq!(reader.view().selected(), None);
    assert!(reader.panes().list);
    assert!(!reader.panes().detail);

    reader.select(ArticleId::from("2")).await;
    assert!(!reader.panes().list);
    assert!(reader.panes().detail);

    assert!(reader.back().await);
    assert!(reader.panes().list);
    assert_eq!(reader.detail_view().article, None);
}

#[tokio::test]
async fn widening_opens_the_first_entry() {
    let mut reader = offline_reader(NARROW, MemoryHistory::default()).await;
    reader.refresh().await;
    assert_eq!(reader.view().selected(), None);

    reader.resize(WIDE).await;
    let first = ArticleId::from("1");
    assert_eq!(reader.view().layout(), Layout::Wide);
    assert_eq!(reader.view().selected(), Some(&first));
    assert_eq!(reader.detail_view().article.map(|a| &a.id), Some(&first));

    // Still fires only once.
    reader.deselect();
    reader.resize(NARROW).await;
    reader.resize(WIDE).await;
    assert_eq!(reader.view().selected(), None);
}

#[tokio::test]
async fn clearing_the_fragment_is_not_undone_by_refresh() {
    let mut reader = offline_reader(WIDE, MemoryHistory::new(Some("2"))).await;
    reader.refresh().await;
    assert_eq!(reader.view().selected(), Some(&ArticleId::from("2")));

    reader.follow_fragment(None).await;
    assert_eq!(reader.view().selected(), None);

    reader
        .create(Draft::new("Field Notes", "Observations", "A short note."))
        .await;
    assert_eq!(reader.view().selected(), None);
    assert_eq!(reader.detail_view().article, None);
}

#[tokio::test]
async fn fragment_round_trips_through_history() {
    let mut reader = offline_reader(WIDE, MemoryHistory::new(Some("#2"))).await;
    reader.refresh().await;

    // A deep link wins over the default selection.
    let second = ArticleId::from("2");
    assert_eq!(reader.view().selected(), Some(&second));
    assert_eq!(reader.navigator().len(), 1);

    reader.select(ArticleId::from("1")).await;
    reader.select(ArticleId::from("1")).await;
    assert_eq!(reader.navigator().len(), 2);

    assert!(reader.back().await);
    assert_eq!(reader.view().selected(), Some(&second));
    assert_eq!(reader.detail_view().article.map(|a| &a.id), Some(&second));
    assert!(!reader.back().await);

    assert!(reader.forward().await);
    assert_eq!(reader.view().selected(), Some(&ArticleId::from("1")));
}

#[tokio::test]
async fn missing_entry_shows_an_error() {
    let mut reader = offline_reader(WIDE, MemoryHistory::new(Some("nope"))).await;
    reader.refresh().await;

    let detail = reader.detail_view();
    assert!(detail.is_error);
    assert_eq!(detail.article, None);
    assert!(reader.share_link().is_none());
}

#[tokio::test]
async fn search_filters_the_list_ignoring_case() {
    let mut reader = offline_reader(WIDE, MemoryHistory::default()).await;
    reader.refresh().await;

    reader.search("philo");
    let titles: Vec<_> = reader
        .list_view()
        .articles
        .iter()
        .map(|article| article.title.as_str())
        .collect();
    assert_eq!(titles, ["The Ethics of Digital Minimalism"]);

    reader.search("gothic");
    assert!(reader.list_view().articles.is_empty());

    reader.search("");
    assert_eq!(reader.list_view().articles.len(), 2);
}

#[tokio::test]
async fn created_entry_leads_the_list() {
    let mut reader = offline_reader(WIDE, MemoryHistory::default()).await;
    reader.refresh().await;

    let created = reader
        .create(Draft::new("Field Notes", "Observations", "A short note."))
        .await;

    let list = reader.list_view();
    assert_eq!(list.articles.len(), 3);
    assert_eq!(list.articles[0], &created);
    // The default selection already fired and does not move to the new entry.
    assert_eq!(reader.view().selected(), Some(&ArticleId::from("1")));
}

#[tokio::test]
async fn bookmark_and_share_follow_the_open_entry() {
    let archive = MockArchive::start(seed_articles()).await;
    let mut reader = Reader::new(
        gateway(archive.base().clone(), FallbackStore::in_memory()),
        ViewState::new(WIDE, 768),
        MemoryHistory::default(),
        Url::parse("https://curator.example/reader").unwrap(),
    );
    reader.refresh().await;

    assert!(reader.toggle_bookmark());
    assert!(reader.view().is_bookmarked());
    assert_eq!(
        reader.share_link().unwrap().as_str(),
        "https://curator.example/reader#1"
    );

    reader.select(ArticleId::from("2")).await;
    assert!(!reader.view().is_bookmarked());
    assert_eq!(
        reader.share_link().unwrap().as_str(),
        "https://curator.example/reader#2"
    );
    assert!(
        reader
            .export()
            .unwrap()
            .starts_with("The Ethics of Digital Minimalism\n")
    );
}
