//! Interactive reading session in the terminal.

use std::path::PathBuf;

use color_eyre::eyre;
use curator::{ArticleId, Reader};
use dialoguer::{Input, Select, theme::ColorfulTheme};
use tracing::info;

use crate::{
    create::prompt_draft,
    long_task,
    render::{render_detail, render_list},
};

enum Action {
    Open(ArticleId),
    Close,
    Bookmark,
    Share,
    Export,
    Search,
    Create,
    Back,
    Forward,
    Refresh,
    Quit,
}

pub async fn run(mut reader: Reader) -> eyre::Result<()> {
    let theme = ColorfulTheme::default();
    long_task("Consulting the archive...", reader.refresh(), "Archive ready").await;

    loop {
        let panes = reader.panes();
        let mut menu: Vec<(String, Action)> = Vec::new();

        if panes.detail {
            println!(
                "\n{}",
                render_detail(
                    &reader.detail_view(),
                    &reader.related(),
                    reader.view().is_bookmarked()
                )
            );
            if reader.detail_view().article.is_some() {
                for entry in reader.related() {
                    menu.push((format!("Related: {}", entry.title), Action::Open(entry.id.clone())));
                }
                let bookmark = if reader.view().is_bookmarked() {
                    "Remove bookmark"
                } else {
                    "Bookmark"
                };
                menu.push((bookmark.into(), Action::Bookmark));
                menu.push(("Share".into(), Action::Share));
                menu.push(("Export archival copy".into(), Action::Export));
            }
            if reader.view().selected().is_some() {
                menu.push(("Close entry".into(), Action::Close));
            }
        }

        if panes.list {
            let list = reader.list_view();
            if !reader.view().search_term().is_empty() {
                println!("Searching for \"{}\"", reader.view().search_term());
            }
            if list.articles.is_empty() {
                print!("{}", render_list(&list, None));
            }
            let selected = reader.view().selected();
            for article in &list.articles {
                let marker = if selected == Some(&article.id) { ">" } else { " " };
                menu.push((
                    format!(
                        "{marker} [{}] {}",
                        article.primary_category().unwrap_or("UNCLASSIFIED"),
                        article.title
                    ),
                    Action::Open(article.id.clone()),
                ));
            }
        }

        menu.push(("Search".into(), Action::Search));
        menu.push(("New entry".into(), Action::Create));
        menu.push(("Back".into(), Action::Back));
        menu.push(("Forward".into(), Action::Forward));
        menu.push(("Refresh".into(), Action::Refresh));
        menu.push(("Quit".into(), Action::Quit));

        let labels: Vec<&str> = menu.iter().map(|(label, _)| label.as_str()).collect();
        let index = Select::with_theme(&theme)
            .with_prompt("The Curator")
            .items(&labels)
            .default(0)
            .interact()?;

        match menu.swap_remove(index).1 {
            Action::Open(id) => {
                long_task("Retrieving entry...", reader.select(id), "Entry retrieved").await;
            }
            Action::Close => reader.deselect(),
            Action::Bookmark => {
                reader.toggle_bookmark();
            }
            Action::Share => {
                if let Some(link) = reader.share_link() {
                    println!("{link}");
                }
            }
            Action::Export => export(&reader, &theme).await?,
            Action::Search => {
                let term: String = Input::with_theme(&theme)
                    .with_prompt("Search the archives")
                    .with_initial_text(reader.view().search_term())
                    .allow_empty(true)
                    .interact_text()?;
                reader.search(term);
            }
            Action::Create => {
                let draft = prompt_draft().await?;
                let article =
                    long_task("Recording entry...", reader.create(draft), "Entry recorded").await;
                println!("Recorded entry {}", article.id);
            }
            Action::Back => {
                if !long_task("Going back...", reader.back(), "Done").await {
                    info!("Already at the start of history");
                }
            }
            Action::Forward => {
                if !long_task("Going forward...", reader.forward(), "Done").await {
                    info!("Already at the end of history");
                }
            }
            Action::Refresh => {
                long_task("Consulting the archive...", reader.refresh(), "Archive ready").await;
            }
            Action::Quit => return Ok(()),
        }
    }
}

async fn export(reader: &Reader, theme: &ColorfulTheme) -> eyre::Result<()> {
    let (Some(text), Some(article)) = (reader.export(), reader.detail_view().article) else {
        return Ok(());
    };
    let path: String = Input::with_theme(theme)
        .with_prompt("Save archival copy to")
        .default(format!("{}.txt", article.id))
        .interact_text()?;
    let path = PathBuf::from(path);
    tokio::fs::write(&path, text).await?;
    info!("Archival copy written to {}", path.display());
    Ok(())
}
