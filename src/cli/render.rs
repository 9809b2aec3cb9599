//! Plain-text rendering of the list and reading panes.

use curator::{
    Article, ArticleId,
    reader::{DetailView, ListView},
};

pub fn render_list(view: &ListView<'_>, selected: Option<&ArticleId>) -> String {
    if view.is_loading {
        return "Consulting the archive...\n".into();
    }
    if view.is_error {
        return "Archive link severed.\n".into();
    }
    if view.articles.is_empty() {
        return "No records match your inquiry.\n".into();
    }

    view.articles
        .iter()
        .map(|article| {
            let marker = if selected == Some(&article.id) { '>' } else { ' ' };
            let year = article
                .recorded()
                .map_or_else(|| article.date.clone(), |date| date.year().to_string());
            format!(
                "{marker} [{}] {year}  #{}\n  {}\n  {}\n",
                article.primary_category().unwrap_or("UNCLASSIFIED"),
                article.id,
                article.title,
                article.description
            )
        })
        .collect()
}

pub fn render_detail(view: &DetailView<'_>, related: &[&Article], bookmarked: bool) -> String {
    if view.is_loading {
        return "Retrieving entry...\n".into();
    }
    if view.is_error {
        return "Archival retrieval failed. The record may have been moved or deleted.\n".into();
    }
    let Some(article) = view.article else {
        return "Select an entry to start reading.\n".into();
    };

    let mut out = format!(
        "{} | {} min read | {}{}\n\n{}\n\n{}\n\n{}\n",
        article.primary_category().unwrap_or("UNCLASSIFIED"),
        article.minutes_to_read(),
        article.recorded_label(),
        if bookmarked { " | bookmarked" } else { "" },
        article.title,
        article.description,
        article.content.trim_end()
    );
    if let Some(tags) = article.tags.as_ref().filter(|tags| !tags.is_empty()) {
        let tags: Vec<String> = tags.iter().map(|tag| format!("#{tag}")).collect();
        out.push_str(&format!("\n{}\n", tags.join(" ")));
    }
    if !related.is_empty() {
        out.push_str("\nInterconnected records:\n");
        for entry in related {
            out.push_str(&format!("  #{} {}\n", entry.id, entry.title));
        }
    }
    out
}
