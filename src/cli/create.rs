use clap::Args;
use color_eyre::{Section, eyre};
use curator::{Draft, article::CATEGORIES};
use dialoguer::{Editor, Input, Select, theme::ColorfulTheme};

#[derive(Debug, Default, Args)]
pub struct CreateArgs {
    /// Headline of the entry
    #[arg(long)]
    title: Option<String>,

    /// Short summary shown in the list
    #[arg(long)]
    description: Option<String>,

    /// Body text, or `@path` to read it from a file
    #[arg(long)]
    content: Option<String>,

    /// Classification, may be repeated
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Free-form tag, may be repeated
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Cover image URL
    #[arg(long)]
    cover_image: Option<String>,

    /// Date of the entry, defaults to today
    #[arg(long)]
    date: Option<String>,
}

/// Build a draft from the arguments, asking for whatever is missing.
pub async fn draft_from_args(args: CreateArgs) -> eyre::Result<Draft> {
    let theme = ColorfulTheme::default();
    let interactive =
        args.title.is_none() || args.description.is_none() || args.content.is_none();

    let title = match args.title {
        Some(title) => title,
        None => prompt_line(&theme, "Article title")?,
    };
    let description = match args.description {
        Some(description) => description,
        None => prompt_line(&theme, "Description")?,
    };
    let content = match args.content {
        Some(content) => match content.strip_prefix('@') {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .note("Can't read the content file")?,
            None => content,
        },
        None => prompt_content(&theme)?,
    };

    let mut draft = Draft::new(title, description, content).with_tags(args.tags);
    if !args.categories.is_empty() {
        draft = draft.with_category(args.categories);
    } else if interactive {
        draft = draft.with_category([prompt_category(&theme)?]);
    }
    if let Some(cover_image) = args.cover_image {
        draft = draft.with_cover_image(cover_image);
    }
    if let Some(date) = args.date {
        draft = draft.with_date(date);
    }

    draft.validate()?;
    Ok(draft)
}

/// Ask for every field of a new entry.
pub async fn prompt_draft() -> eyre::Result<Draft> {
    draft_from_args(CreateArgs::default()).await
}

fn prompt_line(theme: &ColorfulTheme, prompt: &str) -> eyre::Result<String> {
    Ok(Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("This field is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?)
}

fn prompt_content(theme: &ColorfulTheme) -> eyre::Result<String> {
    if let Some(content) = Editor::new().extension(".md").edit("")? {
        if !content.trim().is_empty() {
            return Ok(content);
        }
    }
    prompt_line(theme, "Content")
}

fn prompt_category(theme: &ColorfulTheme) -> eyre::Result<&'static str> {
    let index = Select::with_theme(theme)
        .with_prompt("Classification")
        .items(&CATEGORIES)
        .default(0)
        .interact()?;
    Ok(CATEGORIES[index])
}
