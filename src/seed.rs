use crate::article::{Article, ArticleId};

/// The archive a fresh installation starts with.
#[must_use]
pub fn seed_articles() -> Vec<Article> {
    vec![
        Article {
            id: ArticleId::from("1"),
            title: "The Silent Geometry of Brutalism".into(),
            category: vec!["ARCHITECTURE".into()],
            tags: Some(vec!["Brutalism".into(), "Concrete".into(), "Urbanism".into()]),
            description: "An investigation into the raw honesty of exposed concrete and the architectural souls of monolithic structures.".into(),
            date: "2026-02-15T10:00:00.000Z".into(),
            cover_image: "https://images.unsplash.com/photo-1518005020951-eccb494ad742?q=80&w=2000&auto=format&fit=crop".into(),
            content: "There is a specific kind of beauty in the unapologetic weight of concrete. Brutalism, often misunderstood as cold or hostile, is in fact an architecture of profound honesty. It does not hide its structural purpose behind glass curtains or decorative facades.\n\nIn this entry, we explore the works of Marcel Breuer and Le Corbusier, looking at how they used the 'béton brut' to create spaces that feel both ancient and futuristic. The way light hits a textured concrete wall at sunset reveals a softness that few other materials can replicate. It is the architecture of the soul, stripped of all pretense.".into(),
            reading_time: Some(4),
        },
        Article {
            id: ArticleId::from("2"),
            title: "The Ethics of Digital Minimalism".into(),
            category: vec!["PHILOSOPHY".into()],
            tags: Some(vec!["Minimalism".into(), "Technology".into(), "Mindfulness".into()]),
            description: "In an era of infinite noise, the most radical act is the intentional curation of one's digital landscape.".into(),
            date: "2026-01-20T14:30:00.000Z".into(),
            cover_image: "https://images.unsplash.com/photo-1494438639946-1ebd1d20bf85?q=80&w=2000&auto=format&fit=crop".into(),
            content: "Digital minimalism is not about living in a cave; it is about reclaiming the agency over our attention. The modern interface is designed to exploit our biological weaknesses, turning focus into a commodity. \n\nWe must build our own 'architectural' boundaries in the digital realm. This means choosing tools that serve us, rather than the other way around. It requires a philosophy of 'less but better', where every notification is a conscious choice and every app has a verified purpose. Silence in the digital age is not a luxury, it is a necessity for deep thought.".into(),
            reading_time: Some(6),
        },
    ]
}
