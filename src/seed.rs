use tracing::info;

use crate::error::EventError;
use crate::event::EventController;
use crate::models::EventDraft;
use crate::store::DocumentStore;

const SAMPLES: [(u32, &str); 6] = [
    (1, "San Francisco, CA, USA"),
    (2, "San Lahore, LA, PAK"),
    (3, "San Lahore, LA, PAK"),
    (4, "San Lahore, LA, PAK"),
    (5, "San Lahore, LA, PAK"),
    (6, "San Lahore, LA, PAK"),
];

/// Featured events shown on a fresh install.
pub fn sample_drafts() -> Vec<EventDraft> {
    SAMPLES
        .iter()
        .map(|(n, location)| EventDraft {
            title: format!("React post {n}"),
            slug: None,
            description: format!("Hands-on React session number {n}."),
            overview: "Talks and live coding on modern React.".to_string(),
            image: format!("/images/event{n}.png"),
            venue: "Community Hall".to_string(),
            location: location.to_string(),
            date: "2025-11-19".to_string(),
            time: "07:55 PM".to_string(),
            mode: "hybrid".to_string(),
            audience: "Developers".to_string(),
            agenda: vec![
                "Welcome".to_string(),
                "Live coding".to_string(),
                "Q&A".to_string(),
            ],
            organizer: "DevEvent".to_string(),
            tags: vec!["react".to_string(), "frontend".to_string()],
        })
        .collect()
}

/// Creates the sample events through the regular pipeline when the store is
/// empty. Returns how many were written.
pub async fn seed_if_empty<S>(events: &EventController<S>) -> Result<usize, EventError>
where
    S: DocumentStore + ?Sized,
{
    if !events.list().await?.is_empty() {
        return Ok(0);
    }

    let drafts = sample_drafts();
    let count = drafts.len();
    for draft in drafts {
        events.create(draft).await?;
    }
    info!(count, "seeded sample events");
    Ok(count)
}
