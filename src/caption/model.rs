use serde::{Deserialize, Serialize};

/// Layout family a caption was written for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionStyle {
    /// Classic impact-font caption above and below the image.
    TopBottom,
    /// Setup/punchline pair in the style of a short social post.
    TweetStyle,
    /// Any style name this build does not know about.
    #[serde(other)]
    Unknown,
}

/// One meme candidate: style plus top, bottom and accessibility text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionRecord {
    /// Layout family.
    pub style: CaptionStyle,
    /// Text drawn near the top edge (revealed progressively when animated).
    pub top: String,
    /// Text drawn near the bottom edge.
    pub bottom: String,
    /// Description for screen readers and `alt` attributes.
    pub alt_text: String,
}

impl CaptionRecord {
    /// Build a record from borrowed parts.
    pub fn new(
        style: CaptionStyle,
        top: impl Into<String>,
        bottom: impl Into<String>,
        alt_text: impl Into<String>,
    ) -> Self {
        Self {
            style,
            top: top.into(),
            bottom: bottom.into(),
            alt_text: alt_text.into(),
        }
    }
}

/// The fixed caption list served whenever no real pipeline answers.
pub fn mock_captions() -> Vec<CaptionRecord> {
    vec![
        CaptionRecord::new(
            CaptionStyle::TopBottom,
            "WHEN YOU FINALLY",
            "FINISH YOUR CODE WITHOUT BUGS",
            "Celebration meme about bug-free code",
        ),
        CaptionRecord::new(
            CaptionStyle::TopBottom,
            "THAT MOMENT",
            "WHEN THE DEMO ACTUALLY WORKS",
            "Relief when demo works perfectly",
        ),
        CaptionRecord::new(
            CaptionStyle::TweetStyle,
            "Nobody:\n\nProgrammers:",
            "Is this a bug or a feature?",
            "Joke about programmers confusing bugs and features",
        ),
        CaptionRecord::new(
            CaptionStyle::TopBottom,
            "ONE DOES NOT SIMPLY",
            "WRITE BUG-FREE CODE",
            "Boromir meme about writing code",
        ),
        CaptionRecord::new(
            CaptionStyle::TopBottom,
            "DEBUGGING",
            "THE ART OF FINDING OUT WHY CODE WORKS",
            "Joke about debugging process",
        ),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/caption/model.rs"]
mod tests;
