use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named story list exposed by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    #[default]
    TopStories,
    NewStories,
    BestStories,
    JobStories,
    PollStories,
    AskStories,
    ShowStories,
}

impl FeedKind {
    pub const ALL: [FeedKind; 7] = [
        FeedKind::TopStories,
        FeedKind::NewStories,
        FeedKind::BestStories,
        FeedKind::AskStories,
        FeedKind::ShowStories,
        FeedKind::JobStories,
        FeedKind::PollStories,
    ];

    /// Endpoint name, e.g. `topstories`.
    pub fn name(self) -> &'static str {
        match self {
            FeedKind::TopStories => "topstories",
            FeedKind::NewStories => "newstories",
            FeedKind::BestStories => "beststories",
            FeedKind::JobStories => "jobstories",
            FeedKind::PollStories => "pollstories",
            FeedKind::AskStories => "askstories",
            FeedKind::ShowStories => "showstories",
        }
    }

    pub fn path(self) -> String {
        format!("{}.json", self.name())
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedKind::TopStories => "Top",
            FeedKind::NewStories => "New",
            FeedKind::BestStories => "Best",
            FeedKind::JobStories => "Jobs",
            FeedKind::PollStories => "Polls",
            FeedKind::AskStories => "Ask",
            FeedKind::ShowStories => "Show",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeedKind {
    type Err = String;

    /// Accepts both the endpoint name (`beststories`) and the short label (`best`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        FeedKind::ALL
            .into_iter()
            .find(|f| f.name() == s || f.label().to_lowercase() == s)
            .ok_or_else(|| format!("Unknown feed: {}", s))
    }
}
