//! Memory quests: the themes a conversation can follow.

use serde::{Deserialize, Serialize};

/// A named conversational theme with its opening question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub initial_question: String,
    #[serde(default)]
    pub is_custom: bool,
}

impl Quest {
    /// Build a custom quest around a free-text topic.
    ///
    /// The opening question is generated separately, so it is passed in.
    pub fn custom(topic: &str, initial_question: impl Into<String>) -> Self {
        let topic = topic.trim();
        Self {
            id: "custom".to_string(),
            title: topic.to_string(),
            description: format!("Your own memories about {}", topic),
            icon: "✨".to_string(),
            initial_question: initial_question.into(),
            is_custom: true,
        }
    }
}

struct QuestSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    initial_question: &'static str,
}

const PREDEFINED: [QuestSeed; 4] = [
    QuestSeed {
        id: "high-school-years",
        title: "The High School Years",
        description: "Journey back to your teenage years and share the memories that shaped you",
        icon: "🎓",
        initial_question: "Let's start with your high school days. Tell me about your very first day of high school - what did you wear, and how were you feeling that morning?",
    },
    QuestSeed {
        id: "first-jobs",
        title: "A Decade of First Jobs",
        description: "Share stories about your early working life and career beginnings",
        icon: "💼",
        initial_question: "I'd love to hear about your first real job. How did you find it, and what was your very first day like at work?",
    },
    QuestSeed {
        id: "building-home",
        title: "Building a Family Home",
        description: "Tell us about creating a home and the memories within those walls",
        icon: "🏠",
        initial_question: "Tell me about a home that was really special to you. What made it feel like home, and what's your favorite memory from that place?",
    },
    QuestSeed {
        id: "love-story",
        title: "Your Love Story",
        description: "Share the romantic journey that brought you together with your partner",
        icon: "❤️",
        initial_question: "Let's talk about love! Tell me about the moment you first met your partner - where were you, and what was your first impression?",
    },
];

/// The built-in quest catalogue, in display order.
pub fn predefined_quests() -> Vec<Quest> {
    PREDEFINED
        .iter()
        .map(|seed| Quest {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            icon: seed.icon.to_string(),
            initial_question: seed.initial_question.to_string(),
            is_custom: false,
        })
        .collect()
}

/// Look up a built-in quest by id.
pub fn find_quest(id: &str) -> Option<Quest> {
    predefined_quests().into_iter().find(|quest| quest.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_four_quests_with_unique_ids() {
        let quests = predefined_quests();
        assert_eq!(quests.len(), 4);
        let mut ids: Vec<_> = quests.iter().map(|q| q.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(quests.iter().all(|q| !q.initial_question.is_empty()));
    }

    #[test]
    fn find_quest_by_id() {
        let quest = find_quest("high-school-years").unwrap();
        assert_eq!(quest.title, "The High School Years");
        assert!(find_quest("space-travel").is_none());
    }

    #[test]
    fn custom_quest_uses_topic_as_title() {
        let quest = Quest::custom("  fishing trips ", "Tell me about fishing!");
        assert!(quest.is_custom);
        assert_eq!(quest.title, "fishing trips");
        assert_eq!(quest.initial_question, "Tell me about fishing!");
    }
}
