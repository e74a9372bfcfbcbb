//! Canned navigator used when no usable LLM credential is configured.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use memory_keeper_domain::{last_user_turn, ConversationTurn, NarrativeArtifact};

use super::prompts::excerpt;
use super::{NarrativeError, StoryNavigator};
use crate::infrastructure::ports::{ClockPort, RandomPort};

const FOLLOW_UP_POOL: [&str; 8] = [
    "That sounds fascinating! Can you tell me more about how that made you feel?",
    "What a wonderful memory! What details from that day still stand out to you?",
    "That must have been quite an experience. Who else was there with you?",
    "How interesting! What happened next in that story?",
    "That sounds like it was really meaningful to you. What made it so special?",
    "I'd love to hear more about that. What was going through your mind at the time?",
    "What a great story! Can you describe what you saw, heard, or smelled that day?",
    "That sounds like it shaped who you are today. How did that experience change you?",
];

const OPENING_POOL: [&str; 4] = [
    "Tell me about a special memory you have related to that topic. What made it so meaningful to you?",
    "I'd love to hear about your experiences with that. Can you share a story that comes to mind?",
    "That sounds like something important to you. What's your favorite memory related to that?",
    "Can you take me back to a moment when that was particularly significant in your life?",
];

/// Artificial delays imitating a remote model.
#[derive(Debug, Clone, Copy)]
pub struct MockLatency {
    /// Follow-ups wait a random duration in this range (milliseconds).
    pub follow_up_ms: (u64, u64),
    pub opening: Duration,
    pub narrative: Duration,
}

impl MockLatency {
    pub fn none() -> Self {
        Self {
            follow_up_ms: (0, 0),
            opening: Duration::ZERO,
            narrative: Duration::ZERO,
        }
    }
}

impl Default for MockLatency {
    fn default() -> Self {
        Self {
            follow_up_ms: (1000, 3000),
            opening: Duration::from_millis(1500),
            narrative: Duration::from_millis(3000),
        }
    }
}

pub struct MockNavigator {
    next_follow_up: AtomicUsize,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    latency: MockLatency,
}

impl MockNavigator {
    pub fn new(random: Arc<dyn RandomPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self::with_latency(random, clock, MockLatency::default())
    }

    pub fn with_latency(
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        latency: MockLatency,
    ) -> Self {
        Self {
            next_follow_up: AtomicUsize::new(0),
            random,
            clock,
            latency,
        }
    }

    async fn pause(duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    fn follow_up_delay(&self) -> Duration {
        let (min, max) = self.latency.follow_up_ms;
        let to_i32 = |ms: u64| i32::try_from(ms).unwrap_or(i32::MAX);
        let ms = self.random.gen_range(to_i32(min), to_i32(max));
        Duration::from_millis(u64::try_from(ms).unwrap_or(0))
    }
}

/// Substitute the topic into an opening template.
fn personalise(template: &str, topic: &str) -> String {
    if template.contains("that topic") {
        template.replacen("that topic", topic, 1)
    } else {
        template.replacen("that", topic, 1)
    }
}

fn mock_narrative_content(quest_title: &str, first_answer: Option<&str>) -> String {
    let opening = match first_answer {
        Some(answer) => format!("{}...", excerpt(answer)),
        None => "These precious memories tell a story of experiences that have shaped a lifetime of wisdom and love.".to_string(),
    };

    format!(
        "This is a beautiful collection of memories shared about {quest_title}.\n\n\
         {opening}\n\n\
         The stories shared reveal not just events, but the emotions, relationships, and moments that truly matter. \
         Each memory is a thread in the rich tapestry of a life well-lived.\n\n\
         These memories remind us that our experiences, both big and small, create the foundation of who we are \
         and the wisdom we pass on to future generations."
    )
}

#[async_trait]
impl StoryNavigator for MockNavigator {
    async fn produce_follow_up(
        &self,
        _theme: &str,
        history: &[ConversationTurn],
    ) -> Result<String, NarrativeError> {
        if last_user_turn(history).is_none() {
            return Err(NarrativeError::NoUserInput);
        }

        Self::pause(self.follow_up_delay()).await;

        let index = self.next_follow_up.fetch_add(1, Ordering::Relaxed);
        Ok(FOLLOW_UP_POOL[index % FOLLOW_UP_POOL.len()].to_string())
    }

    async fn produce_opening_question(&self, topic: &str) -> String {
        Self::pause(self.latency.opening).await;

        let last = i32::try_from(OPENING_POOL.len() - 1).unwrap_or(0);
        let pick = usize::try_from(self.random.gen_range(0, last)).unwrap_or(0);
        let template = OPENING_POOL.get(pick).copied().unwrap_or(OPENING_POOL[0]);
        personalise(template, topic)
    }

    async fn produce_narrative(
        &self,
        quest_title: &str,
        turns: &[ConversationTurn],
    ) -> NarrativeArtifact {
        Self::pause(self.latency.narrative).await;

        let first_answer = turns.iter().find(|t| t.is_user()).map(|t| t.text.as_str());

        NarrativeArtifact {
            title: format!("Memories from {}", quest_title),
            content: mock_narrative_content(quest_title, first_answer),
            wisdom: vec![
                "Every memory is a treasure to be shared with those we love.".to_string(),
                "Life's most precious moments often come from the simplest experiences.".to_string(),
                "The stories we tell become the legacy we leave behind.".to_string(),
            ],
            family_prompts: vec![
                format!(
                    "What other memories do you have from the time period of {}?",
                    quest_title
                ),
                "How did these experiences influence the person you became?".to_string(),
                "Are there similar stories from your own life that this reminds you of?".to_string(),
            ],
            generated_at: self.clock.now(),
        }
    }
}
