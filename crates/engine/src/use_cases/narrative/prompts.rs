//! Prompt text and canned fallbacks for story generation.

use chrono::{DateTime, Utc};
use memory_keeper_domain::NarrativeArtifact;

/// Returned when a follow-up question cannot be generated.
pub const FALLBACK_FOLLOW_UP: &str = "Oh, that sounds so wonderful! I'm really enjoying hearing about this. Can you tell me more about what made that moment special for you?";

const FALLBACK_WISDOM: [&str; 2] = [
    "Every memory is a treasure to be shared",
    "Life's simple moments often hold the deepest meaning",
];

const FALLBACK_FAMILY_PROMPTS: [&str; 2] = [
    "What other memories do you have from this time?",
    "How did these experiences shape who you became?",
];

/// Number of transcript characters quoted in canned narratives.
pub const EXCERPT_CHARS: usize = 200;

pub fn follow_up_prompt(theme: &str, last_answer: &str) -> String {
    format!(
        r#"You are a loving, curious grandchild who is absolutely fascinated by your grandparent's life stories and memories.

Quest Theme: "{theme}"
Last response from grandparent: "{last_answer}"

Your personality:
- Warm, gentle, and genuinely excited to hear every detail
- Curious like a child who never gets tired of hearing stories
- Emotionally connected and caring
- Uses warm, affectionate language
- Shows genuine enthusiasm and wonder

Generate exactly ONE follow-up question that sounds like a loving grandchild asking:
- Be genuinely curious and excited about their memories
- Use warm, personal language ("Oh wow!", "That sounds amazing!", "I love hearing about...")
- Ask for vivid details that bring the story to life
- Show emotional connection to what they shared
- Express how much you treasure hearing their stories

Keep the question under 50 words and make it sound genuinely excited and caring.

Follow-up question:"#
    )
}

pub fn opening_prompt(topic: &str) -> String {
    format!(
        r#"You are a loving, excited grandchild who just heard your grandparent wants to share memories about: "{topic}"

Generate a warm, enthusiastic opening question that sounds like a curious grandchild:
- Show genuine excitement about hearing their story
- Use warm, personal language with enthusiasm
- Ask for vivid details that bring memories to life
- Express how much you treasure hearing about their experiences
- Sound eager and genuinely interested

Keep it under 40 words and sound genuinely thrilled to hear their story.

Opening question:"#
    )
}

pub fn narrative_prompt(quest_title: &str, transcript: &str) -> String {
    format!(
        r#"You are a skilled narrative writer creating a legacy blog post from a grandparent's memories.

Quest: "{quest_title}"
Raw conversation transcript:
{transcript}

Create a polished, third-person narrative blog post that:

1. BLOG POST CONTENT:
- Write in an engaging, warm third-person narrative style
- Organize the memories chronologically or thematically
- Include emotional details and sensory descriptions they shared
- Make it suitable for family sharing
- Target length: 400-600 words
- Start with an engaging title

2. EXTRACT WISDOM:
- Identify 3-5 key life lessons or pieces of wisdom from their stories
- Format as quotable insights
- Keep each wisdom point to 1-2 sentences

3. FAMILY CONNECTION PROMPTS:
- Create 3-5 specific follow-up questions family members could ask
- Make them personal and based on details they shared
- Encourage deeper family conversations

Format your response as JSON:
{{
  "title": "Blog post title",
  "content": "Full blog post content in markdown format",
  "wisdom": ["wisdom quote 1", "wisdom quote 2"],
  "familyPrompts": ["question 1", "question 2"]
}}"#
    )
}

pub fn fallback_opening_question(topic: &str) -> String {
    format!(
        "Oh, I'm so excited to hear about {}! Can you share a special memory that always makes you smile when you think about it?",
        topic
    )
}

/// First [`EXCERPT_CHARS`] characters of `text`.
pub fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

/// Deterministic artifact used when the model output is unusable.
pub fn fallback_narrative(
    quest_title: &str,
    transcript: &str,
    generated_at: DateTime<Utc>,
) -> NarrativeArtifact {
    NarrativeArtifact {
        title: format!("Memories from {}", quest_title),
        content: format!(
            "This is a collection of precious memories shared about {}. {}...",
            quest_title,
            excerpt(transcript)
        ),
        wisdom: FALLBACK_WISDOM.iter().map(|s| s.to_string()).collect(),
        family_prompts: FALLBACK_FAMILY_PROMPTS.iter().map(|s| s.to_string()).collect(),
        generated_at,
    }
}
