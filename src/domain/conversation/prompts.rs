//! Prompt assembly for the interview and the meditation script.
//!
//! Every generator call the collector makes is built here as a pure function
//! of the session history, so prompt construction can be tested without
//! touching the generator port.

use super::{ConversationTurn, TurnRole};

/// Fixed acknowledgment returned when the turn budget is exhausted.
pub const CLOSING_ACKNOWLEDGMENT: &str =
    "Alright, I have a good sense of how you are feeling. Let me create a personalised meditation for you.";

/// Renders turns as a `role: content` transcript, one line per turn,
/// in chronological order.
pub fn transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| {
            let role = match turn.role {
                TurnRole::Assistant => "assistant",
                TurnRole::User => "user",
            };
            format!("{}: {}", role, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt for the opening greeting.
pub fn opening() -> String {
    "You are a gentle meditation guide. Greet the user warmly and ask them one \
     open-ended question about how they are feeling today.\n\
     Requirements:\n\
     1. Warm and natural, a single sentence\n\
     2. Ask only one question\n\
     3. Patient, unhurried tone\n\n\
     Respond with the greeting only, no explanations."
        .to_string()
}

/// Prompt for the next follow-up question, built over a bounded window of
/// recent history.
pub fn next_question(window: &[ConversationTurn], turn: u32, max_turns: u32) -> String {
    format!(
        "You are a gentle meditation guide conducting a short interview. Based on \
         the conversation so far, ask the next question to understand the user's \
         emotional state more deeply.\n\n\
         Conversation so far:\n{}\n\n\
         Requirements:\n\
         1. Ask one follow-up question that builds on the user's last answer\n\
         2. If they mentioned an emotion, ask about physical sensations or specific thoughts\n\
         3. If they mentioned stress, ask about its source or impact\n\
         4. If you already know enough, ask how they would like to feel instead\n\
         5. Ask only one question, in a gentle and natural tone\n\
         6. Never repeat a question you already asked\n\n\
         Current round: {}/{}\n\n\
         Respond with the question only, no explanations.",
        transcript(window),
        turn,
        max_turns
    )
}

/// Prompt for summarizing the full interview.
pub fn summary(history: &[ConversationTurn]) -> String {
    format!(
        "Summarize the following conversation, extracting the user's emotional \
         state and the key information they shared:\n\n{}\n\n\
         Requirements:\n\
         1. Describe the user's emotional state\n\
         2. Identify their main concerns and stressors\n\
         3. Keep it concise so it can guide a meditation script",
        transcript(history)
    )
}

/// Prompt for the final guided-meditation script.
pub fn meditation(summary: &str, history: &[ConversationTurn]) -> String {
    format!(
        "Based on the conversation summary and full history below, write a \
         personalised guided meditation of roughly five minutes (about 500-800 \
         characters).\n\n\
         Summary:\n{}\n\n\
         Full conversation:\n{}\n\n\
         Requirements:\n\
         1. Tailor the script to the user's emotional state and concerns\n\
         2. Slow pacing, short sentences, gentle and calm voice\n\
         3. Follow this structure:\n\
            - Opening: settle into a comfortable position, close the eyes\n\
            - Breathing: notice the natural breath\n\
            - Body scan: relax each part of the body in turn\n\
            - Emotional acceptance: welcome the current emotional state\n\
            - Mindfulness: observe present sensations without judging them\n\
            - Closing: slowly return to the present, open the eyes\n\
         4. Use soft guiding words such as \"now\", \"gently\", \"slowly\"\n\
         5. Suggest rather than command; no lecturing, no diagnosis\n\n\
         Respond with the meditation script only, no explanations.",
        summary,
        transcript(history)
    )
}
