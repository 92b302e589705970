//! Chat intent router — turns a free-text message into a reply backed by the matcher.
//!
//! Intents, checked in order:
//! 1. empty message → prompt for skills
//! 2. greeting word (hi / hello / hey) → greeting
//! 3. "help" / "thank" → canned replies
//! 4. "what should i learn for X" / "skills for X" → `skills_for_career(X)`
//! 5. anything else → split into skills and `recommend_by_skills(.., 5)`

use std::sync::OnceLock;

use regex::Regex;

use crate::matching::engine::{CareerMatcher, MatchError};

const CHAT_TOPN: usize = 5;
const MAX_ROLE_SKILLS: usize = 12;
const MAX_LEARN_PER_LINE: usize = 5;
const GREETINGS: &[&str] = &["hi", "hello", "hey"];
const ROLE_INTENTS: &[&str] = &["what should i learn for", "skills for"];

const EMPTY_REPLY: &str = "Say something like: 'I know Python and SQL, what roles fit me?'";
const GREETING_REPLY: &str =
    "Hello! Tell me a few skills you have or want to learn, and I'll suggest careers.";
const HELP_REPLY: &str = "You can type your skills (e.g., Python, Excel, communication) or ask 'what should I learn for data analyst?'.";
const THANKS_REPLY: &str = "You're welcome! Keep exploring skills and roles.";
const UNKNOWN_ROLE_REPLY: &str =
    "I couldn't find that role. Try a common title like 'Data Analyst' or 'Web Developer'.";
const NO_MATCH_REPLY: &str =
    "Hmm, I couldn't match that. Try listing 3-5 skills (e.g., Python, statistics, SQL).";

fn skill_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,;/]| and | with ").expect("valid separator regex"))
}

fn for_keyword() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bfor\b").expect("valid keyword regex"))
}

/// Produces the chat reply for `message`.
pub fn reply(matcher: &CareerMatcher, message: &str) -> Result<String, MatchError> {
    let msg = message.trim();
    if msg.is_empty() {
        return Ok(EMPTY_REPLY.to_string());
    }

    let lower = msg.to_lowercase();
    if lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| GREETINGS.contains(&word))
    {
        return Ok(GREETING_REPLY.to_string());
    }
    if lower.contains("help") {
        return Ok(HELP_REPLY.to_string());
    }
    if lower.contains("thank") {
        return Ok(THANKS_REPLY.to_string());
    }

    if ROLE_INTENTS.iter().any(|intent| lower.contains(intent)) {
        let target = role_target(&lower);
        let skills = matcher.skills_for_career(&target);
        if skills.is_empty() {
            return Ok(UNKNOWN_ROLE_REPLY.to_string());
        }
        let focus: Vec<&str> = skills
            .iter()
            .take(MAX_ROLE_SKILLS)
            .map(String::as_str)
            .collect();
        return Ok(format!(
            "For **{}**, focus on: {}",
            title_case(&target),
            focus.join(", ")
        ));
    }

    let pieces = split_skills(msg);
    let results = matcher.recommend_by_skills(&pieces, CHAT_TOPN)?;
    if results.is_empty() {
        return Ok(NO_MATCH_REPLY.to_string());
    }

    let bullets: Vec<String> = results
        .iter()
        .map(|r| {
            let learn: Vec<&str> = r
                .top_skills
                .iter()
                .take(MAX_LEARN_PER_LINE)
                .map(String::as_str)
                .collect();
            format!(
                "- {}  • match {}% • learn: {}",
                r.career,
                (r.score * 100.0) as i32,
                learn.join(", ")
            )
        })
        .collect();

    Ok(format!("Top matches:\n{}", bullets.join("\n")))
}

/// Text after the last standalone "for", without surrounding spaces and `?.!`.
fn role_target(lower: &str) -> String {
    let tail = for_keyword()
        .find_iter(lower)
        .last()
        .map(|m| &lower[m.end()..])
        .unwrap_or(lower);
    tail.trim_matches(|c: char| c == ' ' || c == '?' || c == '.' || c == '!')
        .to_string()
}

fn split_skills(msg: &str) -> Vec<String> {
    skill_separator()
        .split(msg)
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
