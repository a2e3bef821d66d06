use async_trait::async_trait;
use edupeak_core::error::ProviderError;
use edupeak_core::responder::{ResponseRequest, Responder};
use std::time::Duration;

use crate::image::describe_image;

/// What a matching rule answers with.
#[derive(Debug, Clone, Copy)]
enum Reply {
    Canned(&'static str),
    /// Restate the previous assistant reply in short form.
    Simplify,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    keywords: &'static [&'static str],
    reply: Reply,
}

/// Checked top to bottom; the first rule with any keyword contained in the
/// lower-cased message wins.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["simpler", "simplify", "simple terms", "eli5", "don't understand", "dont understand"],
        reply: Reply::Simplify,
    },
    Rule {
        keywords: &["opportunity cost", "trade-off", "tradeoff"],
        reply: Reply::Canned(
            "Opportunity cost is the value of the next best option you give up when you make a choice. 💡 \
             If you spend ₦2,000 on snacks instead of saving it for a textbook, the textbook is your \
             opportunity cost. Every choice has one!",
        ),
    },
    Rule {
        keywords: &["budget", "saving", "save money", "money", "finance", "interest rate"],
        reply: Reply::Canned(
            "A budget is a plan for your money. Try the 50/30/20 rule: 50% for needs, 30% for wants and \
             20% for savings. 💰 Writing down small daily expenses is the easiest way to start.",
        ),
    },
    Rule {
        keywords: &["photosynthesis", "chlorophyll", "plant"],
        reply: Reply::Canned(
            "Photosynthesis is how green plants make their own food. 🌱 Chlorophyll in the leaves uses \
             sunlight to turn carbon dioxide and water into glucose and oxygen: \
             6CO₂ + 6H₂O → C₆H₁₂O₆ + 6O₂.",
        ),
    },
    Rule {
        keywords: &["nigeria", "independence"],
        reply: Reply::Canned(
            "Nigeria became independent from Britain on 1 October 1960, with Sir Abubakar Tafawa Balewa \
             as Prime Minister. 🇳🇬 It became a republic in 1963, and Nnamdi Azikiwe was its first \
             President.",
        ),
    },
    Rule {
        keywords: &["derivative", "calculus", "differentiat"],
        reply: Reply::Canned(
            "A derivative measures how fast something changes. 📈 For powers of x use the power rule: \
             d/dx(xⁿ) = n·xⁿ⁻¹, so the derivative of x³ is 3x². Share your problem and we can work \
             through it step by step!",
        ),
    },
    Rule {
        keywords: &["quiz", "exams", "exam prep", "revision", "study tips"],
        reply: Reply::Canned(
            "Great that you're preparing! 📚 Revise in short 25-minute blocks, test yourself with past \
             questions and go over your mistakes the same day. Want me to quiz you on a topic?",
        ),
    },
    Rule {
        keywords: &["thank"],
        reply: Reply::Canned("You're welcome! Keep up the great work. 🚀"),
    },
    Rule {
        keywords: &["hello", "hey there", "good morning", "good afternoon", "good evening"],
        reply: Reply::Canned(
            "Hello! I'm Cortex-AI, your personal learning assistant. What would you like to learn today?",
        ),
    },
];

pub const DEFAULT_REPLY: &str = "That's a great question! I'm in offline mode right now, so I can only go \
     in depth on a few topics: photosynthesis, opportunity cost, budgeting, calculus and Nigerian \
     history. Try asking about one of those!";

const SIMPLIFY_WITHOUT_CONTEXT: &str =
    "Happy to make it simpler! Which topic would you like me to explain in plain words?";

/// Longest excerpt of the previous reply a "simpler" answer quotes.
const SIMPLIFY_MAX_CHARS: usize = 200;

/// Builds the canned reply for `request`. Deterministic; no I/O.
pub fn mock_reply(request: &ResponseRequest) -> String {
    let text = request.text.trim();
    let answer = if text.is_empty() {
        None
    } else {
        Some(answer_text(text, request.previous_reply.as_deref()))
    };

    match (&request.image, answer) {
        (Some(image), Some(answer)) => format!("{}\n\n{answer}", describe_image(image)),
        (Some(image), None) => format!(
            "{} What would you like to know about it?",
            describe_image(image)
        ),
        (None, Some(answer)) => answer,
        (None, None) => DEFAULT_REPLY.to_string(),
    }
}

fn answer_text(text: &str, previous_reply: Option<&str>) -> String {
    let lowered = text.to_lowercase();
    let rule = RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)));

    match rule.map(|r| r.reply) {
        Some(Reply::Canned(reply)) => reply.to_string(),
        Some(Reply::Simplify) => match previous_reply.map(str::trim).filter(|p| !p.is_empty()) {
            Some(previous) => format!(
                "Sure, here's the short version: {} Would you like a real-life example?",
                first_sentence(previous)
            ),
            None => SIMPLIFY_WITHOUT_CONTEXT.to_string(),
        },
        None => DEFAULT_REPLY.to_string(),
    }
}

fn first_sentence(text: &str) -> String {
    let end = text
        .char_indices()
        .find(|(_, c)| matches!(c, '.' | '!' | '?'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(text.len());
    edupeak_core::session::truncate_with_ellipsis(&text[..end], SIMPLIFY_MAX_CHARS)
}

/// Canned replies after a fixed, purely cosmetic pause.
pub struct MockResponder {
    delay: Duration,
}

impl MockResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn respond(&self, request: &ResponseRequest) -> Result<String, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(mock_reply(request))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
