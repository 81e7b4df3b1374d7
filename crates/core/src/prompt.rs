use serde::Deserialize;

use crate::clean::clean;

/// The kind of explanation the student asked for.
///
/// Unrecognized wire values deserialize to [`ExplanationKind::Unknown`]
/// instead of failing; the HTTP boundary decides how to treat those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationKind {
    ExplainPasuk,
    ReviewAliyah,
    WhatsTheQuestion,
    ExplainSimply,
    Deeper,
    WeeklySummary,
    #[serde(other)]
    #[default]
    Unknown,
}

impl ExplanationKind {
    /// Output-token budget for this kind of explanation.
    pub fn max_tokens(self) -> u32 {
        match self {
            ExplanationKind::ExplainPasuk => 200,
            ExplanationKind::ReviewAliyah => 350,
            ExplanationKind::WhatsTheQuestion => 250,
            ExplanationKind::ExplainSimply => 200,
            ExplanationKind::Deeper => 400,
            ExplanationKind::WeeklySummary => 200,
            ExplanationKind::Unknown => 0,
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error("unknown explanation type: {0}")]
pub struct UnknownKind(String);

impl std::str::FromStr for ExplanationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explain_pasuk" => Ok(ExplanationKind::ExplainPasuk),
            "review_aliyah" => Ok(ExplanationKind::ReviewAliyah),
            "whats_the_question" => Ok(ExplanationKind::WhatsTheQuestion),
            "explain_simply" => Ok(ExplanationKind::ExplainSimply),
            "deeper" => Ok(ExplanationKind::Deeper),
            "weekly_summary" => Ok(ExplanationKind::WeeklySummary),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Aliyah label as it arrives on the wire, either a name or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Number(i64),
}

impl Label {
    fn rendered(&self) -> String {
        match self {
            Label::Text(text) => clean(text),
            Label::Number(number) => number.to_string(),
        }
    }
}

/// One explanation request as posted by the study client.
///
/// Every field other than `type` is optional; missing fields render as
/// empty segments rather than failing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExplainRequest {
    #[serde(rename = "type")]
    pub kind: ExplanationKind,
    pub rashi_he: Option<String>,
    pub rashi_en: Option<String>,
    pub pasuk_he: Option<String>,
    pub pasuk_en: Option<String>,
    pub parasha: Option<String>,
    pub aliyah: Option<Label>,
    pub instruction: Option<String>,
}

/// A user message ready to send to the completion service, with its
/// per-kind output-token budget. The system instruction is deployment
/// configuration and lives with the adapter, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub user_text: String,
    pub max_tokens: u32,
}

/// Render the user message for a request.
///
/// All free-text fields are sanitized before they are embedded. The
/// caller-supplied `instruction` overrides the default clause for the
/// kinds that accept one. An unknown kind renders an empty message.
pub fn render_prompt(request: &ExplainRequest) -> RenderedPrompt {
    let parasha = cleaned(&request.parasha);
    let aliyah = request
        .aliyah
        .as_ref()
        .map(Label::rendered)
        .unwrap_or_default();
    let pasuk_he = cleaned(&request.pasuk_he);
    let pasuk_en = cleaned(&request.pasuk_en);
    let rashi_he = cleaned(&request.rashi_he);
    let rashi_en = cleaned(&request.rashi_en);
    let instruction = request
        .instruction
        .as_deref()
        .map(clean)
        .filter(|text| !text.is_empty());

    let user_text = match request.kind {
        ExplanationKind::ExplainPasuk => format!(
            "Parashat {parasha}, Aliyah {aliyah}.\n\n\
             Pasuk (Hebrew): {pasuk_he}\n\
             Pasuk (English): {pasuk_en}\n\n{}",
            instruction
                .unwrap_or_else(|| "Explain this pasuk simply in 2-3 sentences.".to_string()),
        ),
        ExplanationKind::ReviewAliyah => format!(
            "Parashat {parasha}, Aliyah {aliyah}.\n\n\
             Full text: {pasuk_en}\n\n{}",
            instruction
                .unwrap_or_else(|| "Summarize this aliyah in 4-6 sentences.".to_string()),
        ),
        ExplanationKind::WhatsTheQuestion => format!(
            "The student is learning Parashat {parasha}, Aliyah {aliyah}.\n\n\
             Pasuk (Hebrew): {pasuk_he}\n\
             Pasuk (English): {pasuk_en}\n\n\
             Rashi (Hebrew): {rashi_he}\n\
             Rashi (English): {}\n\n\
             Explain: What bothered Rashi in this pasuk? What's his question, \
             and what's his answer? Keep it simple and clear — this is for a beginner.",
            or_no_translation(&rashi_en),
        ),
        ExplanationKind::ExplainSimply => format!(
            "The student is learning Parashat {parasha}, Aliyah {aliyah}.\n\n\
             Rashi (Hebrew): {rashi_he}\n\
             Rashi (English): {}\n\n\
             On this pasuk:\n\
             Hebrew: {pasuk_he}\n\
             English: {pasuk_en}\n\n\
             Give a simple, clear explanation of what Rashi is saying here. \
             Assume the student is a beginner.",
            or_no_translation(&rashi_en),
        ),
        ExplanationKind::Deeper => format!(
            "The student wants to go deeper on this Rashi from Parashat {parasha}, \
             Aliyah {aliyah}.\n\n\
             Pasuk: {pasuk_he} — {pasuk_en}\n\
             Rashi: {rashi_he} — {rashi_en}\n\n\
             Give a more in-depth explanation. What's the underlying Torah principle? \
             Are there other opinions? How does this connect to the broader sugya or \
             halachic implications? Still keep it accessible for a motivated beginner.",
        ),
        ExplanationKind::WeeklySummary => format!(
            "The student just finished (or is finishing) Parashat {parasha} for their \
             weekly Maavara Sedra.\n\n\
             Give a brief, encouraging 2-3 sentence summary of the key themes of this \
             parasha and one interesting Rashi to look out for. Be warm and motivating.",
        ),
        ExplanationKind::Unknown => String::new(),
    };

    RenderedPrompt {
        user_text,
        max_tokens: request.kind.max_tokens(),
    }
}

fn cleaned(field: &Option<String>) -> String {
    field.as_deref().map(clean).unwrap_or_default()
}

fn or_no_translation(rashi_en: &str) -> &str {
    if rashi_en.is_empty() {
        "No English translation available"
    } else {
        rashi_en
    }
}
