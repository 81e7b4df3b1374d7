use maavara_core::prompt::{render_prompt, ExplainRequest, ExplanationKind, Label};

use crate::anthropic::{Anthropic, SYSTEM_PROMPT};
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Parser)]
pub struct ExplainOptions {
    /// Explanation type: explain_pasuk, review_aliyah, whats_the_question,
    /// explain_simply, deeper or weekly_summary.
    #[clap(value_name = "TYPE")]
    pub kind: ExplanationKind,

    /// Parasha name, e.g. "Noach".
    #[clap(long)]
    pub parasha: Option<String>,

    /// Aliyah label within the parasha.
    #[clap(long)]
    pub aliyah: Option<String>,

    /// Hebrew text of the pasuk.
    #[clap(long)]
    pub pasuk_he: Option<String>,

    /// English text of the pasuk (or the full aliyah for review_aliyah).
    #[clap(long)]
    pub pasuk_en: Option<String>,

    /// Hebrew text of the Rashi.
    #[clap(long)]
    pub rashi_he: Option<String>,

    /// English text of the Rashi.
    #[clap(long)]
    pub rashi_en: Option<String>,

    /// Override the default instruction clause for this type.
    #[clap(long)]
    pub instruction: Option<String>,

    /// Model identifier for the completion service.
    #[clap(long, env = "MAAVARA_MODEL", default_value = "claude-sonnet-4-5-20250514")]
    pub model: String,

    /// Completion-service credential.
    #[clap(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

pub async fn run(options: ExplainOptions, global: crate::Global) -> Result<()> {
    let request = ExplainRequest {
        kind: options.kind,
        parasha: options.parasha,
        aliyah: options.aliyah.map(Label::Text),
        pasuk_he: options.pasuk_he,
        pasuk_en: options.pasuk_en,
        rashi_he: options.rashi_he,
        rashi_en: options.rashi_en,
        instruction: options.instruction,
    };

    let prompt = render_prompt(&request);

    if global.verbose {
        eprintln!("Model: {}", options.model);
        eprintln!("Token budget: {}", prompt.max_tokens);
        eprintln!("Prompt length: {} chars", prompt.user_text.len());
    }

    let client = Anthropic::new(options.api_key, options.model)?;
    let text = client
        .complete(SYSTEM_PROMPT, &prompt.user_text, prompt.max_tokens)
        .await?;

    println!("{}", text);

    Ok(())
}
