//! Prompt templates for the three workflow steps and the renderer that fills them.
//!
//! Placeholders use `{name}` syntax and are resolved in a single scan, so text
//! inside a resume that happens to look like a placeholder is left alone.

use std::fmt;

use thiserror::Error;

use crate::workflow::state::WorkflowState;

/// Gap analysis prompt. Replace: {resume}, {jd}
pub const GAP_ANALYSIS_TEMPLATE: &str = "\
You are a Senior Recruiter. Compare the provided <resume> and <job_description>.\n\
Identify key skill gaps. Do NOT suggest new experience. Only identify what is missing.\n\
\n\
Resume: {resume}\n\
JD: {jd}";

/// Rewrite prompt. Replace: {resume}, {jd}, {critique}
///
/// The critique is the gap analysis on the first pass and the fact-check
/// verdict on every later pass.
pub const REWRITE_TEMPLATE: &str = "\
You are an expert Resume Editor. Your task is to rewrite the resume to match the JD.\n\
\n\
CRITICAL RULES:\n\
1. Only use facts present in the original <resume>.\n\
2. DO NOT invent job titles, companies, or dates.\n\
3. DO NOT fabricate metrics or achievements.\n\
4. You MAY rephrase existing bullet points to use keywords from the <job_description>.\n\
\n\
Original Resume: {resume}\n\
Job Description: {jd}\n\
Gap Analysis: {critique}\n\
\n\
Output the tailored resume in Markdown.";

/// Fact-check prompt. Replace: {resume}, {tailored}
///
/// The verdict markers here are what `verdict::should_stop` looks for.
pub const FACT_CHECK_TEMPLATE: &str = "\
Compare the <tailored_resume> with the <original_resume>.\n\
Did the assistant invent any new work experience or skills that weren't in the original?\n\
\n\
If yes, list the hallucinations and say 'NEEDS REVISION'.\n\
If no, say 'FACTUAL'.\n\
\n\
Original: {resume}\n\
Tailored: {tailored}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateId {
    GapAnalysis,
    Rewrite,
    FactCheck,
}

impl TemplateId {
    pub fn text(self) -> &'static str {
        match self {
            TemplateId::GapAnalysis => GAP_ANALYSIS_TEMPLATE,
            TemplateId::Rewrite => REWRITE_TEMPLATE,
            TemplateId::FactCheck => FACT_CHECK_TEMPLATE,
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemplateId::GapAnalysis => "gap-analysis",
            TemplateId::Rewrite => "rewrite",
            TemplateId::FactCheck => "fact-check",
        };
        f.write_str(name)
    }
}

/// A template needed a state field that no step has populated yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{template} prompt requires '{field}', which has not been set")]
pub struct MissingFieldError {
    pub template: TemplateId,
    pub field: &'static str,
}

/// Renders `template` against the current state.
pub fn render(template: TemplateId, state: &WorkflowState) -> Result<String, MissingFieldError> {
    let fields = match template {
        TemplateId::GapAnalysis => vec![
            ("resume", state.resume()),
            ("jd", state.job_description()),
        ],
        TemplateId::Rewrite => vec![
            ("resume", state.resume()),
            ("jd", state.job_description()),
            (
                "critique",
                require(template, "critique", state.critique.as_deref())?,
            ),
        ],
        TemplateId::FactCheck => vec![
            ("resume", state.resume()),
            (
                "tailored",
                require(template, "tailored_resume", state.tailored_resume.as_deref())?,
            ),
        ],
    };

    Ok(fill_template(template.text(), &fields))
}

fn require<'a>(
    template: TemplateId,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, MissingFieldError> {
    value.ok_or(MissingFieldError { template, field })
}

/// Substitutes `{name}` placeholders in one pass. Unknown placeholders are kept verbatim.
fn fill_template(template: &str, fields: &[(&str, &str)]) -> String {
    let extra: usize = fields.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            fields
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
