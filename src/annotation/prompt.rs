//! System and user prompt construction.

use super::classifier::Classifier;
use crate::completion::ChatMessage;

/// System template for fixed-label annotators.
pub const SYSTEM_TEMPLATE_MULTILABEL: &str = r#"You are a specialized text classification assistant. Your task is to analyze text content and assign relevant tags from a predefined label set.

<rules>
1. You MUST select tags ONLY from the provided available labels
2. Select 1-5 most relevant tags based on the content
3. Return response in strict JSON format: {"tags": ["label1", "label2"]}
4. Do NOT add any explanation, markdown formatting, or additional text
5. If no labels are relevant, return {"tags": []}
</rules>

<available_labels>
{labels}
</available_labels>

<examples>
Example 1:
Available labels: ["US Stock", "Taiwan Stock", "Accounting", "Technical Analysis", "Fundamental Analysis", "Cryptocurrency"]
Context: "Tesla Q3 earnings beat EPS expectations, technical chart breaks through 120 support level"
Response: {"tags": ["US Stock", "Accounting", "Technical Analysis"]}

Example 2:
Available labels: "US Stock", "Taiwan Stock", "Accounting", "Technical Analysis", "Fundamental Analysis", "Cryptocurrency"
Context: "Is TSMC's P/E ratio of 15 cheap? Looking at the balance sheet..."
Response: {"tags": ["Taiwan Stock", "Accounting", "Fundamental Analysis"]}

Example 3:
Available labels: "US Stock", "Taiwan Stock", "Accounting", "Technical Analysis", "Fundamental Analysis", "Cryptocurrency"
Context: "Bitcoin breaks through $60,000, crypto market warming up"
Response: {"tags": ["Cryptocurrency"]}
</examples>

<user_instruction>
{instruction}
</user_instruction>"#;

/// System template for zero-shot annotators.
pub const SYSTEM_TEMPLATE_ZEROSHOT: &str = r#"You are a specialized text classification assistant with zero-shot capability. Your task is to analyze text content and assign relevant tags, preferring suggested labels but allowing creation of new ones when necessary.

<rules>
1. PREFER selecting tags from the provided suggested labels
2. If suggested labels are insufficient, you MAY create new relevant tags (max {max_new_labels} new tags)
3. Select 1-5 most relevant tags total based on the content
4. Return response in strict JSON format: {"tags": ["label1", "label2", "new_label1"]}
5. Do NOT add any explanation, markdown formatting, or additional text
6. If no labels are relevant, return {"tags": []}
</rules>

<suggested_labels>
{labels}
</suggested_labels>

<examples>
Example 1:
Suggested labels: ["US Stock", "Taiwan Stock", "Accounting", "Technical Analysis"]
Context: "Tesla Q3 earnings beat EPS expectations, technical chart breaks through 120 support level"
Response: {"tags": ["US Stock", "Accounting", "Technical Analysis"]}

Example 2:
Suggested labels: "US Stock", "Taiwan Stock", "Accounting", "Technical Analysis"
Context: "Fed rate hike impacts bond market, investors turn to gold for safe haven"
Response: {"tags": ["US Stock", "Bonds", "Gold", "Safe Haven"]}

Example 3:
Suggested labels: "US Stock", "Taiwan Stock", "Accounting", "Technical Analysis"
Context: "Bitcoin breaks through $60,000, crypto market warming up"
Response: {"tags": ["Cryptocurrency", "Bitcoin"]}
</examples>

<user_instruction>
{instruction}
</user_instruction>"#;

/// User template shared by both modes.
pub const USER_TEMPLATE: &str = "<context>\n{context}\n</context>\n\nAnalyze the above context and return relevant tags in JSON format.";

/// A rendered system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn into_messages(self) -> Vec<ChatMessage> {
        vec![ChatMessage::system(self.system), ChatMessage::user(self.user)]
    }
}

/// Renders the label list as `"a", "b", "c"`.
pub fn format_labels(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| format!("\"{}\"", label))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Substitutes `{key}` placeholders in a single pass.
///
/// Braces that do not enclose a known key are copied through, and substituted
/// values are never scanned again, so user text containing `{labels}` stays
/// literal.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replacement = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });

        match replacement {
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

/// Builds the prompt for one annotation call. Performs no I/O.
pub fn build_prompt(classifier: &Classifier, instruction: &str, context: &str) -> Prompt {
    let labels = format_labels(classifier.labels());

    let system = match classifier {
        Classifier::FixedLabel { .. } => render(
            SYSTEM_TEMPLATE_MULTILABEL,
            &[("labels", &labels), ("instruction", instruction)],
        ),
        Classifier::ZeroShot { max_new_labels, .. } => render(
            SYSTEM_TEMPLATE_ZEROSHOT,
            &[
                ("labels", &labels),
                ("instruction", instruction),
                ("max_new_labels", &max_new_labels.to_string()),
            ],
        ),
    };

    Prompt {
        system,
        user: render(USER_TEMPLATE, &[("context", context)]),
    }
}
