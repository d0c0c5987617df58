use std::fmt;

use ns_core::{GenerationParams, Result, SummarizationModel};

/// Label reported for summaries produced by the lead extractor.
pub const LEAD_LABEL: &str = "lead";

const TERMINATORS: [char; 4] = ['.', '!', '?', '…'];
const CLOSERS: [char; 4] = ['"', '»', ')', '\''];

/// Extractive summarizer that keeps the leading sentences of the text.
///
/// News is written lead-first, so the opening sentences that fit the word
/// budget make a reasonable offline stand-in for the neural model. Output is
/// always a prefix of the input and fully deterministic.
pub struct LeadModel {
    label: String,
}

impl fmt::Debug for LeadModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeadModel").field("label", &self.label).finish()
    }
}

impl LeadModel {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

/// Byte offsets just past each sentence, including trailing punctuation runs.
fn sentence_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !TERMINATORS.contains(&c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if TERMINATORS.contains(&next) || CLOSERS.contains(&next) {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        ends.push(end);
    }
    if ends.last().copied().unwrap_or(0) < text.trim_end().len() {
        ends.push(text.len());
    }
    ends
}

#[async_trait::async_trait]
impl SummarizationModel for LeadModel {
    fn name(&self) -> &str {
        &self.label
    }

    fn is_reentrant(&self) -> bool {
        true
    }

    async fn summarize(&self, text: &str, params: &GenerationParams) -> Result<String> {
        let budget = params.max_length.max(1);
        let mut words = 0;
        let mut cut = None;
        let mut start = 0;

        for end in sentence_ends(text) {
            let count = text[start..end].split_whitespace().count();
            if words + count > budget {
                if cut.is_none() {
                    // Opening sentence alone is over budget
                    let head: Vec<&str> = text[..end].split_whitespace().take(budget).collect();
                    return Ok(head.join(" "));
                }
                break;
            }
            words += count;
            cut = Some(end);
            start = end;
        }

        let summary = match cut {
            Some(end) => text[..end].trim(),
            None => text.trim(),
        };
        tracing::debug!("Lead summary keeps {} words", words);
        Ok(summary.to_string())
    }
}
