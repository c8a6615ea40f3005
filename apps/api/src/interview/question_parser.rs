//! Turns the model's free-form answer into `(index, question)` pairs.
//!
//! Stage A keeps lines that start with a number token (`1.`, `2)`, `3`).
//! If it finds fewer than `QUESTION_COUNT` entries, its result is discarded and
//! Stage B takes the first non-blank lines by position instead.
//!
//! Indices from Stage A are kept as written: duplicates or gaps in the model's
//! numbering survive parsing. The output is never re-sorted. A token is only a
//! number if it is a positive index that fits the `index_num` column, so `0.`
//! or an overflowing number does not match.

/// Size of an initial question set.
pub const QUESTION_COUNT: usize = 5;

const BULLET_CHARS: &[char] = &['-', '•', ' '];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Numbered,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuestions {
    pub stage: ParseStage,
    /// At most `QUESTION_COUNT` entries, in encounter order.
    pub items: Vec<(i32, String)>,
}

pub fn parse_questions(text: &str) -> ParsedQuestions {
    let numbered = numbered_lines(text);
    if numbered.len() >= QUESTION_COUNT {
        return ParsedQuestions {
            stage: ParseStage::Numbered,
            items: numbered.into_iter().take(QUESTION_COUNT).collect(),
        };
    }

    ParsedQuestions {
        stage: ParseStage::Fallback,
        items: positional_lines(text),
    }
}

/// Stage A.
fn numbered_lines(text: &str) -> Vec<(i32, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()))
        .filter_map(|line| {
            let (token, rest) = line.split_once(char::is_whitespace)?;
            let rest = rest.trim();
            if rest.is_empty() {
                return None;
            }
            let cleaned: String = token.chars().filter(|c| *c != '.' && *c != ')').collect();
            if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let index = cleaned.parse::<i32>().ok().filter(|i| *i > 0)?;
            Some((index, rest.to_string()))
        })
        .collect()
}

/// Stage B. Lines that are empty once bullets are stripped (`---`, `•`) are skipped.
fn positional_lines(text: &str) -> Vec<(i32, String)> {
    text.lines()
        .map(|line| line.trim().trim_start_matches(BULLET_CHARS).trim())
        .filter(|line| !line.is_empty())
        .take(QUESTION_COUNT)
        .zip(1..)
        .map(|(line, index)| (index, line.to_string()))
        .collect()
}
