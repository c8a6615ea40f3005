/// Prompt for the initial question set. The résumé travels as an attached document block.
pub const QUESTION_SET_PROMPT_TEMPLATE: &str = r#"You are interviewing a candidate for the {role} position at {company}.
Using the attached résumé and what you know about {company}, write exactly five interview questions
appropriate to this company and role.

Number the questions 1 through 5, one question per line, in the form:
1. <question>
2. <question>
3. <question>
4. <question>
5. <question>

{plain_text_instruction}"#;

/// Prompt for a single follow-up question.
pub const FOLLOWUP_PROMPT_TEMPLATE: &str = r#"Below is the previous interview question and the candidate's answer.
Based on this answer, write exactly one follow-up question.
Return only the question itself.

Previous question: {previous_question}
Candidate's answer: {answer_text}

{plain_text_instruction}

Follow-up question:"#;
