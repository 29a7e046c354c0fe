//! Prompt templates for ranking, debate, and synthesis calls

/// Templates for every judge, debate, and summarizer prompt the strategies
/// issue. All builders are pure string functions; anything identity-sensitive
/// (anonymous labels vs. real ids) is decided by which arguments the caller
/// passes in.
pub struct PromptTemplate;

impl PromptTemplate {
    /// Majority-voting judge prompt: score every candidate's alignment with
    /// the overall position, JSON only.
    pub fn alignment_ranking(prompt: &str, candidates: &[(String, String)]) -> String {
        let mut text = format!(
            r#"You are evaluating {} candidate answers to the same question.

Original question: {}

Candidate answers:
"#,
            candidates.len(),
            prompt
        );

        for (model_id, content) in candidates {
            text.push_str(&format!("\n--- {} ---\n{}\n", model_id, content));
        }

        text.push_str(
            r#"
Score each candidate from 0 to 100 by how well it aligns with the position most candidates share and how well it answers the question. Higher scores mean stronger alignment.

Respond with JSON only, in exactly this shape:
{"rankings": [{"modelId": "<id>", "alignmentScore": <0-100>}, ...]}

Include every candidate exactly once. Do not add any text outside the JSON."#,
        );

        text
    }

    /// Synthesis prompt for majority voting, anchored on the top-ranked
    /// model's position.
    pub fn majority_synthesis(
        prompt: &str,
        anchor_id: &str,
        candidates: &[(String, String)],
    ) -> String {
        let mut text = format!(
            r#"You are synthesizing a consensus answer from the top-ranked candidate answers to a question.

Original question: {}

The majority position is the one held by {}. Candidate answers, highest-ranked first:
"#,
            prompt, anchor_id
        );

        for (model_id, content) in candidates {
            text.push_str(&format!("\n--- {} ---\n{}\n", model_id, content));
        }

        text.push_str(
            r#"
Write one final consensus answer:
1. Anchor on the majority position
2. Prefer details that several candidates repeat over claims made by only one
3. Do not mention models, rankings, or voting anywhere in the text
4. Output only the final answer"#,
        );

        text
    }

    /// Pairwise tournament judge prompt. Takes answer texts only; the two
    /// candidates appear solely as "Model A" and "Model B".
    pub fn pairwise_judgment(prompt: &str, answer_a: &str, answer_b: &str) -> String {
        format!(
            r#"You are judging which of two anonymous answers better addresses a question.

Question: {}

Model A's answer:
{}

Model B's answer:
{}

Compare the answers for factual correctness, completeness, and how directly they address the question. Reason through the comparison briefly, then give your verdict on the final line in exactly one of these forms:

WINNER: A
WINNER: B
WINNER: TIE"#,
            prompt, answer_a, answer_b
        )
    }

    /// Synthesis prompt over anonymous numbered candidates, used by the Elo
    /// and council strategies.
    pub fn anonymous_synthesis(prompt: &str, candidates: &[String]) -> String {
        let mut text = format!(
            r#"You are writing the final answer to a question, drawing on several unattributed candidate answers.

Question: {}
"#,
            prompt
        );

        for (i, content) in candidates.iter().enumerate() {
            text.push_str(&format!("\nCandidate {}:\n{}\n", i + 1, content));
        }

        text.push_str(
            r#"
Write a single consolidated answer:
1. Resolve disagreements by factual correctness, not by how many candidates repeat a claim
2. If the question requires a specific output format, follow that format exactly
3. Output only the final answer text, with no meta-commentary and no mention of candidates"#,
        );

        text
    }

    /// Critique prompt: one participant reviews another's initial answer.
    pub fn critique(prompt: &str, target_id: &str, target_answer: &str) -> String {
        format!(
            r#"You are a participant in a structured debate about the best answer to a question.

Question: {}

{} proposed this answer:
{}

Write a focused critique of this answer. Identify factual errors, unsupported claims, and missing considerations. If the answer is sound, say so and explain why its reasoning holds. Be specific and concise."#,
            prompt, target_id, target_answer
        )
    }

    /// Rebuttal prompt: a participant answers the critiques gathered against
    /// its own branch.
    pub fn rebuttal(prompt: &str, own_answer: &str, critiques: &[(String, String)]) -> String {
        let mut text = format!(
            r#"You are a debate participant defending your answer to a question.

Question: {}

Your answer:
{}
"#,
            prompt, own_answer
        );

        if critiques.is_empty() {
            text.push_str("\nNo critiques were raised against your answer.\n");
        } else {
            text.push_str("\nCritiques received:\n");
            for (critic_id, content) in critiques {
                text.push_str(&format!("\n--- critique from {} ---\n{}\n", critic_id, content));
            }
        }

        text.push_str(
            r#"
Write a rebuttal. Defend the parts of your answer that are correct, and concede any point where a critique identified a real error. If conceding changes your answer, state the corrected answer clearly. If there were no critiques, restate your answer in its strongest form."#,
        );

        text
    }

    /// Validity judgment prompt: a peer decides whether a debated answer
    /// survived the exchange. Output contract is strict JSON.
    pub fn validity_judgment(
        prompt: &str,
        target_id: &str,
        initial_answer: &str,
        critiques: &[(String, String)],
        rebuttal: Option<&str>,
    ) -> String {
        let mut text = format!(
            r#"You are judging whether a debated answer remains logically sound after critique and rebuttal.

Question: {}

{}'s answer:
{}
"#,
            prompt, target_id, initial_answer
        );

        if !critiques.is_empty() {
            text.push_str("\nCritiques:\n");
            for (critic_id, content) in critiques {
                text.push_str(&format!("\n--- critique from {} ---\n{}\n", critic_id, content));
            }
        }

        match rebuttal {
            Some(rebuttal) => {
                text.push_str(&format!("\nRebuttal:\n{}\n", rebuttal));
            }
            None => {
                text.push_str("\nNo rebuttal was offered.\n");
            }
        }

        text.push_str(
            r#"
Taking the whole exchange into account, decide whether this is still a valid answer to the question.

Respond with JSON only, in exactly this shape:
{"isValid": <true or false>, "reasoning": "<one or two sentences>"}

Do not add any text outside the JSON."#,
        );

        text
    }
}
