//! Tutorly Prompts - Tutoring prompt templates
//!
//! Builders that turn a student's answer into a [`Prompt`] for the LLM layer:
//! - Grammar checker example
//! - IELTS grammar and sentence structure tutor
//! - TOEFL tutor for structure, listening and reading tasks

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tutorly_llm::Prompt;

/// Prompt template errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Unknown TOEFL task name
    #[error("unknown TOEFL task '{0}' (expected structure, listening or reading)")]
    UnknownTask(String),

    /// Unknown proficiency level
    #[error("unknown level '{0}' (expected beginner, intermediate or advance)")]
    UnknownLevel(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

const GRAMMAR_CHECKER_INSTRUCTIONS: &str = "You are a grammar checker. Fix errors related to \
verb tense, article usage, and pluralization. Also explain each correction in simple terms.";

const GRAMMAR_CHECKER_SAMPLE: &str = "The people is goes to market to buys vegetable.";

const IELTS_INSTRUCTIONS: &str = "You are an experienced IELTS tutor who specializes in \
grammar and sentence structure. Evaluate the student's answer for grammatical accuracy, \
sentence structure, punctuation, and clarity. For each sentence, identify and explain any \
grammar or structural issues and suggest a corrected version. Then give brief overall feedback \
and a personalized recommendation for improving their grammar skills. Be constructive, clear, \
and encouraging.";

/// Grammar checker prompt for `text`, or the built-in sample sentence
#[must_use]
pub fn grammar_checker_prompt(text: Option<&str>) -> Prompt {
    Prompt::new(text.unwrap_or(GRAMMAR_CHECKER_SAMPLE))
        .with_instructions(GRAMMAR_CHECKER_INSTRUCTIONS)
}

/// IELTS tutor feedback on a student's answer
#[must_use]
pub fn ielts_tutor_prompt(student_answer: &str) -> Prompt {
    Prompt::new(format!("Student's answer: {student_answer}"))
        .with_instructions(IELTS_INSTRUCTIONS)
}

/// TOEFL section the answer belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToeflTask {
    /// Structure and written expression
    #[default]
    Structure,
    /// Listening comprehension
    Listening,
    /// Reading comprehension
    Reading,
}

impl ToeflTask {
    /// Lowercase identifier
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ToeflTask::Structure => "structure",
            ToeflTask::Listening => "listening",
            ToeflTask::Reading => "reading",
        }
    }
}

impl fmt::Display for ToeflTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToeflTask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "structure" => Ok(ToeflTask::Structure),
            "listening" => Ok(ToeflTask::Listening),
            "reading" => Ok(ToeflTask::Reading),
            _ => Err(Error::UnknownTask(s.to_string())),
        }
    }
}

/// Learner proficiency level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// New learners
    #[default]
    Beginner,
    /// Intermediate learners
    Intermediate,
    /// Advanced learners
    Advance,
}

impl Level {
    /// Lowercase identifier
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advance => "advance",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            // "advanced" is the spelling most users type
            "advance" | "advanced" => Ok(Level::Advance),
            _ => Err(Error::UnknownLevel(s.to_string())),
        }
    }
}

struct ToeflTemplate {
    role: &'static str,
    guidelines: &'static [&'static str],
    request: &'static str,
    checklist: &'static [&'static str],
    closing: &'static str,
}

const STRUCTURE: ToeflTemplate = ToeflTemplate {
    role: "structure and written expression tutor. Analyze the user's answer and give \
           comprehensive feedback",
    guidelines: &[
        "Analyze grammatical accuracy, sentence structure, and written expression",
        "Identify the specific grammar rules violated or correctly applied",
        "Explain complex grammar concepts with simple analogies",
        "Give constructive feedback with improvement suggestions",
        "Include relevant examples to illustrate points",
    ],
    request: "Please analyze this TOEFL structure/written expression answer:",
    checklist: &[
        "Correctness assessment",
        "Grammar/structure analysis",
        "Specific areas for improvement",
        "Examples of correct usage",
        "Tips for similar questions",
    ],
    closing: "Tailor the complexity of your explanation to the",
};

const LISTENING: ToeflTemplate = ToeflTemplate {
    role: "listening comprehension tutor. Evaluate the user's listening comprehension \
           response and give targeted feedback",
    guidelines: &[
        "Assess comprehension accuracy and completeness",
        "Identify listening strategies that worked or need improvement",
        "Focus on key skills: main ideas, details, inference, speaker's attitude",
        "Give tips for better note-taking and listening techniques",
        "Explain listening strategies with analogies, like tuning a radio",
    ],
    request: "Please evaluate this TOEFL listening comprehension response:",
    checklist: &[
        "Comprehension accuracy",
        "Key information captured or missed",
        "Listening strategies analysis",
        "Note-taking effectiveness (if applicable)",
        "Specific improvement recommendations",
        "Practice suggestions for similar listening tasks",
    ],
    closing: "Adapt your feedback to the",
};

const READING: ToeflTemplate = ToeflTemplate {
    role: "reading comprehension tutor. Analyze the user's reading response and give \
           detailed feedback",
    guidelines: &[
        "Evaluate reading comprehension accuracy and depth",
        "Assess understanding of main ideas, supporting details, and inferences",
        "Identify reading strategies used effectively or needing improvement",
        "Focus on vocabulary in context, passage organization, and author's purpose",
        "Explain reading strategies with analogies, like detective work or puzzle solving",
    ],
    request: "Please analyze this TOEFL reading comprehension response:",
    checklist: &[
        "Answer accuracy and completeness",
        "Reading comprehension analysis",
        "Vocabulary and context understanding",
        "Reading strategy effectiveness",
        "Areas needing improvement",
        "Specific practice recommendations",
        "Tips for similar reading passages",
    ],
    closing: "Match the complexity of your feedback to the",
};

/// TOEFL tutor feedback comparing a user's answer with the correct one
#[must_use]
pub fn toefl_tutor_prompt(
    user_answer: &str,
    correct_answer: &str,
    task: ToeflTask,
    level: Level,
) -> Prompt {
    let template = match task {
        ToeflTask::Structure => &STRUCTURE,
        ToeflTask::Listening => &LISTENING,
        ToeflTask::Reading => &READING,
    };
    let ToeflTemplate {
        role,
        guidelines,
        request,
        checklist,
        closing,
    } = *template;

    let mut instructions = format!(
        "You are an expert TOEFL {role} suited to a {level} level learner.\n\nGuidelines:\n"
    );
    for line in guidelines {
        instructions.push_str("- ");
        instructions.push_str(line);
        instructions.push('\n');
    }
    instructions.push_str(&format!("- Adjust complexity for {level} learners\n"));

    let mut body = format!(
        "{request}\n\nCorrect answer: {correct_answer}\nUser's Answer: {user_answer}\n\
         User Level: {level}\n\nProvide feedback covering:\n"
    );
    for (i, item) in checklist.iter().enumerate() {
        body.push_str(&format!("{}. {item}\n", i + 1));
    }
    body.push_str(&format!("\n{closing} {level} level."));

    Prompt::new(body).with_instructions(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_checker_sample() {
        let prompt = grammar_checker_prompt(None);
        assert_eq!(prompt.body(), GRAMMAR_CHECKER_SAMPLE);
        assert!(prompt.instructions().unwrap().contains("grammar checker"));

        let prompt = grammar_checker_prompt(Some("She go home."));
        assert_eq!(prompt.body(), "She go home.");
    }

    #[test]
    fn test_ielts_prompt_embeds_answer() {
        let prompt = ielts_tutor_prompt("I has went to London last year.");
        assert_eq!(
            prompt.body(),
            "Student's answer: I has went to London last year."
        );
        assert!(prompt.instructions().unwrap().contains("IELTS tutor"));
    }

    #[test]
    fn test_toefl_prompt_per_task() {
        let structure = toefl_tutor_prompt("went", "gone", ToeflTask::Structure, Level::Beginner);
        assert!(structure.instructions().unwrap().contains("structure and written expression"));
        assert!(structure.body().contains("Correct answer: gone"));
        assert!(structure.body().contains("User's Answer: went"));
        assert!(structure.body().contains("5. Tips for similar questions"));
        assert!(structure.body().ends_with("beginner level."));

        let listening = toefl_tutor_prompt("a", "b", ToeflTask::Listening, Level::Intermediate);
        assert!(listening.instructions().unwrap().contains("listening comprehension"));
        assert!(listening.body().contains("6. Practice suggestions"));
        assert!(listening.body().contains("User Level: intermediate"));

        let reading = toefl_tutor_prompt("a", "b", ToeflTask::Reading, Level::Advance);
        assert!(reading.instructions().unwrap().contains("advance level learner"));
        assert!(reading.body().contains("7. Tips for similar reading passages"));
    }

    #[test]
    fn test_task_and_level_parsing() {
        assert_eq!("Reading".parse::<ToeflTask>(), Ok(ToeflTask::Reading));
        assert_eq!("advanced".parse::<Level>(), Ok(Level::Advance));
        assert_eq!(
            "speaking".parse::<ToeflTask>(),
            Err(Error::UnknownTask("speaking".to_string()))
        );
        assert!("expert".parse::<Level>().is_err());
        assert_eq!(ToeflTask::default(), ToeflTask::Structure);
        assert_eq!(Level::default(), Level::Beginner);
    }
}
