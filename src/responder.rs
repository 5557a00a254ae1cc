//! Canned study-coach replies chosen by keyword.

/// What a message is about. Variants are listed in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Study,
    Time,
    Task,
    Stress,
    Exam,
    Motivation,
    General,
}

const RULES: &[(Topic, &[&str])] = &[
    (Topic::Study, &["study", "learn"]),
    (Topic::Time, &["time", "schedule"]),
    (Topic::Task, &["task", "todo"]),
    (Topic::Stress, &["stress", "anxious"]),
    (Topic::Exam, &["exam", "test"]),
    (Topic::Motivation, &["motivation", "procrastination"]),
];

impl Topic {
    /// First rule with a keyword contained in the lower-cased message wins.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(topic, _)| *topic)
            .unwrap_or(Self::General)
    }

    pub fn reply(&self) -> &'static str {
        match self {
            Self::Study => "Try the Pomodoro technique: 25 minutes focused study, 5-minute break. Repeat 4 times, then take a longer break.",
            Self::Time => "Plan your day in time blocks. Allocate specific hours for studying, breaks, and personal activities.",
            Self::Task => "Prioritize tasks using the Eisenhower Matrix: urgent/important, important/not urgent, urgent/not important, neither.",
            Self::Stress => "Take regular breaks, practice deep breathing, and ensure you're getting enough sleep and exercise.",
            Self::Exam => "Create a study schedule starting 2-3 weeks before exams. Review material regularly rather than cramming.",
            Self::Motivation => "Set small, achievable goals and reward yourself when you complete them. Track your progress visually.",
            Self::General => "I recommend breaking your work into manageable chunks and taking regular breaks. Would you like specific tips for time management, study techniques, or stress reduction?",
        }
    }
}

pub fn respond(message: &str) -> &'static str {
    Topic::classify(message).reply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_message() {
        assert_eq!(Topic::classify("I have an exam next week"), Topic::Exam);
        assert_eq!(respond("I have an exam next week"), Topic::Exam.reply());
    }

    #[test]
    fn no_keyword_falls_back() {
        assert_eq!(Topic::classify("hello there"), Topic::General);
        assert_eq!(respond(""), Topic::General.reply());
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(Topic::classify("STRESSED OUT"), Topic::Stress);
    }

    #[test]
    fn earlier_groups_win() {
        // "study" outranks "exam"
        assert_eq!(Topic::classify("how should I study for my exam"), Topic::Study);
        // "schedule" outranks "task"
        assert_eq!(Topic::classify("schedule my tasks"), Topic::Time);
        // "todo" outranks "anxious"
        assert_eq!(Topic::classify("anxious about my todo list"), Topic::Task);
    }

    #[test]
    fn substring_matches_count() {
        // "latest" contains "test"
        assert_eq!(Topic::classify("what's the latest?"), Topic::Exam);
        assert_eq!(Topic::classify("fighting procrastination"), Topic::Motivation);
    }
}
