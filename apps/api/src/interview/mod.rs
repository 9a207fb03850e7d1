// Interview preparation: generated multiple-choice quizzes and graded assessments.

pub mod handlers;
pub mod prompts;
pub mod quiz;
