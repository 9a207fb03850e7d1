// Interview prompt templates.

/// Replace: {industry}, {skills_clause}, {question_count}, {json_only}
pub const QUIZ_PROMPT_TEMPLATE: &str = r#"Generate {question_count} technical interview questions for a {industry} professional{skills_clause}.

Each question should be multiple choice with 4 options.

Return the response in this JSON format only, no additional text:
{
  "questions": [
    {
      "question": "string",
      "options": ["string", "string", "string", "string"],
      "correctAnswer": "string",
      "explanation": "string"
    }
  ]
}

{json_only}"#;

/// Replace: {industry}, {wrong_answers}
pub const IMPROVEMENT_TIP_PROMPT_TEMPLATE: &str = r#"The user got the following {industry} technical interview questions wrong:

{wrong_answers}

Based on these mistakes, provide a concise, specific improvement tip.
Focus on the knowledge gaps revealed by these wrong answers.
Keep the response under 2 sentences and make it encouraging.
Don't explicitly mention the mistakes, instead focus on what to learn/practice."#;
