// Resume improvement prompt template.
// Replace: {section}, {industry}, {current}, {plain_text}

pub const IMPROVE_PROMPT_TEMPLATE: &str = r#"As an expert resume writer, improve the following {section} description for a {industry} professional.
Make it more impactful, quantifiable, and aligned with industry standards.
Current content: "{current}"

Requirements:
1. Use action verbs
2. Include metrics and results where possible
3. Highlight relevant technical skills
4. Keep it concise but detailed
5. Focus on achievements over responsibilities
6. Use industry-specific keywords

{plain_text}"#;
