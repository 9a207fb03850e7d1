// Cover letter prompt template.
// Replace: {job_title}, {company_name}, {industry}, {experience}, {skills}, {bio}, {job_description}

pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a professional cover letter for a {job_title} position at {company_name}.

About the candidate:
- Industry: {industry}
- Years of Experience: {experience}
- Skills: {skills}
- Professional Background: {bio}

Job Description:
{job_description}

Requirements:
1. Use a professional, enthusiastic tone
2. Highlight relevant skills and experience
3. Show understanding of the company's needs
4. Keep it concise (max 400 words)
5. Use proper business letter formatting in markdown
6. Include specific examples of achievements
7. Relate candidate's background to job requirements

Format the letter in markdown."#;
