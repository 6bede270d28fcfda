// All LLM prompt constants for the InternSpark flows.
// One system prompt and one template per flow. Placeholders are `{name}`;
// `{resume}` is bound to either pasted text or an attached document.

/// System prompt for resume review.
pub const RESUME_REVIEW_SYSTEM: &str = "You are a resume mentor for college students \
    applying to internships. Read the resume carefully and be concrete: name the \
    sections, skills and projects you are referring to. \
    Respond only through the provided tool.";

/// Resume review template. Slots: {resume}
pub const RESUME_REVIEW_TEMPLATE: &str = r#"Review the student's resume below.

Resume:
{resume}

Return:
1. summary: the student's skills, education and key projects.
2. suggestions: what to improve, covering weak areas, missing sections and formatting."#;

/// System prompt for cover letter generation.
pub const COVER_LETTER_SYSTEM: &str = "You are a career writer who drafts concise, \
    professional internship cover letters for students. Use only facts present in \
    the resume. Do not invent employers, grades or achievements. \
    Respond only through the provided tool.";

/// Cover letter template. Slots: {roleTitle}, {companyName}, {resume}
pub const COVER_LETTER_TEMPLATE: &str = r#"Write an internship-level cover letter for a student applying to the {roleTitle} role at {companyName}.
Tailor it to the resume below.

Resume:
{resume}

Return the full letter in coverLetter, ready to send."#;

/// System prompt for job description simplification.
pub const JD_SIMPLIFIER_SYSTEM: &str = "You are a career counselor who helps college \
    students understand job descriptions. Replace jargon with plain language. \
    Respond only through the provided tool.";

/// Job description simplifier template. Slots: {jobDescription}
pub const JD_SIMPLIFIER_TEMPLATE: &str = r#"Simplify the job description below for a student.

Job description:
{jobDescription}

Return:
- summary: what the job is, in a few sentences.
- requiredSkills: the key skills the role needs.
- preparationTips: how a student can prepare before applying."#;

/// System prompt for mock HR question generation.
pub const MOCK_HR_SYSTEM: &str = "You are an HR interviewer who specializes in \
    internship hiring. Your questions suit a college student with limited work \
    experience. Respond only through the provided tool.";

/// Mock HR questions template. Slots: {internshipRole}
pub const MOCK_HR_TEMPLATE: &str = r#"Generate exactly 5 HR interview questions for a student applying for the role: {internshipRole}.
Number each question.

Example output:
{
  "questions": [
    "1. Tell me about yourself.",
    "2. Why are you interested in this internship?",
    "3. What are your strengths and weaknesses?",
    "4. Describe a time you had to overcome a challenge.",
    "5. Where do you see yourself in 5 years?"
  ]
}"#;

/// System prompt for the internship readiness score.
pub const READINESS_SYSTEM: &str = "You are a career counselor who specializes in \
    internships. Score readiness honestly; a typical first-year student lands \
    between 30 and 60. Respond only through the provided tool.";

/// Readiness score template. Slots: {resume}
pub const READINESS_TEMPLATE: &str = r#"Rate this student's internship readiness from 0 to 100 based on the resume below.
Then give exactly 3 personalized tips that would raise the score. Each tip must refer to something specific in the resume.

Resume:
{resume}"#;
