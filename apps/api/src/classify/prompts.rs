// Status-classification prompt. The model must answer with exactly one
// uppercase label; anything else falls back to OTHER at the call site.

pub const CLASSIFY_STATUS_PROMPT: &str = r#"Determine the application status based on the email content. The status can be one of the following:
- APPLIED
- INTERVIEWING
- OFFER
- OTHER
- REJECTED

You can only reply with one of the five words listed above based on the email content, and make sure it is uppercase.
If the email content is inconclusive, you can reply with "OTHER".

Email content:
{email_content}"#;
