//! Message bodies for the transactional emails

use sm_core::errors::DomainError;
use sm_core::services::EmailTemplate;

/// Subject and bodies ready to hand to a mail API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
    /// Link the recipient is asked to open
    pub link: String,
}

/// Render a template for one recipient
///
/// # Arguments
/// * `site_url` - Public base URL, without trailing slash
/// * `token` - Raw one-time token; required for verification and reset mails
/// * `name` - Recipient display name, may be empty
pub fn render(
    template: EmailTemplate,
    site_url: &str,
    token: Option<&str>,
    name: &str,
) -> Result<RenderedEmail, DomainError> {
    let base = site_url.trim_end_matches('/');

    let (subject, heading, link, action, note) = match template {
        EmailTemplate::Verification => (
            "Verifieer je e-mailadres - SlimmerMetAI",
            "Bevestig je e-mailadres",
            format!("{}/verify-email?token={}", base, required_token(template, token)?),
            "Verifieer e-mailadres",
            None,
        ),
        EmailTemplate::PasswordReset => (
            "Wachtwoord resetten - SlimmerMetAI",
            "Wachtwoord resetten",
            format!("{}/reset-password?token={}", base, required_token(template, token)?),
            "Reset wachtwoord",
            Some("Deze link is 1 uur geldig."),
        ),
        EmailTemplate::Welcome => (
            "Welkom bij SlimmerMetAI!",
            "Welkom bij SlimmerMetAI!",
            format!("{}/dashboard", base),
            "Ga naar dashboard",
            None,
        ),
    };

    let greeting = if name.trim().is_empty() {
        "Hallo,".to_string()
    } else {
        format!("Hallo {},", name.trim())
    };

    let mut html = format!(
        "<html><body><h1>{}</h1><p>{}</p><p><a href=\"{}\">{}</a></p>",
        heading,
        escape_html(&greeting),
        escape_html(&link),
        action
    );
    let mut text = format!("{}\n\n{}\n\n{}: {}\n", heading, greeting, action, link);
    if let Some(note) = note {
        html.push_str(&format!("<p>{}</p>", note));
        text.push_str(&format!("\n{}\n", note));
    }
    html.push_str("</body></html>");

    Ok(RenderedEmail {
        subject: subject.to_string(),
        html,
        text,
        link,
    })
}

fn required_token<'a>(
    template: EmailTemplate,
    token: Option<&'a str>,
) -> Result<&'a str, DomainError> {
    token.filter(|t| !t.is_empty()).ok_or_else(|| DomainError::Internal {
        message: format!("The {} email needs a token", template.as_str()),
    })
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_link_uses_site_url() {
        let email = render(
            EmailTemplate::Verification,
            "https://slimmermetai.com/",
            Some("abc123"),
            "Anna",
        )
        .unwrap();

        assert_eq!(email.link, "https://slimmermetai.com/verify-email?token=abc123");
        assert!(email.html.contains("Hallo Anna,"));
        assert!(email.text.contains(&email.link));
    }

    #[test]
    fn test_reset_mail_mentions_validity() {
        let email = render(
            EmailTemplate::PasswordReset,
            "https://slimmermetai.com",
            Some("t0k3n"),
            "",
        )
        .unwrap();

        assert_eq!(email.link, "https://slimmermetai.com/reset-password?token=t0k3n");
        assert!(email.html.contains("1 uur"));
        assert!(email.text.starts_with("Wachtwoord resetten"));
    }

    #[test]
    fn test_token_templates_require_token() {
        let result = render(EmailTemplate::PasswordReset, "https://x.test", None, "Anna");
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }

    #[test]
    fn test_name_is_escaped() {
        let email = render(EmailTemplate::Welcome, "https://x.test", None, "<b>Eve</b>").unwrap();
        assert!(email.html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(!email.html.contains("<b>Eve"));
    }
}
