use super::{EmailAddress, Locale};

/// Elements whose content is not readable text.
const SKIPPED_ELEMENTS: [&str; 4] = ["head", "script", "style", "title"];

/// Subject and HTML body sent on every successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub subject: &'static str,
    pub html_body: &'static str,
}

impl NotificationTemplate {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::English => Self {
                subject: "Automatic Email Notification Delivered",
                html_body: ENGLISH_BODY,
            },
            Locale::Indonesian => Self {
                subject: "Notifikasi Email Otomatis Berhasil Terkirim",
                html_body: INDONESIAN_BODY,
            },
        }
    }
}

/// A fully assembled message, ready for a [`crate::ports::Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub recipient: EmailAddress,
    pub subject: String,
    pub html_body: String,
    /// Plain-text fallback derived from `html_body`.
    pub text_body: String,
}

impl OutgoingEmail {
    pub fn new(
        recipient: EmailAddress,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        let html_body = html_body.into();
        let text_body = strip_markup(&html_body);
        Self {
            recipient,
            subject: subject.into(),
            html_body,
            text_body,
        }
    }

    pub fn from_template(recipient: EmailAddress, template: &NotificationTemplate) -> Self {
        Self::new(recipient, template.subject, template.html_body)
    }
}

/// Remove markup from an HTML document, keeping its readable text.
///
/// Tags are dropped, as is everything inside `head`, `script`, `style` and
/// `title`. Lines are trimmed and empty lines removed.
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let tag_and_after = &rest[open + 1..];
        let Some(close) = tag_and_after.find('>') else {
            // Unterminated tag: nothing after it is text.
            rest = "";
            break;
        };
        let tag = &tag_and_after[..close];
        rest = &tag_and_after[close + 1..];

        if let Some(element) = skipped_element(tag) {
            let closing = format!("</{element}");
            rest = match rest.to_ascii_lowercase().find(&closing) {
                Some(end) => &rest[end..],
                None => "",
            };
        }
    }
    text.push_str(rest);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn skipped_element(tag: &str) -> Option<&'static str> {
    let name = tag
        .trim_start()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    SKIPPED_ELEMENTS.into_iter().find(|element| *element == name)
}

const ENGLISH_BODY: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        .container { max-width: 600px; margin: 0 auto; padding: 20px; }
        h3 { color: #667eea; }
        p { margin: 10px 0; }
    </style>
</head>
<body>
    <div class="container">
        <h3>Hello, this is a notice from the notification_email website!</h3>
        <p>This email is a test notification from the notification_email website.
        If you received it, the system has been configured successfully!</p>
        <p>Thank you for visiting the notification_email website.</p>
    </div>
</body>
</html>
"#;

const INDONESIAN_BODY: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        .container { max-width: 600px; margin: 0 auto; padding: 20px; }
        h3 { color: #667eea; }
        p { margin: 10px 0; }
    </style>
</head>
<body>
    <div class="container">
        <h3>Halo, ini adalah Pemberitahuan dari web notification_email!</h3>
        <p>Email ini adalah uji coba notifikasi pada web notification_email.
        Jika Anda menerima ini, berarti konfigurasi sistem telah berhasil!</p>
        <p>Terima kasih telah mengunjungi web notification_email.</p>
    </div>
</body>
</html>
"#;
