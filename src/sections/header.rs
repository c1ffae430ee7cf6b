//! Name, headline and contact line.

use crate::model::ResumeDocument;
use crate::style::ResolvedStyle;

/// What a contact entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Email,
    Phone,
    Url,
    Location,
    Profile,
}

impl ContactKind {
    fn label(&self) -> &'static str {
        match self {
            ContactKind::Email => "Email",
            ContactKind::Phone => "Phone",
            ContactKind::Url => "Web",
            ContactKind::Location => "Location",
            ContactKind::Profile => "Profile",
        }
    }
}

/// One item of the contact line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub kind: ContactKind,
    pub text: String,
    pub link: Option<String>,
}

/// Document header, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// Name after capitalization.
    pub name: String,
    pub label: Option<String>,
    pub contacts: Vec<Contact>,
    /// Raw image reference (data URL or base64) when the image is shown.
    pub image: Option<String>,
}

impl Header {
    pub fn build(doc: &ResumeDocument, style: &ResolvedStyle) -> Header {
        let basics = &doc.basics;
        let h = &style.header;
        let mut contacts = Vec::new();

        let mut push = |kind: ContactKind, text: &str, link: Option<String>| {
            let text = text.trim();
            if text.is_empty() {
                return;
            }
            let text = if h.show_contact_labels {
                format!("{}: {text}", kind.label())
            } else {
                text.to_string()
            };
            contacts.push(Contact { kind, text, link });
        };

        if h.show_email {
            push(
                ContactKind::Email,
                &basics.email,
                Some(format!("mailto:{}", basics.email.trim())),
            );
        }
        if h.show_phone {
            push(ContactKind::Phone, &basics.phone, phone_link(&basics.phone));
        }
        if h.show_url {
            push(ContactKind::Url, &basics.url, web_link(&basics.url));
        }
        if h.show_location {
            push(ContactKind::Location, &basics.location.display(), None);
        }
        if h.show_profiles {
            for profile in &basics.profiles {
                let text = match (profile.network.trim(), profile.username.trim()) {
                    ("", "") => profile.url.trim().to_string(),
                    ("", user) => user.to_string(),
                    (network, "") if profile.url.trim().is_empty() => network.to_string(),
                    (network, "") => format!("{network}: {}", profile.url.trim()),
                    (network, user) => format!("{network}: {user}"),
                };
                push(ContactKind::Profile, &text, web_link(&profile.url));
            }
        }

        let label = basics.label.trim();
        let image = basics.image.trim();
        Header {
            name: style
                .typography
                .name_capitalization
                .apply(basics.name.trim()),
            label: (h.show_label && !label.is_empty()).then(|| label.to_string()),
            contacts,
            image: (style.image.show_image && !image.is_empty()).then(|| image.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.label.is_none() && self.contacts.is_empty() && self.image.is_none()
    }
}

fn phone_link(phone: &str) -> Option<String> {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    (!digits.is_empty()).then(|| format!("tel:{digits}"))
}

/// Link target for a web address; a missing scheme means https.
pub(crate) fn web_link(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        None
    } else if url.contains("://") || url.starts_with("mailto:") {
        Some(url.to_string())
    } else {
        Some(format!("https://{url}"))
    }
}
