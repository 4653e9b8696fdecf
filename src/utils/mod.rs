// Utility functions shared by the moderation services

/// Mask an email address for exports, keeping the first two characters of
/// the local part and the whole domain.
pub fn mask_email(email: &str) -> String {
    let Some(at_pos) = email.find('@') else {
        return email.to_string();
    };

    let local = &email[..at_pos];
    let domain = &email[at_pos..];

    if local.chars().count() <= 2 {
        return email.to_string();
    }

    let visible: String = local.chars().take(2).collect();
    format!("{}***{}", visible, domain)
}
