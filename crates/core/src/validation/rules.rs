use crate::models::Order;

const MIN_CONTACT_DIGITS: usize = 7;

pub fn required_fields(order: &Order) -> Result<(), Vec<String>> {
    let mut errs = Vec::new();

    if order.recipient.trim().is_empty() {
        errs.push("Recipient name is required".to_string());
    }

    if order.address.trim().is_empty() {
        errs.push("Address is required".to_string());
    }

    // Blank contact is reported by contact_number.
    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}

pub fn contact_number(contact: &str) -> Result<(), String> {
    let contact = contact.trim();
    if contact.is_empty() {
        return Err("Contact number is required".to_string());
    }

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.');
    if !contact.chars().all(allowed) {
        return Err(format!("Contact number contains invalid characters: {contact}"));
    }

    let digits = contact.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_CONTACT_DIGITS {
        return Err(format!(
            "Contact number must have at least {MIN_CONTACT_DIGITS} digits"
        ));
    }
    Ok(())
}
