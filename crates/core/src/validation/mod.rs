mod rules;

use crate::models::Order;

/// Checks a delivery request before it is handed to the repository.
/// All violations are reported together.
pub fn validate(order: &Order) -> Result<(), Vec<String>> {
    let mut errs = Vec::new();
    if let Err(mut re) = rules::required_fields(order) {
        errs.append(&mut re);
    }
    if let Err(e) = rules::contact_number(&order.contact) {
        errs.push(e);
    }
    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_order_passes() {
        let order = Order::new("Me", "Alice Smith", "123 Main St", "+1 555-0101");
        assert!(validate(&order).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let order = Order::new("Me", " ", "", "call me");
        let errs = validate(&order).unwrap_err();
        assert_eq!(errs.len(), 3);
        assert!(errs.iter().any(|e| e.contains("Recipient")));
        assert!(errs.iter().any(|e| e.contains("Address")));
        assert!(errs.iter().any(|e| e.contains("Contact")));
    }
}
