use crate::error::ValidationError;
use crate::models::ListingDraft;

/// Pre-submission checks, stopping at the first failure.
///
/// Control constraints come first, as the form would refuse to submit before
/// the handler runs. Then at least one image, then the offer price rule.
pub fn validate(draft: &ListingDraft) -> Result<(), ValidationError> {
    draft.check_controls()?;

    if draft.image_urls.is_empty() {
        return Err(ValidationError::MissingImages);
    }

    if draft.has_offer && draft.discount_price >= draft.regular_price {
        return Err(ValidationError::DiscountNotBelowRegular);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_draft() -> ListingDraft {
        ListingDraft {
            image_urls: vec!["https://cdn.example.com/cover.jpg".to_string()],
            name: "Old Town Hostel & Bar".to_string(),
            description: "Dorms and private rooms".to_string(),
            address: "3 Market Square".to_string(),
            ..ListingDraft::default()
        }
    }

    #[test]
    fn test_ready_draft_passes() {
        assert_eq!(validate(&ready_draft()), Ok(()));
    }

    #[test]
    fn test_missing_images_checked_before_discount() {
        let mut draft = ready_draft();
        draft.image_urls.clear();
        draft.has_offer = true;
        draft.regular_price = 100.0;
        draft.discount_price = 150.0;
        assert_eq!(validate(&draft), Err(ValidationError::MissingImages));
    }

    #[test]
    fn test_discount_must_be_strictly_lower() {
        let mut draft = ready_draft();
        draft.has_offer = true;
        draft.regular_price = 100.0;
        draft.discount_price = 100.0;
        assert_eq!(validate(&draft), Err(ValidationError::DiscountNotBelowRegular));

        draft.discount_price = 99.0;
        assert_eq!(validate(&draft), Ok(()));
    }

    #[test]
    fn test_discount_ignored_without_offer() {
        let mut draft = ready_draft();
        draft.regular_price = 100.0;
        draft.discount_price = 150.0;
        assert_eq!(validate(&draft), Ok(()));
    }

    #[test]
    fn test_control_constraints_come_first() {
        let mut draft = ready_draft();
        draft.image_urls.clear();
        draft.address = "   ".to_string();
        assert!(matches!(
            validate(&draft),
            Err(ValidationError::Control { field: "address", .. })
        ));
    }
}
