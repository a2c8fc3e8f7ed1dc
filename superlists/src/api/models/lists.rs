//! Form models for the list pages.

use serde::Deserialize;

pub const EMPTY_ITEM_ERROR: &str = "You can't have an empty list item";
pub const DUPLICATE_ITEM_ERROR: &str = "You've already got this in your list";

/// New-item form posted by both the home page and a list page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemForm {
    /// A missing field is treated like an empty one.
    #[serde(default)]
    pub text: String,
}

impl ItemForm {
    /// The item text with surrounding whitespace removed, or the inline error to show.
    pub fn validated_text(&self) -> Result<&str, &'static str> {
        match self.text.trim() {
            "" => Err(EMPTY_ITEM_ERROR),
            text => Ok(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(EMPTY_ITEM_ERROR, "You can't have an empty list item");
        assert_eq!(DUPLICATE_ITEM_ERROR, "You've already got this in your list");
    }

    #[test]
    fn test_blank_text_is_rejected() {
        for text in ["", "   ", "\n\t"] {
            let form = ItemForm { text: text.to_string() };
            assert_eq!(form.validated_text(), Err(EMPTY_ITEM_ERROR));
        }
    }

    #[test]
    fn test_text_is_trimmed() {
        let form = ItemForm {
            text: "  Buy milk \n".to_string(),
        };
        assert_eq!(form.validated_text(), Ok("Buy milk"));
    }

    #[test]
    fn test_missing_field_deserializes_as_empty() {
        let form: ItemForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.validated_text(), Err(EMPTY_ITEM_ERROR));
    }
}
