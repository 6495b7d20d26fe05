//! Error types for the domain model

/// Validation errors for drafts and request forms
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A required field was empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Adoption terms were not accepted
    #[error("adoption terms must be accepted")]
    TermsNotAccepted,

    /// Neither a tier nor a custom amount was given
    #[error("select a sponsorship tier or enter a custom amount")]
    NoSponsorshipAmount,

    /// Custom sponsorship amount was zero
    #[error("invalid sponsorship amount: {0}")]
    InvalidAmount(u32),

    /// Unrecognized sponsorship tier name
    #[error("unknown sponsorship tier: '{0}'")]
    UnknownTier(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_display() {
        let err = ModelError::MissingField("email");
        assert!(err.to_string().contains("email"));
        assert!(ModelError::UnknownTier("platinum".into())
            .to_string()
            .contains("platinum"));
    }
}
