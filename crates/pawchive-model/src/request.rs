//! Adoption and sponsorship request forms
//!
//! Both forms are validated locally; nothing here moves money.

use crate::error::ModelError;
use crate::stray::StrayId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn require(value: &str, field: &'static str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        Err(ModelError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Adoption application for one stray
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdoptionRequest {
    /// Stray being adopted
    pub stray_id: Option<StrayId>,
    /// Applicant's full name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Home address
    pub address: String,
    /// Why the applicant wants to adopt
    #[serde(default)]
    pub reason: String,
    /// Has kept pets before
    #[serde(default)]
    pub has_experience: bool,
    /// Accepted the adoption terms
    #[serde(default)]
    pub agree_terms: bool,
}

impl AdoptionRequest {
    /// Check required fields, then terms
    ///
    /// # Errors
    /// - `ModelError::MissingField` for the first empty required field
    /// - `ModelError::TermsNotAccepted` if terms were not accepted
    pub fn validate(&self) -> Result<(), ModelError> {
        require(&self.full_name, "full_name")?;
        require(&self.email, "email")?;
        require(&self.phone, "phone")?;
        require(&self.address, "address")?;
        if !self.agree_terms {
            return Err(ModelError::TermsNotAccepted);
        }
        Ok(())
    }
}

/// Fixed sponsorship tiers (amounts in pesos)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SponsorTier {
    /// Monthly updates and a thank-you card
    Basic,
    /// Adds visits, photos and a certificate
    Gold,
    /// Adds priority adoption and a named health card
    Premium,
}

impl SponsorTier {
    /// All tiers, cheapest first
    pub const ALL: [SponsorTier; 3] = [Self::Basic, Self::Gold, Self::Premium];

    /// Amount in pesos
    #[inline]
    #[must_use]
    pub fn amount(self) -> u32 {
        match self {
            Self::Basic => 100,
            Self::Gold => 500,
            Self::Premium => 1000,
        }
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic Sponsor",
            Self::Gold => "Gold Sponsor",
            Self::Premium => "Premium Sponsor",
        }
    }

    /// Benefits listed on the tier card
    #[must_use]
    pub fn benefits(self) -> &'static [&'static str] {
        match self {
            Self::Basic => &[
                "Monthly update emails",
                "Digital thank you card",
                "Name on sponsor wall",
            ],
            Self::Gold => &[
                "All Basic benefits",
                "Quarterly visit rights",
                "Exclusive photos & videos",
                "Sponsor certificate",
            ],
            Self::Premium => &[
                "All Gold benefits",
                "Priority adoption rights",
                "Named health card",
                "VIP campus events",
            ],
        }
    }

    /// Highlighted as the most popular choice
    #[inline]
    #[must_use]
    pub fn is_popular(self) -> bool {
        matches!(self, Self::Gold)
    }
}

impl fmt::Display for SponsorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SponsorTier {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "gold" => Ok(Self::Gold),
            "premium" => Ok(Self::Premium),
            _ => Err(ModelError::UnknownTier(s.to_string())),
        }
    }
}

/// Sponsorship pledge for one stray
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SponsorshipRequest {
    /// Stray being sponsored
    pub stray_id: Option<StrayId>,
    /// Sponsor's name
    pub sponsor_name: String,
    /// Contact email
    pub email: String,
    /// Selected tier
    pub tier: Option<SponsorTier>,
    /// Custom amount in pesos, used when no tier is selected
    pub custom_amount: Option<u32>,
}

impl SponsorshipRequest {
    /// Validate the form and resolve the pledged amount
    ///
    /// A selected tier takes precedence over a custom amount.
    ///
    /// # Errors
    /// - `ModelError::MissingField` for an empty name or email
    /// - `ModelError::NoSponsorshipAmount` if neither tier nor amount is set
    /// - `ModelError::InvalidAmount` for a zero custom amount
    pub fn resolve_amount(&self) -> Result<u32, ModelError> {
        require(&self.sponsor_name, "sponsor_name")?;
        require(&self.email, "email")?;

        match (self.tier, self.custom_amount) {
            (Some(tier), _) => Ok(tier.amount()),
            (None, Some(0)) => Err(ModelError::InvalidAmount(0)),
            (None, Some(amount)) => Ok(amount),
            (None, None) => Err(ModelError::NoSponsorshipAmount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adoption() -> AdoptionRequest {
        AdoptionRequest {
            stray_id: Some(StrayId::new("1")),
            full_name: "Ana Cruz".into(),
            email: "ana@example.edu".into(),
            phone: "0917 000 0000".into(),
            address: "Dorm 3".into(),
            agree_terms: true,
            ..AdoptionRequest::default()
        }
    }

    #[test]
    fn adoption_requires_fields_then_terms() {
        assert!(adoption().validate().is_ok());

        let missing = AdoptionRequest {
            phone: " ".into(),
            ..adoption()
        };
        assert_eq!(missing.validate(), Err(ModelError::MissingField("phone")));

        let no_terms = AdoptionRequest {
            agree_terms: false,
            ..adoption()
        };
        assert_eq!(no_terms.validate(), Err(ModelError::TermsNotAccepted));
    }

    #[test]
    fn sponsorship_tier_wins_over_custom_amount() {
        let request = SponsorshipRequest {
            sponsor_name: "Ben".into(),
            email: "ben@example.edu".into(),
            tier: Some(SponsorTier::Gold),
            custom_amount: Some(42),
            ..SponsorshipRequest::default()
        };
        assert_eq!(request.resolve_amount(), Ok(500));

        let custom = SponsorshipRequest {
            tier: None,
            ..request.clone()
        };
        assert_eq!(custom.resolve_amount(), Ok(42));

        let nothing = SponsorshipRequest {
            tier: None,
            custom_amount: None,
            ..request.clone()
        };
        assert_eq!(nothing.resolve_amount(), Err(ModelError::NoSponsorshipAmount));

        let zero = SponsorshipRequest {
            tier: None,
            custom_amount: Some(0),
            ..request
        };
        assert_eq!(zero.resolve_amount(), Err(ModelError::InvalidAmount(0)));
    }

    #[test]
    fn tier_parsing() {
        assert_eq!("Premium".parse::<SponsorTier>(), Ok(SponsorTier::Premium));
        assert!("platinum".parse::<SponsorTier>().is_err());
        assert!(SponsorTier::Gold.is_popular());
        assert_eq!(SponsorTier::ALL.map(SponsorTier::amount), [100, 500, 1000]);
    }
}
