//! Step state for the multi-step sell-car flow.
//!
//! The wizard is a linear forward/back index over a shared draft. The draft
//! survives page loads through the session store and is discarded on
//! submission or cancellation. Validation beyond per-field shape checks is
//! the backend's job.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{FuelType, Ownership, Transmission};
use crate::validate;

pub const SELL_WIZARD_STEPS: u8 = 3;

/// In-progress car attributes, filled in field by field across the steps.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellDraft {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub variant: Option<String>,
    pub year: Option<u16>,
    pub km_driven: Option<u32>,
    pub ownership: Option<Ownership>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub city: Option<String>,
    pub registration_number: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub photos: Vec<String>,
}

/// A single-field merge into the draft, one per form control.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum DraftUpdate {
    Brand(String),
    Model(String),
    Variant(String),
    Year(u16),
    KmDriven(u32),
    Ownership(Ownership),
    FuelType(FuelType),
    Transmission(Transmission),
    City(String),
    RegistrationNumber(String),
    Phone(String),
    Description(String),
    AddPhoto(String),
}

impl SellDraft {
    pub fn apply(&mut self, update: DraftUpdate) {
        match update {
            DraftUpdate::Brand(v) => self.brand = Some(v),
            DraftUpdate::Model(v) => self.model = Some(v),
            DraftUpdate::Variant(v) => self.variant = Some(v),
            DraftUpdate::Year(v) => self.year = Some(v),
            DraftUpdate::KmDriven(v) => self.km_driven = Some(v),
            DraftUpdate::Ownership(v) => self.ownership = Some(v),
            DraftUpdate::FuelType(v) => self.fuel_type = Some(v),
            DraftUpdate::Transmission(v) => self.transmission = Some(v),
            DraftUpdate::City(v) => self.city = Some(v),
            DraftUpdate::RegistrationNumber(v) => self.registration_number = Some(v),
            DraftUpdate::Phone(v) => self.phone = Some(v),
            DraftUpdate::Description(v) => self.description = Some(v),
            DraftUpdate::AddPhoto(v) => self.photos.push(v),
        }
    }

    /// Shape checks gating final submission. First failure wins and is shown
    /// inline; nothing is sent to the backend until this passes.
    pub fn validate_for_submit(&self) -> Result<(), AppError> {
        fn required<'a>(value: &'a Option<String>, label: &str) -> Result<&'a str, AppError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Validation(format!("{} is required", label)))
        }

        required(&self.brand, "Brand")?;
        required(&self.model, "Model")?;
        required(&self.city, "City")?;
        if self.year.is_none() {
            return Err(AppError::Validation("Year is required".to_string()));
        }
        if self.km_driven.is_none() {
            return Err(AppError::Validation("Kilometres driven is required".to_string()));
        }
        let phone = required(&self.phone, "Mobile number")?;
        validate::validate_phone(phone)?;
        let registration = required(&self.registration_number, "Registration number")?;
        validate::validate_registration(registration)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    /// Already at the last step; the flow should submit instead of advancing.
    ReadyToSubmit,
    /// Already at the first step; back navigation exits the flow.
    AtStart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SellWizard {
    step: u8,
    total_steps: u8,
    pub draft: SellDraft,
}

impl SellWizard {
    pub fn new() -> Self {
        Self::with_draft(SellDraft::default())
    }

    /// Resumes the flow from a persisted draft.
    pub fn with_draft(draft: SellDraft) -> Self {
        Self {
            step: 1,
            total_steps: SELL_WIZARD_STEPS,
            draft,
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn total_steps(&self) -> u8 {
        self.total_steps
    }

    /// Restores a step from a query parameter, clamped into bounds.
    pub fn go_to(&mut self, step: u8) {
        self.step = step.clamp(1, self.total_steps);
    }

    pub fn advance(&mut self) -> StepOutcome {
        if self.step >= self.total_steps {
            StepOutcome::ReadyToSubmit
        } else {
            self.step += 1;
            StepOutcome::Moved
        }
    }

    pub fn retreat(&mut self) -> StepOutcome {
        if self.step <= 1 {
            StepOutcome::AtStart
        } else {
            self.step -= 1;
            StepOutcome::Moved
        }
    }

    pub fn update_field(&mut self, update: DraftUpdate) {
        self.draft.apply(update);
    }
}

impl Default for SellWizard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> SellDraft {
        let mut draft = SellDraft::default();
        for update in [
            DraftUpdate::Brand("Maruti".to_string()),
            DraftUpdate::Model("Swift".to_string()),
            DraftUpdate::City("Pune".to_string()),
            DraftUpdate::Phone("9876543210".to_string()),
            DraftUpdate::RegistrationNumber("MH-12-AB-1234".to_string()),
        ] {
            draft.apply(update);
        }
        draft.apply(DraftUpdate::Year(2020));
        draft.apply(DraftUpdate::KmDriven(42_000));
        draft
    }

    #[test]
    fn retreat_at_first_step_does_not_underflow() {
        let mut wizard = SellWizard::new();
        assert_eq!(wizard.retreat(), StepOutcome::AtStart);
        assert_eq!(wizard.step(), 1);
    }

    #[test]
    fn advance_at_last_step_signals_submission() {
        let mut wizard = SellWizard::new();
        assert_eq!(wizard.advance(), StepOutcome::Moved);
        assert_eq!(wizard.advance(), StepOutcome::Moved);
        assert_eq!(wizard.step(), 3);
        assert_eq!(wizard.advance(), StepOutcome::ReadyToSubmit);
        assert_eq!(wizard.step(), 3);
    }

    #[test]
    fn go_to_clamps_into_bounds() {
        let mut wizard = SellWizard::new();
        wizard.go_to(9);
        assert_eq!(wizard.step(), 3);
        wizard.go_to(0);
        assert_eq!(wizard.step(), 1);
    }

    #[test]
    fn updates_merge_single_fields() {
        let mut wizard = SellWizard::new();
        wizard.update_field(DraftUpdate::Brand("Maruti".to_string()));
        wizard.update_field(DraftUpdate::Year(2020));
        wizard.update_field(DraftUpdate::AddPhoto("a.jpg".to_string()));
        wizard.update_field(DraftUpdate::AddPhoto("b.jpg".to_string()));
        assert_eq!(wizard.draft.brand.as_deref(), Some("Maruti"));
        assert_eq!(wizard.draft.year, Some(2020));
        assert_eq!(wizard.draft.photos, ["a.jpg", "b.jpg"]);
        // untouched fields stay unset
        assert!(wizard.draft.model.is_none());
    }

    #[test]
    fn complete_draft_passes_submission_checks() {
        assert!(complete_draft().validate_for_submit().is_ok());
    }

    #[test]
    fn submission_blocks_on_missing_or_invalid_fields() {
        let mut draft = complete_draft();
        draft.brand = None;
        assert!(draft.validate_for_submit().is_err());

        let mut draft = complete_draft();
        draft.phone = Some("98765".to_string());
        assert!(draft.validate_for_submit().is_err());

        let mut draft = complete_draft();
        draft.registration_number = Some("MH-12-AB-0000".to_string());
        assert!(draft.validate_for_submit().is_err());
    }

    #[test]
    fn draft_round_trips_through_json() {
        let draft = complete_draft();
        let raw = serde_json::to_string(&draft).expect("serialize");
        let restored: SellDraft = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(restored, draft);
    }
}
