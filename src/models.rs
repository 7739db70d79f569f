// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Records held by the store and the request and response structures used by
//! the REST API. Wire names follow the clinic's established JSON vocabulary
//! (`nombre`, `telefono`, `direccion`, ...), mapped onto English field names
//! with serde renames.
//!
//! ## Model Categories
//!
//! - **Users**: Identity store records (never serialized)
//! - **Addresses**: Embedded in doctors and patients
//! - **Doctors**: `/medicos` records
//! - **Patients**: `/pacientes` records
//! - **Paging**: Page envelope for list endpoints
//!
//! Records are values: updates and deactivation build a new record rather
//! than mutating the stored one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

/// Field path → message, reported as `ERR_VALIDATION_FAILED`.
pub type FieldErrors = BTreeMap<String, String>;

const MUST_NOT_BE_BLANK: &str = "must not be blank";
const MUST_NOT_BE_NULL: &str = "must not be null";

fn require_text(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), MUST_NOT_BE_BLANK.to_string());
    }
}

fn require_email(errors: &mut FieldErrors, field: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.insert(field.to_string(), MUST_NOT_BE_BLANK.to_string());
        return;
    }
    let well_formed = value
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'))
        .unwrap_or(false);
    if !well_formed {
        errors.insert(
            field.to_string(),
            "must be a well-formed email address".to_string(),
        );
    }
}

fn require_digits(errors: &mut FieldErrors, field: &str, value: &str, min: usize, max: usize) {
    let value = value.trim();
    if value.is_empty() {
        errors.insert(field.to_string(), MUST_NOT_BE_BLANK.to_string());
    } else if !(min..=max).contains(&value.len()) || !value.chars().all(|c| c.is_ascii_digit()) {
        errors.insert(
            field.to_string(),
            format!("must be {min} to {max} digits"),
        );
    }
}

fn into_result(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Users
// =============================================================================

/// A user of the identity store.
///
/// The password is only ever held as a bcrypt hash and is redacted from
/// `Debug` output. Users are not serializable.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: u64,
    /// Unique login name.
    pub login: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// The user's single role.
    pub role: Role,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

// =============================================================================
// Address
// =============================================================================

/// Postal address embedded in doctor and patient records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Address {
    #[serde(rename = "calle")]
    pub street: String,
    #[serde(rename = "distrito")]
    pub district: String,
    #[serde(rename = "ciudad")]
    pub city: String,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "complemento", default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
}

impl Address {
    /// Copy of this address with every provided field replaced.
    pub fn merged(&self, update: &AddressUpdate) -> Address {
        Address {
            street: update.street.clone().unwrap_or_else(|| self.street.clone()),
            district: update.district.clone().unwrap_or_else(|| self.district.clone()),
            city: update.city.clone().unwrap_or_else(|| self.city.clone()),
            number: update.number.clone().unwrap_or_else(|| self.number.clone()),
            complement: update.complement.clone().or_else(|| self.complement.clone()),
        }
    }

    fn validate_into(&self, errors: &mut FieldErrors, prefix: &str) {
        require_text(errors, &format!("{prefix}.calle"), &self.street);
        require_text(errors, &format!("{prefix}.distrito"), &self.district);
        require_text(errors, &format!("{prefix}.ciudad"), &self.city);
        require_text(errors, &format!("{prefix}.numero"), &self.number);
    }
}

/// Partial address used by update requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AddressUpdate {
    #[serde(rename = "calle", default)]
    pub street: Option<String>,
    #[serde(rename = "distrito", default)]
    pub district: Option<String>,
    #[serde(rename = "ciudad", default)]
    pub city: Option<String>,
    #[serde(rename = "numero", default)]
    pub number: Option<String>,
    #[serde(rename = "complemento", default)]
    pub complement: Option<String>,
}

// =============================================================================
// Doctors
// =============================================================================

/// Medical specialty of a doctor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialty {
    Ortopedia,
    Cardiologia,
    Ginecologia,
    Pediatria,
}

/// A doctor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub id: u64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub document: String,
    pub specialty: Specialty,
    pub address: Address,
    pub active: bool,
}

impl Doctor {
    /// Copy of this doctor with the update applied. Phone, email and
    /// specialty are not updatable.
    pub fn with_updates(&self, update: &DoctorUpdate) -> Doctor {
        Doctor {
            name: update.name.clone().unwrap_or_else(|| self.name.clone()),
            document: update.document.clone().unwrap_or_else(|| self.document.clone()),
            address: update
                .address
                .as_ref()
                .map(|a| self.address.merged(a))
                .unwrap_or_else(|| self.address.clone()),
            ..self.clone()
        }
    }

    /// Copy of this doctor marked inactive.
    pub fn deactivated(&self) -> Doctor {
        Doctor {
            active: false,
            ..self.clone()
        }
    }
}

/// Request to register a doctor.
///
/// Text fields default to empty so that missing fields surface as
/// validation errors rather than unreadable bodies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorRegistration {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "documento", default)]
    pub document: String,
    #[serde(rename = "especialidad", default)]
    pub specialty: Option<Specialty>,
    #[serde(rename = "direccion", default)]
    pub address: Option<Address>,
}

impl DoctorRegistration {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "nombre", &self.name);
        require_email(&mut errors, "email", &self.email);
        require_text(&mut errors, "telefono", &self.phone);
        require_digits(&mut errors, "documento", &self.document, 4, 6);
        if self.specialty.is_none() {
            errors.insert("especialidad".to_string(), MUST_NOT_BE_NULL.to_string());
        }
        match &self.address {
            Some(address) => address.validate_into(&mut errors, "direccion"),
            None => {
                errors.insert("direccion".to_string(), MUST_NOT_BE_NULL.to_string());
            }
        }
        into_result(errors)
    }
}

/// Request to update a doctor. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DoctorUpdate {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "documento", default)]
    pub document: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<AddressUpdate>,
}

impl DoctorUpdate {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.id.is_none() {
            errors.insert("id".to_string(), MUST_NOT_BE_NULL.to_string());
        }
        if let Some(name) = &self.name {
            require_text(&mut errors, "nombre", name);
        }
        if let Some(document) = &self.document {
            require_digits(&mut errors, "documento", document, 4, 6);
        }
        into_result(errors)
    }
}

/// Full doctor representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DoctorDetails {
    pub id: u64,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "documento")]
    pub document: String,
    #[serde(rename = "especialidad")]
    pub specialty: Specialty,
    #[serde(rename = "direccion")]
    pub address: Address,
}

impl From<&Doctor> for DoctorDetails {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name.clone(),
            email: doctor.email.clone(),
            phone: doctor.phone.clone(),
            document: doctor.document.clone(),
            specialty: doctor.specialty,
            address: doctor.address.clone(),
        }
    }
}

/// Doctor entry in list pages.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DoctorListItem {
    pub id: u64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "especialidad")]
    pub specialty: Specialty,
    #[serde(rename = "documento")]
    pub document: String,
    pub email: String,
}

impl From<&Doctor> for DoctorListItem {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name.clone(),
            specialty: doctor.specialty,
            document: doctor.document.clone(),
            email: doctor.email.clone(),
        }
    }
}

// =============================================================================
// Patients
// =============================================================================

/// A patient record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: u64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub identity_document: String,
    pub address: Address,
    pub active: bool,
}

impl Patient {
    /// Copy of this patient with the update applied.
    pub fn with_updates(&self, update: &PatientUpdate) -> Patient {
        Patient {
            name: update.name.clone().unwrap_or_else(|| self.name.clone()),
            identity_document: update
                .identity_document
                .clone()
                .unwrap_or_else(|| self.identity_document.clone()),
            address: update
                .address
                .as_ref()
                .map(|a| self.address.merged(a))
                .unwrap_or_else(|| self.address.clone()),
            ..self.clone()
        }
    }

    /// Copy of this patient marked inactive.
    pub fn deactivated(&self) -> Patient {
        Patient {
            active: false,
            ..self.clone()
        }
    }
}

/// Request to register a patient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientRegistration {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "documentoIdentidad", default)]
    pub identity_document: String,
    #[serde(rename = "direccion", default)]
    pub address: Option<Address>,
}

impl PatientRegistration {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "nombre", &self.name);
        require_email(&mut errors, "email", &self.email);
        require_text(&mut errors, "telefono", &self.phone);
        require_text(&mut errors, "documentoIdentidad", &self.identity_document);
        match &self.address {
            Some(address) => address.validate_into(&mut errors, "direccion"),
            None => {
                errors.insert("direccion".to_string(), MUST_NOT_BE_NULL.to_string());
            }
        }
        into_result(errors)
    }
}

/// Request to update a patient. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PatientUpdate {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "documentoIdentidad", default)]
    pub identity_document: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<AddressUpdate>,
}

impl PatientUpdate {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.id.is_none() {
            errors.insert("id".to_string(), MUST_NOT_BE_NULL.to_string());
        }
        if let Some(name) = &self.name {
            require_text(&mut errors, "nombre", name);
        }
        if let Some(document) = &self.identity_document {
            require_text(&mut errors, "documentoIdentidad", document);
        }
        into_result(errors)
    }
}

/// Full patient representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PatientDetails {
    pub id: u64,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "documentoIdentidad")]
    pub identity_document: String,
    #[serde(rename = "direccion")]
    pub address: Address,
}

impl From<&Patient> for PatientDetails {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            identity_document: patient.identity_document.clone(),
            address: patient.address.clone(),
        }
    }
}

/// Patient entry in list pages.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PatientListItem {
    pub id: u64,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "documentoIdentidad")]
    pub identity_document: String,
    #[serde(rename = "telefono")]
    pub phone: String,
}

impl From<&Patient> for PatientListItem {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name.clone(),
            email: patient.email.clone(),
            identity_document: patient.identity_document.clone(),
            phone: patient.phone.clone(),
        }
    }
}

// =============================================================================
// Paging
// =============================================================================

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// Items across all pages.
    pub total_elements: usize,
    /// Number of pages.
    pub total_pages: usize,
    /// Zero-based page number.
    pub number: usize,
    /// Requested page size.
    pub size: usize,
}

impl<T> Page<T> {
    /// Slice page `number` of `size` out of the full, already ordered list.
    pub fn of(items: Vec<T>, number: usize, size: usize) -> Self {
        let size = size.clamp(1, MAX_PAGE_SIZE);
        let total_elements = items.len();
        let total_pages = total_elements.div_ceil(size);
        let content = items
            .into_iter()
            .skip(number.saturating_mul(size))
            .take(size)
            .collect();
        Self {
            content,
            total_elements,
            total_pages,
            number,
            size,
        }
    }
}
