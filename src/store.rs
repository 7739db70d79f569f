// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store for users, doctors and patients.
//!
//! Shared behind `Arc<RwLock<_>>` in [`AppState`](crate::state::AppState).
//! Identifiers are assigned sequentially per collection, starting at 1.

use std::collections::{BTreeMap, HashMap};

use crate::auth::Role;
use crate::models::{
    Doctor, DoctorRegistration, DoctorUpdate, Patient, PatientRegistration, PatientUpdate, User,
};

/// Store failures surfaced to handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("a record with this {0} already exists")]
    Duplicate(&'static str),
    #[error("record not found")]
    NotFound,
    #[error("record is incomplete: {0}")]
    Incomplete(&'static str),
}

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<u64, User>,
    doctors: BTreeMap<u64, Doctor>,
    patients: BTreeMap<u64, Patient>,
    next_user_id: u64,
    next_doctor_id: u64,
    next_patient_id: u64,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Add a user with an already hashed password. Logins are unique.
    pub fn insert_user(
        &mut self,
        login: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Result<User, StoreError> {
        let login = login.into();
        if self.user_by_login(&login).is_some() {
            return Err(StoreError::Duplicate("login"));
        }

        let user = User {
            id: next_id(&mut self.next_user_id),
            login,
            password_hash: password_hash.into(),
            role,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn user_by_login(&self, login: &str) -> Option<&User> {
        self.users.values().find(|user| user.login == login)
    }

    pub fn user_by_id(&self, id: u64) -> Option<&User> {
        self.users.get(&id)
    }

    // -------------------------------------------------------------------------
    // Doctors
    // -------------------------------------------------------------------------

    /// Active doctors ordered by name.
    pub fn active_doctors(&self) -> Vec<&Doctor> {
        let mut doctors: Vec<_> = self.doctors.values().filter(|d| d.active).collect();
        doctors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        doctors
    }

    pub fn doctor(&self, id: u64) -> Result<&Doctor, StoreError> {
        self.doctors.get(&id).ok_or(StoreError::NotFound)
    }

    /// Register a doctor. Email and document together must be unique.
    pub fn create_doctor(&mut self, request: DoctorRegistration) -> Result<Doctor, StoreError> {
        if self
            .doctors
            .values()
            .any(|d| d.email == request.email && d.document == request.document)
        {
            return Err(StoreError::Duplicate("email or document"));
        }
        let specialty = request.specialty.ok_or(StoreError::Incomplete("especialidad"))?;
        let address = request.address.ok_or(StoreError::Incomplete("direccion"))?;

        let doctor = Doctor {
            id: next_id(&mut self.next_doctor_id),
            name: request.name,
            phone: request.phone,
            email: request.email,
            document: request.document,
            specialty,
            address,
            active: true,
        };
        self.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    pub fn update_doctor(&mut self, update: &DoctorUpdate) -> Result<Doctor, StoreError> {
        let id = update.id.ok_or(StoreError::NotFound)?;
        let updated = self.doctor(id)?.with_updates(update);
        self.doctors.insert(id, updated.clone());
        Ok(updated)
    }

    /// Logical delete: the record stays but drops out of listings.
    pub fn deactivate_doctor(&mut self, id: u64) -> Result<Doctor, StoreError> {
        let inactive = self.doctor(id)?.deactivated();
        self.doctors.insert(id, inactive.clone());
        Ok(inactive)
    }

    // -------------------------------------------------------------------------
    // Patients
    // -------------------------------------------------------------------------

    /// Active patients ordered by name.
    pub fn active_patients(&self) -> Vec<&Patient> {
        let mut patients: Vec<_> = self.patients.values().filter(|p| p.active).collect();
        patients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        patients
    }

    pub fn patient(&self, id: u64) -> Result<&Patient, StoreError> {
        self.patients.get(&id).ok_or(StoreError::NotFound)
    }

    /// Register a patient. Email and identity document together must be unique.
    pub fn create_patient(&mut self, request: PatientRegistration) -> Result<Patient, StoreError> {
        if self.patients.values().any(|p| {
            p.email == request.email && p.identity_document == request.identity_document
        }) {
            return Err(StoreError::Duplicate("email or document"));
        }
        let address = request.address.ok_or(StoreError::Incomplete("direccion"))?;

        let patient = Patient {
            id: next_id(&mut self.next_patient_id),
            name: request.name,
            phone: request.phone,
            email: request.email,
            identity_document: request.identity_document,
            address,
            active: true,
        };
        self.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    pub fn update_patient(&mut self, update: &PatientUpdate) -> Result<Patient, StoreError> {
        let id = update.id.ok_or(StoreError::NotFound)?;
        let updated = self.patient(id)?.with_updates(update);
        self.patients.insert(id, updated.clone());
        Ok(updated)
    }

    /// Logical delete: the record stays but drops out of listings.
    pub fn deactivate_patient(&mut self, id: u64) -> Result<Patient, StoreError> {
        let inactive = self.patient(id)?.deactivated();
        self.patients.insert(id, inactive.clone());
        Ok(inactive)
    }
}
