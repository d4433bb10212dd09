//! Portal API document to `JourneySnapshot` converter.
//!
//! The portal's REST layer returns snake_case JSON. This crate walks that
//! document, normalizes each record into the `journey-core` shapes and hands
//! them to the assembler. camelCase keys are accepted as well so that already
//! normalized documents pass through unchanged.

use journey_core::{
    CarePathway, InsuranceType, JourneyConfig, JourneyError, JourneySnapshot, Milestone,
    MilestoneType, Patient, Visit, VisitStatus, VisitType,
};
use serde_json::Value;

/// Assemble a journey snapshot from a JSON string.
pub fn assemble_document_str(
    document_json: &str,
    config: &JourneyConfig,
) -> Result<JourneySnapshot, JourneyError> {
    let value: Value = serde_json::from_str(document_json)
        .map_err(|err| JourneyError::Parse(err.to_string()))?;
    assemble_document_value(&value, config)
}

/// Assemble a journey snapshot from a `serde_json::Value`.
pub fn assemble_document_value(
    document: &Value,
    config: &JourneyConfig,
) -> Result<JourneySnapshot, JourneyError> {
    if !document.is_object() {
        return Err(JourneyError::Parse(
            "Expected a JSON object at the document root".to_string(),
        ));
    }

    // Some mock handlers wrap the payload in a `data` envelope.
    let document = document
        .get("data")
        .filter(|inner| inner.is_object())
        .unwrap_or(document);

    let patient = document
        .get("patient")
        .filter(|patient| patient.is_object())
        .ok_or(JourneyError::MissingData("patient"))?;
    let patient = read_patient(patient)?;

    let visits = read_records(document, "visits", read_visit)?;
    let milestones = read_records(document, "milestones", read_milestone)?;

    tracing::debug!(
        patient_id = %patient.id,
        visits = visits.len(),
        milestones = milestones.len(),
        "assembling journey document"
    );

    Ok(JourneySnapshot::assemble(
        config,
        patient,
        &visits,
        &milestones,
    ))
}

fn read_records<T>(
    document: &Value,
    key: &str,
    read: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<T>, JourneyError> {
    match document.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries.iter().filter_map(read).collect()),
        Some(_) => Err(JourneyError::Parse(format!("Expected `{key}` to be an array"))),
    }
}

fn read_patient(value: &Value) -> Result<Patient, JourneyError> {
    let id = extract_id(value).ok_or(JourneyError::MissingData("patient.id"))?;

    // A missing plan or pathway matches no rule selector, so nothing extra is hidden.
    let insurance_type = extract_text(value, &["insurance_type", "insuranceType"])
        .unwrap_or_else(|| {
            tracing::warn!(patient_id = %id, "patient has no insurance type");
            String::new()
        });
    let care_pathway = extract_text(value, &["care_pathway", "carePathway"])
        .unwrap_or_else(|| {
            tracing::warn!(patient_id = %id, "patient has no care pathway");
            String::new()
        });

    let current_week = ["current_week", "currentWeek"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_u64))
        .and_then(|week| u32::try_from(week).ok());

    Ok(Patient {
        id,
        first_name: extract_text(value, &["first_name", "firstName"]).unwrap_or_default(),
        last_name: extract_text(value, &["last_name", "lastName"]).unwrap_or_default(),
        due_date: extract_text(value, &["due_date", "dueDate"]),
        current_week,
        insurance_type: InsuranceType::from(insurance_type),
        care_pathway: CarePathway::from(care_pathway),
    })
}

fn read_visit(value: &Value) -> Option<Visit> {
    let Some(id) = extract_id(value) else {
        tracing::warn!("skipping visit without an id");
        return None;
    };
    let Some(visit_type) = extract_text(value, &["type", "visit_type", "visitType"]) else {
        tracing::warn!(visit_id = %id, "skipping visit without a type");
        return None;
    };

    let status = extract_text(value, &["status"]).unwrap_or_else(|| "available".to_string());

    Some(Visit {
        id,
        visit_type: VisitType::from(visit_type),
        status: VisitStatus::from(status),
        title: extract_text(value, &["title"]),
        scheduled_date: extract_text(value, &["scheduled_date", "scheduledDate"]),
        completed_date: extract_text(value, &["completed_date", "completedDate"]),
        provider_name: extract_text(value, &["provider_name", "providerName"]),
        location: extract_text(value, &["location"]),
        notes: extract_text(value, &["notes"]),
    })
}

fn read_milestone(value: &Value) -> Option<Milestone> {
    let Some(id) = extract_id(value) else {
        tracing::warn!("skipping milestone without an id");
        return None;
    };

    let date = extract_text(value, &["date"]).unwrap_or_else(|| {
        tracing::warn!(milestone_id = %id, "milestone has no date");
        String::new()
    });

    Some(Milestone {
        milestone_type: MilestoneType::from(
            extract_text(value, &["type", "milestone_type", "milestoneType"])
                .unwrap_or_else(|| "custom".to_string()),
        ),
        title: extract_text(value, &["title"]).unwrap_or_default(),
        date,
        description: extract_text(value, &["description"]),
        id,
    })
}

/// Ids arrive as strings from most handlers and as numbers from a few.
fn extract_id(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// First non-empty string found under any of `fields`.
fn extract_text(value: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        value
            .get(*field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}
