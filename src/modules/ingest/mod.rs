// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::lead::{Lead, LeadStatus, NewLead};
use crate::modules::parser::{ParsedLead, ParserFactory};
use crate::modules::property::Property;
use crate::modules::transport::ParsedEmail;
use crate::raise_error;
use crate::utc_now;
use chrono::Local;
use tracing::info;

#[cfg(test)]
mod tests;

/// Turns one portal notification email into a created or updated lead.
///
/// The service never touches mailbox state; deciding whether an email
/// should be processed at all (the ledger check) is the worker's job.
pub struct LeadIngestService {
    parser_factory: ParserFactory,
    company_id: u64,
}

impl LeadIngestService {
    pub fn new(company_id: u64) -> Self {
        Self {
            parser_factory: ParserFactory::new(),
            company_id,
        }
    }

    pub async fn process_email(&self, email: &ParsedEmail) -> LeadGateResult<()> {
        let parser = self.parser_factory.get_parser(&email.subject, &email.from)?;
        let parsed = parser.parse(&email.subject, &email.body)?;

        info!(
            company_id = self.company_id,
            source = %parsed.source,
            email = %parsed.email,
            reference = %parsed.property_reference,
            "Parsed portal lead"
        );

        // A lead without a known property is worthless to the CRM; the
        // error is terminal for this message and the caller still records
        // it in the ledger.
        let property = Property::find_by_reference(&parsed.property_reference)
            .await?
            .ok_or_else(|| {
                raise_error!(
                    format!(
                        "property reference {} does not exist - email ignored",
                        parsed.property_reference
                    ),
                    ErrorCode::PropertyReferenceUnknown
                )
            })?;

        match Lead::find_by_email(&parsed.email).await? {
            Some(existing) => self.merge_into_existing(existing, &parsed, &property).await,
            None => self.create_new_lead(&parsed, &property).await,
        }
    }

    async fn create_new_lead(&self, parsed: &ParsedLead, property: &Property) -> LeadGateResult<()> {
        let lead = NewLead {
            name: parsed.name.clone(),
            email: parsed.email.clone(),
            phone: parsed.phone.clone(),
            property_id: Some(property.id),
            company_id: self.company_id,
            source: parsed.source.to_string(),
            notes: format!("Mensaje inicial: {}", parsed.message),
        }
        .into_lead();
        lead.save().await?;
        info!(
            lead_id = lead.id,
            email = %lead.email,
            reference = %property.reference,
            "Created new lead"
        );
        Ok(())
    }

    async fn merge_into_existing(
        &self,
        existing: Lead,
        parsed: &ParsedLead,
        property: &Property,
    ) -> LeadGateResult<()> {
        let mut lead = existing;
        let now = utc_now!();
        let stamp = Local::now().format("%Y-%m-%d %H:%M");

        let property_changed = lead.property_id != Some(property.id);
        if property_changed {
            let previous = lead
                .property_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "none".into());
            lead.notes.push_str(&format!(
                "\n[{stamp}] Nuevo contacto sobre propiedad {} (anterior: {previous}). Mensaje: {}",
                property.reference, parsed.message
            ));
            lead.property_id = Some(property.id);
        } else {
            lead.notes.push_str(&format!(
                "\n[{stamp}] Nuevo contacto. Mensaje: {}",
                parsed.message
            ));
        }

        // Contact details only improve, an empty field never erases one
        if !parsed.name.is_empty() {
            lead.name = parsed.name.clone();
        }
        if !parsed.phone.is_empty() {
            lead.phone = parsed.phone.clone();
        }

        match lead.status {
            LeadStatus::Closed => {
                info!(lead_id = lead.id, "Reopening closed lead as contacted");
                lead.status = LeadStatus::Contacted;
            }
            LeadStatus::New => lead.status = LeadStatus::Contacted,
            _ => {}
        }

        let source = parsed.source.to_string();
        if lead.source != source {
            lead.source = source;
        }

        lead.last_interaction = Some(now);
        lead.updated_at = now;

        info!(
            lead_id = lead.id,
            reference = %property.reference,
            property_changed,
            "Updated existing lead with new contact"
        );
        Lead::persist_update(lead).await
    }
}
