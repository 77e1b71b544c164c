//! Objective service

use std::sync::Arc;

use crate::config::Settings;
use crate::error::OkrResult;
use crate::gitlab::store::TicketStore;
use crate::gitlab::types::{Ticket, TicketUpdate};
use crate::models::{
    FieldUpdate, ObjectiveCreateRequest, ObjectiveResponse, ObjectiveUpdateRequest,
};
use crate::okr::classifier::{classify_labels, TitleClassifier};
use crate::okr::document::DocumentCodec;

use super::dedup_labels;

pub struct ObjectiveService {
    store: Arc<dyn TicketStore>,
    codec: DocumentCodec,
    classifier: TitleClassifier,
    objective_labels: Vec<String>,
}

impl ObjectiveService {
    pub fn new(store: Arc<dyn TicketStore>, settings: &Settings) -> Self {
        Self {
            store,
            codec: DocumentCodec::new(),
            classifier: TitleClassifier::new(),
            objective_labels: settings.gitlab_objective_labels.clone(),
        }
    }

    fn to_response(&self, ticket: Ticket) -> ObjectiveResponse {
        let classification = classify_labels(&ticket.labels);
        ObjectiveResponse {
            id: ticket.iid,
            title: ticket.title,
            description: ticket.description.unwrap_or_default(),
            web_url: ticket.web_url,
            team_label: classification.team_label,
            product_label: classification.product_label,
        }
    }

    pub async fn create(&self, request: ObjectiveCreateRequest) -> OkrResult<ObjectiveResponse> {
        let title = format!("OBJ{}: {}", request.obj_number, request.title.to_uppercase());
        let description = self.codec.render_objective(&request.description);

        let mut labels = dedup_labels(&self.objective_labels);
        for extra in [&request.team_label, &request.product_label] {
            if !extra.is_empty() && !labels.contains(extra) {
                labels.push(extra.clone());
            }
        }

        let ticket = self
            .store
            .create_ticket(&title, &description, &labels)
            .await?;
        tracing::info!(iid = ticket.iid, "Created objective");
        Ok(self.to_response(ticket))
    }

    pub async fn get(&self, objective_iid: u64) -> OkrResult<ObjectiveResponse> {
        let ticket = self.store.get_ticket(objective_iid).await?;
        Ok(self.to_response(ticket))
    }

    pub async fn list(&self) -> OkrResult<Vec<ObjectiveResponse>> {
        let tickets = self.store.list_tickets(&self.objective_labels).await?;
        Ok(tickets
            .into_iter()
            .map(|ticket| self.to_response(ticket))
            .collect())
    }

    /// Merge the supplied fields over the current document and write the
    /// re-rendered whole back. The `### Resultados Chave` section is
    /// carried through verbatim so checklist references are never lost.
    pub async fn update(
        &self,
        objective_iid: u64,
        request: ObjectiveUpdateRequest,
    ) -> OkrResult<ObjectiveResponse> {
        let ticket = self.store.get_ticket(objective_iid).await?;

        let mut update = TicketUpdate::default();

        if let FieldUpdate::Set(new_title) = &request.title {
            // The rendered title keeps the ticket's objective prefix; only
            // the human text changes.
            let prefix = self.classifier.objective_prefix(&ticket.title, ticket.iid);
            update.title = Some(format!("{}: {}", prefix, new_title.to_uppercase()));
        }

        if !request.description.is_unchanged() {
            let fields = self.codec.parse_objective(ticket.description_text());
            let description = request.description.clone().resolve(fields.description);
            update.description = Some(
                self.codec
                    .render_objective_with_section(&description, &fields.kr_section),
            );
        }

        let updated = self.store.update_ticket(objective_iid, update).await?;
        tracing::info!(iid = objective_iid, "Updated objective");
        Ok(self.to_response(updated))
    }
}
