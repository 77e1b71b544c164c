//! Key Result service

use std::sync::Arc;

use crate::config::Settings;
use crate::error::OkrResult;
use crate::gitlab::store::TicketStore;
use crate::gitlab::types::{Ticket, TicketUpdate};
use crate::models::{KrCreateRequest, KrResponse, KrUpdateRequest};
use crate::okr::classifier::{classify_labels, TitleClassifier};
use crate::okr::document::{DocumentCodec, KrFields};
use crate::okr::hierarchy::HierarchyResolver;

use super::{dedup_labels, validate_percent};

pub struct KrService {
    store: Arc<dyn TicketStore>,
    codec: DocumentCodec,
    classifier: TitleClassifier,
    resolver: HierarchyResolver,
    kr_labels: Vec<String>,
    kr_reference_label: String,
}

impl KrService {
    pub fn new(store: Arc<dyn TicketStore>, settings: &Settings) -> Self {
        let resolver = HierarchyResolver::new(
            store.clone(),
            settings.gitlab_objective_labels.clone(),
            settings.gitlab_kr_labels.clone(),
        );
        Self {
            store,
            codec: DocumentCodec::new(),
            classifier: TitleClassifier::new(),
            resolver,
            kr_labels: settings.gitlab_kr_labels.clone(),
            kr_reference_label: settings.kr_reference_label.clone(),
        }
    }

    fn to_response(&self, ticket: Ticket, objective_iid: Option<u64>) -> KrResponse {
        let classification = classify_labels(&ticket.labels);
        let title_parts = self.classifier.split_kr_title(&ticket.title);
        KrResponse {
            id: ticket.iid,
            title: ticket.title,
            kr_number: title_parts.kr_number,
            display_title: title_parts.display_title,
            description: ticket.description.unwrap_or_default(),
            web_url: ticket.web_url,
            objective_iid,
            team_label: classification.team_label,
            product_label: classification.product_label,
        }
    }

    /// Create a KR ticket under an objective.
    ///
    /// The KR ticket itself is the operation's primary effect. The link to
    /// the objective and the objective's checklist rewrite are best-effort
    /// enrichment: their failures are logged and swallowed, never rolled
    /// back into a failure of the creation.
    pub async fn create(&self, request: KrCreateRequest) -> OkrResult<KrResponse> {
        validate_percent(request.meta_prevista, "meta_prevista")?;
        validate_percent(request.meta_realizada, "meta_realizada")?;

        let parent = self.store.get_ticket(request.objective_iid).await?;
        let prefix = self.classifier.objective_prefix(&parent.title, parent.iid);
        let title = format!("{} - KR{}: {}", prefix, request.kr_number, request.title);

        let fields = KrFields::new(
            request.description,
            request.meta_prevista,
            request.meta_realizada,
            request.responsaveis,
        );
        let description = self.codec.render_kr(&fields);

        let mut labels = dedup_labels(&self.kr_labels);
        for extra in [&request.team_label, &request.product_label] {
            if let Some(label) = extra {
                if !label.is_empty() && !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
        }

        let kr = self
            .store
            .create_ticket(&title, &description, &labels)
            .await?;
        tracing::info!(iid = kr.iid, objective_iid = parent.iid, "Created KR");

        if let Err(e) = self.store.link_tickets(kr.iid, parent.iid).await {
            tracing::warn!(
                kr_iid = kr.iid,
                objective_iid = parent.iid,
                error = %e,
                "Failed to link KR to objective"
            );
        }

        if let Err(e) = self.append_checklist_reference(&kr, parent.iid).await {
            tracing::warn!(
                kr_iid = kr.iid,
                objective_iid = parent.iid,
                error = %e,
                "Failed to add KR reference to objective description"
            );
        }

        Ok(self.to_response(kr, Some(parent.iid)))
    }

    /// Rewrite the parent objective's description with a checklist line for
    /// the new KR. Re-fetches the objective so the rewrite starts from the
    /// freshest description the store will give us.
    async fn append_checklist_reference(&self, kr: &Ticket, objective_iid: u64) -> OkrResult<()> {
        let parent = self.store.get_ticket(objective_iid).await?;
        let line = DocumentCodec::checklist_line(&kr.title, &self.kr_reference_label);
        let updated = self
            .codec
            .insert_checklist_line(parent.description_text(), &line);
        self.store
            .update_ticket(objective_iid, TicketUpdate::description(updated))
            .await?;
        Ok(())
    }

    pub async fn get(&self, kr_iid: u64) -> OkrResult<KrResponse> {
        let ticket = self.store.get_ticket(kr_iid).await?;
        let objective_iid = match self.resolver.objective_of_kr(kr_iid).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(kr_iid, error = %e, "Failed to resolve parent objective");
                None
            }
        };
        Ok(self.to_response(ticket, objective_iid))
    }

    /// Merge a partial field update over the stored document and write the
    /// re-rendered whole back. The activity table survives untouched.
    pub async fn update(&self, kr_iid: u64, request: KrUpdateRequest) -> OkrResult<KrResponse> {
        if let Some(value) = request.meta_prevista.as_set() {
            validate_percent(*value, "meta_prevista")?;
        }
        if let Some(value) = request.meta_realizada.as_set() {
            validate_percent(*value, "meta_realizada")?;
        }

        if request.is_empty() {
            return self.get(kr_iid).await;
        }

        let ticket = self.store.get_ticket(kr_iid).await?;
        let description = self
            .codec
            .apply_kr_update(ticket.description_text(), &request);
        let updated = self
            .store
            .update_ticket(kr_iid, TicketUpdate::description(description))
            .await?;
        tracing::info!(iid = kr_iid, "Updated KR");

        let objective_iid = self.resolver.objective_of_kr(kr_iid).await.unwrap_or(None);
        Ok(self.to_response(updated, objective_iid))
    }

    /// Replace the raw description wholesale, bypassing the codec. The
    /// escape hatch for descriptions edited outside the structured fields.
    pub async fn replace_description(
        &self,
        kr_iid: u64,
        description: String,
    ) -> OkrResult<KrResponse> {
        let updated = self
            .store
            .update_ticket(kr_iid, TicketUpdate::description(description))
            .await?;
        let objective_iid = self.resolver.objective_of_kr(kr_iid).await.unwrap_or(None);
        Ok(self.to_response(updated, objective_iid))
    }

    /// All KRs linked to one objective, via forward link resolution.
    pub async fn list_for_objective(&self, objective_iid: u64) -> OkrResult<Vec<KrResponse>> {
        let tickets = self.resolver.krs_of_objective(objective_iid).await?;
        Ok(tickets
            .into_iter()
            .map(|ticket| self.to_response(ticket, Some(objective_iid)))
            .collect())
    }

    /// Same question answered from the KR side: scan KR-labeled tickets
    /// and keep those holding a link to the objective. Slower, but immune
    /// to an objective whose own link list is stale.
    pub async fn list_for_objective_by_scan(
        &self,
        objective_iid: u64,
    ) -> OkrResult<Vec<KrResponse>> {
        let tickets = self.resolver.krs_of_objective_by_scan(objective_iid).await?;
        Ok(tickets
            .into_iter()
            .map(|ticket| self.to_response(ticket, Some(objective_iid)))
            .collect())
    }

    /// All KR-labeled tickets regardless of objective. Parent resolution
    /// is skipped here; it would cost one link listing per KR.
    pub async fn list_all(&self) -> OkrResult<Vec<KrResponse>> {
        let tickets = self.store.list_tickets(&self.kr_labels).await?;
        Ok(tickets
            .into_iter()
            .map(|ticket| self.to_response(ticket, None))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OkrError;
    use crate::gitlab::memory::InMemoryTicketStore;
    use crate::models::FieldUpdate;
    use crate::services::objective_service::ObjectiveService;

    fn settings() -> Settings {
        Settings {
            gitlab_api_url: "https://gitlab.example.com".to_string(),
            gitlab_access_token: "token".to_string(),
            gitlab_project_id: "okr/okr".to_string(),
            gitlab_objective_labels: vec!["OKR::Objetivo".to_string()],
            gitlab_kr_labels: vec!["OKR::KR".to_string()],
            kr_reference_label: "OKR::KR".to_string(),
            auth_username: String::new(),
            auth_password: String::new(),
            auth_secret: String::new(),
            auth_token_expire_minutes: 30,
            port: 8000,
        }
    }

    async fn create_objective(store: &Arc<InMemoryTicketStore>) -> u64 {
        let service = ObjectiveService::new(store.clone(), &settings());
        service
            .create(crate::models::ObjectiveCreateRequest {
                obj_number: 1,
                title: "Parent Objective Title".to_string(),
                description: "Why this matters".to_string(),
                team_label: "TEAM::Growth".to_string(),
                product_label: "PRODUCT::Checkout".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn kr_request(objective_iid: u64) -> KrCreateRequest {
        KrCreateRequest {
            objective_iid,
            kr_number: 1,
            title: "New KR Title".to_string(),
            description: "KR details here".to_string(),
            meta_prevista: 100.0,
            meta_realizada: 0.0,
            responsaveis: vec!["User One".to_string(), "User Two".to_string()],
            team_label: None,
            product_label: None,
        }
    }

    #[tokio::test]
    async fn create_composes_title_links_and_rewrites_parent() {
        let store = Arc::new(InMemoryTicketStore::new());
        let objective_iid = create_objective(&store).await;
        let service = KrService::new(store.clone(), &settings());

        let response = service.create(kr_request(objective_iid)).await.unwrap();

        assert_eq!(response.title, "OBJ1 - KR1: New KR Title");
        assert_eq!(response.objective_iid, Some(objective_iid));
        assert!(response.description.contains("> KR details here"));
        assert!(response.description.contains("**Meta prevista**: 100%"));
        assert!(response
            .description
            .contains("**Responsável(eis)**: User One, User Two"));
        assert!(response.description.contains("| Projetos/Ações/Atividades |"));

        // The link record exists, KR as source.
        let linked = store.list_links(response.id).await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].iid, objective_iid);

        // The parent description now references the KR.
        let parent = store.get_ticket(objective_iid).await.unwrap();
        assert!(parent
            .description_text()
            .contains("- [ ] **OBJ1 - KR1: New KR Title** ~\"OKR::KR\""));
    }

    #[tokio::test]
    async fn create_falls_back_to_parent_iid_prefix() {
        let store = Arc::new(InMemoryTicketStore::new());
        let parent = store
            .create_ticket(
                "Objective Without Standard Prefix",
                "Desc",
                &["OKR::Objetivo".to_string()],
            )
            .await
            .unwrap();
        let service = KrService::new(store.clone(), &settings());

        let mut request = kr_request(parent.iid);
        request.kr_number = 3;
        let response = service.create(request).await.unwrap();

        assert_eq!(
            response.title,
            format!("OBJ{} - KR3: New KR Title", parent.iid)
        );

        // The checklist section did not exist; it was appended.
        let updated_parent = store.get_ticket(parent.iid).await.unwrap();
        assert!(updated_parent
            .description_text()
            .contains("### Resultados Chave"));
    }

    #[tokio::test]
    async fn create_with_missing_parent_surfaces_not_found() {
        let store = Arc::new(InMemoryTicketStore::new());
        let service = KrService::new(store, &settings());
        let err = service.create(kr_request(999)).await.unwrap_err();
        assert!(matches!(err, OkrError::NotFound(999)));
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_percent() {
        let store = Arc::new(InMemoryTicketStore::new());
        let objective_iid = create_objective(&store).await;
        let service = KrService::new(store, &settings());

        let mut request = kr_request(objective_iid);
        request.meta_prevista = 120.0;
        let err = service.create(request).await.unwrap_err();
        assert!(matches!(err, OkrError::Validation(_)));
    }

    #[tokio::test]
    async fn update_merges_single_field_and_keeps_the_rest() {
        let store = Arc::new(InMemoryTicketStore::new());
        let objective_iid = create_objective(&store).await;
        let service = KrService::new(store, &settings());
        let created = service.create(kr_request(objective_iid)).await.unwrap();

        let updated = service
            .update(
                created.id,
                KrUpdateRequest {
                    meta_realizada: FieldUpdate::Set(40.0),
                    ..KrUpdateRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, created.title);
        assert!(updated.description.contains("**Meta realizada**: 40%"));
        assert!(updated.description.contains("**Meta prevista**: 100%"));
        assert!(updated
            .description
            .contains("**Responsável(eis)**: User One, User Two"));
        assert_eq!(updated.objective_iid, Some(objective_iid));
    }

    #[tokio::test]
    async fn empty_update_is_a_read() {
        let store = Arc::new(InMemoryTicketStore::new());
        let objective_iid = create_objective(&store).await;
        let service = KrService::new(store, &settings());
        let created = service.create(kr_request(objective_iid)).await.unwrap();

        let unchanged = service
            .update(created.id, KrUpdateRequest::default())
            .await
            .unwrap();
        assert_eq!(unchanged.description, created.description);
    }

    #[tokio::test]
    async fn list_for_objective_returns_only_labeled_links() {
        let store = Arc::new(InMemoryTicketStore::new());
        let objective_iid = create_objective(&store).await;
        let service = KrService::new(store.clone(), &settings());
        let kr = service.create(kr_request(objective_iid)).await.unwrap();

        // A linked ticket without the KR label must be filtered out.
        let noise = store
            .create_ticket("Linked note", "", &["note".to_string()])
            .await
            .unwrap();
        store.link_tickets(noise.iid, objective_iid).await.unwrap();

        let krs = service.list_for_objective(objective_iid).await.unwrap();
        assert_eq!(krs.len(), 1);
        assert_eq!(krs[0].id, kr.id);
        assert_eq!(krs[0].objective_iid, Some(objective_iid));
    }

    #[tokio::test]
    async fn scan_resolution_agrees_with_forward_resolution() {
        let store = Arc::new(InMemoryTicketStore::new());
        let objective_iid = create_objective(&store).await;
        let service = KrService::new(store, &settings());
        let kr = service.create(kr_request(objective_iid)).await.unwrap();

        let forward = service.list_for_objective(objective_iid).await.unwrap();
        let scanned = service
            .list_for_objective_by_scan(objective_iid)
            .await
            .unwrap();

        assert_eq!(forward.len(), 1);
        assert_eq!(scanned.len(), 1);
        assert_eq!(forward[0].id, kr.id);
        assert_eq!(scanned[0].id, kr.id);
    }

    #[tokio::test]
    async fn list_for_missing_objective_is_empty() {
        let store = Arc::new(InMemoryTicketStore::new());
        let service = KrService::new(store, &settings());
        assert!(service.list_for_objective(999).await.unwrap().is_empty());
    }
}
