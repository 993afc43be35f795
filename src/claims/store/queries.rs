// SPDX-License-Identifier: MIT

//! The fixed read queries exposed as tools
//!
//! Identifier columns are compared as text (`col::text = $1`) so the same
//! statement works whether the column is `uuid` or `text`.

/// The single argument a read query takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryParam {
    HealthCard,
    UserId,
    ProviderId,
    PolicyId,
    ClaimId,
}

impl QueryParam {
    pub fn name(self) -> &'static str {
        match self {
            QueryParam::HealthCard => "health_card",
            QueryParam::UserId => "user_id",
            QueryParam::ProviderId => "provider_id",
            QueryParam::PolicyId => "policy_id",
            QueryParam::ClaimId => "claim_id",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            QueryParam::HealthCard => "The user's health card number",
            QueryParam::UserId => "The user's id",
            QueryParam::ProviderId => "The insurance provider's id",
            QueryParam::PolicyId => "The policy id",
            QueryParam::ClaimId => "The claim id",
        }
    }
}

/// Static description of a read query
#[derive(Debug, Clone, Copy)]
pub struct QuerySpec {
    pub tool_name: &'static str,
    pub description: &'static str,
    pub param: Option<QueryParam>,
    pub sql: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimsQuery {
    FindUserByHealthCard,
    UsersByProvider,
    PoliciesByUser,
    ActivePolicies,
    ClaimsByUser,
    ClaimDetails,
    ProviderDetails,
    ProviderPlans,
    PaymentsByPolicy,
    CoverageLimits,
    PreAuthorizations,
    DentalDetailsByUser,
    DrugDetailsByUser,
    HospitalVisitsByUser,
    VisionClaimsByUser,
    UserCoverageLimits,
    ClaimAuditLogs,
    UserClaimDocuments,
    UserPreferences,
    UserCommunications,
}

impl ClaimsQuery {
    pub const ALL: [ClaimsQuery; 20] = [
        ClaimsQuery::FindUserByHealthCard,
        ClaimsQuery::UsersByProvider,
        ClaimsQuery::PoliciesByUser,
        ClaimsQuery::ActivePolicies,
        ClaimsQuery::ClaimsByUser,
        ClaimsQuery::ClaimDetails,
        ClaimsQuery::ProviderDetails,
        ClaimsQuery::ProviderPlans,
        ClaimsQuery::PaymentsByPolicy,
        ClaimsQuery::CoverageLimits,
        ClaimsQuery::PreAuthorizations,
        ClaimsQuery::DentalDetailsByUser,
        ClaimsQuery::DrugDetailsByUser,
        ClaimsQuery::HospitalVisitsByUser,
        ClaimsQuery::VisionClaimsByUser,
        ClaimsQuery::UserCoverageLimits,
        ClaimsQuery::ClaimAuditLogs,
        ClaimsQuery::UserClaimDocuments,
        ClaimsQuery::UserPreferences,
        ClaimsQuery::UserCommunications,
    ];

    pub fn spec(self) -> QuerySpec {
        use QueryParam::*;

        let (tool_name, description, param, sql) = match self {
            ClaimsQuery::FindUserByHealthCard => (
                "find_user_by_health_card_or_id",
                "Search user using health card number",
                Some(HealthCard),
                "SELECT * FROM users WHERE health_card = $1",
            ),
            ClaimsQuery::UsersByProvider => (
                "get_users_by_provider",
                "Find all users associated with a specific insurance provider",
                Some(ProviderId),
                "SELECT user_id, name, email, phone FROM users WHERE provider_id::text = $1",
            ),
            ClaimsQuery::PoliciesByUser => (
                "get_policies_by_user",
                "Retrieve all insurance policies for a specific user",
                Some(UserId),
                r#"SELECT p.policy_id, p.policy_number, p.plan_type,
                          p.coverage_start, p.coverage_end, p.monthly_premium,
                          ip.name AS provider_name
                   FROM policies p
                   JOIN insurance_providers ip ON p.provider_id = ip.provider_id
                   WHERE p.user_id::text = $1 AND p.active = TRUE"#,
            ),
            ClaimsQuery::ActivePolicies => (
                "get_active_policies",
                "List all currently active insurance policies",
                None,
                r#"SELECT p.policy_id, u.name AS user_name, ip.name AS provider_name,
                          p.policy_number, p.coverage_end, p.monthly_premium
                   FROM policies p
                   JOIN users u ON p.user_id = u.user_id
                   JOIN insurance_providers ip ON p.provider_id = ip.provider_id
                   WHERE p.active = TRUE"#,
            ),
            ClaimsQuery::ClaimsByUser => (
                "get_claims_by_user_id",
                "Retrieve all claims submitted by a specific user",
                Some(UserId),
                r#"SELECT c.claim_id, c.service_date, c.claim_type,
                          c.amount_claimed, c.amount_approved, c.status,
                          p.policy_number
                   FROM claims c
                   JOIN policies p ON c.policy_id = p.policy_id
                   WHERE c.user_id::text = $1
                   ORDER BY c.service_date DESC"#,
            ),
            ClaimsQuery::ClaimDetails => (
                "get_claim_details",
                "Get detailed information about a specific claim",
                Some(ClaimId),
                r#"SELECT c.claim_id, c.user_id, c.provider_id, c.policy_id,
                          c.service_date, c.claim_type, c.service_code, c.description,
                          c.amount_claimed, c.amount_approved, c.status, c.submitted_at,
                          u.name AS user_name, p.policy_number, ip.name AS provider_name
                   FROM claims c
                   JOIN users u ON c.user_id = u.user_id
                   JOIN policies p ON c.policy_id = p.policy_id
                   JOIN insurance_providers ip ON c.provider_id = ip.provider_id
                   WHERE c.claim_id::text = $1"#,
            ),
            ClaimsQuery::ProviderDetails => (
                "get_provider_details",
                "Get information about an insurance provider",
                Some(ProviderId),
                r#"SELECT provider_id, name, description
                   FROM insurance_providers
                   WHERE provider_id::text = $1"#,
            ),
            ClaimsQuery::ProviderPlans => (
                "get_provider_plans",
                "List all available plans from a specific insurance provider",
                Some(ProviderId),
                r#"SELECT plan_id, name, description, base_premium,
                          drug_limit, dental_limit, vision_limit
                   FROM provider_plans
                   WHERE provider_id::text = $1"#,
            ),
            ClaimsQuery::PaymentsByPolicy => (
                "get_payments_by_policy",
                "Retrieve payment history for a specific policy",
                Some(PolicyId),
                r#"SELECT payment_id, due_date, paid_date,
                          amount_due, amount_paid, payment_status
                   FROM premium_payments
                   WHERE policy_id::text = $1
                   ORDER BY due_date DESC"#,
            ),
            ClaimsQuery::CoverageLimits => (
                "get_coverage_limits",
                "Get coverage limits and usage for a specific user",
                Some(UserId),
                r#"SELECT claim_type, year, max_coverage, used_coverage
                   FROM coverage_limits
                   WHERE user_id::text = $1
                   ORDER BY year DESC, claim_type"#,
            ),
            ClaimsQuery::PreAuthorizations => (
                "get_pre_authorizations",
                "Retrieve pre-authorization requests for a user",
                Some(UserId),
                r#"SELECT auth_id, service_requested, estimated_cost,
                          request_date, approved_date, status
                   FROM pre_authorizations
                   WHERE user_id::text = $1
                   ORDER BY request_date DESC"#,
            ),
            ClaimsQuery::DentalDetailsByUser => (
                "get_dental_details_by_user",
                "Retrieve all dental details for a specific user with procedure details",
                Some(UserId),
                r#"SELECT c.claim_id, c.service_date, c.status,
                          d.category, d.tooth_code, d.procedure_code
                   FROM claims c
                   JOIN dental_details d ON c.claim_id = d.claim_id
                   WHERE c.user_id::text = $1
                   ORDER BY c.service_date DESC"#,
            ),
            ClaimsQuery::DrugDetailsByUser => (
                "get_drug_details_by_user",
                "Get all prescription drug details for a user with medication details",
                Some(UserId),
                r#"SELECT c.claim_id, c.service_date, c.status,
                          d.drug_name, d.din_code, d.quantity, d.dosage
                   FROM claims c
                   JOIN drug_details d ON c.claim_id = d.claim_id
                   WHERE c.user_id::text = $1
                   ORDER BY c.service_date DESC"#,
            ),
            ClaimsQuery::HospitalVisitsByUser => (
                "get_hospital_visits_by_user",
                "Retrieve all hospital visits for a user with stay details",
                Some(UserId),
                r#"SELECT c.claim_id, c.service_date, c.status,
                          h.room_type, h.admission_date, h.discharge_date
                   FROM claims c
                   JOIN hospital_visits h ON c.claim_id = h.claim_id
                   WHERE c.user_id::text = $1
                   ORDER BY h.admission_date DESC"#,
            ),
            ClaimsQuery::VisionClaimsByUser => (
                "get_vision_claims_by_user",
                "Get all vision care claims for a user with product details",
                Some(UserId),
                r#"SELECT c.claim_id, c.service_date, c.status,
                          v.product_type, v.coverage_limit, v.eligibility_date
                   FROM claims c
                   JOIN vision_claims v ON c.claim_id = v.claim_id
                   WHERE c.user_id::text = $1
                   ORDER BY c.service_date DESC"#,
            ),
            ClaimsQuery::UserCoverageLimits => (
                "get_user_coverage_limits",
                "Retrieve all coverage limits and usage for a specific user",
                Some(UserId),
                r#"SELECT claim_type, year, max_coverage, used_coverage,
                          (max_coverage - used_coverage) AS remaining_coverage
                   FROM coverage_limits
                   WHERE user_id::text = $1
                   ORDER BY year DESC, claim_type"#,
            ),
            ClaimsQuery::ClaimAuditLogs => (
                "get_claim_audit_logs",
                "Get audit history for all claims belonging to a user",
                Some(UserId),
                r#"SELECT a.audit_id, a.event_time, a.event_type,
                          a.performed_by, c.claim_id, c.claim_type
                   FROM claim_audit_logs a
                   JOIN claims c ON a.claim_id = c.claim_id
                   WHERE c.user_id::text = $1
                   ORDER BY a.event_time DESC
                   LIMIT 50"#,
            ),
            ClaimsQuery::UserClaimDocuments => (
                "get_user_claim_documents",
                "Retrieve all documents submitted with a user's claims",
                Some(UserId),
                r#"SELECT d.document_id, d.file_name, d.uploaded_at,
                          d.document_type, c.claim_id, c.claim_type
                   FROM claim_documents d
                   JOIN claims c ON d.claim_id = c.claim_id
                   WHERE c.user_id::text = $1
                   ORDER BY d.uploaded_at DESC"#,
            ),
            ClaimsQuery::UserPreferences => (
                "get_user_preferences",
                "Get communication preferences and settings for a user",
                Some(UserId),
                r#"SELECT communication_opt_in, consent_to_share_data,
                          language_preference, timezone
                   FROM user_preferences
                   WHERE user_id::text = $1"#,
            ),
            ClaimsQuery::UserCommunications => (
                "get_user_communications",
                "Retrieve all communications sent to/from a user",
                Some(UserId),
                r#"SELECT log_id, type, subject, sent_at, status
                   FROM communications_log
                   WHERE user_id::text = $1
                   ORDER BY sent_at DESC
                   LIMIT 50"#,
            ),
        };

        QuerySpec {
            tool_name,
            description,
            param,
            sql,
        }
    }

    pub fn arity(self) -> usize {
        usize::from(self.spec().param.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tool_names_are_unique() {
        let names: HashSet<_> = ClaimsQuery::ALL.iter().map(|q| q.spec().tool_name).collect();
        assert_eq!(names.len(), ClaimsQuery::ALL.len());
    }

    #[test]
    fn test_placeholder_matches_arity() {
        for query in ClaimsQuery::ALL {
            let spec = query.spec();
            assert_eq!(
                spec.sql.contains("$1"),
                query.arity() == 1,
                "{} placeholder/arity mismatch",
                spec.tool_name
            );
            assert!(!spec.sql.contains("$2"), "{} takes one argument", spec.tool_name);
        }
    }

    #[test]
    fn test_only_active_policies_is_parameterless() {
        let parameterless: Vec<_> = ClaimsQuery::ALL
            .iter()
            .filter(|q| q.arity() == 0)
            .map(|q| q.spec().tool_name)
            .collect();
        assert_eq!(parameterless, vec!["get_active_policies"]);
    }

    #[test]
    fn test_find_user_uses_health_card() {
        let spec = ClaimsQuery::FindUserByHealthCard.spec();
        assert_eq!(spec.param, Some(QueryParam::HealthCard));
        assert_eq!(spec.param.unwrap().name(), "health_card");
    }
}
