//! Prompt templates. Every constrained field lists its legal values from the
//! core vocabulary tables.

use casedesk_core::vocab::{
  CaseSource, CaseStatus, Complexity, Marketplace, Priority, SellerType,
  SubStatus, Workstream, listing,
};

pub const TEMPERATURE: f32 = 0.1;

pub const INTENT_MAX_TOKENS: u32 = 50;
pub const CASE_MAX_TOKENS: u32 = 400;
pub const UPDATE_MAX_TOKENS: u32 = 300;
pub const ANALYTICS_MAX_TOKENS: u32 = 300;

pub const CASE_SYSTEM: &str = "You are an expert at extracting structured data \
                               from API integration support conversations.";
pub const UPDATE_SYSTEM: &str =
  "You are an expert at extracting case update information.";
pub const ANALYTICS_SYSTEM: &str = "You are an expert at converting natural \
                                    language to database queries for case \
                                    analytics.";

pub fn intent(text: &str) -> String {
  format!(
    r#"Analyze this text and determine the intent:

Text: "{text}"

Return exactly one of these words: create, update, query, analytics

- "create" if this is about a new issue or case
- "update" if this is about updating an existing case
- "query" if this is asking for information about a specific case
- "analytics" if this is asking for statistics, counts, or analysis across multiple cases

Examples of analytics queries:
- "How many cases are in WIP?"
- "Show me EU marketplace cases"
- "Count of Smart Connect cases"
- "Cases by priority""#
  )
}

pub fn case(text: &str) -> String {
  format!(
    r#"Extract case information from this text: "{text}"

Return ONLY a JSON object with these fields (use null for missing):
{{
  "seller_name": "company or seller name",
  "case_reference": "marketplace case ID if mentioned (like AMZ-12345678)",
  "marketplace": "one of: {marketplaces}",
  "case_source": "one of: {sources}",
  "workstream": "one of: {workstreams}",
  "issue_type": "brief description of the issue",
  "complexity": "one of: {complexities}",
  "priority": "one of: {priorities}",
  "seller_type": "one of: {seller_types}",
  "api_area": "Product API/Inventory API/Orders API/Payment API/General API",
  "listing_start_date": "YYYY-MM-DD format if mentioned",
  "notes": "detailed description of the issue"
}}

Return JSON only:"#,
    marketplaces = listing::<Marketplace>(),
    sources = listing::<CaseSource>(),
    workstreams = listing::<Workstream>(),
    complexities = listing::<Complexity>(),
    priorities = listing::<Priority>(),
    seller_types = listing::<SellerType>(),
  )
}

pub fn update(text: &str) -> String {
  format!(
    r#"Extract update information from: "{text}"

Return ONLY a JSON object:
{{
  "case_id": "case ID mentioned (like CASE-0001)",
  "note": "what happened or what was done",
  "sub_status": "one of: {sub_statuses}",
  "listing_completion_date": "YYYY-MM-DD if mentioned as completed",
  "csat_score": "number between 1-5 if mentioned",
  "feedback_received": "Yes/No if mentioned"
}}

Return JSON only:"#,
    sub_statuses = listing::<SubStatus>(),
  )
}

pub fn analytics(text: &str) -> String {
  format!(
    r#"Convert this natural language query into filter conditions for case analysis:

Query: "{text}"

Available fields and values:
- case_status: {statuses}
- marketplace: {marketplaces}
- workstream: {workstreams}
- priority: {priorities}
- sub_status: {sub_statuses}
- seller_type: {seller_types}

Return JSON with filters and grouping:
{{
  "filters": {{
    "case_status": ["WIP"] or null,
    "marketplace": ["EU"] or null,
    "workstream": ["STRATEGIC_PRODUCT_SMART_CONNECT_EU"] or null,
    "priority": ["High"] or null,
    "sub_status": ["INT_WIP"] or null,
    "seller_type": ["NEW"] or null
  }},
  "group_by": "case_status" or "marketplace" or "workstream" or "priority" or "sub_status" or "seller_type" or null,
  "description": "human readable description of what is being analyzed"
}}

Return JSON only:"#,
    statuses = listing::<CaseStatus>(),
    marketplaces = listing::<Marketplace>(),
    workstreams = listing::<Workstream>(),
    priorities = listing::<Priority>(),
    sub_statuses = listing::<SubStatus>(),
    seller_types = listing::<SellerType>(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prompts_embed_text_and_vocabularies() {
    let p = case("Acme on EU has auth issues");
    assert!(p.contains("Acme on EU has auth issues"));
    assert!(p.contains("EU5, EU, 3PX"));
    assert!(p.contains("\"seller_name\""));

    let p = update("Update CASE-0001");
    assert!(p.contains("Case_Created"));
    assert!(p.contains("HANDOVER"));

    let p = analytics("How many WIP?");
    assert!(p.contains("AWAITING INFORMATION"));
  }
}
