use serde_json::{Map, Value};

use crate::domain::{
    intel::PartnerCandidate,
    lead_business::{
        EmailStatus, LeadBusiness, LeadBusinessType, PartnershipScore, PotentialValue,
    },
};

// Candidate source keys per field, in order of preference. Producers use either
// snake_case or camelCase, and some use their own names for the title.
const POSITION: &[&str] = &["position", "rank"];
const TITLE: &[&str] = &["title", "name", "business_name", "businessName"];
const PLACE_ID: &[&str] = &["place_id", "placeId"];
const ADDRESS: &[&str] = &["address", "full_address", "fullAddress"];
const CITY: &[&str] = &["city"];
const STATE: &[&str] = &["state"];
const ZIP: &[&str] = &["zip", "zip_code", "zipCode", "postal_code", "postalCode"];
const PHONE: &[&str] = &["phone", "phone_number", "phoneNumber"];
const WEBSITE: &[&str] = &["website", "website_url", "websiteUrl"];
const EMAIL: &[&str] = &["email"];
const EMAIL_STATUS: &[&str] = &["email_status", "emailStatus"];
const RATING: &[&str] = &["rating"];
const REVIEW_COUNT: &[&str] = &["review_count", "reviewCount", "reviews_count", "reviewsCount"];
const BUSINESS_TYPE: &[&str] = &["business_type", "businessType"];
const INDUSTRY: &[&str] = &["industry"];
const CATEGORY: &[&str] = &["category", "type"];

const PARTNERSHIP: &[&str] = &["partnership"];
const PARTNERSHIP_SCORE: &[&str] = &["partnership_score", "partnershipScore", "score"];
const PARTNERSHIP_FACTORS: &[&str] = &["partnership_factors", "partnershipFactors", "factors"];
const REFERRAL_TRIGGER: &[&str] = &["referral_trigger", "referralTrigger"];
const SUGGESTED_APPROACH: &[&str] = &[
    "suggested_approach",
    "suggestedApproach",
    "approach_script",
    "approachScript",
];
const POTENTIAL_VALUE: &[&str] = &["potential_value", "potentialValue"];

/// Maps every raw provider object; the output has the same length and order.
pub fn map_results(raw: &[Value]) -> Vec<LeadBusiness> {
    raw.iter().map(map_result).collect()
}

pub fn map_result(raw: &Value) -> LeadBusiness {
    let Some(fields) = raw.as_object() else {
        return LeadBusiness::default();
    };

    let business_type = LeadBusinessType::coerce(text(fields, BUSINESS_TYPE).as_deref());
    let partnership = match business_type {
        Some(LeadBusinessType::Partner) => partnership(fields),
        _ => None,
    };

    LeadBusiness {
        position: integer(fields, POSITION),
        title: text(fields, TITLE),
        place_id: text(fields, PLACE_ID),
        address: text(fields, ADDRESS),
        city: text(fields, CITY),
        state: text(fields, STATE),
        zip: text(fields, ZIP),
        phone: text(fields, PHONE),
        website: text(fields, WEBSITE),
        email: text(fields, EMAIL),
        email_status: text(fields, EMAIL_STATUS).map(|s| EmailStatus::parse(&s)),
        rating: number(fields, RATING),
        review_count: integer(fields, REVIEW_COUNT),
        business_type,
        industry: text(fields, INDUSTRY),
        category: text(fields, CATEGORY),
        partnership,
    }
}

/// Maps one `topPartners` entry. `None` when the entry is not an object.
pub fn map_partner(raw: &Value) -> Option<PartnerCandidate> {
    let fields = raw.as_object()?;
    let scoring = pick(fields, PARTNERSHIP)
        .and_then(Value::as_object)
        .unwrap_or(fields);

    Some(PartnerCandidate {
        place_id: text(fields, PLACE_ID).filter(|p| !p.trim().is_empty()),
        name: text(fields, TITLE),
        address: text(fields, ADDRESS),
        phone: text(fields, PHONE),
        website: text(fields, WEBSITE),
        category: text(fields, CATEGORY),
        rating: number(fields, RATING),
        partnership_score: number(scoring, PARTNERSHIP_SCORE),
        referral_trigger: text(scoring, REFERRAL_TRIGGER),
        suggested_approach: text(scoring, SUGGESTED_APPROACH),
        potential_value: text(scoring, POTENTIAL_VALUE),
    })
}

/// Scoring may come nested under `partnership` or flat on the result itself.
fn partnership(fields: &Map<String, Value>) -> Option<PartnershipScore> {
    let source = pick(fields, PARTNERSHIP)
        .and_then(Value::as_object)
        .unwrap_or(fields);

    let score = PartnershipScore {
        score: number(source, PARTNERSHIP_SCORE),
        factors: tags(source, PARTNERSHIP_FACTORS),
        referral_trigger: text(source, REFERRAL_TRIGGER),
        suggested_approach: text(source, SUGGESTED_APPROACH),
        potential_value: text(source, POTENTIAL_VALUE).and_then(|v| PotentialValue::parse(&v)),
    };

    (!score.is_empty()).then_some(score)
}

fn pick<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match pick(fields, keys)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(fields: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    match pick(fields, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn integer(fields: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    match pick(fields, keys)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn tags(fields: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match pick(fields, keys) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.to_string()))
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => vec![],
    }
}
