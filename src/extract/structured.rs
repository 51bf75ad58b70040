//! Schema.org `JobPosting` objects embedded as JSON-LD.
//!
//! ATS pages (Workday especially) ship a JSON-LD block describing the opening
//! independently of the visual layout. It is the most reliable title source
//! when present. Blocks that fail to parse are skipped; one broken script tag
//! must not hide a valid one further down the page.

use serde_json::Value;
use tracing::debug;

const JOB_POSTING_TYPE: &str = "JobPosting";

/// The fields of a `JobPosting` the cascade cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPosting {
    pub title: Option<String>,
    pub hiring_organization: Option<String>,
}

/// First `JobPosting` across `blocks`, in document order.
///
/// Each block may be a single object, a list of objects, or an object with an
/// `@graph` list. The first object whose `@type` is (or includes)
/// `JobPosting` is returned even if it carries no usable fields.
pub fn find_job_posting<'a, I>(blocks: I) -> Option<JobPosting>
where
    I: IntoIterator<Item = &'a str>,
{
    blocks.into_iter().enumerate().find_map(|(idx, raw)| {
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => find_in_value(&value),
            Err(e) => {
                debug!("Skipping malformed JSON-LD block #{}: {}", idx, e);
                None
            }
        }
    })
}

fn find_in_value(value: &Value) -> Option<JobPosting> {
    match value {
        Value::Array(items) => items.iter().find_map(posting_from_object),
        Value::Object(map) => posting_from_object(value).or_else(|| {
            map.get("@graph")
                .and_then(Value::as_array)
                .and_then(|graph| graph.iter().find_map(posting_from_object))
        }),
        _ => None,
    }
}

fn posting_from_object(value: &Value) -> Option<JobPosting> {
    let obj = value.as_object()?;
    let is_job = match obj.get("@type") {
        Some(Value::String(t)) => t == JOB_POSTING_TYPE,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(JOB_POSTING_TYPE)),
        _ => false,
    };
    if !is_job {
        return None;
    }

    let title = non_empty_str(obj.get("title")).or_else(|| {
        obj.get("identifier")
            .and_then(|id| non_empty_str(id.get("name")))
    });
    let hiring_organization = obj
        .get("hiringOrganization")
        .and_then(|org| non_empty_str(org.get("name")));

    Some(JobPosting {
        title,
        hiring_organization,
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object() {
        let block = r#"{"@context":"https://schema.org","@type":"JobPosting",
            "title":" Staff Engineer ","hiringOrganization":{"@type":"Organization","name":"Initech"}}"#;
        let p = find_job_posting([block]).unwrap();
        assert_eq!(p.title.as_deref(), Some("Staff Engineer"));
        assert_eq!(p.hiring_organization.as_deref(), Some("Initech"));
    }

    #[test]
    fn list_and_type_array() {
        let block = r#"[{"@type":"BreadcrumbList"},{"@type":["Thing","JobPosting"],"title":"QA Lead"}]"#;
        let p = find_job_posting([block]).unwrap();
        assert_eq!(p.title.as_deref(), Some("QA Lead"));
        assert_eq!(p.hiring_organization, None);
    }

    #[test]
    fn graph_container() {
        let block = r#"{"@context":"https://schema.org","@graph":[
            {"@type":"WebPage"},{"@type":"JobPosting","title":"Nurse"}]}"#;
        assert_eq!(
            find_job_posting([block]).unwrap().title.as_deref(),
            Some("Nurse")
        );
    }

    #[test]
    fn identifier_name_backs_up_title() {
        let block = r#"{"@type":"JobPosting","identifier":{"name":"Req 42 Welder"}}"#;
        assert_eq!(
            find_job_posting([block]).unwrap().title.as_deref(),
            Some("Req 42 Welder")
        );
    }

    #[test]
    fn malformed_block_is_skipped() {
        let broken = r#"{"@type":"JobPosting","title": "#;
        let good = r#"{"@type":"JobPosting","title":"Chef"}"#;
        let p = find_job_posting([broken, good]).unwrap();
        assert_eq!(p.title.as_deref(), Some("Chef"));
    }

    #[test]
    fn first_matching_block_wins() {
        let a = r#"{"@type":"JobPosting"}"#;
        let b = r#"{"@type":"JobPosting","title":"Later"}"#;
        assert_eq!(find_job_posting([a, b]), Some(JobPosting::default()));
    }

    #[test]
    fn no_job_posting() {
        assert_eq!(find_job_posting([r#"{"@type":"Organization"}"#, "42"]), None);
        assert_eq!(find_job_posting(Vec::<&str>::new()), None);
    }
}
