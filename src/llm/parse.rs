use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Key under which unparseable model output is returned.
pub const RAW_RESPONSE_KEY: &str = "raw_response";

const INTRO_SECTION: &str = "intro";

/// Pulls the body out of a ```` ```json ```` (or bare ```` ``` ````) fence.
/// Text without a fence is returned unchanged.
pub fn strip_code_fence(response: &str) -> &str {
    if let Some((_, rest)) = response.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest);
    }
    if let Some((_, rest)) = response.split_once("```") {
        return rest.split("```").next().unwrap_or(rest);
    }
    response
}

/// Best-effort JSON object extraction from model output. Never fails:
/// anything that is not a JSON object comes back as
/// `{"raw_response": <original text>}`.
pub fn parse_json_response(response: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(strip_code_fence(response).trim()) {
        Ok(Value::Object(map)) => map,
        _ => {
            // Keep the unstripped reply so callers see exactly what the model sent.
            let mut fallback = Map::new();
            fallback.insert(RAW_RESPONSE_KEY.to_string(), Value::String(response.to_string()));
            fallback
        }
    }
}

fn section_key(heading: &str) -> String {
    heading.trim().to_lowercase().replace(' ', "_")
}

/// Splits a markdown report on `## ` headings.
///
/// Every heading yields an entry, even with an empty body. Text before the
/// first heading is kept under `intro` when it has any non-blank line.
pub fn split_sections(markdown: &str) -> IndexMap<String, String> {
    let mut sections = IndexMap::new();
    if markdown.is_empty() {
        return sections;
    }

    let mut current: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    let mut flush = |current: Option<String>, body: &mut Vec<&str>| {
        match current {
            Some(key) => {
                sections.insert(key, body.join("\n"));
            }
            None if body.iter().any(|line| !line.trim().is_empty()) => {
                sections.insert(INTRO_SECTION.to_string(), body.join("\n"));
            }
            None => {}
        }
        body.clear();
    };

    for line in markdown.split('\n') {
        if let Some(heading) = line.strip_prefix("## ") {
            flush(current.take(), &mut body);
            current = Some(section_key(heading));
        } else {
            body.push(line);
        }
    }
    flush(current, &mut body);

    sections
}
