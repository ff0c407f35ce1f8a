//! Network-free mapping assist.
//!
//! Scores every header against every canonical field of the entity, then
//! hands out fields one-to-one, best score first. A header whose candidates
//! were all taken keeps its own name at zero confidence so it surfaces for
//! review. Scores:
//! - normalized exact match (alphanumerics only, case-folded): 1.0
//! - synonym table hit: 0.9
//! - otherwise a blend of Jaro-Winkler and Levenshtein similarity, scaled so
//!   that pure string likeness never reaches full confidence.

use crate::assist::{AssistSuggestion, MappingAssist};
use crate::error::AssistError;
use crate::model::RawRecord;
use crate::schema::EntityType;

const SYNONYM_SCORE: f64 = 0.9;
const SIMILARITY_CEILING: f64 = 0.85;
/// Below this the header keeps its own name.
const MIN_SCORE: f64 = 0.35;

/// Known aliases per canonical field, already normalized.
static SYNONYMS: &[(&str, &[&str])] = &[
    // clients
    ("ClientID", &["client", "clientid", "clientno", "clientnumber", "customerid", "custid", "cid"]),
    ("ClientName", &["clientname", "customer", "customername", "client", "company", "companyname"]),
    ("PriorityLevel", &["priority", "prio", "level", "importance", "rank"]),
    ("RequestedTaskIDs", &["tasks", "taskids", "requestedtasks", "requested", "tasklist"]),
    ("GroupTag", &["group", "tag", "clientgroup", "segment", "grouptag"]),
    ("AttributesJSON", &["attrs", "attributes", "metadata", "meta", "json", "extra", "properties"]),
    // workers
    ("WorkerID", &["worker", "workerid", "employeeid", "empid", "staffid", "wid"]),
    ("WorkerName", &["workername", "employee", "employeename", "staff", "staffname", "fullname"]),
    ("Skills", &["skill", "skillset", "abilities", "competencies"]),
    ("AvailableSlots", &["slots", "availability", "available", "freeslots", "openslots"]),
    ("MaxLoadPerPhase", &["maxload", "load", "capacity", "loadperphase", "maxperphase"]),
    ("WorkerGroup", &["group", "team", "department", "dept", "workergroup"]),
    ("QualificationLevel", &["qualification", "qual", "grade", "seniority", "experience"]),
    // tasks
    ("TaskID", &["task", "taskid", "jobid", "tid"]),
    ("TaskName", &["taskname", "title", "job", "jobname", "description"]),
    ("Category", &["cat", "type", "kind", "class"]),
    ("Duration", &["length", "durationphases", "time", "span"]),
    ("RequiredSkills", &["skills", "skillsneeded", "requirements", "needs", "reqskills"]),
    ("PreferredPhases", &["phases", "preferred", "phasewindow", "window", "schedule"]),
    ("MaxConcurrent", &["concurrency", "concurrent", "maxparallel", "parallel", "maxworkers"]),
];

/// Strip everything but ASCII alphanumerics and lower-case the rest.
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn synonyms_of(field: &str) -> &'static [&'static str] {
    SYNONYMS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, s)| *s)
        .unwrap_or(&[])
}

/// Confidence that `header` names `field`.
pub fn field_score(header: &str, field: &str) -> f64 {
    let h = normalize_key(header);
    let f = normalize_key(field);
    if h.is_empty() {
        return 0.0;
    }
    if h == f {
        return 1.0;
    }
    if synonyms_of(field).contains(&h.as_str()) {
        return SYNONYM_SCORE;
    }

    let jw = strsim::jaro_winkler(&h, &f);
    let lev = strsim::normalized_levenshtein(&h, &f);
    ((jw + lev) / 2.0) * SIMILARITY_CEILING
}

/// Local, deterministic assist.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAssist;

impl HeuristicAssist {
    /// One field per header and one header per field, highest score first.
    /// Ties go to the earlier header, then the earlier field.
    fn assign(headers: &[String], entity: EntityType) -> Vec<(String, f64)> {
        let fields = entity.canonical_fields();
        let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
        for (hi, header) in headers.iter().enumerate() {
            for (fi, field) in fields.iter().enumerate() {
                let score = field_score(header, field);
                if score >= MIN_SCORE {
                    candidates.push((hi, fi, score));
                }
            }
        }
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));

        let mut assigned: Vec<Option<(usize, f64)>> = vec![None; headers.len()];
        let mut taken = vec![false; fields.len()];
        for (hi, fi, score) in candidates {
            if assigned[hi].is_none() && !taken[fi] {
                assigned[hi] = Some((fi, score));
                taken[fi] = true;
            }
        }

        headers
            .iter()
            .zip(assigned)
            .map(|(header, slot)| match slot {
                Some((fi, score)) => (fields[fi].to_string(), score),
                None => (header.clone(), 0.0),
            })
            .collect()
    }
}

impl MappingAssist for HeuristicAssist {
    fn suggest_mapping(
        &self,
        headers: &[String],
        entity: EntityType,
        _samples: &[RawRecord],
    ) -> Result<Vec<AssistSuggestion>, AssistError> {
        Ok(headers
            .iter()
            .zip(Self::assign(headers, entity))
            .map(|(h, (suggested, confidence))| AssistSuggestion {
                original: h.clone(),
                suggested,
                confidence,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggest(entity: EntityType, names: &[&str]) -> Vec<AssistSuggestion> {
        let headers: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        HeuristicAssist.suggest_mapping(&headers, entity, &[]).unwrap()
    }

    #[test]
    fn normalized_exact_is_certain() {
        let out = suggest(EntityType::Clients, &["Client ID", "client_name"]);
        assert_eq!(out[0].suggested, "ClientID");
        assert_eq!(out[0].confidence, 1.0);
        assert_eq!(out[1].suggested, "ClientName");
        assert_eq!(out[1].confidence, 1.0);
    }

    #[test]
    fn synonyms_score_high() {
        let out = suggest(EntityType::Clients, &["Priority", "Attrs", "Group"]);
        assert_eq!(out[0].suggested, "PriorityLevel");
        assert_eq!(out[0].confidence, SYNONYM_SCORE);
        assert_eq!(out[1].suggested, "AttributesJSON");
        assert_eq!(out[2].suggested, "GroupTag");
    }

    #[test]
    fn similarity_never_reaches_certainty() {
        let out = suggest(EntityType::Workers, &["QualificationLvl"]);
        assert_eq!(out[0].suggested, "QualificationLevel");
        assert!(out[0].confidence < 0.9);
        assert!(out[0].confidence > MIN_SCORE);
    }

    #[test]
    fn unrelated_header_keeps_own_name() {
        let out = suggest(EntityType::Tasks, &["zzz"]);
        assert_eq!(out[0].suggested, "zzz");
        assert!(out[0].confidence < MIN_SCORE);
    }

    #[test]
    fn phases_goes_to_preferred_phases_when_duration_present() {
        let out = suggest(
            EntityType::Tasks,
            &["TaskID", "TaskName", "Category", "Duration", "RequiredSkills", "Phases", "MaxConcurrent"],
        );
        assert_eq!(out[3].suggested, "Duration");
        assert_eq!(out[5].suggested, "PreferredPhases");
        assert_eq!(out[5].confidence, SYNONYM_SCORE);
    }

    #[test]
    fn field_is_never_suggested_twice() {
        let out = suggest(EntityType::Clients, &["Customer ID", "Cust ID", "Client"]);
        assert_eq!(out[0].suggested, "ClientID");
        assert_ne!(out[1].suggested, "ClientID");
        assert_ne!(out[2].suggested, "ClientID");

        let mut named: Vec<&str> = out
            .iter()
            .filter(|s| s.confidence > 0.0)
            .map(|s| s.suggested.as_str())
            .collect();
        let total = named.len();
        named.sort();
        named.dedup();
        assert_eq!(named.len(), total);
    }

    #[test]
    fn repeated_header_does_not_reuse_field() {
        let out = suggest(EntityType::Tasks, &["TaskID", "Task ID"]);
        assert_eq!(out[0].suggested, "TaskID");
        assert_eq!(out[0].confidence, 1.0);
        assert_ne!(out[1].suggested, "TaskID");
    }

    #[test]
    fn header_with_every_field_taken_keeps_own_name() {
        let mut names: Vec<&str> = EntityType::Clients.canonical_fields().to_vec();
        names.push("Client Identifier");
        let out = suggest(EntityType::Clients, &names);
        assert_eq!(out[0].suggested, "ClientID");
        assert_eq!(out[6].suggested, "Client Identifier");
        assert_eq!(out[6].confidence, 0.0);
    }

    #[test]
    fn covers_every_header_once() {
        let names = ["a", "b", "TaskID", "Task Name"];
        let out = suggest(EntityType::Tasks, &names);
        let originals: Vec<&str> = out.iter().map(|s| s.original.as_str()).collect();
        assert_eq!(originals, names);
    }

    #[test]
    fn normalize_key_strips_punctuation() {
        assert_eq!(normalize_key(" Max-Load / Phase "), "maxloadphase");
    }
}
