//! Query matching against the cached corpus.
//!
//! A record matches when its field occurs inside the lowercased query, not
//! the other way round. "who works in sales?" therefore matches the Sales
//! department and every Sales employee, and a query naming nobody matches
//! nothing. Results keep corpus order (employees, then departments) and are
//! not deduplicated.

use crate::models::{Corpus, MatchResult};

pub fn retrieve<'a>(query: &str, corpus: &'a Corpus) -> Vec<MatchResult<'a>> {
    let query = query.to_lowercase();
    let mut matches = Vec::new();

    for employee in &corpus.employees {
        if query.contains(&employee.name.to_lowercase())
            || query.contains(&employee.department.as_str().to_lowercase())
            || query.contains(&employee.position.to_lowercase())
        {
            matches.push(MatchResult::Employee(employee));
        }
    }

    for department in &corpus.departments {
        if query.contains(&department.name.to_lowercase()) {
            matches.push(MatchResult::Department(department));
        }
    }

    tracing::debug!(matches = matches.len(), "retrieved");
    matches
}
