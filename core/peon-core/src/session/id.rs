use crate::patterns::RE_SESSION_ID;

/// Returns true if `candidate` is a canonical UUID string.
pub fn is_valid_session_id(candidate: Option<&str>) -> bool {
    match candidate {
        Some(id) => is_valid_session_str(id),
        None => false,
    }
}

pub fn is_valid_session_str(candidate: &str) -> bool {
    !candidate.is_empty() && RE_SESSION_ID.is_match(candidate)
}
