use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Current UTC instant formatted as RFC3339, the shape the API uses for
/// `created_at`.
pub fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("rfc3339 formatting")
}

/// Placeholder id for live frames that arrive without one.
pub fn temp_id() -> String {
    format!("tmp-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_rfc3339() {
        let ts = now_timestamp();
        assert!(OffsetDateTime::parse(&ts, &Rfc3339).is_ok());
    }

    #[test]
    fn temp_ids_are_prefixed_and_distinct() {
        let a = temp_id();
        let b = temp_id();
        assert!(a.starts_with("tmp-"));
        assert_ne!(a, b);
    }
}
