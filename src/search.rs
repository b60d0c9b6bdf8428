use std::borrow::Cow;

use crate::model::UserRecord;

/// Filter `users` by a case-insensitive substring of name or email.
///
/// An empty query hands back the input slice without copying.
pub fn apply<'a>(users: &'a [UserRecord], query: &str) -> Cow<'a, [UserRecord]> {
    if query.is_empty() {
        return Cow::Borrowed(users);
    }
    let q = query.to_lowercase();
    Cow::Owned(
        users
            .iter()
            .filter(|u| {
                u.name.as_deref().unwrap_or("").to_lowercase().contains(&q)
                    || u.email.as_deref().unwrap_or("").to_lowercase().contains(&q)
            })
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Vec<UserRecord> {
		vec![
			UserRecord::new("Ann", "a@x.com"),
			UserRecord::new("Bob", "b@x.com"),
			UserRecord { name: None, email: Some("ANNA@corp.io".into()), id: Some("3".into()) },
		]
	}

	#[test]
	fn matches_name_case_insensitively() {
		let users = sample()[..2].to_vec();
		let out = apply(&users, "an");
		assert_eq!(out.len(), 1);
		assert_eq!(out[0].name.as_deref(), Some("Ann"));
	}

	#[test]
	fn matches_email_and_tolerates_missing_name() {
		let users = sample();
		let out = apply(&users, "corp");
		assert_eq!(out.len(), 1);
		assert_eq!(out[0].id.as_deref(), Some("3"));
	}

	#[test]
	fn preserves_order() {
		let users = sample();
		let out = apply(&users, "AN");
		let ids: Vec<_> = out.iter().map(|u| u.display_email()).collect();
		assert_eq!(ids, vec!["a@x.com", "ANNA@corp.io"]);
	}

	#[test]
	fn empty_query_borrows_and_is_idempotent() {
		let users = sample();
		for _ in 0..3 {
			let out = apply(&users, "");
			assert!(matches!(out, Cow::Borrowed(_)));
			assert_eq!(out.as_ref(), users.as_slice());
		}
	}

	#[test]
	fn special_characters_are_literal() {
		let users = sample();
		assert!(apply(&users, "[").is_empty());
		assert_eq!(apply(&users, "@x.").len(), 2);
	}
}
